//! Actions exposed by the memory gathering agent.
//!
//! Requests arrive as JSON envelopes naming an action and its arguments. The action runs to
//! completion against a [`context::ActionContext`] and the collected records, or a single error,
//! are sent back in a reply. The transport carrying the envelopes is not part of this crate.

pub mod actions;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod envelope;
pub mod error;

pub use crate::{
	config::AgentConfig,
	dispatch::Dispatcher,
	envelope::{Reply, Request}
};
