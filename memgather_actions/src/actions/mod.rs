//! Action definitions.
//!
//! Each action parses its typed arguments from the context, runs to completion and then emits
//! its responses. Failures surface as exactly one error message and no responses.

use serde::de::DeserializeOwned;

use crate::{context::ActionContext, error::ActionError};

#[cfg(target_os = "linux")]
pub mod dump;
pub mod find;
pub mod search;
pub mod transfer;

pub trait Action {
	const NAME: &'static str;
	type Args: DeserializeOwned;

	fn run<C: ActionContext>(&self, args: Self::Args, context: &mut C) -> Result<(), ActionError>;
}

/// Runs `action` against `context`, turning a failure into the context error.
///
/// Returns whether the action succeeded.
pub fn run_action<A: Action, C: ActionContext>(action: &A, context: &mut C) -> bool {
	let result = context
		.populate_args::<A::Args>()
		.map_err(ActionError::from)
		.and_then(|args| action.run(args, context));

	match result {
		Ok(()) => {
			log::info!("action {} finished", A::NAME);
			true
		}
		Err(err) => {
			let message = err.report();
			log::warn!("action {} failed: {}", A::NAME, message);
			context.set_error(message);
			false
		}
	}
}

fn open_resource(path: &std::path::Path) -> Result<std::fs::File, ActionError> {
	std::fs::File::open(path).map_err(|source| ActionError::OpenResource {
		path: path.to_path_buf(),
		source
	})
}
