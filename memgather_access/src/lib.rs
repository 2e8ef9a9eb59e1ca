//! Live process memory acquisition.
//!
//! This library parses process memory maps, pauses processes using ptrace and copies
//! their anonymous readable memory out into a flat dump file.

pub mod common;
pub mod memory;

pub mod platform;

#[cfg(target_os = "linux")]
pub mod acquire;

pub mod prelude;
