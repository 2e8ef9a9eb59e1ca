//! Platform specific access to process memory.
//!
//! Only Linux is supported, memory is enumerated and read through procfs and processes are paused using ptrace.

#[cfg(target_os = "linux")]
pub mod ptrace;

#[cfg(target_os = "linux")]
pub mod procfs;
