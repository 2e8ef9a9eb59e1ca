pub mod maps;

pub use maps::{MapsParser, MapsReader};

/// Returns the path of the memory access file of process `pid`.
pub fn mem_path(pid: crate::common::Pid) -> std::path::PathBuf {
	format!("/proc/{}/mem", pid).into()
}
