pub use crate::{
	common::{AddressRange, Pid, MAX_CHUNK_SIZE},
	memory::region::MemoryRegion
};

#[cfg(target_os = "linux")]
pub use crate::{
	acquire::{AcquireError, DumpConfig, DumpOutcome, DumpSummary, DumpedRegion, ProcessHandle},
	platform::{
		procfs::{MapsParser, MapsReader},
		ptrace::{PtraceAttachError, PtraceAttachment, PtraceDetachError}
	}
};
