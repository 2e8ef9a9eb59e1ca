//! Common definitions used across this library.

/// Process identifier as understood by the kernel.
pub type Pid = libc::pid_t;

/// Largest chunk copied out of process memory in one read.
pub const MAX_CHUNK_SIZE: usize = 512 * 1024;

/// Returns the pid of the calling process.
pub fn self_pid() -> Pid {
	// Safe because getpid cannot fail
	unsafe { libc::getpid() }
}

/// Half-open interval of addresses or offsets.
///
/// `start <= end` is not enforced here, consumers decide what an inverted range means.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AddressRange {
	pub start: u64,
	pub end: u64
}
impl AddressRange {
	pub const fn new(start: u64, end: u64) -> Self {
		AddressRange { start, end }
	}

	pub const fn is_empty(&self) -> bool {
		self.start >= self.end
	}

	pub const fn len(&self) -> u64 {
		self.end.saturating_sub(self.start)
	}
}
impl std::fmt::Display for AddressRange {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "{:x}-{:x}", self.start, self.end)
	}
}
