use std::num::NonZeroUsize;

/// Candidate match for stream scanner.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ScannerCandidate {
	/// Offset where the value match starts.
	offset: u64,
	/// Length of the candidate match.
	length: NonZeroUsize,
	/// Whether the candidate has been resolved.
	resolved: bool
}
impl ScannerCandidate {
	/// Creates a candidate of length one which still needs more bytes.
	pub fn normal(offset: u64) -> Self {
		ScannerCandidate {
			offset,
			length: NonZeroUsize::MIN,
			resolved: false
		}
	}

	/// Creates a candidate of length one which is already a complete match.
	pub fn resolved(offset: u64) -> Self {
		ScannerCandidate {
			offset,
			length: NonZeroUsize::MIN,
			resolved: true
		}
	}

	pub const fn is_resolved(&self) -> bool {
		self.resolved
	}

	/// Returns the offset where the value match starts.
	pub const fn offset(&self) -> u64 {
		self.offset
	}

	/// Returns the length of the match since [`offset`](ScannerCandidate::offset).
	pub const fn length(&self) -> NonZeroUsize {
		self.length
	}

	/// Offset one past the last matched byte.
	pub const fn end_offset(&self) -> u64 {
		self.offset.saturating_add(self.length.get() as u64)
	}

	pub fn advance(&mut self) {
		self.length = self.length.saturating_add(1);
	}

	pub fn resolve(&mut self) {
		self.resolved = true;
	}
}
