use crate::{
	candidate::ScannerCandidate,
	predicate::{ScannerPredicate, UpdateCandidateResult}
};

/// Predicate scanning for a literal byte string.
pub struct LiteralPredicate {
	bytes: Vec<u8>
}
impl LiteralPredicate {
	/// Creates a new predicate.
	///
	/// Returns `None` if `bytes` is empty, as the empty string matches nowhere in particular.
	pub fn new(bytes: impl Into<Vec<u8>>) -> Option<Self> {
		let bytes = bytes.into();
		if bytes.is_empty() {
			return None
		}

		Some(LiteralPredicate { bytes })
	}

	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}
}
impl ScannerPredicate for LiteralPredicate {
	fn try_start_candidate(&self, offset: u64, byte: u8) -> Option<ScannerCandidate> {
		if self.bytes[0] != byte {
			return None
		}

		let result = if self.bytes.len() == 1 {
			ScannerCandidate::resolved(offset)
		} else {
			ScannerCandidate::normal(offset)
		};

		Some(result)
	}

	fn update_candidate(
		&self,
		_offset: u64,
		byte: u8,
		candidate: &ScannerCandidate
	) -> UpdateCandidateResult {
		let position = candidate.length().get();
		debug_assert!(position < self.bytes.len());

		if self.bytes[position] != byte {
			UpdateCandidateResult::Remove
		} else if position + 1 == self.bytes.len() {
			UpdateCandidateResult::Resolve
		} else {
			UpdateCandidateResult::Advance
		}
	}
}
