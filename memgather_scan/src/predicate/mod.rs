use crate::candidate::ScannerCandidate;

pub mod literal;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UpdateCandidateResult {
	/// Candidate is still valid, advance it and continue.
	Advance,
	/// Candidate is no longer valid, remove it from the candidate pool.
	Remove,
	/// Resolve the candidate into the match.
	Resolve
}

/// Scanner predicate is an interface which the scanner asks where
/// to create, update, delete and resolve candidates.
pub trait ScannerPredicate {
	/// Decides whether the currently read byte is a start of a candidate.
	fn try_start_candidate(&self, offset: u64, byte: u8) -> Option<ScannerCandidate>;

	/// Decides whether the currently read byte is a valid continuation of the candidate.
	///
	/// This is only called if `offset == candidate.end_offset()`.
	fn update_candidate(
		&self,
		offset: u64,
		byte: u8,
		candidate: &ScannerCandidate
	) -> UpdateCandidateResult;
}
