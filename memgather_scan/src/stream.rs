use std::num::NonZeroUsize;

use crate::candidate::ScannerCandidate;
use crate::predicate::{ScannerPredicate, UpdateCandidateResult};

/// Scans a stream of bytes for values matching the predicate.
pub struct StreamScanner<P: ScannerPredicate> {
	predicate: P,
	candidates: Vec<ScannerCandidate>
}
impl<P: ScannerPredicate> StreamScanner<P> {
	pub fn new(predicate: P) -> Self {
		StreamScanner {
			predicate,
			candidates: Vec::new()
		}
	}

	pub fn predicate(&self) -> &P {
		&self.predicate
	}

	/// Clears candidates left over from a previous scan.
	pub fn reset(&mut self) {
		self.candidates.clear()
	}

	/// Runs the scanner on a stream whose first byte lies at `offset`.
	///
	/// `callback` receives the offset and length of every match, in the order the matches end.
	/// Scanning stops once the callback returns `false`.
	///
	/// Does not detect across multiple calls.
	pub fn scan_once(
		&mut self,
		offset: u64,
		stream: impl Iterator<Item = u8>,
		mut callback: impl FnMut(u64, NonZeroUsize) -> bool
	) {
		self.reset();

		let mut offset = offset;
		for byte in stream {
			let cont = self.on_byte(offset, byte, &mut callback);

			if !cont {
				break
			}

			offset += 1;
		}
	}

	fn on_byte(
		&mut self,
		offset: u64,
		byte: u8,
		mut callback: impl FnMut(u64, NonZeroUsize) -> bool
	) -> bool {
		let mut i = 0;
		while i < self.candidates.len() {
			// make sure to skip candidates that are in a different address range
			if self.candidates[i].end_offset() != offset {
				i += 1;
				continue
			}

			match self.predicate.update_candidate(offset, byte, &self.candidates[i]) {
				UpdateCandidateResult::Advance => {
					self.candidates[i].advance();
					i += 1;
				}
				UpdateCandidateResult::Remove => {
					self.candidates.remove(i);
				}
				UpdateCandidateResult::Resolve => {
					let mut candidate = self.candidates.remove(i);
					candidate.advance();
					candidate.resolve();

					if !callback(candidate.offset(), candidate.length()) {
						return false
					}
				}
			}
		}

		match self.predicate.try_start_candidate(offset, byte) {
			None => (),
			Some(candidate) if candidate.is_resolved() => {
				return callback(candidate.offset(), candidate.length())
			}
			Some(candidate) => self.candidates.push(candidate)
		};

		true
	}
}

#[cfg(test)]
mod test {
	use std::num::NonZeroUsize;

	use super::StreamScanner;
	use crate::predicate::literal::LiteralPredicate;

	fn scan_all(needle: &str, haystack: &[u8], offset: u64) -> Vec<(u64, usize)> {
		let mut scanner = StreamScanner::new(LiteralPredicate::new(needle).unwrap());
		let mut found = Vec::new();

		scanner.scan_once(offset, haystack.iter().copied(), |offset, len| {
			found.push((offset, len.get()));

			true
		});

		found
	}

	#[test]
	fn test_stream_scanner_finds_value() {
		let data = b"Hello There";

		let mut scanner = StreamScanner::new(LiteralPredicate::new(&data[..]).unwrap());
		let mut found = Vec::new();
		scanner.scan_once(1, data.iter().copied(), |offset, len| {
			found.push((offset, len));

			true
		});

		assert_eq!(found, &[(1, NonZeroUsize::new(data.len()).unwrap())]);
	}

	#[test]
	fn test_stream_scanner_overlapping_candidates() {
		assert_eq!(scan_all("aab", b"aaab", 0), &[(1, 3)]);
		// every occurrence is reported, overlapping ones included
		assert_eq!(scan_all("aa", b"aaaa", 10), &[(10, 2), (11, 2), (12, 2)]);
		assert_eq!(scan_all("x", b"axbx", 0), &[(1, 1), (3, 1)]);
	}

	#[test]
	fn test_stream_scanner_stops() {
		let mut scanner = StreamScanner::new(LiteralPredicate::new("ab").unwrap());
		let mut found = Vec::new();

		scanner.scan_once(0, b"ababab".iter().copied(), |offset, _| {
			found.push(offset);

			false
		});

		assert_eq!(found, &[0]);
	}
}
