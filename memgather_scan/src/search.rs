//! Literal and regex content search over byte resources.

use std::ops::Range;

use regex::bytes::{Regex, RegexBuilder};
use thiserror::Error;

use crate::{
	cursor::{WindowedSource, DEFAULT_WINDOW_SIZE},
	predicate::literal::LiteralPredicate,
	source::ByteSource,
	stream::StreamScanner
};

/// Bytes of context regex anchors and word boundaries may look at before a scan window.
const LOOK_BEHIND: u64 = 4;

#[derive(Debug, Error)]
pub enum SearchError {
	#[error("empty interval, offset too large?")]
	Range { start: u64, end: u64, size: u64 },
	#[error("invalid regular expression: {0}")]
	RegexCompile(#[from] regex::Error),
	#[error("literal pattern is empty")]
	EmptyPattern,
	#[error("could not read resource")]
	Io(#[from] std::io::Error)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
	Literal(Vec<u8>),
	Regex(String)
}

/// Absolute interval `[start, end)` of a match within the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Match {
	pub start: u64,
	pub end: u64
}
impl Match {
	pub const fn len(&self) -> u64 {
		self.end - self.start
	}

	pub const fn is_empty(&self) -> bool {
		self.start == self.end
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
	pub pattern: Pattern,
	pub start: u64,
	/// End of the searched interval, `None` meaning the end of the resource.
	pub end: Option<u64>,
	pub all_hits: bool,
	pub bytes_before: u64,
	pub bytes_after: u64
}
impl SearchRequest {
	/// Request for the first match of `pattern` anywhere in the resource.
	pub fn new(pattern: Pattern) -> Self {
		SearchRequest {
			pattern,
			start: 0,
			end: None,
			all_hits: false,
			bytes_before: 0,
			bytes_after: 0
		}
	}
}

/// One reported match together with its surrounding context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
	/// Start of the context-expanded span.
	pub offset: u64,
	/// Length of the context-expanded span.
	pub length: u64,
	/// The bytes of the expanded span.
	pub data: Vec<u8>,
	/// The match itself, without context.
	pub matched: Match
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
	/// Size of the cursor window used by literal searches.
	pub cursor_window: usize,
	/// Size of one chunk handed to the regex engine.
	pub regex_window: usize,
	/// How far consecutive regex chunks overlap, the longest match guaranteed to be found whole.
	pub regex_overlap: usize
}
impl Default for SearchConfig {
	fn default() -> Self {
		SearchConfig {
			cursor_window: DEFAULT_WINDOW_SIZE,
			regex_window: 1024 * 1024,
			regex_overlap: 64 * 1024
		}
	}
}

/// Search engine bound to one resource.
pub struct ContentSearch<S: ByteSource> {
	source: WindowedSource<S>,
	config: SearchConfig
}
impl<S: ByteSource> ContentSearch<S> {
	pub fn new(source: S, config: SearchConfig) -> Result<Self, SearchError> {
		let source = WindowedSource::with_capacity(source, config.cursor_window)?;

		Ok(ContentSearch { source, config })
	}

	pub const fn size(&self) -> u64 {
		self.source.size()
	}

	/// Clamps `[start, end)` into the resource.
	///
	/// Returns `None` for an empty resource, which is searched trivially.
	pub fn clamp_range(&self, start: u64, end: Option<u64>) -> Result<Option<Range<u64>>, SearchError> {
		let size = self.size();
		if size == 0 {
			return Ok(None)
		}

		let end = end.unwrap_or(size).min(size);
		let start = start.min(size);
		if start >= end {
			return Err(SearchError::Range { start, end, size })
		}

		Ok(Some(start .. end))
	}

	/// Expands `matched` by up to `before` and `after` bytes without leaving the resource.
	pub fn expand(&self, matched: Match, before: u64, after: u64) -> Match {
		let size = self.size();

		Match {
			start: matched.start - matched.start.min(before),
			end: matched.end + after.min(size.saturating_sub(matched.end))
		}
	}

	pub fn search_literal(
		&self,
		pattern: &[u8],
		start: u64,
		end: Option<u64>,
		all_hits: bool
	) -> Result<Vec<Match>, SearchError> {
		let predicate = LiteralPredicate::new(pattern).ok_or(SearchError::EmptyPattern)?;
		let range = match self.clamp_range(start, end)? {
			None => return Ok(Vec::new()),
			Some(range) => range
		};

		self.scan_literal(predicate, range, all_hits)
	}

	pub fn search_regex(
		&self,
		pattern: &str,
		start: u64,
		end: Option<u64>,
		all_hits: bool
	) -> Result<Vec<Match>, SearchError> {
		let regex = Self::compile(pattern)?;
		let range = match self.clamp_range(start, end)? {
			None => return Ok(Vec::new()),
			Some(range) => range
		};

		self.scan_regex(&regex, range, all_hits)
	}

	/// Runs `request` and materializes the context of every match.
	pub fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, SearchError> {
		let matches = match request.pattern {
			Pattern::Literal(ref bytes) => {
				self.search_literal(bytes, request.start, request.end, request.all_hits)?
			}
			Pattern::Regex(ref pattern) => {
				self.search_regex(pattern, request.start, request.end, request.all_hits)?
			}
		};

		matches
			.into_iter()
			.map(|matched| {
				let expanded = self.expand(matched, request.bytes_before, request.bytes_after);
				let data = self.source.read_range(expanded.start, expanded.end)?;

				Ok::<_, SearchError>(SearchHit {
					offset: expanded.start,
					length: data.len() as u64,
					data,
					matched
				})
			})
			.collect()
	}

	/// Compiles `pattern` for matching arbitrary, not necessarily UTF-8, bytes.
	pub fn compile(pattern: &str) -> Result<Regex, SearchError> {
		let regex = RegexBuilder::new(pattern).unicode(false).build()?;

		Ok(regex)
	}

	fn scan_literal(
		&self,
		predicate: LiteralPredicate,
		range: Range<u64>,
		all_hits: bool
	) -> Result<Vec<Match>, SearchError> {
		let mut scanner = StreamScanner::new(predicate);
		let end = self.source.cursor(range.end);

		let mut matches = Vec::new();
		let mut position = self.source.cursor(range.start);
		while position < end {
			let mut found = None;
			scanner.scan_once(position.offset(), position.bytes_until(end), |offset, length| {
				found = Some(Match {
					start: offset,
					end: offset + length.get() as u64
				});

				false
			});

			if let Some(err) = self.source.take_error() {
				return Err(SearchError::Io(err))
			}

			match found {
				None => break,
				Some(matched) => {
					matches.push(matched);
					if !all_hits {
						break
					}

					// no overlapping matches, continue right after this one
					position = self.source.cursor(matched.end);
				}
			}
		}
		log::debug!("literal scan of {:?} found {} matches", range, matches.len());

		Ok(matches)
	}

	/// Runs `regex` over `range` in overlapping chunks.
	///
	/// A match is only accepted from a chunk if it starts before the overlap and ends before the chunk does,
	/// otherwise the next chunk starts early enough to see it whole. Matches longer than the overlap
	/// are guaranteed to be found whole only if they start at the beginning of a chunk.
	fn scan_regex(&self, regex: &Regex, range: Range<u64>, all_hits: bool) -> Result<Vec<Match>, SearchError> {
		let window = self.config.regex_window.max(2) as u64;
		let overlap = (self.config.regex_overlap as u64).min(window / 2);

		let mut matches = Vec::new();
		let mut position = range.start;
		loop {
			let buffer_start = position.saturating_sub(LOOK_BEHIND).max(range.start);
			let window_end = position.saturating_add(window).min(range.end);
			let last_window = window_end == range.end;
			let accept_before = if last_window { range.end } else { window_end - overlap };

			let buffer = self.source.read_range(buffer_start, window_end)?;
			log::debug!("regex scan window {:#x}-{:#x}", position, window_end);

			let mut next_position = accept_before;
			let mut search_from = (position - buffer_start) as usize;
			while search_from <= buffer.len() {
				let found = match regex.find_at(&buffer, search_from) {
					None => break,
					Some(found) => found
				};
				let matched = Match {
					start: buffer_start + found.start() as u64,
					end: buffer_start + found.end() as u64
				};

				if !last_window {
					if matched.start >= accept_before {
						break
					}
					// possibly cut short by the chunk end, unless no later chunk could do better
					if matched.end >= window_end && matched.start > position {
						next_position = matched.start;
						break
					}
				}

				matches.push(matched);
				if !all_hits {
					return Ok(matches)
				}

				// empty matches still have to move the scan forward
				search_from = found.end() + matched.is_empty() as usize;
				next_position = next_position.max(buffer_start + search_from as u64);
			}

			if last_window || next_position >= range.end {
				break
			}
			position = next_position;
		}

		Ok(matches)
	}
}
