use std::{
	fs::OpenOptions,
	io::{BufRead, BufReader}
};

use crate::{common::Pid, memory::region::MemoryRegion};

/// Parser for the `/proc/[pid]/maps` line format.
///
/// `<start>-<end> <perms> <offset> <dev> <inode> [<path>]`, addresses and offset in hex.
pub struct MapsParser;
impl MapsParser {
	pub fn maps_path(pid: Pid) -> std::path::PathBuf {
		format!("/proc/{}/maps", pid).into()
	}

	/// Parses one line into a region.
	///
	/// Returns `None` for lines that cannot be parsed, those are meant to be skipped.
	pub fn parse_line(line: &str) -> Option<MemoryRegion> {
		let mut rest = line;

		let (from, to) = Self::next_token(&mut rest)?.split_once('-')?;
		let start = u64::from_str_radix(from, 16).ok()?;
		let end = u64::from_str_radix(to, 16).ok()?;

		let permissions = Self::next_token(&mut rest)?.to_string();
		// not used for region selection, a bogus offset does not invalidate the line
		let offset = u64::from_str_radix(Self::next_token(&mut rest)?, 16).unwrap_or(0);
		let device = Self::next_token(&mut rest)?.to_string();
		let inode = Self::next_token(&mut rest)?.to_string();

		// the path may contain spaces, it is the rest of the line
		let path = match rest.trim() {
			"" => None,
			path => Some(path.to_string())
		};

		Some(MemoryRegion {
			start,
			end,
			permissions,
			offset,
			device,
			inode,
			path
		})
	}

	fn next_token<'a>(rest: &mut &'a str) -> Option<&'a str> {
		let trimmed = rest.trim_start();
		let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
		let (token, tail) = trimmed.split_at(end);
		*rest = tail;

		if token.is_empty() {
			None
		} else {
			Some(token)
		}
	}
}

/// Iterator over regions parsed from a maps line stream.
///
/// Malformed lines are skipped. A read error ends the iteration.
pub struct MapsReader<R: BufRead> {
	lines: std::io::Lines<R>
}
impl MapsReader<BufReader<std::fs::File>> {
	/// Opens `/proc/[pid]/maps` of the given process.
	pub fn open(pid: Pid) -> std::io::Result<Self> {
		let file = OpenOptions::new().read(true).open(MapsParser::maps_path(pid))?;

		Ok(MapsReader::new(BufReader::new(file)))
	}
}
impl<R: BufRead> MapsReader<R> {
	pub fn new(reader: R) -> Self {
		MapsReader {
			lines: reader.lines()
		}
	}
}
impl<R: BufRead> Iterator for MapsReader<R> {
	type Item = MemoryRegion;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			let line = match self.lines.next()? {
				Ok(line) => line,
				Err(err) => {
					log::warn!("could not read maps line: {}", err);
					return None
				}
			};

			match MapsParser::parse_line(&line) {
				Some(region) => return Some(region),
				None => log::debug!("skipping malformed maps line {:?}", line)
			}
		}
	}
}
