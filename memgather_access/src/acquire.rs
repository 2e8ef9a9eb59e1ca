//! Acquisition of live process memory.
//!
//! A [`ProcessHandle`] owns everything needed for one dump: the memory file, the maps stream,
//! the scratch output file and optionally a ptrace attachment which keeps the process paused.

use std::{
	fs::{File, OpenOptions},
	io::{BufReader, Read, Seek, SeekFrom, Write},
	path::PathBuf
};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::{
	common::{AddressRange, Pid, MAX_CHUNK_SIZE},
	memory::region::MemoryRegion,
	platform::{
		procfs::{self, MapsReader},
		ptrace::{PtraceAttachError, PtraceAttachment}
	}
};

#[derive(Debug, Error)]
pub enum AcquireError {
	#[error("could not open memory of process {pid}")]
	OpenMemory {
		pid: Pid,
		#[source]
		source: std::io::Error
	},
	#[error("could not open memory map of process {pid}")]
	OpenMaps {
		pid: Pid,
		#[source]
		source: std::io::Error
	},
	#[error("could not create scratch output file")]
	OpenSink(#[source] std::io::Error),
	#[error("could not pause process {pid}")]
	Attach {
		pid: Pid,
		#[source]
		source: PtraceAttachError
	},
	#[error("process handle is not usable")]
	NotUsable,
	#[error("could not write memory dump, output discarded")]
	Write(#[source] std::io::Error),
	#[error("could not keep memory dump")]
	Persist(#[source] std::io::Error)
}

/// Configuration of process memory dumps.
#[derive(Debug, Clone)]
pub struct DumpConfig {
	/// Directory in which dump files are created.
	pub scratch_dir: PathBuf,
	/// Size of one copy chunk, capped at [`MAX_CHUNK_SIZE`].
	pub chunk_size: usize
}
impl DumpConfig {
	pub fn effective_chunk_size(&self) -> usize {
		self.chunk_size.clamp(1, MAX_CHUNK_SIZE)
	}
}
impl Default for DumpConfig {
	fn default() -> Self {
		DumpConfig {
			scratch_dir: std::env::temp_dir(),
			chunk_size: MAX_CHUNK_SIZE
		}
	}
}

/// Where the bytes of one region ended up in the dump file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpedRegion {
	pub range: AddressRange,
	pub file_offset: u64,
	/// Number of bytes copied, may be less than the size of `range`.
	pub length: u64
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpSummary {
	pub bytes_written: u64,
	pub regions: Vec<DumpedRegion>
}

#[derive(Debug)]
pub struct DumpOutcome {
	/// Path of the finished dump file.
	pub location: PathBuf,
	pub summary: DumpSummary,
	/// Set when the process could not be detached after the dump was written.
	pub detach_error: Option<String>
}

/// Copies all dumpable regions from `mem` into `sink`, in the order they are yielded.
///
/// A region whose start cannot be seeked to is skipped. A failed, short or empty read ends
/// the copy of the current region only.
///
/// Returns an error only if writing into `sink` fails, in which case the output is incomplete.
pub fn copy_regions<M: Read + Seek, W: Write>(
	mem: &mut M,
	regions: impl Iterator<Item = MemoryRegion>,
	sink: &mut W,
	chunk_size: usize
) -> Result<DumpSummary, std::io::Error> {
	let mut buffer = vec![0u8; chunk_size.clamp(1, MAX_CHUNK_SIZE)];
	let mut summary = DumpSummary::default();

	for region in regions.filter(MemoryRegion::dumpable) {
		let length = copy_region(mem, &region, sink, &mut buffer)?;
		log::debug!("copied {:#x} bytes of region {}", length, region);

		if length > 0 {
			summary.regions.push(DumpedRegion {
				range: region.range(),
				file_offset: summary.bytes_written,
				length
			});
			summary.bytes_written += length;
		}
	}
	sink.flush()?;

	Ok(summary)
}

fn copy_region<M: Read + Seek, W: Write>(
	mem: &mut M,
	region: &MemoryRegion,
	sink: &mut W,
	buffer: &mut [u8]
) -> Result<u64, std::io::Error> {
	match mem.seek(SeekFrom::Start(region.start)) {
		Ok(position) if position == region.start => (),
		Ok(position) => {
			log::warn!("seek to {:#x} landed at {:#x}, skipping region", region.start, position);
			return Ok(0)
		}
		Err(err) => {
			log::warn!("could not seek to region {}: {}", region.range(), err);
			return Ok(0)
		}
	}

	let mut remaining = region.size();
	let mut copied = 0u64;
	while remaining > 0 {
		let wanted = remaining.min(buffer.len() as u64) as usize;

		let read = match mem.read(&mut buffer[.. wanted]) {
			Ok(0) => break,
			Ok(read) => read,
			Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
			Err(err) => {
				log::debug!("read of region {} stopped at +{:#x}: {}", region.range(), copied, err);
				break
			}
		};

		sink.write_all(&buffer[.. read])?;
		copied += read as u64;
		remaining -= read as u64;

		if read < wanted {
			break
		}
	}

	Ok(copied)
}

/// Handle to the memory of one process, exclusively owned by one dump.
pub struct ProcessHandle {
	pid: Pid,
	pause_requested: bool,
	attachment: Option<PtraceAttachment>,
	mem: File,
	maps: MapsReader<BufReader<File>>,
	sink: NamedTempFile,
	chunk_size: usize
}
impl ProcessHandle {
	/// Opens the memory of process `pid` and, if `pause` is set, attaches to it with ptrace.
	///
	/// Any files created before a failure are removed again.
	pub fn open(pid: Pid, pause: bool, config: &DumpConfig) -> Result<Self, AcquireError> {
		let mem = OpenOptions::new()
			.read(true)
			.open(procfs::mem_path(pid))
			.map_err(|source| AcquireError::OpenMemory { pid, source })?;

		let maps = MapsReader::open(pid).map_err(|source| AcquireError::OpenMaps { pid, source })?;

		let sink = tempfile::Builder::new()
			.prefix("memgather-dump-")
			.suffix(".bin")
			.tempfile_in(&config.scratch_dir)
			.map_err(AcquireError::OpenSink)?;

		let attachment = if pause {
			Some(PtraceAttachment::attach(pid).map_err(|source| AcquireError::Attach { pid, source })?)
		} else {
			None
		};

		Ok(ProcessHandle {
			pid,
			pause_requested: pause,
			attachment,
			mem,
			maps,
			sink,
			chunk_size: config.effective_chunk_size()
		})
	}

	pub const fn pid(&self) -> Pid {
		self.pid
	}

	pub fn attached(&self) -> bool {
		self.attachment.as_ref().map(PtraceAttachment::attached).unwrap_or(false)
	}

	/// Whether the handle can be used for a dump.
	///
	/// A handle that was asked to pause the process must hold the attachment.
	pub fn is_good(&self) -> bool {
		self.attached() == self.pause_requested
	}

	/// Path of the scratch file the dump is written to.
	pub fn sink_path(&self) -> &std::path::Path {
		self.sink.path()
	}

	/// Dumps all anonymous readable regions of the process into the scratch file.
	///
	/// On success the scratch file is kept and its location returned. On a write failure it is deleted.
	/// The process is detached in every case; a failed detach after a successful dump is only reported
	/// in [`DumpOutcome::detach_error`].
	pub fn dump(self) -> Result<DumpOutcome, AcquireError> {
		self.dump_with(|mem, maps, sink, chunk_size| copy_regions(mem, maps, sink, chunk_size))
	}

	fn dump_with(
		self,
		copy: impl FnOnce(&mut File, MapsReader<BufReader<File>>, &mut File, usize) -> Result<DumpSummary, std::io::Error>
	) -> Result<DumpOutcome, AcquireError> {
		if !self.is_good() {
			return Err(AcquireError::NotUsable)
		}

		let ProcessHandle {
			pid,
			attachment,
			mut mem,
			maps,
			mut sink,
			chunk_size,
			..
		} = self;

		let result = copy(&mut mem, maps, sink.as_file_mut(), chunk_size);

		let detach_error = attachment.and_then(|attachment| attachment.detach().err()).map(|err| {
			log::warn!("could not detach from process {}: {}", pid, err);
			err.to_string()
		});

		let summary = result.map_err(AcquireError::Write)?;
		let (_, location) = sink.keep().map_err(|err| AcquireError::Persist(err.error))?;
		log::info!(
			"dumped {:#x} bytes from {} regions of process {} into {}",
			summary.bytes_written,
			summary.regions.len(),
			pid,
			location.display()
		);

		Ok(DumpOutcome {
			location,
			summary,
			detach_error
		})
	}
}

#[cfg(test)]
mod test {
	use std::io::{Read, Seek, SeekFrom, Write};

	use super::{copy_regions, AcquireError, DumpConfig, ProcessHandle};
	use crate::{
		common::self_pid,
		platform::{procfs::MapsReader, ptrace::PtraceAttachError}
	};

	/// Synthetic address space where every byte is derived from its address.
	struct FakeMemory {
		position: u64,
		size: u64,
		unreadable: Option<(u64, u64)>,
		reads: Vec<usize>
	}
	impl FakeMemory {
		fn new(size: u64) -> Self {
			FakeMemory {
				position: 0,
				size,
				unreadable: None,
				reads: Vec::new()
			}
		}

		fn byte_at(address: u64) -> u8 {
			(address % 251) as u8
		}
	}
	impl Read for FakeMemory {
		fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
			if let Some((from, to)) = self.unreadable {
				if self.position >= from && self.position < to {
					return Err(std::io::Error::from_raw_os_error(libc::EIO))
				}
			}

			let available = self.size.saturating_sub(self.position).min(buf.len() as u64) as usize;
			for (i, byte) in buf[.. available].iter_mut().enumerate() {
				*byte = FakeMemory::byte_at(self.position + i as u64);
			}
			self.position += available as u64;
			self.reads.push(available);

			Ok(available)
		}
	}
	impl Seek for FakeMemory {
		fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
			match pos {
				SeekFrom::Start(position) if position <= self.size => {
					self.position = position;
					Ok(position)
				}
				_ => Err(std::io::Error::from_raw_os_error(libc::EINVAL))
			}
		}
	}

	struct FailingWriter {
		budget: usize
	}
	impl Write for FailingWriter {
		fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
			if buf.len() > self.budget {
				return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
			}
			self.budget -= buf.len();

			Ok(buf.len())
		}

		fn flush(&mut self) -> std::io::Result<()> {
			Ok(())
		}
	}

	#[test]
	fn test_copy_regions_anonymous_only() {
		let maps = "400000-401000 r-xp 00000000 00:00 0\n\
			402000-403000 rw-p 00000000 08:01 1234 /lib/x.so\n";

		let mut mem = FakeMemory::new(0x500000);
		let mut output = Vec::new();
		let summary = copy_regions(&mut mem, MapsReader::new(maps.as_bytes()), &mut output, 0x1000).unwrap();

		assert_eq!(output.len(), 0x1000);
		assert_eq!(summary.bytes_written, 0x1000);
		assert_eq!(summary.regions.len(), 1);
		assert_eq!(summary.regions[0].range.start, 0x400000);
		assert!(output
			.iter()
			.enumerate()
			.all(|(i, &byte)| byte == FakeMemory::byte_at(0x400000 + i as u64)));
	}

	#[test]
	fn test_copy_regions_skips_unreadable_and_unseekable() {
		let maps = "1000-2000 ---p 00000000 00:00 0\n\
			2000-3000 rw-p 00000000 00:00 0 [heap]\n\
			ffffffffff600000-ffffffffff601000 r-xp 00000000 00:00 0 [vsyscall]\n\
			3000-3000 rw-p 00000000 00:00 0\n";

		let mut mem = FakeMemory::new(0x10000);
		let mut output = Vec::new();
		let summary = copy_regions(&mut mem, MapsReader::new(maps.as_bytes()), &mut output, 0x800).unwrap();

		assert_eq!(output.len(), 0x1000);
		assert_eq!(summary.regions.len(), 1);
		assert_eq!(summary.regions[0].range.start, 0x2000);
		assert_eq!(output[0], FakeMemory::byte_at(0x2000));
	}

	#[test]
	fn test_copy_regions_read_error_ends_region() {
		let maps = "1000-3000 rw-p 00000000 00:00 0\n\
			4000-5000 rw-p 00000000 00:00 0\n";

		let mut mem = FakeMemory::new(0x10000);
		mem.unreadable = Some((0x2000, 0x3000));
		let mut output = Vec::new();
		let summary = copy_regions(&mut mem, MapsReader::new(maps.as_bytes()), &mut output, 0x1000).unwrap();

		assert_eq!(summary.regions.len(), 2);
		assert_eq!(summary.regions[0].length, 0x1000);
		assert_eq!(summary.regions[1].file_offset, 0x1000);
		assert_eq!(output.len(), 0x2000);
		assert_eq!(output[0x1000], FakeMemory::byte_at(0x4000));
	}

	#[test]
	fn test_copy_regions_chunk_cap() {
		let maps = "0-200000 rw-p 00000000 00:00 0\n";

		let mut mem = FakeMemory::new(0x200000);
		let mut output = Vec::new();
		copy_regions(&mut mem, MapsReader::new(maps.as_bytes()), &mut output, usize::MAX).unwrap();

		assert_eq!(output.len(), 0x200000);
		assert!(mem.reads.iter().all(|&read| read <= 512 * 1024));
	}

	#[test]
	fn test_copy_regions_write_failure() {
		let maps = "0-3000 rw-p 00000000 00:00 0\n";

		let mut mem = FakeMemory::new(0x10000);
		let mut sink = FailingWriter { budget: 0x1800 };
		copy_regions(&mut mem, MapsReader::new(maps.as_bytes()), &mut sink, 0x1000).unwrap_err();
	}

	#[test]
	fn test_open_self_pause_rejected() {
		let scratch = tempfile::tempdir().unwrap();
		let config = DumpConfig {
			scratch_dir: scratch.path().to_path_buf(),
			..Default::default()
		};

		let err = ProcessHandle::open(self_pid(), true, &config).err().unwrap();
		assert!(matches!(
			err,
			AcquireError::Attach {
				source: PtraceAttachError::SelfAttach,
				..
			}
		));

		// the scratch file must not survive
		assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
	}

	#[test]
	fn test_open_self_without_pause() {
		let scratch = tempfile::tempdir().unwrap();
		let config = DumpConfig {
			scratch_dir: scratch.path().to_path_buf(),
			..Default::default()
		};

		let handle = ProcessHandle::open(self_pid(), false, &config).unwrap();
		assert!(handle.is_good());
		assert!(!handle.attached());
		assert!(handle.sink_path().starts_with(scratch.path()));

		drop(handle);
		assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
	}

	#[test]
	fn test_dump_write_failure_discards_output() {
		let scratch = tempfile::tempdir().unwrap();
		let config = DumpConfig {
			scratch_dir: scratch.path().to_path_buf(),
			..Default::default()
		};

		let handle = ProcessHandle::open(self_pid(), false, &config).unwrap();
		let err = handle
			.dump_with(|_, _, sink, _| {
				sink.write_all(b"partial")?;
				Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
			})
			.err()
			.unwrap();

		assert!(matches!(err, AcquireError::Write(_)));
		assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
	}

	fn process_state(pid: i32) -> char {
		let stat = std::fs::read_to_string(format!("/proc/{}/stat", pid)).unwrap();
		// the command name may contain spaces, the state follows its closing parenthesis
		let after_comm = &stat[stat.rfind(')').unwrap() + 1 ..];

		after_comm.trim_start().chars().next().unwrap()
	}

	#[test]
	fn test_dump_paused_child() {
		let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
		let pid = child.id() as i32;

		let scratch = tempfile::tempdir().unwrap();
		let config = DumpConfig {
			scratch_dir: scratch.path().to_path_buf(),
			..Default::default()
		};

		let handle = ProcessHandle::open(pid, true, &config).unwrap();
		assert!(handle.attached());
		assert!(handle.is_good());
		assert!(matches!(process_state(pid), 't' | 'T'));

		let outcome = handle.dump().unwrap();
		assert!(outcome.detach_error.is_none());
		assert!(outcome.summary.bytes_written > 0);
		assert!(outcome.location.starts_with(scratch.path()));
		assert_eq!(
			std::fs::metadata(&outcome.location).unwrap().len(),
			outcome.summary.bytes_written
		);

		// detached and running again
		assert!(child.try_wait().unwrap().is_none());
		assert!(!matches!(process_state(pid), 't' | 'T'));

		child.kill().unwrap();
		child.wait().unwrap();
	}

	#[test]
	fn test_open_nonexistent_process() {
		let err = ProcessHandle::open(i32::MAX - 1, false, &DumpConfig::default()).err().unwrap();

		assert!(matches!(err, AcquireError::OpenMemory { .. }));
	}
}
