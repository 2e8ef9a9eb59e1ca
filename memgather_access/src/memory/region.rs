use crate::common::AddressRange;

/// One mapping of a process address space as reported by the kernel.
///
/// The textual columns are kept verbatim, the predicates below interpret them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
	pub start: u64,
	pub end: u64,
	/// Permission column, for example `rw-p`.
	pub permissions: String,
	/// Offset into the backing file, zero for anonymous mappings.
	pub offset: u64,
	/// Device column in `major:minor` form.
	pub device: String,
	pub inode: String,
	/// Path or pseudo-path such as `[heap]`, if any.
	pub path: Option<String>
}
impl MemoryRegion {
	pub fn readable(&self) -> bool {
		self.permissions.starts_with('r')
	}

	/// Whether the region counts as backed by a file.
	///
	/// Only the first character of the inode column is inspected: a region whose inode
	/// starts with anything other than `'0'` is treated as file-backed.
	pub fn file_backed(&self) -> bool {
		!self.inode.starts_with('0')
	}

	/// Whether the region is selected for a memory dump.
	pub fn dumpable(&self) -> bool {
		self.readable() && !self.file_backed() && self.start < self.end
	}

	pub const fn size(&self) -> u64 {
		self.end.saturating_sub(self.start)
	}

	pub const fn range(&self) -> AddressRange {
		AddressRange::new(self.start, self.end)
	}
}
impl std::fmt::Display for MemoryRegion {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(
			f,
			"{:x}-{:x} {} {:08x} {} {}",
			self.start,
			self.end,
			self.permissions,
			self.offset,
			self.device,
			self.inode
		)?;

		match self.path {
			Some(ref path) => write!(f, " {}", path),
			None => Ok(())
		}
	}
}
