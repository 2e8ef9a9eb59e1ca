use std::io::{Read, Seek, SeekFrom};

/// Random access byte resource, such as a file or a memory dump.
pub trait ByteSource {
	/// Total size of the resource in bytes.
	fn size(&mut self) -> std::io::Result<u64>;

	/// Reads into `buffer` starting at `offset`.
	///
	/// The buffer is filled completely unless the end of the resource is reached first.
	/// Returns the number of bytes read.
	fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> std::io::Result<usize>;

	/// Reads the half-open interval `[start, end)`, or less if the resource ends sooner.
	fn read_range(&mut self, start: u64, end: u64) -> std::io::Result<Vec<u8>> {
		let mut buffer = vec![0u8; end.saturating_sub(start) as usize];
		let read = self.read_at(start, &mut buffer)?;
		buffer.truncate(read);

		Ok(buffer)
	}
}
impl<T: Read + Seek> ByteSource for T {
	fn size(&mut self) -> std::io::Result<u64> {
		self.seek(SeekFrom::End(0))
	}

	fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> std::io::Result<usize> {
		self.seek(SeekFrom::Start(offset))?;

		let mut filled = 0;
		while filled < buffer.len() {
			match self.read(&mut buffer[filled ..]) {
				Ok(0) => break,
				Ok(read) => filled += read,
				Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
				Err(err) => return Err(err)
			}
		}

		Ok(filled)
	}
}
