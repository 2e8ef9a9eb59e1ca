use memgather_scan::source::ByteSource;

/// Size of the chunks streamed through the digest and the compressor.
pub const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Interval of a resource which was actually read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferReference {
	pub offset: u64,
	pub length: u64
}
impl BufferReference {
	/// Clamps `[offset, offset + length)` to a resource of `size` bytes.
	pub fn clamped(size: u64, offset: u64, length: u64) -> Self {
		let offset = offset.min(size);
		let length = length.min(size - offset);

		BufferReference { offset, length }
	}

	pub const fn end(&self) -> u64 {
		self.offset + self.length
	}
}

/// Reads the referenced interval in chunks and hands them to `sink`.
///
/// Returns the reference shortened to what could actually be read, should the resource end early.
pub(crate) fn stream_range<S: ByteSource, E: From<std::io::Error>>(
	source: &mut S,
	reference: BufferReference,
	mut sink: impl FnMut(&[u8]) -> Result<(), E>
) -> Result<BufferReference, E> {
	let mut buffer = vec![0u8; STREAM_CHUNK_SIZE.min(reference.length as usize).max(1)];

	let mut position = reference.offset;
	while position < reference.end() {
		let wanted = (reference.end() - position).min(buffer.len() as u64) as usize;
		let read = source.read_at(position, &mut buffer[.. wanted])?;

		sink(&buffer[.. read])?;
		position += read as u64;

		if read < wanted {
			log::warn!("resource ended at {:#x} before the requested {:#x}", position, reference.end());
			break
		}
	}

	Ok(BufferReference {
		offset: reference.offset,
		length: position - reference.offset
	})
}

#[cfg(test)]
mod test {
	use std::io::Cursor;

	use super::{stream_range, BufferReference};

	#[test]
	fn test_clamped() {
		assert_eq!(BufferReference::clamped(100, 10, 20), BufferReference { offset: 10, length: 20 });
		assert_eq!(BufferReference::clamped(100, 90, 20), BufferReference { offset: 90, length: 10 });
		assert_eq!(BufferReference::clamped(100, 200, 20), BufferReference { offset: 100, length: 0 });
		assert_eq!(BufferReference::clamped(100, 0, u64::MAX), BufferReference { offset: 0, length: 100 });
	}

	#[test]
	fn test_stream_range_chunks() {
		let data = (0 .. 200_000u32).map(|i| (i % 256) as u8).collect::<Vec<_>>();
		let mut source = Cursor::new(data.clone());

		let mut collected = Vec::new();
		let mut chunks = 0;
		let reference = stream_range::<_, std::io::Error>(
			&mut source,
			BufferReference { offset: 5, length: 150_000 },
			|chunk| {
				chunks += 1;
				collected.extend_from_slice(chunk);

				Ok(())
			}
		)
		.unwrap();

		assert_eq!(reference.length, 150_000);
		assert_eq!(chunks, 3);
		assert_eq!(collected, &data[5 .. 150_005]);
	}
}
