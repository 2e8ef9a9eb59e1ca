use sha2::{Digest, Sha256};
use thiserror::Error;

use memgather_scan::source::ByteSource;

use crate::{
	buffer::{stream_range, BufferReference},
	payload::{CompressedPayload, PayloadWriter}
};

#[derive(Debug, Error)]
pub enum TransferError {
	#[error("could not read resource")]
	Io(#[from] std::io::Error)
}

/// SHA-256 digest of an interval, without its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDigest {
	pub reference: BufferReference,
	pub digest: [u8; 32]
}
impl BufferDigest {
	pub fn hex(&self) -> String {
		hex::encode(self.digest)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferResult {
	pub reference: BufferReference,
	pub digest: [u8; 32],
	/// Compressed raw bytes, present for full transfers.
	pub payload: Option<CompressedPayload>
}
impl TransferResult {
	pub fn hex(&self) -> String {
		hex::encode(self.digest)
	}

	/// Length of the raw, uncompressed interval.
	pub const fn raw_length(&self) -> u64 {
		self.reference.length
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
	pub offset: u64,
	pub length: u64,
	/// Whether the compressed content is wanted, or only the digest.
	pub want_payload: bool
}
impl TransferRequest {
	pub fn execute<S: ByteSource>(&self, source: &mut S) -> Result<TransferResult, TransferError> {
		if self.want_payload {
			transfer(source, self.offset, self.length)
		} else {
			let probed = probe(source, self.offset, self.length)?;

			Ok(TransferResult {
				reference: probed.reference,
				digest: probed.digest,
				payload: None
			})
		}
	}
}

/// Computes the digest of `[offset, offset + length)` clamped to the resource.
pub fn probe<S: ByteSource>(source: &mut S, offset: u64, length: u64) -> Result<BufferDigest, TransferError> {
	let reference = BufferReference::clamped(source.size()?, offset, length);

	let mut hasher = Sha256::new();
	let reference = stream_range(source, reference, |chunk| {
		hasher.update(chunk);

		Ok::<_, TransferError>(())
	})?;
	log::debug!("probed {:#x}+{:#x}", reference.offset, reference.length);

	Ok(BufferDigest {
		reference,
		digest: hasher.finalize().into()
	})
}

/// Computes the digest of `[offset, offset + length)` clamped to the resource, and compresses its bytes.
pub fn transfer<S: ByteSource>(source: &mut S, offset: u64, length: u64) -> Result<TransferResult, TransferError> {
	let reference = BufferReference::clamped(source.size()?, offset, length);

	let mut hasher = Sha256::new();
	let mut writer = PayloadWriter::new();
	let reference = stream_range(source, reference, |chunk| {
		hasher.update(chunk);
		writer.write(chunk)?;

		Ok::<_, TransferError>(())
	})?;
	let payload = writer.finish()?;
	log::debug!(
		"transferred {:#x}+{:#x} as {} bytes of {}",
		reference.offset,
		reference.length,
		payload.bytes.len(),
		payload.algorithm
	);

	Ok(TransferResult {
		reference,
		digest: hasher.finalize().into(),
		payload: Some(payload)
	})
}

#[cfg(test)]
mod test {
	use std::io::Cursor;

	use sha2::{Digest, Sha256};

	use super::{probe, transfer, TransferRequest};
	use crate::buffer::BufferReference;

	const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor \
		incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud exercitation \
		ullamco laboris nisi ut aliquip ex ea commodo consequat. Duis aute irure dolor in reprehenderit \
		in voluptate velit esse cillum dolore eu fugiat nulla pariatur. Excepteur sint occaecat cupidatat \
		non proident, sunt in culpa qui officia deserunt mollit anim id est laborum. ";

	const LOREM_SHA256: &str = "cca04536113e16feaa3fe109e5410ca96ce51661476e12bf501ada46619069c1";

	#[test]
	fn test_transfer_whole_buffer() {
		let mut source = Cursor::new(LOREM.as_bytes().to_vec());

		let result = transfer(&mut source, 0, LOREM.len() as u64).unwrap();
		assert_eq!(result.raw_length(), 446);
		assert_eq!(result.hex(), LOREM_SHA256);

		let payload = result.payload.unwrap();
		assert_eq!(payload.decompress().unwrap(), LOREM.as_bytes());
	}

	#[test]
	fn test_probe_matches_transfer() {
		let mut source = Cursor::new(LOREM.as_bytes().to_vec());

		let probed = probe(&mut source, 0, 446).unwrap();
		assert_eq!(probed.hex(), LOREM_SHA256);

		let probed = probe(&mut source, 6, 5).unwrap();
		assert_eq!(probed.reference, BufferReference { offset: 6, length: 5 });
		assert_eq!(probed.digest, <[u8; 32]>::from(Sha256::digest(b"ipsum")));

		let transferred = transfer(&mut source, 6, 5).unwrap();
		assert_eq!(transferred.digest, probed.digest);
		assert_eq!(transferred.payload.unwrap().decompress().unwrap(), b"ipsum");
	}

	#[test]
	fn test_transfer_clamps() {
		let mut source = Cursor::new(LOREM.as_bytes().to_vec());

		let result = transfer(&mut source, 440, 100).unwrap();
		assert_eq!(result.reference, BufferReference { offset: 440, length: 6 });
		assert_eq!(result.payload.unwrap().decompress().unwrap(), b"orum. ");

		let result = transfer(&mut source, 1000, 100).unwrap();
		assert_eq!(result.raw_length(), 0);
		assert_eq!(result.hex(), "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
		assert!(result.payload.unwrap().decompress().unwrap().is_empty());
	}

	#[test]
	fn test_transfer_large_resource() {
		let data = (0 .. 300_000u32).map(|i| (i * 7 % 251) as u8).collect::<Vec<_>>();
		let mut source = Cursor::new(data.clone());

		let result = transfer(&mut source, 0, u64::MAX).unwrap();
		assert_eq!(result.raw_length(), data.len() as u64);
		assert_eq!(result.digest, <[u8; 32]>::from(Sha256::digest(&data)));
		assert_eq!(result.payload.unwrap().decompress().unwrap(), data);
	}

	#[test]
	fn test_request_execute() {
		let mut source = Cursor::new(LOREM.as_bytes().to_vec());

		let request = TransferRequest {
			offset: 0,
			length: 5,
			want_payload: false
		};
		let result = request.execute(&mut source).unwrap();
		assert!(result.payload.is_none());
		assert_eq!(result.digest, <[u8; 32]>::from(Sha256::digest(b"Lorem")));

		let result = TransferRequest {
			want_payload: true,
			..request
		}
		.execute(&mut source)
		.unwrap();
		assert_eq!(result.payload.unwrap().decompress().unwrap(), b"Lorem");
	}
}
