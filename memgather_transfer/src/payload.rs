use std::io::{Read, Write};

use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
	#[error("could not decompress payload")]
	Decompress(#[source] std::io::Error)
}

/// Compression applied to transferred bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionAlgorithm {
	/// DEFLATE stream with zlib framing.
	Deflate
}
impl std::fmt::Display for CompressionAlgorithm {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			CompressionAlgorithm::Deflate => write!(f, "deflate")
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedPayload {
	pub algorithm: CompressionAlgorithm,
	pub bytes: Vec<u8>
}
impl CompressedPayload {
	/// Reproduces the raw bytes this payload was made from.
	pub fn decompress(&self) -> Result<Vec<u8>, PayloadError> {
		match self.algorithm {
			CompressionAlgorithm::Deflate => {
				let mut decoder = ZlibDecoder::new(&self.bytes[..]);
				let mut raw = Vec::new();
				decoder.read_to_end(&mut raw).map_err(PayloadError::Decompress)?;

				Ok(raw)
			}
		}
	}
}

/// Incrementally compresses raw bytes into a payload.
pub(crate) struct PayloadWriter {
	encoder: ZlibEncoder<Vec<u8>>
}
impl PayloadWriter {
	pub fn new() -> Self {
		PayloadWriter {
			encoder: ZlibEncoder::new(Vec::new(), Compression::default())
		}
	}

	pub fn write(&mut self, raw: &[u8]) -> std::io::Result<()> {
		self.encoder.write_all(raw)
	}

	pub fn finish(self) -> std::io::Result<CompressedPayload> {
		Ok(CompressedPayload {
			algorithm: CompressionAlgorithm::Deflate,
			bytes: self.encoder.finish()?
		})
	}
}
