//! Transfer of byte ranges out of a resource.
//!
//! A range is either only probed (its SHA-256 digest is computed) or fully transferred, in which case
//! the raw bytes are additionally compressed into a payload.

pub mod buffer;
pub mod payload;
pub mod transfer;

pub use crate::{
	buffer::BufferReference,
	payload::{CompressedPayload, CompressionAlgorithm, PayloadError},
	transfer::{probe, transfer, BufferDigest, TransferError, TransferRequest, TransferResult}
};
