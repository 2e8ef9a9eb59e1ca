use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use memgather_transfer::{TransferRequest, TransferResult};

use super::{open_resource, Action};
use crate::{
	context::{ActionContext, ResponseKind},
	error::ActionError
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BufferArgs {
	pub path: PathBuf,
	#[serde(default)]
	pub offset: u64,
	pub length: u64
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BufferRecord {
	pub path: PathBuf,
	pub offset: u64,
	/// Length of the raw bytes.
	pub length: u64,
	pub sha256: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub compression: Option<String>,
	/// Hex encoded compressed bytes.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<String>
}
impl BufferRecord {
	fn new(path: PathBuf, result: TransferResult) -> Self {
		BufferRecord {
			path,
			offset: result.reference.offset,
			length: result.reference.length,
			sha256: result.hex(),
			compression: result.payload.as_ref().map(|payload| payload.algorithm.to_string()),
			data: result.payload.map(|payload| hex::encode(payload.bytes))
		}
	}
}

fn run_buffer<C: ActionContext>(args: BufferArgs, want_payload: bool, context: &mut C) -> Result<(), ActionError> {
	let mut file = open_resource(&args.path)?;

	let request = TransferRequest {
		offset: args.offset,
		length: args.length,
		want_payload
	};
	let result = request.execute(&mut file)?;

	context.send_response(&BufferRecord::new(args.path, result), ResponseKind::Summary)?;

	Ok(())
}

/// Reports the digest of a byte range of a file, without its content.
pub struct HashBuffer;
impl Action for HashBuffer {
	const NAME: &'static str = "HashBuffer";
	type Args = BufferArgs;

	fn run<C: ActionContext>(&self, args: Self::Args, context: &mut C) -> Result<(), ActionError> {
		run_buffer(args, false, context)
	}
}

/// Transfers a byte range of a file, compressed, together with its digest.
pub struct TransferBuffer;
impl Action for TransferBuffer {
	const NAME: &'static str = "TransferBuffer";
	type Args = BufferArgs;

	fn run<C: ActionContext>(&self, args: Self::Args, context: &mut C) -> Result<(), ActionError> {
		run_buffer(args, true, context)
	}
}
