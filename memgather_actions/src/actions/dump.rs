use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use memgather_access::prelude::{DumpConfig, DumpOutcome, DumpedRegion, Pid, ProcessHandle};

use super::Action;
use crate::{
	context::{ActionContext, ResponseKind},
	error::ActionError
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DumpProcessMemoryArgs {
	pub pid: Pid,
	/// Whether to keep the process stopped while it is being dumped.
	#[serde(default)]
	pub pause: bool
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DumpedRegionRecord {
	pub start: u64,
	pub end: u64,
	pub file_offset: u64,
	pub length: u64
}
impl From<&DumpedRegion> for DumpedRegionRecord {
	fn from(region: &DumpedRegion) -> Self {
		DumpedRegionRecord {
			start: region.range.start,
			end: region.range.end,
			file_offset: region.file_offset,
			length: region.length
		}
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DumpProcessMemoryResponse {
	pub pid: Pid,
	pub path: PathBuf,
	pub bytes_written: u64,
	pub regions: Vec<DumpedRegionRecord>,
	/// Set when the dump succeeded but the process could not be detached afterwards.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub detach_error: Option<String>
}
impl DumpProcessMemoryResponse {
	fn new(pid: Pid, outcome: DumpOutcome) -> Self {
		DumpProcessMemoryResponse {
			pid,
			regions: outcome.summary.regions.iter().map(DumpedRegionRecord::from).collect(),
			bytes_written: outcome.summary.bytes_written,
			path: outcome.location,
			detach_error: outcome.detach_error
		}
	}
}

/// Dumps the anonymous readable memory of a process into a scratch file.
pub struct DumpProcessMemory {
	pub config: DumpConfig
}
impl Action for DumpProcessMemory {
	const NAME: &'static str = "DumpProcessMemory";
	type Args = DumpProcessMemoryArgs;

	fn run<C: ActionContext>(&self, args: Self::Args, context: &mut C) -> Result<(), ActionError> {
		let handle = ProcessHandle::open(args.pid, args.pause, &self.config)?;
		let response = DumpProcessMemoryResponse::new(args.pid, handle.dump()?);

		if let Err(err) = context.send_response(&response, ResponseKind::Summary) {
			// nobody would learn where the dump is
			if let Err(remove_err) = std::fs::remove_file(&response.path) {
				log::warn!("could not remove {}: {}", response.path.display(), remove_err);
			}

			return Err(err.into())
		}

		Ok(())
	}
}
