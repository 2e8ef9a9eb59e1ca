use std::path::PathBuf;

use thiserror::Error;

#[cfg(target_os = "linux")]
use memgather_access::prelude::AcquireError;
use memgather_scan::prelude::{FindError, SearchError};
use memgather_transfer::TransferError;

use crate::context::{ArgsError, ResponseError};

/// Failure of one action, reported as a single message.
#[derive(Debug, Error)]
pub enum ActionError {
	#[error(transparent)]
	Args(#[from] ArgsError),
	#[error("could not open {}: {source}", .path.display())]
	OpenResource {
		path: PathBuf,
		#[source]
		source: std::io::Error
	},
	#[error("invalid hex literal: {0}")]
	HexLiteral(#[from] hex::FromHexError),
	#[cfg(target_os = "linux")]
	#[error(transparent)]
	Acquire(#[from] AcquireError),
	#[error(transparent)]
	Search(#[from] SearchError),
	#[error(transparent)]
	Find(#[from] FindError),
	#[error(transparent)]
	Transfer(#[from] TransferError),
	#[error(transparent)]
	Response(#[from] ResponseError)
}
impl ActionError {
	/// Renders the error together with all of its causes.
	pub fn report(&self) -> String {
		let mut message = self.to_string();

		let mut source = std::error::Error::source(self);
		while let Some(err) = source {
			let cause = err.to_string();
			if !message.ends_with(&cause) {
				message.push_str(": ");
				message.push_str(&cause);
			}
			source = err.source();
		}

		message
	}
}
