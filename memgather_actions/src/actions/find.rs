use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use memgather_scan::prelude::{find_by_name, FindOptions};

use super::Action;
use crate::{
	context::{ActionContext, ResponseKind},
	error::ActionError
};

fn default_max_depth() -> usize {
	1
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FindArgs {
	/// Directory to search in.
	pub path: PathBuf,
	pub name_regex: String,
	#[serde(default)]
	pub case_insensitive: bool,
	#[serde(default = "default_max_depth")]
	pub max_depth: usize
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FindRecord {
	pub path: PathBuf
}

/// Lists directory entries whose name matches a regex.
pub struct Find;
impl Action for Find {
	const NAME: &'static str = "Find";
	type Args = FindArgs;

	fn run<C: ActionContext>(&self, args: Self::Args, context: &mut C) -> Result<(), ActionError> {
		let options = FindOptions {
			case_insensitive: args.case_insensitive,
			max_depth: args.max_depth
		};

		for path in find_by_name(&args.path, &args.name_regex, &options)? {
			context.send_response(&FindRecord { path }, ResponseKind::Record)?;
		}

		Ok(())
	}
}
