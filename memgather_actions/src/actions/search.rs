use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use memgather_scan::prelude::{ContentSearch, Pattern, SearchConfig, SearchRequest};

use super::{open_resource, Action};
use crate::{
	context::{ActionContext, ResponseKind},
	error::ActionError
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PatternArgs {
	Literal(String),
	/// Literal given as hex, for binary needles.
	LiteralHex(String),
	Regex(String)
}
impl PatternArgs {
	pub fn into_pattern(self) -> Result<Pattern, ActionError> {
		Ok(match self {
			PatternArgs::Literal(literal) => Pattern::Literal(literal.into_bytes()),
			PatternArgs::LiteralHex(literal) => Pattern::Literal(hex::decode(literal)?),
			PatternArgs::Regex(regex) => Pattern::Regex(regex)
		})
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchContentArgs {
	pub path: PathBuf,
	pub pattern: PatternArgs,
	#[serde(default)]
	pub start: u64,
	/// End of the searched interval, the end of the resource if missing.
	#[serde(default)]
	pub end: Option<u64>,
	#[serde(default)]
	pub all_hits: bool,
	#[serde(default)]
	pub bytes_before: u64,
	#[serde(default)]
	pub bytes_after: u64
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchHitRecord {
	pub path: PathBuf,
	pub offset: u64,
	pub length: u64,
	/// Hex encoded bytes of `[offset, offset + length)`.
	pub data: String,
	pub match_offset: u64,
	pub match_length: u64
}

/// Searches the content of a file for a literal or a regex.
pub struct SearchContent {
	pub config: SearchConfig
}
impl Action for SearchContent {
	const NAME: &'static str = "SearchContent";
	type Args = SearchContentArgs;

	fn run<C: ActionContext>(&self, args: Self::Args, context: &mut C) -> Result<(), ActionError> {
		let request = SearchRequest {
			pattern: args.pattern.into_pattern()?,
			start: args.start,
			end: args.end,
			all_hits: args.all_hits,
			bytes_before: args.bytes_before,
			bytes_after: args.bytes_after
		};

		let file = open_resource(&args.path)?;
		let hits = ContentSearch::new(file, self.config.clone())?.search(&request)?;
		log::debug!("{} hits in {}", hits.len(), args.path.display());

		for hit in hits {
			let record = SearchHitRecord {
				path: args.path.clone(),
				offset: hit.offset,
				length: hit.length,
				data: hex::encode(&hit.data),
				match_offset: hit.matched.start,
				match_length: hit.matched.len()
			};
			context.send_response(&record, ResponseKind::Record)?;
		}

		Ok(())
	}
}
