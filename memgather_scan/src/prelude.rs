pub use crate::{
	candidate::ScannerCandidate,
	cursor::{ByteCursor, CursorBytes, WindowedSource},
	find::{find_by_name, FindError, FindOptions},
	predicate::{literal::LiteralPredicate, ScannerPredicate},
	search::{ContentSearch, Match, Pattern, SearchConfig, SearchError, SearchHit, SearchRequest},
	source::ByteSource,
	stream::StreamScanner
};
