use anyhow::Context;

use memgather_scan::prelude::{ContentSearch, Pattern, SearchConfig, SearchRequest};

fn main() -> anyhow::Result<()> {
	env_logger::init();

	// simple cli parse
	let (path, pattern) = {
		let mut it = std::env::args().skip(1);
		let usage = "usage: content_search FILE (literal|regex) PATTERN";

		let path = it.next().context(usage)?;
		let pattern = match (it.next().as_deref(), it.next()) {
			(Some("literal"), Some(needle)) => Pattern::Literal(needle.into_bytes()),
			(Some("regex"), Some(regex)) => Pattern::Regex(regex),
			_ => anyhow::bail!(usage)
		};

		(path, pattern)
	};

	let file = std::fs::File::open(&path).with_context(|| format!("could not open {}", path))?;
	let search = ContentSearch::new(file, SearchConfig::default())?;

	let mut request = SearchRequest::new(pattern);
	request.all_hits = true;
	request.bytes_before = 16;
	request.bytes_after = 16;

	for hit in search.search(&request)? {
		println!(
			"{:#x}+{}: {}",
			hit.matched.start,
			hit.matched.len(),
			String::from_utf8_lossy(&hit.data).escape_debug()
		);
	}

	Ok(())
}
