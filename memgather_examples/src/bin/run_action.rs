//! Reads one JSON request per line from stdin and writes one JSON reply per line to stdout.

use std::io::{BufRead, Write};

use anyhow::Context;

use memgather_actions::{dispatch::action_names, AgentConfig, Dispatcher};

fn main() -> anyhow::Result<()> {
	env_logger::init();

	let config = match std::env::args().nth(1) {
		Some(path) => AgentConfig::load(std::path::Path::new(&path))?,
		None => AgentConfig::default()
	};
	log::info!("serving actions {:?}", action_names());
	let dispatcher = Dispatcher::new(config);

	let stdin = std::io::stdin();
	let stdout = std::io::stdout();
	let mut stdout = stdout.lock();

	for line in stdin.lock().lines() {
		let line = line.context("could not read request")?;
		if line.trim().is_empty() {
			continue
		}

		let reply = dispatcher.dispatch_json(&line).context("could not serialize reply")?;
		writeln!(stdout, "{}", reply)?;
		stdout.flush()?;
	}

	Ok(())
}
