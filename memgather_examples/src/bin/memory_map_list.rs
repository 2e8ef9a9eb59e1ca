use anyhow::Context;

use memgather_access::prelude::MapsReader;

fn main() -> anyhow::Result<()> {
	env_logger::init();

	// simple cli parse
	let pid: i32 = match std::env::args().nth(1) {
		Some(pid) => pid.parse().context("pid must be a number")?,
		None => std::process::id() as i32
	};
	eprintln!("pid: {}", pid);

	let maps = MapsReader::open(pid).with_context(|| format!("could not read memory map of {}", pid))?;

	// mark the regions a dump would contain
	for region in maps {
		let marker = if region.dumpable() { '*' } else { ' ' };
		println!("{} {}", marker, region);
	}

	Ok(())
}
