use anyhow::Context;

use memgather_access::prelude::{DumpConfig, ProcessHandle};

fn main() -> anyhow::Result<()> {
	env_logger::init();

	// simple cli parse
	let (pid, pause, scratch_dir) = {
		let mut it = std::env::args().skip(1);

		let pid: i32 = it
			.next()
			.context("usage: dump_memory PID [pause] [SCRATCH_DIR]")?
			.parse()
			.context("pid must be a number")?;
		let pause = it.next().map(|flag| flag == "pause").unwrap_or(false);
		let scratch_dir = it.next().map(std::path::PathBuf::from);

		(pid, pause, scratch_dir)
	};
	eprintln!("pid: {}", pid);
	eprintln!("pause: {}", pause);

	let mut config = DumpConfig::default();
	if let Some(scratch_dir) = scratch_dir {
		config.scratch_dir = scratch_dir;
	}

	let handle = ProcessHandle::open(pid, pause, &config).with_context(|| format!("could not open process {}", pid))?;
	let outcome = handle.dump().context("could not dump process memory")?;

	for region in outcome.summary.regions.iter() {
		println!("{} -> {:#x} ({} bytes)", region.range, region.file_offset, region.length);
	}
	if let Some(detach_error) = outcome.detach_error {
		eprintln!("warning: {}", detach_error);
	}
	println!("{} bytes written to {}", outcome.summary.bytes_written, outcome.location.display());

	Ok(())
}
