//! Finding directory entries by name.

use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum FindError {
	#[error("invalid regular expression: {0}")]
	RegexCompile(#[from] regex::Error),
	#[error("could not read directory {}", .path.display())]
	Root {
		path: PathBuf,
		#[source]
		source: walkdir::Error
	}
}

#[derive(Debug, Clone)]
pub struct FindOptions {
	pub case_insensitive: bool,
	/// How many directory levels below the root are visited, 1 meaning direct children only.
	pub max_depth: usize
}
impl Default for FindOptions {
	fn default() -> Self {
		FindOptions {
			case_insensitive: false,
			max_depth: 1
		}
	}
}

/// Returns all entries below `root` whose file name matches `pattern`, sorted by path.
///
/// Entries which cannot be read are skipped, only a failure to read `root` itself is an error.
pub fn find_by_name(root: &Path, pattern: &str, options: &FindOptions) -> Result<Vec<PathBuf>, FindError> {
	let regex = RegexBuilder::new(pattern)
		.case_insensitive(options.case_insensitive)
		.build()?;

	let mut found = Vec::new();
	for entry in WalkDir::new(root).min_depth(1).max_depth(options.max_depth).sort_by_file_name() {
		let entry = match entry {
			Ok(entry) => entry,
			Err(err) if err.depth() == 0 => {
				return Err(FindError::Root {
					path: root.to_path_buf(),
					source: err
				})
			}
			Err(err) => {
				log::warn!("skipping unreadable entry: {}", err);
				continue
			}
		};

		if name_matches(&regex, entry.file_name()) {
			found.push(entry.into_path());
		}
	}
	found.sort();
	log::debug!("{} entries below {} match {:?}", found.len(), root.display(), pattern);

	Ok(found)
}

fn name_matches(regex: &Regex, name: &std::ffi::OsStr) -> bool {
	regex.is_match(&name.to_string_lossy())
}

#[cfg(test)]
mod test {
	use std::fs;

	use super::{find_by_name, FindError, FindOptions};

	fn fixture() -> tempfile::TempDir {
		let dir = tempfile::tempdir().unwrap();
		for name in ["fox.txt", "host.conf", "pam.conf", "hosts"] {
			fs::write(dir.path().join(name), name).unwrap();
		}

		dir
	}

	#[test]
	fn test_find_conf_case_insensitive() {
		let dir = fixture();
		let options = FindOptions {
			case_insensitive: true,
			..Default::default()
		};

		let found = find_by_name(dir.path(), r".conf$", &options).unwrap();
		let names = found
			.iter()
			.map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
			.collect::<Vec<_>>();

		assert_eq!(names, &["host.conf", "pam.conf"]);
	}

	#[test]
	fn test_find_case_sensitivity() {
		let dir = fixture();
		fs::write(dir.path().join("LOUD.CONF"), "").unwrap();

		assert_eq!(find_by_name(dir.path(), r"\.conf$", &FindOptions::default()).unwrap().len(), 2);

		let options = FindOptions {
			case_insensitive: true,
			..Default::default()
		};
		assert_eq!(find_by_name(dir.path(), r"\.conf$", &options).unwrap().len(), 3);
	}

	#[test]
	fn test_find_depth() {
		let dir = fixture();
		fs::create_dir(dir.path().join("nested")).unwrap();
		fs::write(dir.path().join("nested").join("deep.conf"), "").unwrap();

		assert_eq!(find_by_name(dir.path(), r"\.conf$", &FindOptions::default()).unwrap().len(), 2);

		let options = FindOptions {
			max_depth: 2,
			..Default::default()
		};
		assert_eq!(find_by_name(dir.path(), r"\.conf$", &options).unwrap().len(), 3);
	}

	#[test]
	fn test_find_errors() {
		let dir = fixture();

		assert!(matches!(
			find_by_name(dir.path(), "(", &FindOptions::default()),
			Err(FindError::RegexCompile(_))
		));
		assert!(matches!(
			find_by_name(&dir.path().join("missing"), "x", &FindOptions::default()),
			Err(FindError::Root { .. })
		));
	}
}
