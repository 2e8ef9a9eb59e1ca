use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use memgather_access::prelude::{DumpConfig, MAX_CHUNK_SIZE};
use memgather_scan::prelude::SearchConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("could not read config file {}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error
	},
	#[error("could not parse config file {}", .path.display())]
	Parse {
		path: PathBuf,
		#[source]
		source: serde_json::Error
	}
}

/// Agent settings, every field falls back to its default when missing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
	/// Directory where memory dumps are created.
	pub scratch_dir: PathBuf,
	/// Chunk size for copying process memory, never more than 512 KiB.
	pub dump_chunk_size: usize,
	pub search_cursor_window: usize,
	pub search_regex_window: usize,
	pub search_regex_overlap: usize
}
impl AgentConfig {
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source
		})?;

		serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
			path: path.to_path_buf(),
			source
		})
	}

	pub fn dump_config(&self) -> DumpConfig {
		DumpConfig {
			scratch_dir: self.scratch_dir.clone(),
			chunk_size: self.dump_chunk_size.min(MAX_CHUNK_SIZE)
		}
	}

	pub fn search_config(&self) -> SearchConfig {
		SearchConfig {
			cursor_window: self.search_cursor_window,
			regex_window: self.search_regex_window,
			regex_overlap: self.search_regex_overlap
		}
	}
}
impl Default for AgentConfig {
	fn default() -> Self {
		let dump = DumpConfig::default();
		let search = SearchConfig::default();

		AgentConfig {
			scratch_dir: dump.scratch_dir,
			dump_chunk_size: dump.chunk_size,
			search_cursor_window: search.cursor_window,
			search_regex_window: search.regex_window,
			search_regex_overlap: search.regex_overlap
		}
	}
}

#[cfg(test)]
mod test {
	use super::{AgentConfig, ConfigError};

	#[test]
	fn test_config_partial() {
		let config: AgentConfig = serde_json::from_str(r#"{"scratch_dir": "/var/tmp", "dump_chunk_size": 4194304}"#).unwrap();

		assert_eq!(config.scratch_dir, std::path::PathBuf::from("/var/tmp"));
		assert_eq!(config.dump_config().chunk_size, 512 * 1024);
		assert_eq!(config.search_regex_window, AgentConfig::default().search_regex_window);
	}

	#[test]
	fn test_config_load() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("agent.json");

		assert!(matches!(AgentConfig::load(&path), Err(ConfigError::Io { .. })));

		std::fs::write(&path, "{not json").unwrap();
		assert!(matches!(AgentConfig::load(&path), Err(ConfigError::Parse { .. })));

		std::fs::write(&path, r#"{"search_regex_overlap": 128}"#).unwrap();
		assert_eq!(AgentConfig::load(&path).unwrap().search_config().regex_overlap, 128);
	}
}
