use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::StoryError;
use crate::story::params::FormDefaults;
use crate::story::writer::StoryWriter;

/// Default location of the configuration file, relative to the working directory.
pub const CONFIG_FILE: &str = "rs-story.json";

fn default_story_data_path() -> PathBuf {
	PathBuf::from("data/story.json")
}

fn default_models_dir() -> PathBuf {
	PathBuf::from("data/models")
}

fn default_max_order() -> usize {
	3
}

fn default_no_repeat_ngram_size() -> usize {
	2
}

fn default_early_stopping() -> bool {
	true
}

/// Application settings. Every key is optional in the file.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AppConfig {
	/// Story data loaded at startup.
	#[serde(default = "default_story_data_path")]
	pub story_data_path: PathBuf,
	/// Directory holding the `.txt` training corpora.
	#[serde(default = "default_models_dir")]
	pub models_dir: PathBuf,
	/// Longest n-gram the language model learns.
	#[serde(default = "default_max_order")]
	pub max_order: usize,
	#[serde(default = "default_no_repeat_ngram_size")]
	pub no_repeat_ngram_size: usize,
	#[serde(default = "default_early_stopping")]
	pub early_stopping: bool,
	/// Initial values of the numeric form fields.
	#[serde(default)]
	pub defaults: FormDefaults,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			story_data_path: default_story_data_path(),
			models_dir: default_models_dir(),
			max_order: default_max_order(),
			no_repeat_ngram_size: default_no_repeat_ngram_size(),
			early_stopping: default_early_stopping(),
			defaults: FormDefaults::default(),
		}
	}
}

impl AppConfig {
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoryError> {
		let contents = fs::read_to_string(path)?;
		Ok(serde_json::from_str(&contents)?)
	}

	/// Loads the file if present.
	///
	/// A missing file silently gives the defaults; an unreadable or malformed
	/// one is logged and gives the defaults too.
	pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
		let path = path.as_ref();
		if !path.exists() {
			return Self::default();
		}
		match Self::load(path) {
			Ok(config) => {
				info!("Loaded configuration '{}'", path.display());
				config
			}
			Err(e) => {
				warn!("Ignoring configuration '{}': {e}", path.display());
				Self::default()
			}
		}
	}

	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoryError> {
		let contents = serde_json::to_string_pretty(self)?;
		fs::write(path, contents)?;
		Ok(())
	}

	/// Story writer using the configured decoding settings.
	pub fn story_writer(&self) -> StoryWriter {
		StoryWriter::new(self.no_repeat_ngram_size, self.early_stopping)
	}
}
