use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::StoryError;

/// Story elements mixed into the seed prompt.
///
/// Loaded from a JSON object:
/// ```json
/// { "settings": ["..."], "characters": ["..."], "plot_twists": ["..."] }
/// ```
/// A missing key reads as an empty list.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct StoryData {
	#[serde(default)]
	pub settings: Vec<String>,
	#[serde(default)]
	pub characters: Vec<String>,
	#[serde(default)]
	pub plot_twists: Vec<String>,
}

impl StoryData {
	/// Reads and parses a story data file.
	///
	/// # Errors
	/// - `StoryError::Io` if the file is missing or unreadable
	/// - `StoryError::Json` if it is empty or not a valid document
	pub fn try_load<P: AsRef<Path>>(path: P) -> Result<Self, StoryError> {
		let path = path.as_ref();
		let contents = fs::read_to_string(path)?;
		let data: Self = serde_json::from_str(&contents)?;
		info!(
			"Loaded story data '{}' ({} settings, {} characters, {} plot twists)",
			path.display(),
			data.settings.len(),
			data.characters.len(),
			data.plot_twists.len()
		);
		Ok(data)
	}

	/// Like `try_load`, but falls back to empty lists on any failure.
	pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
		let path = path.as_ref();
		Self::try_load(path).unwrap_or_else(|e| {
			warn!("Using empty story data, cannot load '{}': {e}", path.display());
			Self::default()
		})
	}

	/// `true` when all three lists are empty.
	pub fn is_empty(&self) -> bool {
		self.settings.is_empty() && self.characters.is_empty() && self.plot_twists.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_keys_read_as_empty() {
		let data: StoryData = serde_json::from_str(r#"{ "settings": ["a cave"] }"#).unwrap();
		assert_eq!(data.settings, vec!["a cave"]);
		assert!(data.characters.is_empty());
		assert!(data.plot_twists.is_empty());
		assert!(!data.is_empty());
	}

	#[test]
	fn try_load_tells_errors_apart() {
		let dir = tempfile::tempdir().unwrap();
		assert!(matches!(StoryData::try_load(dir.path().join("none.json")), Err(StoryError::Io(_))));

		let empty = dir.path().join("empty.json");
		fs::write(&empty, "").unwrap();
		assert!(matches!(StoryData::try_load(&empty), Err(StoryError::Json(_))));
	}

	#[test]
	fn wrong_shape_falls_back() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("story.json");
		fs::write(&path, r#"{ "settings": "not a list" }"#).unwrap();
		assert!(StoryData::load_or_default(&path).is_empty());
	}
}
