use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the story writer.
///
/// Every variant is meant to be shown to the user as-is, so the messages are
/// written as sentences rather than debug output.
#[derive(Debug, Error)]
pub enum StoryError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("The JSON file is empty or not properly formatted: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Model cache error: {0}")]
	Cache(#[from] postcard::Error),

	#[error("An error occurred during story generation: {0}")]
	Model(String),

	#[error("No corpus (.txt) found in {}", .0.display())]
	NoCorpus(PathBuf),

	#[error("No story was generated.")]
	EmptyStory,
}

/// Rejected form input.
///
/// Raised before any generation starts, so nothing has been mutated yet
/// when one of these reaches the user.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
	#[error("Please enter a story prompt.")]
	EmptyPrompt,

	#[error("Please check your input values ({field} is not a number).")]
	NotANumber { field: &'static str },

	#[error("Max length should be between 1 and 1024.")]
	MaxLength,

	#[error("Temperature should be greater than 0.0 and at most 1.0.")]
	Temperature,

	#[error("Top-k should be between 0 and 1000.")]
	TopK,

	#[error("Top-p should be between 0.0 and 1.0.")]
	TopP,
}
