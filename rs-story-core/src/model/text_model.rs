use super::sampling::SamplingOptions;
use crate::error::StoryError;

/// An autoregressive text generator.
///
/// Implementors continue `input` and return the *whole* text: the input
/// followed by whatever the model added. The story writer only ever talks
/// to a model through this trait, so tests can swap in a stub.
pub trait TextModel {
	fn generate(&mut self, input: &str, options: &SamplingOptions) -> Result<String, StoryError>;
}
