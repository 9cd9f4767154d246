use log::{debug, info};
use rand::Rng;

use super::data::StoryData;
use super::elements::StoryElements;
use super::history::SessionHistory;
use super::params::GenerationParameters;
use crate::error::StoryError;
use crate::model::text_model::TextModel;

/// Number of model calls per story.
pub const NUM_ITERATIONS: usize = 10;

/// Builds the text the first model call starts from.
///
/// `"{prompt} {base_story} {setting} with {character} who {plot_twist}. "`
pub fn build_seed(prompt: &str, base_story: &str, elements: &StoryElements) -> String {
	format!(
		"{prompt} {base_story} {} with {} who {}. ",
		elements.setting, elements.character, elements.plot_twist
	)
}

/// Runs the iterative generation loop.
///
/// Holds the decoding settings that are not on the form.
#[derive(Clone, Debug)]
pub struct StoryWriter {
	no_repeat_ngram_size: usize,
	early_stopping: bool,
}

impl Default for StoryWriter {
	fn default() -> Self {
		Self { no_repeat_ngram_size: 2, early_stopping: true }
	}
}

impl StoryWriter {
	pub fn new(no_repeat_ngram_size: usize, early_stopping: bool) -> Self {
		Self { no_repeat_ngram_size, early_stopping }
	}

	/// Writes one story.
	///
	/// # Behavior
	/// - Samples story elements and builds the seed.
	/// - Calls the model `NUM_ITERATIONS` times; each output is the next
	///   call's whole input, so every round re-seeds from the full text.
	/// - The first model error aborts the story, nothing partial is returned.
	///
	/// # Errors
	/// - The model's error, unchanged
	/// - `StoryError::EmptyStory` if the final text is blank
	pub fn generate_story<M, R>(
		&self,
		model: &mut M,
		data: &StoryData,
		params: &GenerationParameters,
		rng: &mut R,
	) -> Result<String, StoryError>
	where
		M: TextModel + ?Sized,
		R: Rng,
	{
		let elements = data.sample_elements(rng);
		let options = params.sampling_options(self.no_repeat_ngram_size, self.early_stopping);

		let mut story = build_seed(&params.prompt, &params.base_story, &elements);
		debug!("Seed: {story:?}");

		for iteration in 0..NUM_ITERATIONS {
			story = model.generate(&story, &options)?;
			debug!("Iteration {}/{NUM_ITERATIONS}: {} chars", iteration + 1, story.len());
		}

		if story.trim().is_empty() {
			return Err(StoryError::EmptyStory);
		}
		info!("Generated a story of {} words", story.split_whitespace().count());
		Ok(story)
	}

	/// Writes one story and records it in `history` on success.
	///
	/// On failure the history is left as it was.
	pub fn generate_into_history<M, R>(
		&self,
		model: &mut M,
		data: &StoryData,
		params: &GenerationParameters,
		rng: &mut R,
		history: &mut SessionHistory,
	) -> Result<String, StoryError>
	where
		M: TextModel + ?Sized,
		R: Rng,
	{
		let story = self.generate_story(model, data, params, rng)?;
		history.push(story.clone());
		Ok(story)
	}
}
