use rand::SeedableRng;
use rand::rngs::StdRng;

use super::language_model::LanguageModel;
use super::sampling::SamplingOptions;
use super::text_model::TextModel;
use crate::error::StoryError;

/// `TextModel` backed by the bundled n-gram `LanguageModel`.
///
/// Owns its random generator so that a seeded sampler replays the same
/// stories, while the default one draws from the OS.
#[derive(Debug)]
pub struct NGramSampler {
	model: LanguageModel,
	rng: StdRng,
}

impl NGramSampler {
	/// Wraps a model with an OS-seeded random generator.
	pub fn new(model: LanguageModel) -> Self {
		Self { model, rng: StdRng::from_os_rng() }
	}

	/// Wraps a model with a fixed seed (reproducible output).
	pub fn with_seed(model: LanguageModel, seed: u64) -> Self {
		Self { model, rng: StdRng::seed_from_u64(seed) }
	}

	pub fn model(&self) -> &LanguageModel {
		&self.model
	}
}

impl TextModel for NGramSampler {
	fn generate(&mut self, input: &str, options: &SamplingOptions) -> Result<String, StoryError> {
		self.model.generate(input, options, &mut self.rng)
	}
}
