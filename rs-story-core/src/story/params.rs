use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::sampling::SamplingOptions;

/// Accepted range of `max_length` (new tokens per model call).
pub const MAX_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 1..=1024;

/// Accepted range of `top_k`; `0` disables the cut.
pub const TOP_K_RANGE: std::ops::RangeInclusive<usize> = 0..=1000;

/// Parameters of one story generation, as validated from the form.
///
/// # Invariants (checked by `validate`)
/// - `prompt` is not blank
/// - `max_length` in `[1, 1024]`
/// - `temperature` in `(0, 1]`
/// - `top_k` in `[0, 1000]`
/// - `top_p` in `[0, 1]`
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationParameters {
	pub prompt: String,
	pub base_story: String,
	pub max_length: usize,
	pub temperature: f32,
	pub top_k: usize,
	pub top_p: f32,
}

impl GenerationParameters {
	/// Checks every field, in form order, and reports the first failure.
	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.prompt.trim().is_empty() {
			return Err(ValidationError::EmptyPrompt);
		}
		if !MAX_LENGTH_RANGE.contains(&self.max_length) {
			return Err(ValidationError::MaxLength);
		}
		if !(self.temperature > 0.0 && self.temperature <= 1.0) {
			return Err(ValidationError::Temperature);
		}
		if !TOP_K_RANGE.contains(&self.top_k) {
			return Err(ValidationError::TopK);
		}
		if !(0.0..=1.0).contains(&self.top_p) {
			return Err(ValidationError::TopP);
		}
		Ok(())
	}

	/// Decoding options for one model call.
	pub fn sampling_options(&self, no_repeat_ngram_size: usize, early_stopping: bool) -> SamplingOptions {
		SamplingOptions {
			max_new_tokens: self.max_length,
			temperature: self.temperature,
			top_k: self.top_k,
			top_p: self.top_p,
			no_repeat_ngram_size,
			early_stopping,
		}
	}
}

/// Values the numeric form fields start with.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct FormDefaults {
	pub max_length: usize,
	pub temperature: f32,
	pub top_k: usize,
	pub top_p: f32,
}

impl Default for FormDefaults {
	fn default() -> Self {
		Self { max_length: 100, temperature: 0.7, top_k: 50, top_p: 0.9 }
	}
}

/// Raw form content, exactly as typed by the user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormInput {
	pub prompt: String,
	pub base_story: String,
	pub max_length: String,
	pub temperature: String,
	pub top_k: String,
	pub top_p: String,
}

impl FormInput {
	/// Empty prompt and base story, numeric fields pre-filled.
	pub fn with_defaults(defaults: &FormDefaults) -> Self {
		Self {
			prompt: String::new(),
			base_story: String::new(),
			max_length: defaults.max_length.to_string(),
			temperature: defaults.temperature.to_string(),
			top_k: defaults.top_k.to_string(),
			top_p: defaults.top_p.to_string(),
		}
	}

	/// Parses the numeric fields, then validates the whole set.
	///
	/// The prompt is trimmed like a single-line entry; the base story only
	/// loses surrounding whitespace.
	pub fn parse(&self) -> Result<GenerationParameters, ValidationError> {
		let params = GenerationParameters {
			prompt: self.prompt.trim().to_owned(),
			base_story: self.base_story.trim().to_owned(),
			max_length: parse_field(&self.max_length, "max length")?,
			temperature: parse_field(&self.temperature, "temperature")?,
			top_k: parse_field(&self.top_k, "top-k")?,
			top_p: parse_field(&self.top_p, "top-p")?,
		};
		params.validate()?;
		Ok(params)
	}
}

fn parse_field<T: FromStr>(raw: &str, field: &'static str) -> Result<T, ValidationError> {
	raw.trim().parse().map_err(|_| ValidationError::NotANumber { field })
}

#[cfg(test)]
mod tests {
	use super::*;

	fn valid() -> GenerationParameters {
		GenerationParameters {
			prompt: "A dragon".to_owned(),
			base_story: String::new(),
			max_length: 100,
			temperature: 0.7,
			top_k: 50,
			top_p: 0.9,
		}
	}

	fn check(params: GenerationParameters) -> Result<(), ValidationError> {
		params.validate()
	}

	#[test]
	fn max_length_bounds() {
		assert_eq!(check(GenerationParameters { max_length: 0, ..valid() }), Err(ValidationError::MaxLength));
		assert_eq!(check(GenerationParameters { max_length: 1, ..valid() }), Ok(()));
		assert_eq!(check(GenerationParameters { max_length: 1024, ..valid() }), Ok(()));
		assert_eq!(check(GenerationParameters { max_length: 1025, ..valid() }), Err(ValidationError::MaxLength));
	}

	#[test]
	fn temperature_bounds() {
		assert_eq!(check(GenerationParameters { temperature: 0.0, ..valid() }), Err(ValidationError::Temperature));
		assert_eq!(check(GenerationParameters { temperature: 1.0, ..valid() }), Ok(()));
		assert_eq!(check(GenerationParameters { temperature: 1.01, ..valid() }), Err(ValidationError::Temperature));
		assert_eq!(check(GenerationParameters { temperature: f32::NAN, ..valid() }), Err(ValidationError::Temperature));
	}

	#[test]
	fn top_k_and_top_p_bounds() {
		assert_eq!(check(GenerationParameters { top_k: 0, ..valid() }), Ok(()));
		assert_eq!(check(GenerationParameters { top_k: 1001, ..valid() }), Err(ValidationError::TopK));
		assert_eq!(check(GenerationParameters { top_p: 0.0, ..valid() }), Ok(()));
		assert_eq!(check(GenerationParameters { top_p: 1.0, ..valid() }), Ok(()));
		assert_eq!(check(GenerationParameters { top_p: 1.1, ..valid() }), Err(ValidationError::TopP));
	}

	#[test]
	fn blank_prompt_is_rejected_first() {
		let params = GenerationParameters { prompt: "  ".to_owned(), max_length: 0, ..valid() };
		assert_eq!(check(params), Err(ValidationError::EmptyPrompt));
	}

	#[test]
	fn form_defaults_parse() {
		let mut form = FormInput::with_defaults(&FormDefaults::default());
		form.prompt = "  A lighthouse keeper ".to_owned();
		form.base_story = "\nIt was raining.\n".to_owned();

		let params = form.parse().unwrap();
		assert_eq!(params.prompt, "A lighthouse keeper");
		assert_eq!(params.base_story, "It was raining.");
		assert_eq!(params.max_length, 100);
		assert_eq!(params.top_k, 50);
		assert!((params.temperature - 0.7).abs() < f32::EPSILON);
	}

	#[test]
	fn non_numeric_fields_are_reported() {
		let mut form = FormInput::with_defaults(&FormDefaults::default());
		form.prompt = "x".to_owned();
		form.top_k = "fifty".to_owned();
		assert_eq!(form.parse(), Err(ValidationError::NotANumber { field: "top-k" }));

		form.top_k = "50".to_owned();
		form.max_length = "-3".to_owned();
		assert_eq!(form.parse(), Err(ValidationError::NotANumber { field: "max length" }));
	}

	#[test]
	fn sampling_options_carry_the_form() {
		let options = valid().sampling_options(2, true);
		assert_eq!(options.max_new_tokens, 100);
		assert_eq!(options.top_k, 50);
		assert_eq!(options.no_repeat_ngram_size, 2);
		assert!(options.early_stopping);
	}
}
