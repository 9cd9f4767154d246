use super::state::State;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Marker token padding the context before the first word of a paragraph.
pub(crate) const PARAGRAPH_START: &str = "<p>";

/// Marker token emitted after the last word of a paragraph.
pub(crate) const PARAGRAPH_END: &str = "</p>";

/// Represents a word-level n-gram model.
///
/// The `NGramModel` stores states for contexts of `n-1` tokens
/// and gives the observed continuations of a context.
///
/// # Responsibilities
/// - Build the model from tokenized paragraphs
/// - Accumulate transition counts for each state
/// - Look up the continuations of a context
/// - Merge with another n-gram model of the same order `n`
///
/// # Invariants
/// - `n` is always >= 2
/// - Each state in `states` corresponds to a unique context of length `n-1`
/// - All state transitions have occurrence counts >= 1
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NGramModel {
	/// The order of the model (number of tokens in the n-gram)
	n: usize, // must be >= 2

	/// Mapping from a context key to its corresponding state
	states: HashMap<String, State>,
}

impl NGramModel {
	/// Creates a new n-gram model of order `n`.
	///
	/// # Errors
	/// Returns an error if `n < 2`.
	pub fn new(n: usize) -> Result<Self, String> {
		if n < 2 {
			return Err("n must be >= 2".to_owned());
		}
		Ok(Self { n, states: HashMap::new() })
	}

	/// Number of distinct contexts seen during training.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Builds the lookup key of a context: lowercase tokens joined by a space.
	pub(crate) fn context_key<S: AsRef<str>>(context: &[S]) -> String {
		context
			.iter()
			.map(|token| token.as_ref().to_lowercase())
			.collect::<Vec<_>>()
			.join(" ")
	}

	/// Adds one tokenized paragraph to the model.
	///
	/// The paragraph is padded with `n-1` start markers and closed by an
	/// end marker, so the model learns how paragraphs open and finish.
	pub fn add_paragraph<S: AsRef<str>>(&mut self, tokens: &[S]) {
		if tokens.is_empty() {
			return;
		}

		let mut padded: Vec<&str> = vec![PARAGRAPH_START; self.n - 1];
		padded.extend(tokens.iter().map(|t| t.as_ref()));
		padded.push(PARAGRAPH_END);

		for window in padded.windows(self.n) {
			let key = Self::context_key(&window[..self.n - 1]);
			let state = self.states.entry(key.clone()).or_insert_with(|| State::new(&key));
			state.add_transition(window[self.n - 1]);
		}
	}

	/// Returns the state following the last `n-1` tokens of `context`.
	///
	/// Returns `None` if the context is too short or was never seen.
	pub fn state<S: AsRef<str>>(&self, context: &[S]) -> Option<&State> {
		let width = self.n - 1;
		if context.len() < width {
			return None;
		}
		let key = Self::context_key(&context[context.len() - width..]);
		self.states.get(&key)
	}

	/// Merges another n-gram model into this one.
	///
	/// # Notes
	/// - Both models must have the same order `n`.
	/// - Occurrence counts for matching states and transitions are summed.
	///
	/// # Errors
	/// Returns an error if the model orders do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.n != other.n {
			return Err(format!("N mismatch: {} vs {}", self.n, other.n));
		}

		for (key, state) in &other.states {
			if let Some(existing) = self.states.get_mut(key) {
				existing.merge(state)?;
			} else {
				self.states.insert(key.clone(), state.clone());
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::tokenizer::tokenize;

	#[test]
	fn rejects_order_below_two() {
		assert!(NGramModel::new(1).is_err());
		assert!(NGramModel::new(2).is_ok());
	}

	#[test]
	fn learns_paragraph_boundaries() {
		let mut model = NGramModel::new(2).unwrap();
		model.add_paragraph(&tokenize("The fox ran."));

		let start = model.state(&[PARAGRAPH_START]).unwrap();
		assert_eq!(start.candidates(), vec![("The", 1)]);

		let end = model.state(&["."]).unwrap();
		assert_eq!(end.candidates(), vec![(PARAGRAPH_END, 1)]);
	}

	#[test]
	fn context_lookup_is_case_insensitive() {
		let mut model = NGramModel::new(3).unwrap();
		model.add_paragraph(&tokenize("The old fox slept."));

		let state = model.state(&["once", "THE", "Old"]).unwrap();
		assert_eq!(state.candidates(), vec![("fox", 1)]);
		assert!(model.state(&["old"]).is_none());
	}

	#[test]
	fn merge_requires_same_order() {
		let mut bigram = NGramModel::new(2).unwrap();
		let trigram = NGramModel::new(3).unwrap();
		assert!(bigram.merge(&trigram).is_err());

		let mut other = NGramModel::new(2).unwrap();
		other.add_paragraph(&tokenize("A cat."));
		bigram.merge(&other).unwrap();
		assert_eq!(bigram.len(), other.len());
	}
}
