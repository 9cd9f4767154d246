use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Represents a context in an n-gram language model.
///
/// A `State` corresponds to a fixed (n-1)-token context (`key`) and stores
/// every token observed right after that context in the training corpus.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate transition occurrences during training
/// - Expose the observed continuations in a stable order for sampling
/// - Merge with another state having the same key (parallel training support)
///
/// ## Invariants
/// - All transitions belong to the same `key`
/// - Each transition occurrence count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct State {
	/// Identifier of the state (lowercase context tokens joined by a space).
	key: String,
	/// Outgoing transitions indexed by the next token, with original casing.
	/// Example: { "the" => 42, "a" => 3 }
	transitions: HashMap<String, usize>,
}

impl State {
	/// Creates a new empty state for the given context key.
	pub fn new(key: &str) -> Self {
		Self {
			key: key.to_owned(),
			transitions: HashMap::new(),
		}
	}

	/// Records an occurrence of a transition toward `next_token`.
	pub fn add_transition(&mut self, next_token: &str) {
		*self.transitions.entry(next_token.to_owned()).or_insert(0) += 1;
	}

	/// Returns the observed continuations with their counts.
	///
	/// Sorted by decreasing count, then by token, so that a seeded sampler
	/// draws the same sequence on every run regardless of hash order.
	pub fn candidates(&self) -> Vec<(&str, usize)> {
		let mut candidates: Vec<(&str, usize)> = self
			.transitions
			.iter()
			.map(|(token, occurrence)| (token.as_str(), *occurrence))
			.collect();
		candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
		candidates
	}

	/// Merges another state into this one, summing occurrence counts.
	///
	/// # Errors
	/// Returns an error if the state keys do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.key != other.key {
			return Err(format!("Key mismatch: '{}' vs '{}'", self.key, other.key));
		}

		for (next_token, occurrence) in &other.transitions {
			*self.transitions.entry(next_token.clone()).or_insert(0) += *occurrence;
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn candidates_are_sorted_by_count_then_token() {
		let mut state = State::new("the");
		for token in ["wolf", "fox", "wolf", "bear", "fox", "wolf"] {
			state.add_transition(token);
		}

		assert_eq!(state.candidates(), vec![("wolf", 3), ("fox", 2), ("bear", 1)]);
	}

	#[test]
	fn merge_sums_counts() {
		let mut left = State::new("a");
		left.add_transition("x");
		let mut right = State::new("a");
		right.add_transition("x");
		right.add_transition("y");

		left.merge(&right).unwrap();
		assert_eq!(left.candidates(), vec![("x", 2), ("y", 1)]);
	}

	#[test]
	fn merge_rejects_other_key() {
		let mut left = State::new("a");
		assert!(left.merge(&State::new("b")).is_err());
	}
}
