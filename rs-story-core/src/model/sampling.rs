use std::collections::HashSet;

use rand::Rng;

/// Knobs passed to one autoregressive generation call.
///
/// These mirror the usual decoding controls of a language model:
/// - `max_new_tokens`: length budget added on top of the input
/// - `temperature`: sharpens (`< 1`) the next-token distribution
/// - `top_k`: keep only the `k` most likely tokens (`0` disables the cut)
/// - `top_p`: keep the smallest set of tokens whose mass reaches `p`
/// - `no_repeat_ngram_size`: never produce an n-gram twice (`0` disables)
/// - `early_stopping`: stop at the model's end-of-paragraph token
#[derive(Clone, Debug, PartialEq)]
pub struct SamplingOptions {
	pub max_new_tokens: usize,
	pub temperature: f32,
	pub top_k: usize,
	pub top_p: f32,
	pub no_repeat_ngram_size: usize,
	pub early_stopping: bool,
}

impl Default for SamplingOptions {
	fn default() -> Self {
		Self {
			max_new_tokens: 100,
			temperature: 0.7,
			top_k: 50,
			top_p: 0.9,
			no_repeat_ngram_size: 2,
			early_stopping: true,
		}
	}
}

/// Tokens that would complete an n-gram already present in `history`.
///
/// Returned lowercase; matching is case-insensitive like the model lookups.
pub(crate) fn banned_tokens<S: AsRef<str>>(history: &[S], n: usize) -> HashSet<String> {
	let mut banned = HashSet::new();
	if n == 0 || history.len() + 1 < n {
		return banned;
	}

	let lower: Vec<String> = history.iter().map(|t| t.as_ref().to_lowercase()).collect();
	let prefix = &lower[lower.len() + 1 - n..];
	for window in lower.windows(n) {
		if &window[..n - 1] == prefix {
			banned.insert(window[n - 1].clone());
		}
	}
	banned
}

/// Applies the ban list, temperature, top-k and top-p to raw counts.
///
/// `candidates` must be sorted by decreasing count. The result keeps that
/// order and holds unnormalized weights; it is empty only when every
/// candidate was banned.
pub(crate) fn filter_candidates<'a>(
	candidates: &[(&'a str, usize)],
	options: &SamplingOptions,
	banned: &HashSet<String>,
) -> Vec<(&'a str, f64)> {
	let allowed: Vec<(&str, usize)> = candidates
		.iter()
		.copied()
		.filter(|(token, count)| *count > 0 && !banned.contains(&token.to_lowercase()))
		.collect();

	let Some(max_count) = allowed.iter().map(|(_, count)| *count).max() else {
		return Vec::new();
	};

	// count^(1/T), scaled by the best count to stay finite for small T
	let mut weighted: Vec<(&str, f64)> = if options.temperature > 0.0 {
		let max_log = (max_count as f64).ln();
		let temperature = options.temperature as f64;
		allowed
			.iter()
			.map(|(token, count)| (*token, (((*count as f64).ln() - max_log) / temperature).exp()))
			.collect()
	} else {
		// Zero temperature degenerates to greedy decoding
		allowed.iter().take(1).map(|(token, _)| (*token, 1.0)).collect()
	};

	if options.top_k > 0 {
		weighted.truncate(options.top_k);
	}

	if options.top_p < 1.0 {
		let total: f64 = weighted.iter().map(|(_, w)| w).sum();
		let mut cumulative = 0.0;
		let mut keep = 0;
		for (_, weight) in &weighted {
			keep += 1;
			cumulative += weight / total;
			if cumulative >= options.top_p as f64 {
				break;
			}
		}
		weighted.truncate(keep.max(1));
	}

	weighted
}

/// Draws one token proportionally to its weight.
///
/// Returns `None` if there is nothing to draw from.
pub(crate) fn sample_weighted<'a, R: Rng>(weighted: &[(&'a str, f64)], rng: &mut R) -> Option<&'a str> {
	let total: f64 = weighted.iter().map(|(_, w)| w).sum();
	if weighted.is_empty() || total <= 0.0 {
		return None;
	}

	let mut r = rng.random::<f64>() * total;
	for (token, weight) in weighted {
		if r < *weight {
			return Some(*token);
		}
		r -= weight;
	}

	// Rounding can leave a sliver past the last bucket
	weighted.last().map(|(token, _)| *token)
}
