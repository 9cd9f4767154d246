use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::SystemTime;

use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ngram_model::{NGramModel, PARAGRAPH_END, PARAGRAPH_START};
use super::sampling::{SamplingOptions, banned_tokens, filter_candidates, sample_weighted};
use super::tokenizer::{append_tokens, tokenize};
use crate::error::StoryError;
use crate::io::{build_output_path, get_filename, list_files, normalize_folder, read_paragraphs};

/// Size and modification time of a corpus file, stored in its cache.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct CorpusStamp {
	len: u64,
	modified: Option<SystemTime>,
}

impl CorpusStamp {
	fn of(path: &Path) -> Result<Self, StoryError> {
		let metadata = std::fs::metadata(path)?;
		Ok(Self { len: metadata.len(), modified: metadata.modified().ok() })
	}
}

/// On-disk layout of a `.bin` cache.
#[derive(Serialize, Deserialize)]
struct ModelCache<M> {
	stamp: CorpusStamp,
	model: M,
}

/// Word-level back-off language model.
///
/// This struct manages:
/// - `ngrams`: a map from order to its `NGramModel`, for every order in `2..=max_order`.
/// - `paragraphs`: number of paragraphs the model was trained on.
/// - `corpus_names`: names of the corpus files loaded from disk.
///
/// Generation always tries the longest context first and backs off to shorter
/// ones, so a large order only costs memory, never coverage.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LanguageModel {
	max_order: usize,
	ngrams: HashMap<usize, NGramModel>,
	paragraphs: usize,
	corpus_names: Vec<String>,
}

impl LanguageModel {
	/// Creates an untrained model holding every order in `2..=max_order`.
	///
	/// # Errors
	/// Returns an error if `max_order < 2`.
	pub fn empty(max_order: usize) -> Result<Self, StoryError> {
		let mut ngrams = HashMap::new();
		for n in 2..=max_order {
			ngrams.insert(n, NGramModel::new(n).map_err(StoryError::Model)?);
		}
		if ngrams.is_empty() {
			return Err(StoryError::Model(format!("max order must be >= 2, got {max_order}")));
		}
		Ok(Self { max_order, ngrams, paragraphs: 0, corpus_names: Vec::new() })
	}

	/// Loads a model for one corpus file.
	///
	/// - Uses the `postcard` cache next to the corpus (`tales.txt` → `tales.bin`)
	///   when it exists, was built for the same `max_order` and the corpus
	///   still has the size and modification time recorded in it.
	/// - Otherwise trains from the corpus and rewrites the cache.
	pub fn new<P: AsRef<Path>>(corpus_path: P, max_order: usize) -> Result<Self, StoryError> {
		let corpus_path = corpus_path.as_ref();
		let cache_path = build_output_path(corpus_path, "bin")?;

		let stamp = CorpusStamp::of(corpus_path)?;

		let mut model = match Self::read_cache(&cache_path, &stamp, max_order) {
			Some(model) => model,
			None => Self::read_corpus_file(corpus_path, &cache_path, stamp, max_order)?,
		};
		model.corpus_names.push(get_filename(corpus_path)?);
		info!(
			"Loaded corpus '{}' ({} paragraphs, order {})",
			corpus_path.display(),
			model.paragraphs,
			model.max_order
		);
		Ok(model)
	}

	/// Loads and merges every `.txt` corpus found directly in `dir`.
	///
	/// # Errors
	/// - `StoryError::Io` if the directory cannot be read
	/// - `StoryError::NoCorpus` if it holds no corpus
	pub fn from_dir<P: AsRef<Path>>(dir: P, max_order: usize) -> Result<Self, StoryError> {
		let folder = normalize_folder(dir);
		let corpora = list_files(&folder, "txt")?;
		if corpora.is_empty() {
			return Err(StoryError::NoCorpus(folder));
		}

		let mut model = Self::empty(max_order)?;
		for corpus in corpora {
			model.merge(&Self::new(&corpus, max_order)?)?;
		}
		Ok(model)
	}

	/// Trains a model from in-memory paragraphs on the current thread.
	pub fn train<S: AsRef<str>>(paragraphs: &[S], max_order: usize) -> Result<Self, StoryError> {
		let mut model = Self::empty(max_order)?;
		for paragraph in paragraphs {
			model.add_paragraph(paragraph.as_ref());
		}
		Ok(model)
	}

	/// Adds one paragraph to every order of the model.
	pub fn add_paragraph(&mut self, paragraph: &str) {
		let tokens = tokenize(paragraph);
		if tokens.is_empty() {
			return;
		}
		for model in self.ngrams.values_mut() {
			model.add_paragraph(&tokens);
		}
		self.paragraphs += 1;
	}

	/// Returns the cached model if the cache is readable and matches both the
	/// corpus stamp and `max_order`.
	fn read_cache(cache_path: &Path, stamp: &CorpusStamp, max_order: usize) -> Option<Self> {
		if !cache_path.exists() {
			return None;
		}
		let bytes = match std::fs::read(cache_path) {
			Ok(bytes) => bytes,
			Err(e) => {
				warn!("Cannot read model cache '{}': {e}", cache_path.display());
				return None;
			}
		};
		match postcard::from_bytes::<ModelCache<Self>>(&bytes) {
			Ok(cache) if cache.stamp != *stamp => {
				debug!("Ignoring cache '{}': the corpus changed since", cache_path.display());
				None
			}
			Ok(cache) if cache.model.max_order == max_order => Some(cache.model),
			Ok(cache) => {
				debug!(
					"Ignoring cache '{}' built for order {} (wanted {max_order})",
					cache_path.display(),
					cache.model.max_order
				);
				None
			}
			Err(e) => {
				warn!("Ignoring unreadable model cache '{}': {e}", cache_path.display());
				None
			}
		}
	}

	/// Reads a corpus, trains partial models in parallel, merges them and
	/// writes the result to `cache_path`.
	///
	/// # Behavior
	/// - Splits paragraphs into chunks (CPU cores * factor).
	/// - Spawns one thread per chunk, collecting partial models over an MPSC channel.
	/// - Merges all partial models sequentially.
	/// - Serializes the final model for future fast loading.
	fn read_corpus_file(
		filename: &Path,
		cache_path: &Path,
		stamp: CorpusStamp,
		max_order: usize,
	) -> Result<Self, StoryError> {
		let lines = read_paragraphs(filename)?;
		let mut final_model = Self::empty(max_order)?;
		if lines.is_empty() {
			warn!("Corpus '{}' is empty", filename.display());
			return Ok(final_model);
		}

		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = lines.len().div_ceil(chunks).max(1);

		let (tx, rx) = mpsc::channel();
		for chunk in lines.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk: Vec<String> = chunk.to_vec();

			thread::spawn(move || {
				// Only fails once the receiver is gone
				let _ = tx.send(Self::train(&chunk, max_order));
			});
		}
		drop(tx);

		for partial_model in rx.iter() {
			final_model.merge(&partial_model?)?;
		}

		let bytes = postcard::to_stdvec(&ModelCache { stamp, model: &final_model })?;
		std::fs::write(cache_path, bytes)?;
		debug!("Wrote model cache '{}'", cache_path.display());

		Ok(final_model)
	}

	/// Merges another model into this one.
	///
	/// # Errors
	/// Returns an error if the two models were built with different orders.
	pub fn merge(&mut self, other: &Self) -> Result<(), StoryError> {
		if self.max_order != other.max_order {
			return Err(StoryError::Model(format!(
				"Order mismatch: self={}, other={}",
				self.max_order, other.max_order
			)));
		}

		for (n, model) in &other.ngrams {
			if let Some(existing) = self.ngrams.get_mut(n) {
				existing.merge(model).map_err(StoryError::Model)?;
			} else {
				self.ngrams.insert(*n, model.clone());
			}
		}

		self.paragraphs += other.paragraphs;
		self.corpus_names.extend(other.corpus_names.iter().cloned());
		Ok(())
	}

	pub fn max_order(&self) -> usize {
		self.max_order
	}

	/// Number of paragraphs seen during training.
	pub fn paragraphs(&self) -> usize {
		self.paragraphs
	}

	/// Names of the corpora this model was built from, in load order.
	pub fn corpus_names(&self) -> &[String] {
		&self.corpus_names
	}

	pub fn is_empty(&self) -> bool {
		self.paragraphs == 0
	}

	/// Continues `input` and returns the whole text (input + continuation).
	///
	/// # Behavior
	/// - `input` is returned unchanged at the front; only the tokens added by
	///   the model are joined after it.
	/// - The context is the tail of the input; unseen contexts back off to
	///   shorter orders, then restart from a paragraph opening. A restart
	///   ignores the no-repeat ban when every opening is banned.
	/// - At most `max_new_tokens` tokens are added.
	/// - An end-of-paragraph token before the first new word opens a new
	///   paragraph. Later on it stops generation when `early_stopping` is
	///   set, otherwise a new paragraph starts.
	///
	/// # Errors
	/// Returns an error if the model was never trained.
	pub fn generate<R: Rng>(&self, input: &str, options: &SamplingOptions, rng: &mut R) -> Result<String, StoryError> {
		if self.is_empty() {
			return Err(StoryError::Model("the language model has not been trained".to_owned()));
		}

		let opening: Vec<String> = vec![PARAGRAPH_START.to_owned(); self.max_order - 1];
		let mut history = tokenize(input);
		let mut context = opening.clone();
		context.extend(history.iter().cloned());

		let mut added: Vec<String> = Vec::new();
		// Each step either adds a token or closes a paragraph, bound both
		for _ in 0..options.max_new_tokens.saturating_mul(2) {
			if added.len() >= options.max_new_tokens {
				break;
			}

			let banned = banned_tokens(&history, options.no_repeat_ngram_size);
			let next = match self.next_token(&context, options, &banned, rng) {
				Some(token) => token,
				None => {
					// The ban is dropped only if it leaves no opening at all
					let restart = self
						.next_token(&opening, options, &banned, rng)
						.or_else(|| self.next_token(&opening, options, &HashSet::new(), rng));
					match restart {
						Some(token) => {
							context.extend(opening.iter().cloned());
							token
						}
						None => break,
					}
				}
			};

			if next == PARAGRAPH_END {
				if options.early_stopping && !added.is_empty() {
					debug!("End of paragraph after {} new tokens", added.len());
					break;
				}
				context.extend(opening.iter().cloned());
				continue;
			}

			history.push(next.to_owned());
			context.push(next.to_owned());
			added.push(next.to_owned());
		}

		let mut text = input.to_owned();
		append_tokens(&mut text, &added);
		Ok(text)
	}

	/// Samples the next token, backing off from the longest context.
	fn next_token<'a, R: Rng>(
		&'a self,
		context: &[String],
		options: &SamplingOptions,
		banned: &HashSet<String>,
		rng: &mut R,
	) -> Option<&'a str> {
		for n in (2..=self.max_order).rev() {
			let Some(state) = self.ngrams.get(&n).and_then(|model| model.state(context)) else {
				continue;
			};
			let candidates = state.candidates();
			let weighted = filter_candidates(&candidates, options, banned);
			if let Some(token) = sample_weighted(&weighted, rng) {
				return Some(token);
			}
		}
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	const CORPUS: [&str; 3] = [
		"The old wolf lived in the dark forest.",
		"The young fox lived by the silver river.",
		"One night the fox met the wolf, and they became friends.",
	];

	fn greedy() -> SamplingOptions {
		SamplingOptions { temperature: 1.0, top_k: 1, top_p: 1.0, no_repeat_ngram_size: 0, ..SamplingOptions::default() }
	}

	#[test]
	fn rejects_order_below_two() {
		assert!(LanguageModel::empty(1).is_err());
		assert!(LanguageModel::train(&CORPUS, 0).is_err());
	}

	#[test]
	fn untrained_model_cannot_generate() {
		let model = LanguageModel::empty(3).unwrap();
		let mut rng = StdRng::seed_from_u64(1);
		assert!(model.generate("Hi", &SamplingOptions::default(), &mut rng).is_err());
	}

	#[test]
	fn output_starts_with_input() {
		let model = LanguageModel::train(&CORPUS, 3).unwrap();
		let mut rng = StdRng::seed_from_u64(3);
		let text = model.generate("The old wolf", &SamplingOptions::default(), &mut rng).unwrap();
		assert!(text.starts_with("The old wolf"), "{text}");
		assert!(text.len() > "The old wolf".len());
	}

	#[test]
	fn input_is_returned_verbatim() {
		let model = LanguageModel::train(&CORPUS, 3).unwrap();
		let mut rng = StdRng::seed_from_u64(3);
		let input = "Pi is 3.14, said \"Bob!\" e.g. here.\n\nNext line";

		let mut text = input.to_owned();
		for _ in 0..3 {
			let next = model.generate(&text, &SamplingOptions::default(), &mut rng).unwrap();
			assert!(next.starts_with(&text), "{next:?}");
			assert!(next.len() > text.len());
			text = next;
		}
		assert!(text.starts_with(input));
	}

	#[test]
	fn leading_paragraph_end_opens_a_new_paragraph() {
		let model = LanguageModel::train(&["A cat sat."], 2).unwrap();
		let mut rng = StdRng::seed_from_u64(5);
		let options = SamplingOptions { max_new_tokens: 50, ..greedy() };
		assert_eq!(model.generate("A cat sat. ", &options, &mut rng).unwrap(), "A cat sat. A cat sat.");
		assert_eq!(model.generate("A cat sat.", &options, &mut rng).unwrap(), "A cat sat. A cat sat.");
	}

	#[test]
	fn restart_ignores_an_exhausted_ban() {
		let model = LanguageModel::train(&["A cat sat."], 2).unwrap();
		let mut rng = StdRng::seed_from_u64(5);
		let options = SamplingOptions { max_new_tokens: 1, no_repeat_ngram_size: 2, ..greedy() };
		let text = model.generate("A cat sat. A cat sat.", &options, &mut rng).unwrap();
		assert_eq!(text, "A cat sat. A cat sat. A");
	}

	#[test]
	fn respects_length_budget() {
		let model = LanguageModel::train(&CORPUS, 2).unwrap();
		let mut rng = StdRng::seed_from_u64(11);
		let options = SamplingOptions { max_new_tokens: 3, early_stopping: false, ..greedy() };
		let text = model.generate("wolf", &options, &mut rng).unwrap();
		assert_eq!(tokenize(&text).len(), 4, "{text}");
	}

	#[test]
	fn early_stopping_ends_at_paragraph_end() {
		let model = LanguageModel::train(&["A cat sat."], 2).unwrap();
		let mut rng = StdRng::seed_from_u64(5);
		let options = SamplingOptions { max_new_tokens: 50, ..greedy() };
		assert_eq!(model.generate("", &options, &mut rng).unwrap(), "A cat sat.");

		let options = SamplingOptions { max_new_tokens: 5, early_stopping: false, ..greedy() };
		assert_eq!(model.generate("", &options, &mut rng).unwrap(), "A cat sat. A");
	}

	#[test]
	fn unknown_context_restarts_a_paragraph() {
		let model = LanguageModel::train(&["A cat sat."], 3).unwrap();
		let mut rng = StdRng::seed_from_u64(5);
		let options = SamplingOptions { max_new_tokens: 50, ..greedy() };
		assert_eq!(model.generate("Zebras", &options, &mut rng).unwrap(), "Zebras A cat sat.");
	}

	#[test]
	fn seeded_generation_is_reproducible() {
		let model = LanguageModel::train(&CORPUS, 3).unwrap();
		let options = SamplingOptions::default();
		let first = model.generate("The", &options, &mut StdRng::seed_from_u64(42)).unwrap();
		let second = model.generate("The", &options, &mut StdRng::seed_from_u64(42)).unwrap();
		assert_eq!(first, second);
	}

	#[test]
	fn merge_adds_paragraphs_and_names() {
		let mut left = LanguageModel::train(&CORPUS[..1], 3).unwrap();
		let right = LanguageModel::train(&CORPUS[1..], 3).unwrap();
		left.merge(&right).unwrap();
		assert_eq!(left.paragraphs(), 3);

		let other_order = LanguageModel::train(&CORPUS, 2).unwrap();
		assert!(left.merge(&other_order).is_err());
	}

	#[test]
	fn corpus_is_cached_next_to_the_file() {
		let dir = tempfile::tempdir().unwrap();
		let corpus = dir.path().join("fables.txt");
		std::fs::write(&corpus, CORPUS.join("\n")).unwrap();

		let trained = LanguageModel::new(&corpus, 3).unwrap();
		assert!(dir.path().join("fables.bin").exists());
		assert_eq!(trained.corpus_names(), ["fables"]);

		let cached = LanguageModel::new(&corpus, 3).unwrap();
		assert_eq!(cached.paragraphs(), trained.paragraphs());
		assert_eq!(cached.corpus_names(), ["fables"]);

		// A cache built for another order is ignored and rebuilt
		let rebuilt = LanguageModel::new(&corpus, 2).unwrap();
		assert_eq!(rebuilt.max_order(), 2);
	}

	#[test]
	fn edited_corpus_invalidates_the_cache() {
		let dir = tempfile::tempdir().unwrap();
		let corpus = dir.path().join("fables.txt");
		std::fs::write(&corpus, CORPUS[..2].join("\n")).unwrap();
		assert_eq!(LanguageModel::new(&corpus, 3).unwrap().paragraphs(), 2);

		std::fs::write(&corpus, CORPUS.join("\n")).unwrap();
		assert_eq!(LanguageModel::new(&corpus, 3).unwrap().paragraphs(), 3);
	}

	#[test]
	fn from_dir_merges_every_corpus() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("a.txt"), CORPUS[0]).unwrap();
		std::fs::write(dir.path().join("b.txt"), CORPUS[1..].join("\n")).unwrap();

		let model = LanguageModel::from_dir(dir.path(), 3).unwrap();
		assert_eq!(model.corpus_names(), ["a", "b"]);
		assert_eq!(model.paragraphs(), 3);

		let empty = tempfile::tempdir().unwrap();
		assert!(matches!(LanguageModel::from_dir(empty.path(), 3), Err(StoryError::NoCorpus(_))));
	}
}
