//! The bundled language model behind story generation.
//!
//! This module provides a word-level back-off n-gram model, including:
//! - Fixed-order n-gram tables (`NGramModel`)
//! - A multi-order model trained from corpora (`LanguageModel`)
//! - Decoding controls (`SamplingOptions`)
//! - The `TextModel` abstraction the story writer depends on
//! - A ready-to-use `TextModel` implementation (`NGramSampler`)

/// Multi-order model: corpus loading, caching, merging and generation.
pub mod language_model;

/// Fixed-order n-gram table (`n >= 2`).
///
/// Handles paragraph ingestion, transition counting and model merging.
pub mod ngram_model;

/// `TextModel` implementation owning a `LanguageModel` and its rng.
pub mod sampler;

/// Decoding controls: temperature, top-k, top-p, n-gram bans.
pub mod sampling;

/// Internal representation of a single n-gram context.
///
/// Tracks outgoing transitions with their counts.
/// This module is not exposed publicly.
mod state;

/// Abstraction over an autoregressive text generator.
pub mod text_model;

/// Word/punctuation tokenizer.
pub mod tokenizer;
