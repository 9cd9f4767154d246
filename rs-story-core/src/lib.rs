//! Story generation library.
//!
//! This crate provides everything behind the story writer, including:
//! - Story elements loading and random sampling
//! - Form parameters and their validation
//! - The iterative generation loop and the session history
//! - A word-level n-gram language model used as the text generator
//! - Configuration and flat-file helpers
//!
//! The GUI only drives these; no generation logic lives in the front end.

/// Application settings (`rs-story.json`).
pub mod config;

/// Error types shared by the whole crate.
pub mod error;

/// Flat-file helpers (corpora, story output, directory listing).
pub mod io;

/// Language model and the `TextModel` abstraction.
pub mod model;

/// Story data, parameters, generation loop and history.
pub mod story;
