//! Story writing: story elements, form parameters, the generation loop and
//! the session history.

/// Story elements file (`settings`, `characters`, `plot_twists`).
pub mod data;

/// Random pick of one setting, character and plot twist.
pub mod elements;

/// In-memory list of the stories written during this run.
pub mod history;

/// Generation parameters and their validation.
pub mod params;

/// Seed building and the iterative generation loop.
pub mod writer;
