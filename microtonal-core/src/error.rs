//! # Error Types
//!
//! Typed errors for the tuning engine. Configuration errors carry the
//! human-readable message shown to the user as their `Display` text.

use thiserror::Error;

/// A scale definition that cannot describe a repeating tuning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScaleError {
    /// Fewer than the root plus the equave-closing step.
    #[error("malformed scale '{name}': needs at least 2 steps, found {found}")]
    TooFewSteps { name: String, found: usize },

    /// The first step is not the root at 0 cents.
    #[error("malformed scale '{name}': first step must be 0 cents, found {cents}")]
    RootNotZero { name: String, cents: f64 },

    /// Steps are not strictly ascending.
    #[error("malformed scale '{name}': step {index} ({cents} cents) is not above the previous step")]
    NotAscending { name: String, index: usize, cents: f64 },

    /// A step or interval carries NaN or an infinite value.
    #[error("malformed scale '{name}': '{entry}' has a non-finite cents value")]
    NonFinite { name: String, entry: String },

    /// An interval class with negative size.
    #[error("malformed scale '{name}': interval '{interval}' has negative size {cents}")]
    NegativeInterval { name: String, interval: String, cents: f64 },
}

/// Structural failure of a scale file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScalaError {
    #[error("invalid scale file: unable to find the number of notes")]
    MissingNoteCount,
}

/// Rejected exercise configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("You must select at least one type of intervals.")]
    NoIntervalTypes,

    #[error("You must select at least one playing modes.")]
    NoPlaybackModes,

    #[error("The minimum frequency is too low.")]
    MinFreqTooLow,

    #[error("The maximum frequency is too high.")]
    MaxFreqTooHigh,

    #[error("The minimum frequency must be below the maximum frequency.")]
    InvertedRange,

    #[error("The number of questions must be at least 1.")]
    NoQuestions,

    #[error("Can't find requested scale.")]
    ScaleNotFound(String),

    #[error("Finish the current exercise before starting a new one.")]
    ExerciseInProgress,
}

/// A question could not be produced for the current configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("no scale notes lie inside the configured frequency range")]
    NoAvailableNotes,

    #[error("no valid interval for this configuration after {attempts} attempts")]
    NoValidInterval { attempts: usize },
}
