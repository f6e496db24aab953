//! # Configuration
//!
//! Option structs for the exercise and the partial finders. Every field has
//! a default, so a JSON option file only needs to name what it changes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Settings for an interval ear-training exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseOptions {
    pub scale_name: String,
    pub include_smaller_than_equave: bool,
    pub include_larger_than_equave: bool,
    pub play_arpeggio: bool,
    pub play_simultaneous: bool,
    pub min_freq: f64,
    pub max_freq: f64,
    /// Questions per session when not in infinite mode.
    pub num_questions: usize,
    pub infinite_mode: bool,
}

impl Default for ExerciseOptions {
    fn default() -> Self {
        Self {
            scale_name: "24edo".to_string(),
            include_smaller_than_equave: true,
            include_larger_than_equave: false,
            play_arpeggio: true,
            play_simultaneous: true,
            min_freq: 220.0,
            max_freq: 659.3,
            num_questions: 5,
            infinite_mode: true,
        }
    }
}

impl ExerciseOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse exercise options")
    }
}

/// Search window for the partial analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialSearchOptions {
    pub min_freq: f64,
    pub max_freq: f64,
    pub tolerance_cents: f64,
}

impl PartialSearchOptions {
    /// Window used when looking for a common fundamental.
    pub fn fundamental_finder() -> Self {
        Self {
            min_freq: 20.0,
            max_freq: 220.0,
            tolerance_cents: 10.0,
        }
    }

    /// Window used when looking for a common partial.
    pub fn partial_finder() -> Self {
        Self {
            min_freq: 110.0,
            max_freq: 880.0,
            tolerance_cents: 10.0,
        }
    }
}

impl Default for PartialSearchOptions {
    fn default() -> Self {
        Self::fundamental_finder()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let options =
            ExerciseOptions::from_json(r#"{"scale_name":"12edo","infinite_mode":false}"#).unwrap();
        assert_eq!(
            options,
            ExerciseOptions {
                scale_name: "12edo".to_string(),
                infinite_mode: false,
                ..ExerciseOptions::default()
            }
        );
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(ExerciseOptions::from_json("{\"min_freq\": \"low\"}").is_err());
    }

    #[test]
    fn finder_windows() {
        let fundamental = PartialSearchOptions::default();
        assert_eq!((fundamental.min_freq, fundamental.max_freq), (20.0, 220.0));
        let partial = PartialSearchOptions::partial_finder();
        assert_eq!((partial.min_freq, partial.max_freq), (110.0, 880.0));
    }
}
