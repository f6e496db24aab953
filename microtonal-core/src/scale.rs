//! # Scale Model
//!
//! A tuning system is an ordered list of steps inside one repeating equave
//! plus a catalog of named interval classes. Scales are validated when they
//! are built, so quantization and exercise generation can rely on:
//! - at least two steps (the root and the equave-closing step)
//! - the first step at 0 cents
//! - strictly ascending steps, the last one being the equave

use serde::{Deserialize, Serialize};

use crate::error::ScaleError;
use crate::pitch::Pitch;
use crate::scala::ScalaScale;

/// Tolerance used when comparing cents values.
pub const CENTS_EPSILON: f64 = 1e-6;

/// Name given to the equave when the catalog has no interval spanning it.
pub const DEFAULT_EQUAVE_NAME: &str = "equave";

/// A position inside one equave, in cents above the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleStep {
    pub name: String,
    pub cents: f64,
}

impl ScaleStep {
    pub fn new(name: impl Into<String>, cents: f64) -> Self {
        Self {
            name: name.into(),
            cents,
        }
    }
}

/// A named interval class. Its size may exceed one equave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub name: String,
    pub cents: f64,
}

impl Interval {
    pub fn new(name: impl Into<String>, cents: f64) -> Self {
        Self {
            name: name.into(),
            cents,
        }
    }
}

/// Unvalidated scale definition as found in a catalog file.
#[derive(Debug, Clone, Deserialize)]
struct ScaleDefinition {
    name: String,
    notes: Vec<ScaleStep>,
    #[serde(default)]
    intervals: Vec<Interval>,
}

impl TryFrom<ScaleDefinition> for Scale {
    type Error = ScaleError;

    fn try_from(definition: ScaleDefinition) -> Result<Self, Self::Error> {
        Scale::new(definition.name, definition.notes, definition.intervals)
    }
}

/// A validated tuning system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScaleDefinition")]
pub struct Scale {
    name: String,
    notes: Vec<ScaleStep>,
    intervals: Vec<Interval>,
}

impl Scale {
    /// Builds a scale after checking its structure.
    ///
    /// # Returns
    /// * `Err(ScaleError)` - The steps cannot describe a repeating equave
    pub fn new(
        name: impl Into<String>,
        notes: Vec<ScaleStep>,
        intervals: Vec<Interval>,
    ) -> Result<Self, ScaleError> {
        let name = name.into();

        if notes.len() < 2 {
            return Err(ScaleError::TooFewSteps {
                name,
                found: notes.len(),
            });
        }
        for entry in notes
            .iter()
            .map(|n| (&n.name, n.cents))
            .chain(intervals.iter().map(|i| (&i.name, i.cents)))
        {
            if !entry.1.is_finite() {
                return Err(ScaleError::NonFinite {
                    name,
                    entry: entry.0.clone(),
                });
            }
        }
        if notes[0].cents.abs() > CENTS_EPSILON {
            return Err(ScaleError::RootNotZero {
                name,
                cents: notes[0].cents,
            });
        }
        if let Some(index) = (1..notes.len()).find(|&i| notes[i].cents <= notes[i - 1].cents) {
            return Err(ScaleError::NotAscending {
                name,
                index,
                cents: notes[index].cents,
            });
        }
        if let Some(interval) = intervals.iter().find(|i| i.cents < 0.0) {
            return Err(ScaleError::NegativeInterval {
                interval: interval.name.clone(),
                cents: interval.cents,
                name,
            });
        }

        Ok(Self {
            name,
            notes,
            intervals,
        })
    }

    /// An equal division of the equave into `divisions` steps.
    ///
    /// Steps are named by their index and interval classes use the
    /// `steps\divisions` notation, with "unison" and "octave" (or
    /// "equave" for non-octave equaves) at both ends.
    pub fn equal_division(
        name: impl Into<String>,
        divisions: usize,
        equave_cents: f64,
    ) -> Result<Self, ScaleError> {
        let step = equave_cents / divisions.max(1) as f64;
        let equave_name = if (equave_cents - 1200.0).abs() < CENTS_EPSILON {
            "octave"
        } else {
            DEFAULT_EQUAVE_NAME
        };

        let notes = (0..=divisions)
            .map(|k| ScaleStep::new((k % divisions.max(1)).to_string(), k as f64 * step))
            .collect();
        let intervals = (0..=divisions)
            .map(|k| {
                let name = match k {
                    0 => "unison".to_string(),
                    k if k == divisions => equave_name.to_string(),
                    k => format!("{k}\\{divisions}"),
                };
                Interval::new(name, k as f64 * step)
            })
            .collect();

        Self::new(name, notes, intervals)
    }

    /// Derives a scale from a parsed scale file.
    ///
    /// The root `1/1` is added at 0 cents, token values are sorted, and
    /// non-positive or repeated values are dropped. The greatest value closes
    /// the equave. Every non-root step becomes an interval class named after
    /// its token.
    pub fn from_scala(scala: &ScalaScale) -> Result<Self, ScaleError> {
        let mut values: Vec<(String, f64)> = scala
            .notes
            .iter()
            .filter(|note| {
                let keep = note.cents > CENTS_EPSILON;
                if !keep {
                    log::debug!("dropping non-positive scale file value '{}'", note.text);
                }
                keep
            })
            .map(|note| (note.text.clone(), note.cents))
            .collect();
        values.sort_by(|a, b| a.1.total_cmp(&b.1));
        values.dedup_by(|b, a| (b.1 - a.1).abs() < CENTS_EPSILON);

        let mut notes = vec![ScaleStep::new("1/1", 0.0)];
        notes.extend(values.iter().map(|(text, cents)| ScaleStep::new(text.clone(), *cents)));
        let intervals = values
            .into_iter()
            .map(|(text, cents)| Interval::new(text, cents))
            .collect();

        Self::new(scala.name.clone(), notes, intervals)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Steps in ascending order, the last one closing the equave.
    pub fn notes(&self) -> &[ScaleStep] {
        &self.notes
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn equave_cents(&self) -> f64 {
        self.notes[self.notes.len() - 1].cents
    }

    /// Number of distinct steps per equave (the closing step is not counted).
    pub fn steps_per_equave(&self) -> usize {
        self.notes.len() - 1
    }

    /// Name of the interval class spanning exactly one equave.
    pub fn equave_name(&self) -> &str {
        let equave = self.equave_cents();
        self.intervals
            .iter()
            .find(|i| (i.cents - equave).abs() < CENTS_EPSILON)
            .map_or(DEFAULT_EQUAVE_NAME, |i| i.name.as_str())
    }

    /// Whether `name` labels a unison or an exact equave in this scale.
    pub fn is_equave_identity_name(&self, name: &str) -> bool {
        if name == self.equave_name() {
            return true;
        }
        let equave = self.equave_cents();
        self.intervals.iter().any(|i| {
            i.name == name
                && (i.cents.abs() < CENTS_EPSILON || (i.cents - equave).abs() < CENTS_EPSILON)
        })
    }

    /// The step a keyboard key plays, and how many equaves it sits above
    /// the keyboard's base. Keys are numbered from the root of the base
    /// equave; negative keys reach below it.
    pub fn key_step(&self, key: i64) -> (&ScaleStep, i64) {
        let steps = self.steps_per_equave() as i64;
        (&self.notes[key.rem_euclid(steps) as usize], key.div_euclid(steps))
    }

    /// Pitch of a keyboard key whose root sits on C of `octave`.
    ///
    /// # Arguments
    /// * `key` - Key number, 0 being the root of the base equave
    /// * `octave` - Octave number of the root, in scientific pitch notation
    /// * `transposition_cents` - Shift applied to every key
    ///
    /// # Returns
    /// * `None` - The key lies too far out for a finite positive frequency
    pub fn key_pitch(&self, key: i64, octave: i32, transposition_cents: f64) -> Option<Pitch> {
        let (step, equaves) = self.key_step(key);
        let cents = equaves as f64 * self.equave_cents() + step.cents + transposition_cents;
        Pitch::from_midi_note(12.0 * (f64::from(octave) + 1.0) + cents / 100.0)
    }
}
