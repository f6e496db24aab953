//! # Scale Quantizer
//!
//! Maps arbitrary frequencies onto the steps of a [`Scale`], and lists the
//! scale notes that fit inside a frequency range.
//!
//! Positions are absolute cents (MIDI note × 100), so a step at `s` cents in
//! equave `k` sits at `s + k · equave_cents`.

use serde::{Deserialize, Serialize};

use crate::pitch::{cents_to_freq, freq_to_midi};
use crate::scale::{CENTS_EPSILON, Scale};

/// Which way to round when a frequency falls between two steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

/// A quantized position: step index, equave index and absolute cents.
///
/// `degree` is always below `steps_per_equave`; the equave-closing step is
/// reported as degree 0 of the next equave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleDegree {
    pub degree: usize,
    pub equave: i64,
    pub cents: f64,
}

/// A scale note at an absolute position, not bounded to one equave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub name: String,
    pub cents: f64,
}

impl Note {
    pub fn freq(&self) -> f64 {
        cents_to_freq(self.cents)
    }

    /// Index of the equave this note falls in.
    pub fn equave_index(&self, equave_cents: f64) -> i64 {
        (self.cents / equave_cents + CENTS_EPSILON).floor() as i64
    }

    /// Step name followed by the equave index, e.g. "G5".
    pub fn label(&self, equave_cents: f64) -> String {
        format!("{}{}", self.name, self.equave_index(equave_cents))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScaleQuantizer<'a> {
    scale: &'a Scale,
}

impl<'a> ScaleQuantizer<'a> {
    pub fn new(scale: &'a Scale) -> Self {
        Self { scale }
    }

    /// Snaps a frequency to a scale step.
    ///
    /// The nearest step is found first (ties go to the lower step). With
    /// `Direction::Up` a nearest step below the frequency is replaced by the
    /// next one up; `Direction::Down` mirrors this.
    ///
    /// # Returns
    /// * `None` - The frequency is not positive and finite, or the scale has no steps
    pub fn quantize(&self, freq: f64, direction: Direction) -> Option<ScaleDegree> {
        let notes = self.scale.notes();
        if !(freq.is_finite() && freq > 0.0) || notes.is_empty() {
            return None;
        }

        let equave_cents = self.scale.equave_cents();
        let midi_per_equave = equave_cents / 100.0;
        let midi_note = freq_to_midi(freq);
        let mut equave = (midi_note / midi_per_equave).floor() as i64;
        let offset_cents = midi_note.rem_euclid(midi_per_equave) * 100.0;

        let mut index = 0;
        let mut best = f64::INFINITY;
        for (i, note) in notes.iter().enumerate() {
            let distance = (note.cents - offset_cents).abs();
            if distance < best {
                best = distance;
                index = i;
            }
        }

        let last = notes.len() - 1;
        match direction {
            Direction::Up if notes[index].cents < offset_cents - CENTS_EPSILON => {
                if index < last {
                    index += 1;
                } else {
                    index = 0;
                    equave += 1;
                }
            }
            Direction::Down if notes[index].cents > offset_cents + CENTS_EPSILON => {
                if index > 0 {
                    index -= 1;
                } else {
                    index = last;
                    equave -= 1;
                }
            }
            _ => {}
        }
        if index == last && last > 0 {
            index = 0;
            equave += 1;
        }

        Some(ScaleDegree {
            degree: index,
            equave,
            cents: notes[index].cents + equave as f64 * equave_cents,
        })
    }

    /// Lists every scale note between two frequencies, both bounds included.
    ///
    /// The lower bound is quantized upward and the upper bound downward;
    /// notes are then walked step by step, crossing into the next equave after
    /// the last distinct step.
    ///
    /// # Returns
    /// * `None` - Either bound could not be quantized
    /// * `Some(notes)` - Ascending notes (empty when the range holds none)
    pub fn enumerate_available_notes(&self, min_freq: f64, max_freq: f64) -> Option<Vec<Note>> {
        let lower = self.quantize(min_freq, Direction::Up)?;
        let upper = self.quantize(max_freq, Direction::Down)?;

        let notes = self.scale.notes();
        let steps = self.scale.steps_per_equave();
        let equave_cents = self.scale.equave_cents();

        let mut available = Vec::new();
        let (mut degree, mut equave) = (lower.degree, lower.equave);
        loop {
            let cents = notes[degree].cents + equave as f64 * equave_cents;
            if cents > upper.cents + CENTS_EPSILON {
                break;
            }
            available.push(Note {
                name: notes[degree].name.clone(),
                cents,
            });
            degree += 1;
            if degree >= steps {
                degree = 0;
                equave += 1;
            }
        }
        Some(available)
    }
}
