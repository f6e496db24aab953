//! # Pitch Conversion Module
//!
//! Pure conversions between the three equivalent views of a pitch:
//! frequency in Hz, fractional MIDI note number, and note name + octave +
//! detune in cents. Absolute "cents" positions used by the scale code are
//! MIDI note numbers scaled by 100 (MIDI 0 sits at 0 cents).
//!
//! ## Conversion Laws
//! - `midi_to_freq(m) = 440 · 2^((m - 69) / 12)`
//! - `freq_to_midi(f) = 69 + 12 · log2(f / 440)`
//! - MIDI 60 is C4

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tuning::{self, NoteName};

/// Reference pitch A4 in Hz.
pub const A4_FREQ: f64 = 440.0;
/// MIDI note number of A4.
pub const A4_MIDI: f64 = 69.0;

pub fn midi_to_freq(midi_note: f64) -> f64 {
    A4_FREQ * 2.0_f64.powf((midi_note - A4_MIDI) / 12.0)
}

pub fn freq_to_midi(freq: f64) -> f64 {
    A4_MIDI + 12.0 * (freq / A4_FREQ).log2()
}

/// Frequency of an absolute cents position (MIDI note × 100).
pub fn cents_to_freq(cents: f64) -> f64 {
    midi_to_freq(cents * 0.01)
}

/// Absolute cents position (MIDI note × 100) of a frequency.
pub fn freq_to_cents(freq: f64) -> f64 {
    freq_to_midi(freq) * 100.0
}

/// A single pitch seen as frequency, MIDI note and spelled note at once.
///
/// `freq`, `midi_note` and `(note_name, octave, detune_cents)` always agree.
/// `id` is an opaque label for callers (for example a renderer hit-test) and
/// is never inspected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pitch {
    pub freq: f64,
    pub midi_note: f64,
    pub note_name: NoteName,
    pub octave: i32,
    pub detune_cents: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplitude: Option<f64>,
}

impl Pitch {
    /// Names the nearest 12-tone note of a frequency.
    ///
    /// The residual is reported as `detune_cents` in the range (-50, 50].
    ///
    /// # Returns
    /// * `None` - The frequency is zero, negative or not finite
    pub fn from_freq(freq: f64) -> Option<Self> {
        if !(freq.is_finite() && freq > 0.0) {
            return None;
        }
        let midi_note = freq_to_midi(freq);
        // Round half down so an exact quarter-tone reads as +50, not -50.
        let rounded = (midi_note - 0.5).ceil();
        let rounded_int = rounded as i32;

        Some(Self {
            freq,
            midi_note,
            note_name: NoteName::from_midi_note(rounded_int),
            octave: rounded_int.div_euclid(12) - 1,
            detune_cents: (midi_note - rounded) * 100.0,
            id: None,
            amplitude: None,
        })
    }

    /// Builds a pitch from a (possibly fractional) MIDI note number.
    pub fn from_midi_note(midi_note: f64) -> Option<Self> {
        Self::from_freq(midi_to_freq(midi_note))
    }

    /// Builds a pitch from a spelled note, keeping the given spelling.
    pub fn from_note_name_and_cents(note_name: NoteName, octave: i32, detune_cents: f64) -> Self {
        let midi_note = f64::from(note_name.chromatic_degree())
            + 12.0 * (f64::from(octave) + 1.0)
            + detune_cents * 0.01;
        Self {
            freq: midi_to_freq(midi_note),
            midi_note,
            note_name,
            octave,
            detune_cents,
            id: None,
            amplitude: None,
        }
    }

    /// Parses a token such as "C#4" and applies `detune_cents` on top.
    ///
    /// # Returns
    /// * `None` - The token is not a spelling followed by an octave number,
    ///   or the octave is too far out for a finite positive frequency
    pub fn from_note_string(text: &str, detune_cents: f64) -> Option<Self> {
        let (note_name, octave) = tuning::parse_note_name_token(text)?;
        let pitch = Self::from_note_name_and_cents(note_name, octave, detune_cents);
        (pitch.freq.is_finite() && pitch.freq > 0.0).then_some(pitch)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = Some(amplitude.clamp(0.0, 1.0));
        self
    }

    /// Absolute cents position of this pitch.
    pub fn cents(&self) -> f64 {
        self.midi_note * 100.0
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} Hz ({}{} {:+.1}¢)",
            self.freq, self.note_name, self.octave, self.detune_cents
        )
    }
}
