//! # Musical Tuning Module
//!
//! Note spellings of the 12-tone chromatic scale and the small amount of
//! logarithmic arithmetic shared by the rest of the crate.
//!
//! ## Features
//! - 21 spellings (naturals, sharps and flats, enharmonics included)
//! - Chromatic degree lookup with scientific octave numbering (C4 = MIDI 60)
//! - Parsing of note-name tokens such as "A4", "c#3", "Bb2" or "E♭-1"
//! - Cent deviation and ratio-to-cents calculations

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One chromatic spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NoteName {
    C,
    CSharp,
    DFlat,
    D,
    DSharp,
    EFlat,
    E,
    FFlat,
    ESharp,
    F,
    FSharp,
    GFlat,
    G,
    GSharp,
    AFlat,
    A,
    ASharp,
    BFlat,
    B,
    CFlat,
    BSharp,
}

impl NoteName {
    pub const ALL: [NoteName; 21] = [
        NoteName::C,
        NoteName::CSharp,
        NoteName::DFlat,
        NoteName::D,
        NoteName::DSharp,
        NoteName::EFlat,
        NoteName::E,
        NoteName::FFlat,
        NoteName::ESharp,
        NoteName::F,
        NoteName::FSharp,
        NoteName::GFlat,
        NoteName::G,
        NoteName::GSharp,
        NoteName::AFlat,
        NoteName::A,
        NoteName::ASharp,
        NoteName::BFlat,
        NoteName::B,
        NoteName::CFlat,
        NoteName::BSharp,
    ];

    /// Semitones above the C of the same octave number.
    ///
    /// C♭ and B♯ take the pitch class they sound as (11 and 0) without
    /// moving the octave number, so C♭4 sounds as B4 and B♯4 as C4.
    pub fn chromatic_degree(self) -> i32 {
        match self {
            NoteName::C => 0,
            NoteName::CSharp | NoteName::DFlat => 1,
            NoteName::D => 2,
            NoteName::DSharp | NoteName::EFlat => 3,
            NoteName::E | NoteName::FFlat => 4,
            NoteName::ESharp | NoteName::F => 5,
            NoteName::FSharp | NoteName::GFlat => 6,
            NoteName::G => 7,
            NoteName::GSharp | NoteName::AFlat => 8,
            NoteName::A => 9,
            NoteName::ASharp | NoteName::BFlat => 10,
            NoteName::B => 11,
            NoteName::CFlat => 11,
            NoteName::BSharp => 0,
        }
    }

    /// The sharp-side spelling used when naming a MIDI note number.
    pub fn from_midi_note(midi_note: i32) -> NoteName {
        SHARP_SPELLINGS[midi_note.rem_euclid(12) as usize]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::CSharp => "C♯",
            NoteName::DFlat => "D♭",
            NoteName::D => "D",
            NoteName::DSharp => "D♯",
            NoteName::EFlat => "E♭",
            NoteName::E => "E",
            NoteName::FFlat => "F♭",
            NoteName::ESharp => "E♯",
            NoteName::F => "F",
            NoteName::FSharp => "F♯",
            NoteName::GFlat => "G♭",
            NoteName::G => "G",
            NoteName::GSharp => "G♯",
            NoteName::AFlat => "A♭",
            NoteName::A => "A",
            NoteName::ASharp => "A♯",
            NoteName::BFlat => "B♭",
            NoteName::B => "B",
            NoteName::CFlat => "C♭",
            NoteName::BSharp => "B♯",
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SHARP_SPELLINGS: [NoteName; 12] = [
    NoteName::C,
    NoteName::CSharp,
    NoteName::D,
    NoteName::DSharp,
    NoteName::E,
    NoteName::F,
    NoteName::FSharp,
    NoteName::G,
    NoteName::GSharp,
    NoteName::A,
    NoteName::ASharp,
    NoteName::B,
];

/// Static map from canonical spelling ("C♯", "B♭", ...) to note name.
static NOTE_MAP: Lazy<BTreeMap<&'static str, NoteName>> = Lazy::new(|| {
    NoteName::ALL
        .iter()
        .map(|&name| (name.as_str(), name))
        .collect()
});

/// Parses a bare spelling ("c#", "Bb", "E♭") into a note name.
///
/// The letter is case-insensitive. `#` and `♯` mark a sharp, `b`, `B` and
/// `♭` a flat.
pub fn parse_note_name(text: &str) -> Option<NoteName> {
    let mut chars = text.trim().chars();
    let letter = chars.next()?.to_ascii_uppercase();
    if !('A'..='G').contains(&letter) {
        return None;
    }

    let mut canonical = String::with_capacity(4);
    canonical.push(letter);
    match (chars.next(), chars.next()) {
        (None, _) => {}
        (Some('#' | '♯'), None) => canonical.push('♯'),
        (Some('b' | 'B' | '♭'), None) => canonical.push('♭'),
        _ => return None,
    }

    NOTE_MAP.get(canonical.as_str()).copied()
}

/// Splits a token such as "A4", "c#3" or "C-1" into its spelling and octave.
///
/// # Returns
/// * `Some((note_name, octave))` - The token was a valid spelling followed by an integer
/// * `None` - No trailing octave, or the remainder is not a recognized spelling
pub fn parse_note_name_token(text: &str) -> Option<(NoteName, i32)> {
    let text = text.trim();
    let digits_start = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;

    // A minus sign directly before the digits belongs to the octave ("C-1").
    let split = match text[..digits_start].strip_suffix('-') {
        Some(name) => name.len(),
        None => digits_start,
    };

    let (name, octave) = text.split_at(split);
    let octave: i32 = octave.parse().ok()?;
    Some((parse_note_name(name)?, octave))
}

/// Calculates the deviation from a target frequency in cents.
///
/// Cents are a logarithmic unit of pitch measurement where:
/// - 100 cents = 1 semitone
/// - 1200 cents = 1 octave
/// - Positive values indicate sharpness, negative values indicate flatness
pub fn calculate_cents_deviation(freq: f64, target_freq: f64) -> f64 {
    1200.0 * (freq / target_freq).log2()
}

/// Size in cents of the frequency ratio `numerator / denominator`.
pub fn ratio_to_cents(numerator: f64, denominator: f64) -> f64 {
    1200.0 * (numerator / denominator).log2()
}
