//! # Scale File Module
//!
//! Reads and writes the line-oriented `.scl` scale file format:
//!
//! ```text
//! ! name
//! !
//! description
//!  3
//! !
//! 9/8
//! 701.955
//! 2
//! ```
//!
//! Lines starting with `!` are comments; the first one names the scale. The
//! first purely numeric line marks the note count, and every line after it is
//! a note token: a ratio `a/b`, a bare integer `n` (the ratio `n/1`), or a
//! cents value containing a `.`. Unparsable tokens are skipped.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScalaError;
use crate::tuning::ratio_to_cents;

/// How a note token was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalaNoteKind {
    Ratio,
    Cents,
}

/// One note token together with its value in cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalaNote {
    /// The token as written, used again when serializing.
    pub text: String,
    pub cents: f64,
    pub kind: ScalaNoteKind,
}

impl ScalaNote {
    /// Parses one note token.
    ///
    /// Only the first whitespace-delimited word is read, so trailing labels
    /// ("3/2 perfect fifth") are ignored.
    ///
    /// # Returns
    /// * `None` - The token is not a ratio, an integer or a cents value, or
    ///   is a ratio broken up by spaces ("3 / 2")
    pub fn parse(input: &str) -> Option<Self> {
        let mut words = input.split_whitespace();
        let text = words.next()?;
        if text.ends_with('/') || words.next().is_some_and(|word| word.starts_with('/')) {
            return None;
        }

        let (cents, kind) = if let Some((numerator, denominator)) = text.split_once('/') {
            let numerator = parse_positive_integer(numerator)?;
            let denominator = parse_positive_integer(denominator)?;
            (ratio_to_cents(numerator, denominator), ScalaNoteKind::Ratio)
        } else if text.contains('.') {
            let cents: f64 = text.parse().ok()?;
            if !cents.is_finite() {
                return None;
            }
            (cents, ScalaNoteKind::Cents)
        } else {
            (ratio_to_cents(parse_positive_integer(text)?, 1.0), ScalaNoteKind::Ratio)
        };

        Some(Self {
            text: text.to_string(),
            cents,
            kind,
        })
    }
}

fn is_comment(line: &str) -> bool {
    line.starts_with('!')
}

fn is_number(line: &str) -> bool {
    line.parse::<f64>().is_ok_and(f64::is_finite)
}

fn parse_positive_integer(text: &str) -> Option<f64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u64 = text.parse().ok()?;
    (value > 0).then_some(value as f64)
}

/// A scale as read from (or written to) a scale file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalaScale {
    pub name: String,
    pub description: String,
    pub notes: Vec<ScalaNote>,
}

impl ScalaScale {
    /// Parses scale file content.
    ///
    /// # Arguments
    /// * `file_name` - Used as the scale name when the file has no name comment
    /// * `content` - The file's text
    ///
    /// # Returns
    /// * `Err(ScalaError::MissingNoteCount)` - No numeric note-count line was found
    pub fn parse(file_name: &str, content: &str) -> Result<Self, ScalaError> {
        let lines: Vec<&str> = content.lines().map(str::trim).collect();

        let name = lines
            .iter()
            .find(|line| is_comment(line))
            .map(|line| line[1..].trim())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| file_name.trim());
        let name = name.strip_suffix(".scl").unwrap_or(name).trim().to_string();

        let count_index = lines
            .iter()
            .position(|line| !line.is_empty() && !is_comment(line) && is_number(line))
            .ok_or(ScalaError::MissingNoteCount)?;

        let description = lines[..count_index]
            .iter()
            .find(|line| !line.is_empty() && !is_comment(line))
            .map(|line| line.to_string())
            .unwrap_or_default();

        let notes = lines[count_index + 1..]
            .iter()
            .filter(|line| !line.is_empty() && !is_comment(line))
            .filter_map(|line| {
                let note = ScalaNote::parse(line);
                if note.is_none() {
                    log::debug!("skipping invalid scale file token '{line}'");
                }
                note
            })
            .collect();

        Ok(Self {
            name,
            description,
            notes,
        })
    }

    /// File name the scale is exported under.
    pub fn file_name(&self) -> String {
        format!("{}.scl", self.name)
    }
}

impl fmt::Display for ScalaScale {
    /// Writes the scale in scale file layout.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "! {}", self.name)?;
        writeln!(f, "!")?;
        writeln!(f, "{}", self.description)?;
        writeln!(f, " {}", self.notes.len())?;
        write!(f, "!")?;
        for note in &self.notes {
            write!(f, "\n{}", note.text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MEANTONE: &str = "! meanquar.scl
!
1/4-comma meantone scale. Pietro Aaron's temperament (1523)
 12
!
 76.04900
 193.15686
 310.26371
 5/4
 503.42157
 579.47057
 696.57843
 25/16
 889.73529
 1006.84314
 1082.89214
 2/1
";

    #[test]
    fn parses_note_tokens() {
        let ratio = ScalaNote::parse("3/2").unwrap();
        assert_eq!(ratio.kind, ScalaNoteKind::Ratio);
        assert!((ratio.cents - 701.955).abs() < 1e-3);

        let cents = ScalaNote::parse(" 386.3137 ").unwrap();
        assert_eq!(cents.kind, ScalaNoteKind::Cents);
        assert_eq!(cents.text, "386.3137");

        let int = ScalaNote::parse("2").unwrap();
        assert_eq!(int.kind, ScalaNoteKind::Ratio);
        assert!((int.cents - 1200.0).abs() < 1e-9);

        let labelled = ScalaNote::parse("5/4 major third").unwrap();
        assert_eq!(labelled.text, "5/4");

        assert!(ScalaNote::parse("0").is_none());
        assert!(ScalaNote::parse("3/0").is_none());
        assert!(ScalaNote::parse("-2").is_none());
        assert!(ScalaNote::parse("abc").is_none());
        assert!(ScalaNote::parse("").is_none());
    }

    #[test]
    fn spaced_ratios_are_rejected() {
        assert!(ScalaNote::parse("3 / 2").is_none());
        assert!(ScalaNote::parse("3 /2").is_none());
        assert!(ScalaNote::parse("3/ 2").is_none());
        assert_eq!(ScalaNote::parse("2 octave").unwrap().text, "2");
    }

    #[test]
    fn parses_a_scale_file() {
        let scale = ScalaScale::parse("ignored.scl", MEANTONE).unwrap();
        assert_eq!(scale.name, "meanquar");
        assert_eq!(
            scale.description,
            "1/4-comma meantone scale. Pietro Aaron's temperament (1523)"
        );
        assert_eq!(scale.notes.len(), 12);
        assert_eq!(scale.notes[3].text, "5/4");
        assert!((scale.notes[11].cents - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn falls_back_to_file_name() {
        let scale = ScalaScale::parse("pelog.scl", "pelog\n2\n1.5\n2/1").unwrap();
        assert_eq!(scale.name, "pelog");
        assert_eq!(scale.description, "pelog");
        assert_eq!(scale.notes.len(), 2);
    }

    #[test]
    fn missing_note_count_is_an_error() {
        assert_eq!(
            ScalaScale::parse("x", "! x\n!\njust words\n"),
            Err(ScalaError::MissingNoteCount)
        );
    }

    #[test]
    fn serializes_in_file_layout() {
        let scale = ScalaScale::parse("x", "! tiny\n!\nthree notes\n 3\n!\n9/8\n701.955\n2\n").unwrap();
        assert_eq!(
            scale.to_string(),
            "! tiny\n!\nthree notes\n 3\n!\n9/8\n701.955\n2"
        );
        assert_eq!(scale.file_name(), "tiny.scl");

        let reparsed = ScalaScale::parse("x", &scale.to_string()).unwrap();
        assert_eq!(reparsed, scale);
    }
}
