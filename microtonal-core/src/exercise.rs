//! # Interval Exercise Generator
//!
//! Draws random two-note intervals from a scale for ear training, checks the
//! listener's answers and keeps per-interval tallies.
//!
//! Candidates are found by rejection sampling. Both sampling loops are
//! bounded, so an exercise whose range is too narrow for its settings ends in
//! [`GenerationError::NoValidInterval`] instead of spinning.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::ScaleCatalog;
use crate::config::ExerciseOptions;
use crate::error::{ConfigError, GenerationError};
use crate::pitch::Pitch;
use crate::playback::{NotationHints, NotationRenderer, PlaybackMode, ToneGenerator};
use crate::quantize::{Note, ScaleQuantizer};
use crate::scale::{CENTS_EPSILON, Interval, Scale};

/// First notes tried per question.
pub const MAX_NOTE_ATTEMPTS: usize = 256;
/// Interval classes tried per first note.
pub const MAX_INTERVAL_ATTEMPTS: usize = 256;

/// Lowest frequency an exercise may reach, in Hz.
pub const MIN_EXERCISE_FREQ: f64 = 20.0;
/// Highest frequency an exercise may reach, in Hz.
pub const MAX_EXERCISE_FREQ: f64 = 15000.0;

/// One generated question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalQuestion {
    /// Name of the interval class, the expected answer.
    pub name: String,
    pub first_note: Note,
    pub second_note: Note,
    pub mode: PlaybackMode,
}

impl IntervalQuestion {
    /// Frequencies in playing order.
    pub fn freqs(&self) -> [f64; 2] {
        [self.first_note.freq(), self.second_note.freq()]
    }

    /// Signed size of the interval in cents.
    pub fn span_cents(&self) -> f64 {
        self.second_note.cents - self.first_note.cents
    }

    pub fn pitches(&self) -> Vec<Pitch> {
        self.freqs().into_iter().filter_map(Pitch::from_freq).collect()
    }

    /// Both notes labelled with their equave, in playing order ("C5, G5").
    pub fn note_labels(&self, equave_cents: f64) -> String {
        format!(
            "{}, {}",
            self.first_note.label(equave_cents),
            self.second_note.label(equave_cents)
        )
    }

    pub fn play(&self, tone: &mut dyn ToneGenerator) {
        tone.play_notes(&self.freqs(), self.mode);
    }

    pub fn notate(&self, renderer: &mut dyn NotationRenderer, hints: &NotationHints) {
        renderer.render(&self.pitches(), hints);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerTally {
    pub correct: usize,
    pub incorrect: usize,
}

impl AnswerTally {
    pub fn total(&self) -> usize {
        self.correct + self.incorrect
    }

    fn record(&mut self, correct: bool) {
        if correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
    }
}

/// Generates questions for one configured exercise.
///
/// The random source is injected so tests can seed it.
#[derive(Debug, Clone)]
pub struct IntervalExerciseGenerator<R: Rng> {
    scale: Scale,
    intervals: Vec<Interval>,
    available: Vec<Note>,
    include_smaller: bool,
    include_larger: bool,
    play_arpeggio: bool,
    play_simultaneous: bool,
    rng: R,
    current: Option<IntervalQuestion>,
    answered: bool,
    tallies: BTreeMap<String, AnswerTally>,
}

impl<R: Rng> IntervalExerciseGenerator<R> {
    /// Checks the options and prepares the interval catalog.
    ///
    /// # Returns
    /// * `Err(ConfigError)` - The options cannot produce an exercise; its
    ///   `Display` text is meant for the user
    pub fn configure(
        catalog: &ScaleCatalog,
        options: &ExerciseOptions,
        rng: R,
    ) -> Result<Self, ConfigError> {
        if !options.include_smaller_than_equave && !options.include_larger_than_equave {
            return Err(ConfigError::NoIntervalTypes);
        }
        if !options.play_arpeggio && !options.play_simultaneous {
            return Err(ConfigError::NoPlaybackModes);
        }
        if !(options.min_freq >= MIN_EXERCISE_FREQ) {
            return Err(ConfigError::MinFreqTooLow);
        }
        if !(options.max_freq <= MAX_EXERCISE_FREQ) {
            return Err(ConfigError::MaxFreqTooHigh);
        }
        if options.min_freq >= options.max_freq {
            return Err(ConfigError::InvertedRange);
        }
        if options.num_questions < 1 {
            return Err(ConfigError::NoQuestions);
        }
        let scale = catalog
            .find(&options.scale_name)
            .ok_or_else(|| ConfigError::ScaleNotFound(options.scale_name.clone()))?
            .clone();

        let intervals = interval_catalog(
            &scale,
            options.include_smaller_than_equave,
            options.include_larger_than_equave,
        );
        let available = ScaleQuantizer::new(&scale)
            .enumerate_available_notes(options.min_freq, options.max_freq)
            .unwrap_or_default();
        log::info!(
            "Configured exercise on {}: {} interval classes, {} notes between {} and {} Hz",
            scale.name(),
            intervals.len(),
            available.len(),
            options.min_freq,
            options.max_freq
        );

        Ok(Self {
            scale,
            intervals,
            available,
            include_smaller: options.include_smaller_than_equave,
            include_larger: options.include_larger_than_equave,
            play_arpeggio: options.play_arpeggio,
            play_simultaneous: options.play_simultaneous,
            rng,
            current: None,
            answered: false,
            tallies: BTreeMap::new(),
        })
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    /// Interval classes questions are drawn from, ascending by size.
    pub fn interval_catalog(&self) -> &[Interval] {
        &self.intervals
    }

    /// Scale notes inside the configured frequency range, ascending.
    pub fn available_notes(&self) -> &[Note] {
        &self.available
    }

    pub fn current(&self) -> Option<&IntervalQuestion> {
        self.current.as_ref()
    }

    /// Labels of the current question's notes, revealed after answering.
    pub fn current_note_labels(&self) -> Option<String> {
        let question = self.current.as_ref()?;
        Some(question.note_labels(self.scale.equave_cents()))
    }

    /// Draws a new question and makes it the current one.
    pub fn next_interval(&mut self) -> Result<&IntervalQuestion, GenerationError> {
        let question = match self.generate() {
            Ok(question) => question,
            Err(e) => {
                log::warn!("Could not generate an interval: {e}");
                return Err(e);
            }
        };
        log::debug!(
            "Question: {} ({:.1} cents, {:?})",
            question.name,
            question.span_cents(),
            question.mode
        );
        self.answered = false;
        Ok(self.current.insert(question))
    }

    fn generate(&mut self) -> Result<IntervalQuestion, GenerationError> {
        let (Some(lowest), Some(highest)) = (self.available.first(), self.available.last()) else {
            return Err(GenerationError::NoAvailableNotes);
        };
        let (lowest, highest) = (lowest.cents, highest.cents);
        let equave = self.scale.equave_cents();

        for _ in 0..MAX_NOTE_ATTEMPTS {
            let direction = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let straddle = match (self.include_smaller, self.include_larger) {
                (false, true) => true,
                (true, true) => self.rng.gen_bool(0.5),
                _ => false,
            };
            let min_distance = if straddle { equave } else { 0.0 };

            let Some(first) = self.available.choose(&mut self.rng).cloned() else {
                return Err(GenerationError::NoAvailableNotes);
            };
            let distance = if direction > 0.0 {
                highest - first.cents
            } else {
                first.cents - lowest
            };
            if distance <= min_distance + CENTS_EPSILON {
                continue;
            }

            if let Some((name, second)) = self.pick_second_note(&first, direction, distance, straddle)
            {
                let mode = self.pick_mode();
                let (first_note, second_note) =
                    if !self.play_arpeggio && second.cents < first.cents {
                        (second, first)
                    } else {
                        (first, second)
                    };
                return Ok(IntervalQuestion {
                    name,
                    first_note,
                    second_note,
                    mode,
                });
            }
        }
        Err(GenerationError::NoValidInterval {
            attempts: MAX_NOTE_ATTEMPTS,
        })
    }

    /// Picks an interval class that fits within `distance` and the note it lands on.
    fn pick_second_note(
        &mut self,
        first: &Note,
        direction: f64,
        distance: f64,
        straddle: bool,
    ) -> Option<(String, Note)> {
        let equave = self.scale.equave_cents();
        let count = self
            .intervals
            .partition_point(|i| i.cents <= distance + CENTS_EPSILON);
        if count == 0 {
            return None;
        }

        for _ in 0..MAX_INTERVAL_ATTEMPTS {
            let interval = &self.intervals[self.rng.gen_range(0..count)];
            let mut span = interval.cents;
            if straddle {
                let min_equaves = if interval.cents < equave - CENTS_EPSILON { 1 } else { 0 };
                let max_equaves = ((distance - interval.cents) / equave + CENTS_EPSILON).floor() as i64;
                if max_equaves < min_equaves {
                    continue;
                }
                span += self.rng.gen_range(min_equaves..=max_equaves) as f64 * equave;
            }

            let target = first.cents + direction * span;
            match self
                .available
                .iter()
                .find(|note| (note.cents - target).abs() < CENTS_EPSILON)
            {
                Some(second) => return Some((interval.name.clone(), second.clone())),
                None => log::debug!("No scale note at {target:.3} cents, resampling"),
            }
        }
        None
    }

    fn pick_mode(&mut self) -> PlaybackMode {
        match (self.play_arpeggio, self.play_simultaneous) {
            (true, true) if self.rng.gen_bool(0.5) => PlaybackMode::Simultaneous,
            (false, true) => PlaybackMode::Simultaneous,
            _ => PlaybackMode::Arpeggio,
        }
    }

    /// Plays the current question.
    ///
    /// # Returns
    /// * `false` - There is no current question
    pub fn play_current(&self, tone: &mut dyn ToneGenerator) -> bool {
        match &self.current {
            Some(question) => {
                question.play(tone);
                true
            }
            None => false,
        }
    }

    /// Checks an answer against the current question and tallies it.
    ///
    /// With larger-than-equave questions enabled, unison and equave names are
    /// accepted for one another.
    ///
    /// # Returns
    /// * `None` - No question is waiting for an answer
    /// * `Some(correct)` - Whether the answer was right
    pub fn record_answer(&mut self, answer: &str) -> Option<bool> {
        if self.answered {
            return None;
        }
        let question = self.current.as_ref()?;
        let answer = answer.trim();
        let correct = answer == question.name
            || (self.include_larger
                && self.scale.is_equave_identity_name(answer)
                && self.scale.is_equave_identity_name(&question.name));

        self.tallies
            .entry(question.name.clone())
            .or_default()
            .record(correct);
        self.answered = true;
        Some(correct)
    }

    /// Tallies keyed by the asked interval's name.
    pub fn tallies(&self) -> &BTreeMap<String, AnswerTally> {
        &self.tallies
    }

    pub fn totals(&self) -> AnswerTally {
        self.tallies
            .values()
            .fold(AnswerTally::default(), |acc, t| AnswerTally {
                correct: acc.correct + t.correct,
                incorrect: acc.incorrect + t.incorrect,
            })
    }
}

/// Interval classes in play, ascending by size.
///
/// Larger-than-equave classes are the scale's classes shifted up by one
/// equave; the shifted unison takes the equave's name.
fn interval_catalog(scale: &Scale, include_smaller: bool, include_larger: bool) -> Vec<Interval> {
    let mut intervals = Vec::new();
    if include_smaller {
        intervals.extend(scale.intervals().iter().cloned());
    }
    if include_larger {
        let equave = scale.equave_cents();
        intervals.extend(scale.intervals().iter().map(|interval| {
            let name = if interval.cents.abs() < CENTS_EPSILON {
                scale.equave_name().to_string()
            } else {
                interval.name.clone()
            };
            Interval::new(name, interval.cents + equave)
        }));
    }
    intervals.sort_by(|a, b| a.cents.total_cmp(&b.cents));
    intervals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::tone_channel;
    use crate::playback::ToneRequest;
    use crate::scale::ScaleStep;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn fifths_catalog() -> ScaleCatalog {
        let scale = Scale::new(
            "fifths",
            vec![
                ScaleStep::new("C", 0.0),
                ScaleStep::new("G", 700.0),
                ScaleStep::new("C", 1200.0),
            ],
            vec![
                Interval::new("unison", 0.0),
                Interval::new("fourth", 500.0),
                Interval::new("fifth", 700.0),
                Interval::new("octave", 1200.0),
            ],
        )
        .unwrap();
        ScaleCatalog::new(vec![scale])
    }

    fn options(min_freq: f64, max_freq: f64) -> ExerciseOptions {
        ExerciseOptions {
            scale_name: "fifths".to_string(),
            min_freq,
            max_freq,
            ..ExerciseOptions::default()
        }
    }

    fn make_generator(options: &ExerciseOptions, seed: u64) -> IntervalExerciseGenerator<Pcg32> {
        IntervalExerciseGenerator::configure(&fifths_catalog(), options, Pcg32::seed_from_u64(seed))
            .unwrap()
    }

    #[test]
    fn notes_stay_inside_the_range() {
        let mut generator = make_generator(&options(220.0, 880.0), 7);
        for _ in 0..1000 {
            let question = generator.next_interval().unwrap();
            for freq in question.freqs() {
                assert!((220.0..=880.0).contains(&freq), "{freq} Hz out of range");
            }
        }
    }

    #[test]
    fn larger_only_questions_span_at_least_an_equave() {
        let mut opts = options(220.0, 880.0);
        opts.include_smaller_than_equave = false;
        opts.include_larger_than_equave = true;
        let mut generator = make_generator(&opts, 11);

        let names: Vec<&str> = generator
            .interval_catalog()
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["octave", "fourth", "fifth", "octave"]);

        for _ in 0..200 {
            let question = generator.next_interval().unwrap();
            assert!(question.span_cents().abs() >= 1200.0 - 1e-6);
        }
    }

    #[test]
    fn simultaneous_only_orders_notes_upward() {
        let mut opts = options(220.0, 880.0);
        opts.play_arpeggio = false;
        let mut generator = make_generator(&opts, 3);
        for _ in 0..200 {
            let question = generator.next_interval().unwrap();
            assert_eq!(question.mode, PlaybackMode::Simultaneous);
            assert!(question.first_note.cents <= question.second_note.cents);
        }
    }

    #[test]
    fn rejects_bad_configurations() {
        let catalog = fifths_catalog();
        let check = |opts: ExerciseOptions| {
            IntervalExerciseGenerator::configure(&catalog, &opts, Pcg32::seed_from_u64(0))
                .err()
        };

        let mut opts = options(220.0, 880.0);
        opts.include_smaller_than_equave = false;
        assert_eq!(check(opts), Some(ConfigError::NoIntervalTypes));

        let mut opts = options(220.0, 880.0);
        opts.play_arpeggio = false;
        opts.play_simultaneous = false;
        assert_eq!(check(opts), Some(ConfigError::NoPlaybackModes));

        assert_eq!(check(options(10.0, 880.0)), Some(ConfigError::MinFreqTooLow));
        assert_eq!(check(options(220.0, 20000.0)), Some(ConfigError::MaxFreqTooHigh));
        assert_eq!(check(options(880.0, 220.0)), Some(ConfigError::InvertedRange));

        let mut opts = options(220.0, 880.0);
        opts.num_questions = 0;
        assert_eq!(check(opts), Some(ConfigError::NoQuestions));

        let mut opts = options(220.0, 880.0);
        opts.scale_name = "missing".to_string();
        let err = check(opts).unwrap();
        assert_eq!(err.to_string(), "Can't find requested scale.");
    }

    #[test]
    fn narrow_ranges_end_with_an_error() {
        // Only C4 fits, so no interval can be formed.
        let mut generator = make_generator(&options(250.0, 270.0), 1);
        assert_eq!(generator.available_notes().len(), 1);
        assert_eq!(
            generator.next_interval().unwrap_err(),
            GenerationError::NoValidInterval {
                attempts: MAX_NOTE_ATTEMPTS
            }
        );

        let mut generator = make_generator(&options(300.0, 350.0), 1);
        assert_eq!(
            generator.next_interval().unwrap_err(),
            GenerationError::NoAvailableNotes
        );
    }

    #[test]
    fn answers_are_checked_once_and_tallied() {
        let mut generator = make_generator(&options(220.0, 880.0), 5);
        assert_eq!(generator.record_answer("fifth"), None);

        let name = generator.next_interval().unwrap().name.clone();
        assert_eq!(generator.record_answer(&name), Some(true));
        assert_eq!(generator.record_answer(&name), None);

        generator.next_interval().unwrap();
        assert_eq!(generator.record_answer("not an interval"), Some(false));

        let totals = generator.totals();
        assert_eq!((totals.correct, totals.incorrect), (1, 1));
        assert_eq!(generator.tallies()[&name].correct, 1);
    }

    #[test]
    fn unison_and_equave_names_are_interchangeable_with_larger_intervals() {
        let mut opts = options(220.0, 880.0);
        opts.include_larger_than_equave = true;
        let mut generator = make_generator(&opts, 9);

        let mut checked = false;
        for _ in 0..500 {
            let name = generator.next_interval().unwrap().name.clone();
            if name == "octave" {
                assert_eq!(generator.record_answer("unison"), Some(true));
                checked = true;
                break;
            }
            generator.record_answer(&name);
        }
        assert!(checked);
    }

    #[test]
    fn plays_the_current_question() {
        let (mut tone, receiver) = tone_channel(4);
        let mut generator = make_generator(&options(220.0, 880.0), 2);
        assert!(!generator.play_current(&mut tone));

        let question = generator.next_interval().unwrap().clone();
        assert!(generator.play_current(&mut tone));
        assert_eq!(
            receiver.try_recv().unwrap(),
            ToneRequest::Play {
                freqs: question.freqs().to_vec(),
                mode: question.mode
            }
        );
    }

    #[test]
    fn labels_name_each_note_with_its_equave() {
        let mut generator = make_generator(&options(220.0, 880.0), 11);
        assert_eq!(generator.current_note_labels(), None);

        let question = generator.next_interval().unwrap().clone();
        let labels = generator.current_note_labels().unwrap();
        let expected: Vec<String> = [&question.first_note, &question.second_note]
            .iter()
            .map(|note| format!("{}{}", note.name, (note.cents / 1200.0 + 1e-6).floor()))
            .collect();
        assert_eq!(labels, expected.join(", "));

        let question = IntervalQuestion {
            name: "fifth".to_string(),
            first_note: Note { name: "C".to_string(), cents: 6000.0 },
            second_note: Note { name: "G".to_string(), cents: 6700.0 },
            mode: PlaybackMode::Arpeggio,
        };
        assert_eq!(question.note_labels(1200.0), "C5, G5");
    }
}
