// microtonal-core/src/lib.rs

//! The core logic for the microtonal ear-training and tuning toolkit.
//! This crate converts between frequencies, MIDI notes and note names,
//! models arbitrary tuning systems, generates interval exercises and
//! analyzes harmonic and FM spectra. It is completely headless: sound,
//! MIDI and notation are reached through caller-supplied traits.

pub mod catalog;
pub mod config;
pub mod error;
pub mod exercise;
pub mod fm;
pub mod midi;
pub mod partials;
pub mod pitch;
pub mod playback;
pub mod quantize;
pub mod scala;
pub mod scale;
pub mod session;
pub mod tuning;

pub use catalog::ScaleCatalog;
pub use config::{ExerciseOptions, PartialSearchOptions};
pub use error::{ConfigError, GenerationError, ScalaError, ScaleError};
pub use exercise::{AnswerTally, IntervalExerciseGenerator, IntervalQuestion};
pub use fm::{FmParams, predict_fm};
pub use midi::{MicrotonalNote, MidiChannelVoice, MidiOutput};
pub use partials::{CommonFundamental, CommonPartial, common_fundamentals, common_partials};
pub use pitch::Pitch;
pub use playback::{NotationRenderer, PlaybackMode, ToneGenerator};
pub use quantize::{Direction, Note, ScaleQuantizer};
pub use scala::ScalaScale;
pub use scale::{Interval, Scale, ScaleStep};
pub use session::{ExercisePhase, ExerciseSession};
pub use tuning::NoteName;
