//! # Exercise Session
//!
//! Drives an exercise through its three phases:
//!
//! ```text
//! Setup --configure--> Active --end / question budget spent--> Finished
//!   ^                                                             |
//!   +------------------------back_to_setup-----------------------+
//! ```
//!
//! Configuring is allowed from Setup or Finished, never mid-exercise. A
//! rejected configuration leaves the session exactly as it was.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::ScaleCatalog;
use crate::config::ExerciseOptions;
use crate::error::{ConfigError, GenerationError};
use crate::exercise::{AnswerTally, IntervalExerciseGenerator, IntervalQuestion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExercisePhase {
    Setup,
    Active,
    Finished,
}

/// Results of a session so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub asked: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub tallies: BTreeMap<String, AnswerTally>,
}

#[derive(Debug)]
pub struct ExerciseSession<R: Rng> {
    phase: ExercisePhase,
    options: ExerciseOptions,
    generator: Option<IntervalExerciseGenerator<R>>,
    asked: usize,
}

impl<R: Rng> Default for ExerciseSession<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ExerciseSession<R> {
    pub fn new() -> Self {
        Self {
            phase: ExercisePhase::Setup,
            options: ExerciseOptions::default(),
            generator: None,
            asked: 0,
        }
    }

    pub fn phase(&self) -> ExercisePhase {
        self.phase
    }

    pub fn options(&self) -> &ExerciseOptions {
        &self.options
    }

    pub fn generator(&self) -> Option<&IntervalExerciseGenerator<R>> {
        self.generator.as_ref()
    }

    pub fn current(&self) -> Option<&IntervalQuestion> {
        self.generator.as_ref()?.current()
    }

    /// Questions left before the session finishes, `None` in infinite mode.
    pub fn remaining(&self) -> Option<usize> {
        (!self.options.infinite_mode).then(|| self.options.num_questions.saturating_sub(self.asked))
    }

    /// Starts a new exercise with `options`.
    ///
    /// # Returns
    /// * `Err(ConfigError::ExerciseInProgress)` - The session is active; end it first
    /// * `Err(ConfigError)` - The options were rejected and the session is unchanged
    pub fn configure(
        &mut self,
        catalog: &ScaleCatalog,
        options: ExerciseOptions,
        rng: R,
    ) -> Result<(), ConfigError> {
        if self.phase == ExercisePhase::Active {
            return Err(ConfigError::ExerciseInProgress);
        }
        let generator = IntervalExerciseGenerator::configure(catalog, &options, rng)?;
        self.generator = Some(generator);
        self.options = options;
        self.asked = 0;
        self.phase = ExercisePhase::Active;
        Ok(())
    }

    /// Moves on to the next question.
    ///
    /// # Returns
    /// * `Ok(None)` - The session is not active or has just finished
    pub fn advance(&mut self) -> Result<Option<&IntervalQuestion>, GenerationError> {
        if self.phase != ExercisePhase::Active {
            return Ok(None);
        }
        if self.budget_spent() {
            self.finish();
            return Ok(None);
        }
        let Some(generator) = self.generator.as_mut() else {
            return Ok(None);
        };
        let question = generator.next_interval()?;
        self.asked += 1;
        Ok(Some(question))
    }

    /// Checks an answer to the current question.
    ///
    /// Answering the last question of a limited session finishes it.
    pub fn record_answer(&mut self, answer: &str) -> Option<bool> {
        if self.phase != ExercisePhase::Active {
            return None;
        }
        let correct = self.generator.as_mut()?.record_answer(answer)?;
        if self.budget_spent() {
            self.finish();
        }
        Some(correct)
    }

    /// Stops the exercise early.
    pub fn end(&mut self) {
        if self.phase == ExercisePhase::Active {
            self.finish();
        }
    }

    /// Returns to setup, keeping the last options.
    pub fn back_to_setup(&mut self) {
        self.generator = None;
        self.asked = 0;
        self.phase = ExercisePhase::Setup;
    }

    pub fn summary(&self) -> SessionSummary {
        let Some(generator) = &self.generator else {
            return SessionSummary::default();
        };
        let totals = generator.totals();
        SessionSummary {
            asked: self.asked,
            correct: totals.correct,
            incorrect: totals.incorrect,
            tallies: generator.tallies().clone(),
        }
    }

    fn budget_spent(&self) -> bool {
        !self.options.infinite_mode && self.asked >= self.options.num_questions
    }

    fn finish(&mut self) {
        let summary = self.summary();
        log::info!(
            "Exercise finished: {}/{} correct",
            summary.correct,
            summary.asked
        );
        self.phase = ExercisePhase::Finished;
    }
}
