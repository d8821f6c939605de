//! The long-division tutor state machine.
//!
//! A [`DivisionTutor`] owns one problem and its immutable step sequence. In
//! learn mode the cursor moves freely (optionally driven by autoplay); in
//! practice mode it only moves forward, one correct answer at a time.
//!
//! Every change to the cursor, mode or playback bumps the timer generation so
//! that a pending autoplay tick armed before the change can tell it is stale.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::answer::parse_integer;
use crate::board::{project, Board, Mode};
use crate::division::{DivisionProblem, Step, StepKind};
use crate::error::{Result, TutorError};

/// Outcome of a practice submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepCheck {
    /// Whether the answer matched.
    pub correct: bool,
    /// The kind of step that was answered.
    pub step: StepKind,
    /// The expected answer text.
    pub expected: String,
    /// Cursor after the submission.
    pub cursor: usize,
    /// Whether the problem is now finished.
    pub complete: bool,
    /// Consecutive correct answers after the submission.
    pub streak: u32,
}

/// Serializable snapshot of a tutor, returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorView {
    /// The problem, e.g. "532 ÷ 4".
    pub problem: String,
    /// The dividend.
    pub dividend: u64,
    /// The divisor.
    pub divisor: u32,
    /// Current mode.
    pub mode: Mode,
    /// Current step index.
    pub cursor: usize,
    /// Total number of steps, including `Finish`.
    pub step_count: usize,
    /// The step under the cursor.
    pub step: Option<Step>,
    /// Instruction for the step under the cursor.
    pub prompt: String,
    /// Whether the last practice answer was wrong.
    pub error: bool,
    /// Pending practice input.
    pub input: String,
    /// Whether autoplay is running.
    pub autoplay: bool,
    /// Whether the cursor has reached `Finish`.
    pub complete: bool,
    /// Consecutive correct practice answers.
    pub streak: u32,
    /// Longest streak since the tutor was opened.
    pub best_streak: u32,
    /// The projected board.
    pub board: Board,
}

/// Tutor for one long-division problem.
#[derive(Debug, Clone)]
pub struct DivisionTutor {
    problem: DivisionProblem,
    steps: Vec<Step>,
    mode: Mode,
    cursor: usize,
    error: bool,
    input: String,
    autoplay: bool,
    timer_generation: u64,
    streak: u32,
    best_streak: u32,
}

impl DivisionTutor {
    /// Creates a tutor in learn mode at step 0.
    #[must_use]
    pub fn new(problem: DivisionProblem) -> Self {
        Self {
            steps: problem.steps(),
            problem,
            mode: Mode::Learn,
            cursor: 0,
            error: false,
            input: String::new(),
            autoplay: false,
            timer_generation: 0,
            streak: 0,
            best_streak: 0,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Returns the current problem.
    #[must_use]
    pub const fn problem(&self) -> &DivisionProblem {
        &self.problem
    }

    /// Returns the step sequence.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns the current mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the cursor.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the step under the cursor.
    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.cursor)
    }

    /// Returns `true` if the last practice answer was wrong.
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.error
    }

    /// Returns the pending practice input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns `true` while autoplay is running.
    #[must_use]
    pub const fn is_autoplaying(&self) -> bool {
        self.autoplay
    }

    /// Returns the number of consecutive correct practice answers.
    ///
    /// The streak survives resets and new problems; only a wrong answer
    /// clears it.
    #[must_use]
    pub const fn streak(&self) -> u32 {
        self.streak
    }

    /// Returns the longest streak since the tutor was opened.
    #[must_use]
    pub const fn best_streak(&self) -> u32 {
        self.best_streak
    }

    /// Returns the timer generation.
    #[must_use]
    pub const fn timer_generation(&self) -> u64 {
        self.timer_generation
    }

    /// Returns `true` once the cursor sits on `Finish`.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cursor == self.last_index()
    }

    fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    fn first_interactive(&self) -> usize {
        self.steps
            .iter()
            .position(Step::is_interactive)
            .unwrap_or(0)
    }

    fn start_cursor(&self) -> usize {
        match self.mode {
            Mode::Learn => 0,
            Mode::Practice => self.first_interactive(),
        }
    }

    fn bump(&mut self) {
        self.timer_generation = self.timer_generation.wrapping_add(1);
    }

    fn require_mode(&self, mode: Mode, action: &str) -> Result<()> {
        if self.mode == mode {
            Ok(())
        } else {
            Err(TutorError::invalid_transition(self.mode, action))
        }
    }

    // ------------------------------------------------------------------------
    // Problem lifecycle
    // ------------------------------------------------------------------------

    /// Replaces the problem, regenerating the steps and stopping autoplay.
    ///
    /// The mode is kept; the cursor returns to the mode's first step.
    pub fn new_problem(&mut self, problem: DivisionProblem) {
        info!(problem = %problem, "New division problem");
        self.problem = problem;
        self.steps = problem.steps();
        self.rewind();
    }

    /// Rewinds to the start without changing the problem.
    pub fn reset(&mut self) {
        debug!(problem = %self.problem, "Resetting division tutor");
        self.rewind();
    }

    fn rewind(&mut self) {
        self.cursor = self.start_cursor();
        self.error = false;
        self.input.clear();
        self.autoplay = false;
        self.bump();
    }

    /// Switches mode.
    ///
    /// Practice starts on the first interactive step; learn starts at 0.
    /// Both cancel autoplay and clear any pending input.
    pub fn set_mode(&mut self, mode: Mode) {
        info!(from = %self.mode, to = %mode, "Division mode change");
        self.mode = mode;
        self.rewind();
    }

    // ------------------------------------------------------------------------
    // Learn mode
    // ------------------------------------------------------------------------

    /// Moves one step forward; stays put on the last step.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::InvalidStateTransition` in practice mode.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<usize> {
        self.require_mode(Mode::Learn, "next")?;
        self.cursor = (self.cursor + 1).min(self.last_index());
        self.bump();
        Ok(self.cursor)
    }

    /// Moves one step back; stays put on step 0.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::InvalidStateTransition` in practice mode.
    pub fn prev(&mut self) -> Result<usize> {
        self.require_mode(Mode::Learn, "prev")?;
        self.cursor = self.cursor.saturating_sub(1);
        self.bump();
        Ok(self.cursor)
    }

    /// Jumps to `index`, clamped to the step range.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::InvalidStateTransition` in practice mode.
    pub fn jump(&mut self, index: usize) -> Result<usize> {
        self.require_mode(Mode::Learn, "jump")?;
        self.cursor = index.min(self.last_index());
        self.bump();
        Ok(self.cursor)
    }

    /// Starts or stops autoplay.
    ///
    /// Starting on the last step is a no-op that leaves autoplay off.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::InvalidStateTransition` when enabling in practice
    /// mode.
    pub fn set_autoplay(&mut self, enabled: bool) -> Result<bool> {
        if enabled {
            self.require_mode(Mode::Learn, "autoplay")?;
        }
        self.autoplay = enabled && !self.is_complete();
        self.bump();
        Ok(self.autoplay)
    }

    /// Advances one step on behalf of the autoplay timer.
    ///
    /// Returns `true` if the cursor moved. Reaching the last step turns
    /// autoplay off.
    pub fn tick(&mut self) -> bool {
        if !self.autoplay || self.mode != Mode::Learn {
            self.autoplay = false;
            return false;
        }
        let moved = self.cursor < self.last_index();
        if moved {
            self.cursor += 1;
        }
        if self.is_complete() {
            self.autoplay = false;
        }
        self.bump();
        moved
    }

    // ------------------------------------------------------------------------
    // Practice mode
    // ------------------------------------------------------------------------

    /// Stores pending input for the current step.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::InvalidStateTransition` outside practice mode.
    pub fn set_input(&mut self, text: impl Into<String>) -> Result<()> {
        self.require_mode(Mode::Practice, "input")?;
        self.input = text.into();
        Ok(())
    }

    /// Checks an answer for the current step.
    ///
    /// A correct answer advances the cursor and clears the error flag and
    /// input; an incorrect one sets the error flag and keeps the cursor.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::InvalidStateTransition` outside practice mode or
    /// once the problem is complete.
    pub fn submit(&mut self, text: &str) -> Result<StepCheck> {
        self.require_mode(Mode::Practice, "submit")?;

        let Some(step) = self.steps.get(self.cursor).filter(|s| s.is_interactive()) else {
            return Err(TutorError::invalid_transition("complete", "submit"));
        };
        let kind = step.kind();
        let expected = step.expected_answer().unwrap_or_default().to_string();

        let correct = parse_integer(text)
            .is_some_and(|given| Some(given) == parse_integer(&expected));

        if correct {
            self.streak = self.streak.saturating_add(1);
            self.best_streak = self.best_streak.max(self.streak);
            self.cursor = (self.cursor + 1).min(self.last_index());
            self.error = false;
            self.input.clear();
            if self.is_complete() {
                info!(problem = %self.problem, "Division problem completed");
            }
            self.bump();
        } else {
            self.streak = 0;
            self.error = true;
            self.input = text.to_string();
            debug!(step = %kind, given = %text, expected = %expected, "Incorrect division answer");
        }

        Ok(StepCheck {
            correct,
            step: kind,
            expected,
            cursor: self.cursor,
            complete: self.is_complete(),
            streak: self.streak,
        })
    }

    // ------------------------------------------------------------------------
    // Projection
    // ------------------------------------------------------------------------

    /// Projects the current state onto a board.
    #[must_use]
    pub fn board(&self) -> Board {
        project(&self.steps, self.cursor, self.mode)
    }

    /// Returns a serializable snapshot.
    #[must_use]
    pub fn view(&self) -> TutorView {
        let step = self.current_step().cloned();
        TutorView {
            problem: self.problem.to_string(),
            dividend: self.problem.dividend,
            divisor: self.problem.divisor.get(),
            mode: self.mode,
            cursor: self.cursor,
            step_count: self.steps.len(),
            prompt: step.as_ref().map(Step::prompt).unwrap_or_default(),
            step,
            error: self.error,
            input: self.input.clone(),
            autoplay: self.autoplay,
            complete: self.is_complete(),
            streak: self.streak,
            best_streak: self.best_streak,
            board: self.board(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
