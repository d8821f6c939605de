//! The lesson → practice widget shared by every quiz topic.
//!
//! A widget opens on lesson page 0. Paging past the last page (or skipping
//! the lesson) enters practice, which draws a fresh problem and tracks the
//! learner's streak until the widget is closed.
//!
//! A wrong answer is a state ([`PracticeStatus::Incorrect`]), not an error.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TutorError};
use crate::lesson::{lesson_for, Lesson, LessonPage};
use crate::topics::{self, Problem, TopicKind};

// ============================================================================
// Practice state
// ============================================================================

/// Where the learner stands on the current problem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeStatus {
    /// Waiting for an answer.
    #[default]
    Answering,
    /// Answered correctly; waiting for the next problem.
    Correct,
    /// Last answer was wrong; retry allowed.
    Incorrect,
}

impl std::fmt::Display for PracticeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Answering => write!(f, "answering"),
            Self::Correct => write!(f, "correct"),
            Self::Incorrect => write!(f, "incorrect"),
        }
    }
}

/// Result of checking one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    /// Whether the answer matched.
    pub correct: bool,
    /// The expected answer as text.
    pub expected: String,
    /// Streak after this answer.
    pub streak: u32,
    /// Best streak so far.
    pub best_streak: u32,
    /// Status after this answer.
    pub status: PracticeStatus,
}

/// Practice counters and the problem being answered.
#[derive(Debug, Clone)]
pub struct PracticeState {
    problem: Problem,
    status: PracticeStatus,
    streak: u32,
    best_streak: u32,
    attempts: u32,
    correct: u32,
}

impl PracticeState {
    /// Starts practice on `problem` with empty counters.
    #[must_use]
    pub const fn new(problem: Problem) -> Self {
        Self {
            problem,
            status: PracticeStatus::Answering,
            streak: 0,
            best_streak: 0,
            attempts: 0,
            correct: 0,
        }
    }

    /// Returns the current problem.
    #[must_use]
    pub const fn problem(&self) -> &Problem {
        &self.problem
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> PracticeStatus {
        self.status
    }

    /// Returns the current streak.
    #[must_use]
    pub const fn streak(&self) -> u32 {
        self.streak
    }

    /// Returns the best streak reached.
    #[must_use]
    pub const fn best_streak(&self) -> u32 {
        self.best_streak
    }

    /// Returns the number of answers checked.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns the number of correct answers.
    #[must_use]
    pub const fn correct(&self) -> u32 {
        self.correct
    }

    /// Checks `input` against the current problem.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::InvalidStateTransition` if the problem was already
    /// answered correctly.
    pub fn submit(&mut self, input: &str) -> Result<Feedback> {
        if self.status == PracticeStatus::Correct {
            return Err(TutorError::invalid_transition(self.status, "submit"));
        }

        self.attempts += 1;
        let correct = self.problem.answer.check(input);
        if correct {
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
            self.correct += 1;
            self.status = PracticeStatus::Correct;
        } else {
            self.streak = 0;
            self.status = PracticeStatus::Incorrect;
        }
        debug!(correct, streak = self.streak, "Practice answer checked");

        Ok(Feedback {
            correct,
            expected: self.problem.answer.display(),
            streak: self.streak,
            best_streak: self.best_streak,
            status: self.status,
        })
    }

    /// Replaces the problem. The streak carries over.
    pub fn next_problem(&mut self, problem: Problem) {
        self.problem = problem;
        self.status = PracticeStatus::Answering;
    }
}

// ============================================================================
// Widget
// ============================================================================

/// Phase of a topic widget.
#[derive(Debug, Clone)]
pub enum Phase {
    /// Reading the lesson.
    Learn {
        /// Current page index.
        page: usize,
    },
    /// Answering problems.
    Practice(PracticeState),
}

/// A quiz topic widget.
#[derive(Debug, Clone)]
pub struct TopicWidget {
    kind: TopicKind,
    lesson: Lesson,
    phase: Phase,
}

impl TopicWidget {
    /// Opens a widget on lesson page 0.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::NotFound` for topics without a quiz (long
    /// division has its own tutor).
    pub fn new(kind: TopicKind) -> Result<Self> {
        if !kind.is_quiz() {
            return Err(TutorError::not_found("Quiz topic", kind));
        }
        Ok(Self {
            kind,
            lesson: lesson_for(kind),
            phase: Phase::Learn { page: 0 },
        })
    }

    /// Returns the topic kind.
    #[must_use]
    pub const fn kind(&self) -> TopicKind {
        self.kind
    }

    /// Returns the lesson.
    #[must_use]
    pub const fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Returns the practice state once practice has started.
    #[must_use]
    pub const fn practice(&self) -> Option<&PracticeState> {
        match &self.phase {
            Phase::Practice(state) => Some(state),
            Phase::Learn { .. } => None,
        }
    }

    fn phase_name(&self) -> &'static str {
        match self.phase {
            Phase::Learn { .. } => "learn",
            Phase::Practice(_) => "practice",
        }
    }

    fn draw(&self, rng: &mut impl Rng) -> Result<Problem> {
        topics::generate(self.kind, rng).ok_or_else(|| TutorError::not_found("Quiz topic", self.kind))
    }

    /// Turns the page; the last page leads into practice.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::InvalidStateTransition` once practising.
    pub fn next_page(&mut self, rng: &mut impl Rng) -> Result<()> {
        match self.phase {
            Phase::Learn { page } if self.lesson.is_last(page) => self.start_practice(rng),
            Phase::Learn { page } => {
                self.phase = Phase::Learn { page: page + 1 };
                Ok(())
            }
            Phase::Practice(_) => Err(TutorError::invalid_transition("practice", "next_page")),
        }
    }

    /// Turns back a page; stays on page 0.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::InvalidStateTransition` once practising.
    pub fn prev_page(&mut self) -> Result<()> {
        match self.phase {
            Phase::Learn { page } => {
                self.phase = Phase::Learn {
                    page: page.saturating_sub(1),
                };
                Ok(())
            }
            Phase::Practice(_) => Err(TutorError::invalid_transition("practice", "prev_page")),
        }
    }

    /// Skips the rest of the lesson and draws the first problem.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::InvalidStateTransition` if already practising.
    pub fn start_practice(&mut self, rng: &mut impl Rng) -> Result<()> {
        if matches!(self.phase, Phase::Practice(_)) {
            return Err(TutorError::invalid_transition("practice", "practice"));
        }
        let problem = self.draw(rng)?;
        debug!(topic = %self.kind, question = %problem.question, "Practice started");
        self.phase = Phase::Practice(PracticeState::new(problem));
        Ok(())
    }

    /// Checks an answer to the current problem.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::InvalidStateTransition` outside practice or after
    /// the problem was already answered correctly.
    pub fn submit(&mut self, input: &str) -> Result<Feedback> {
        match &mut self.phase {
            Phase::Practice(state) => state.submit(input),
            Phase::Learn { .. } => Err(TutorError::invalid_transition("learn", "submit")),
        }
    }

    /// Draws the next problem.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::InvalidStateTransition` outside practice.
    pub fn next_problem(&mut self, rng: &mut impl Rng) -> Result<()> {
        if !matches!(self.phase, Phase::Practice(_)) {
            return Err(TutorError::invalid_transition(self.phase_name(), "next_problem"));
        }
        let problem = self.draw(rng)?;
        if let Phase::Practice(state) = &mut self.phase {
            state.next_problem(problem);
        }
        Ok(())
    }

    /// Returns a serializable snapshot.
    #[must_use]
    pub fn view(&self) -> WidgetView {
        let mut view = WidgetView {
            topic: self.kind,
            title: self.lesson.title,
            phase: self.phase_name(),
            page: None,
            page_count: self.lesson.len(),
            lesson_page: None,
            problem: None,
            status: None,
            streak: 0,
            best_streak: 0,
            attempts: 0,
            correct: 0,
        };
        match &self.phase {
            Phase::Learn { page } => {
                view.page = Some(*page);
                view.lesson_page = self.lesson.page(*page).copied();
            }
            Phase::Practice(state) => {
                view.problem = Some(state.problem.clone());
                view.status = Some(state.status);
                view.streak = state.streak;
                view.best_streak = state.best_streak;
                view.attempts = state.attempts;
                view.correct = state.correct;
            }
        }
        view
    }
}

/// Serializable snapshot of a [`TopicWidget`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetView {
    /// Topic kind.
    pub topic: TopicKind,
    /// Lesson title.
    pub title: &'static str,
    /// `learn` or `practice`.
    pub phase: &'static str,
    /// Current page while learning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    /// Number of lesson pages.
    pub page_count: usize,
    /// Current page content while learning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson_page: Option<LessonPage>,
    /// Current problem while practising (without its answer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<Problem>,
    /// Practice status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PracticeStatus>,
    /// Current streak.
    pub streak: u32,
    /// Best streak.
    pub best_streak: u32,
    /// Answers checked.
    pub attempts: u32,
    /// Correct answers.
    pub correct: u32,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::answer::Answer;

    fn problem(value: i64) -> Problem {
        Problem::new(format!("What is {value}?"), Answer::integer(value))
    }

    #[test]
    fn test_three_correct_gives_streak_three() {
        let mut state = PracticeState::new(problem(1));
        for n in 1..=3 {
            let feedback = state.submit(&n.to_string()).unwrap();
            assert!(feedback.correct);
            assert_eq!(feedback.streak, u32::try_from(n).unwrap());
            state.next_problem(problem(n + 1));
        }
        assert_eq!(state.streak(), 3);
        assert_eq!(state.best_streak(), 3);
    }

    #[test]
    fn test_wrong_answer_resets_streak() {
        let mut state = PracticeState::new(problem(1));
        state.submit("1").unwrap();
        state.next_problem(problem(2));
        state.submit("2").unwrap();
        state.next_problem(problem(3));

        let feedback = state.submit("4").unwrap();
        assert!(!feedback.correct);
        assert_eq!(feedback.expected, "3");
        assert_eq!(feedback.status, PracticeStatus::Incorrect);
        assert_eq!(state.streak(), 0);
        assert_eq!(state.best_streak(), 2);
    }

    #[test]
    fn test_retry_after_wrong_answer() {
        let mut state = PracticeState::new(problem(5));
        assert!(!state.submit("6").unwrap().correct);
        assert!(state.submit("5").unwrap().correct);
        assert_eq!(state.attempts(), 2);
        assert_eq!(state.correct(), 1);
    }

    #[test]
    fn test_submit_after_correct_rejected() {
        let mut state = PracticeState::new(problem(5));
        state.submit("5").unwrap();
        assert!(matches!(
            state.submit("5"),
            Err(TutorError::InvalidStateTransition { .. })
        ));
        state.next_problem(problem(6));
        assert_eq!(state.status(), PracticeStatus::Answering);
    }

    #[test]
    fn test_unparseable_input_is_incorrect() {
        let mut state = PracticeState::new(problem(5));
        let feedback = state.submit("five").unwrap();
        assert!(!feedback.correct);
    }

    #[test]
    fn test_widget_pages_into_practice() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut widget = TopicWidget::new(TopicKind::Rounding).unwrap();
        assert!(matches!(widget.phase(), Phase::Learn { page: 0 }));

        widget.next_page(&mut rng).unwrap();
        assert!(matches!(widget.phase(), Phase::Learn { page: 1 }));
        widget.prev_page().unwrap();
        widget.prev_page().unwrap();
        assert!(matches!(widget.phase(), Phase::Learn { page: 0 }));

        widget.next_page(&mut rng).unwrap();
        widget.next_page(&mut rng).unwrap();
        assert!(widget.practice().is_some());
        assert!(widget.next_page(&mut rng).is_err());
        assert!(widget.prev_page().is_err());
    }

    #[test]
    fn test_widget_start_practice_skips_lesson() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut widget = TopicWidget::new(TopicKind::Primes).unwrap();
        assert!(widget.submit("yes").is_err());
        assert!(widget.next_problem(&mut rng).is_err());

        widget.start_practice(&mut rng).unwrap();
        assert!(widget.start_practice(&mut rng).is_err());

        let answer = widget.practice().unwrap().problem().answer.display();
        let feedback = widget.submit(&answer).unwrap();
        assert!(feedback.correct);
        assert_eq!(feedback.streak, 1);

        widget.next_problem(&mut rng).unwrap();
        assert_eq!(
            widget.practice().unwrap().status(),
            PracticeStatus::Answering
        );
    }

    #[test]
    fn test_widget_rejects_long_division() {
        assert!(matches!(
            TopicWidget::new(TopicKind::LongDivision),
            Err(TutorError::NotFound { .. })
        ));
    }

    #[test]
    fn test_widget_view() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut widget = TopicWidget::new(TopicKind::Mass).unwrap();
        let json = serde_json::to_value(widget.view()).unwrap();
        assert_eq!(json["phase"], "learn");
        assert_eq!(json["page"], 0);
        assert_eq!(json["lessonPage"]["heading"], "Kilograms and grams");
        assert!(json.get("problem").is_none());

        widget.start_practice(&mut rng).unwrap();
        let json = serde_json::to_value(widget.view()).unwrap();
        assert_eq!(json["phase"], "practice");
        assert_eq!(json["status"], "answering");
        assert!(json["problem"]["question"].is_string());
        assert!(json["problem"].get("answer").is_none());
    }
}
