//! Abacus Report Generation
//!
//! This crate turns accumulated practice statistics into a progress report.
//! Reports can be serialized to JSON for programmatic access or rendered to
//! Markdown for a parent or teacher to read.
//!
//! The crate does not depend on the tutor: callers feed it plain
//! [`TopicInput`] and [`DivisionInput`] values.
//!
//! # Types
//!
//! - [`ProgressReport`] - The complete report
//! - [`ReportSummary`] - Totals across all topics
//! - [`TopicReport`] - One practised topic
//! - [`DivisionReport`] - Long-division statistics
//!
//! # Generators
//!
//! - [`json::JsonGenerator`] - Generate JSON reports with compact or pretty formatting
//! - [`MarkdownGenerator`] - Generate human-readable Markdown reports
//!
//! # Example
//!
//! ```rust
//! use abacus_report::{DivisionInput, ProgressReport, TopicInput};
//! use abacus_report::json::JsonGenerator;
//!
//! let report = ProgressReport::builder()
//!     .learner("Sam")
//!     .topic(TopicInput::new("rounding", 8, 6, 4))
//!     .division(DivisionInput {
//!         problems_completed: 2,
//!         steps_answered: 20,
//!         mistakes: 3,
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(report.summary.total_attempts, 8);
//!
//! let json = JsonGenerator::new(&report).generate_pretty().unwrap();
//! ```

pub mod json;
mod markdown;

pub use markdown::MarkdownGenerator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to serialize the report to JSON.
    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to read or write report files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid report data.
    #[error("invalid report data: {0}")]
    InvalidData(String),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

// ============================================================================
// Inputs
// ============================================================================

/// Practice statistics for one topic, as collected by the tutor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicInput {
    /// Topic identifier, e.g. `place_value`.
    pub topic: String,
    /// Answers checked.
    pub attempts: u32,
    /// Correct answers.
    pub correct: u32,
    /// Longest run of correct answers.
    pub best_streak: u32,
}

impl TopicInput {
    /// Creates a topic input.
    pub fn new(topic: impl Into<String>, attempts: u32, correct: u32, best_streak: u32) -> Self {
        Self {
            topic: topic.into(),
            attempts,
            correct,
            best_streak,
        }
    }
}

/// Long-division statistics, as collected by the tutor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionInput {
    /// Problems finished in practice mode.
    pub problems_completed: u32,
    /// Step answers checked.
    pub steps_answered: u32,
    /// Wrong step answers.
    pub mistakes: u32,
}

/// Fraction of `correct` over `attempts`, or `0.0` with no attempts.
#[must_use]
pub fn accuracy(correct: u32, attempts: u32) -> f64 {
    if attempts == 0 {
        0.0
    } else {
        f64::from(correct) / f64::from(attempts)
    }
}

// ============================================================================
// Report
// ============================================================================

/// Complete progress report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    /// Name of the learner, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learner: Option<String>,

    /// When the report was generated.
    pub generated_at: DateTime<Utc>,

    /// Totals across all topics.
    pub summary: ReportSummary,

    /// Practised topics, in the order they were added.
    pub topics: Vec<TopicReport>,

    /// Long-division statistics.
    pub division: DivisionReport,
}

impl Default for ProgressReport {
    fn default() -> Self {
        Self {
            learner: None,
            generated_at: Utc::now(),
            summary: ReportSummary::default(),
            topics: Vec::new(),
            division: DivisionReport::default(),
        }
    }
}

impl ProgressReport {
    /// Creates a new report builder.
    #[must_use]
    pub fn builder() -> ReportBuilder {
        ReportBuilder::default()
    }

    /// Serializes the report to JSON.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Serialization` if JSON serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(ReportError::from)
    }

    /// Returns `true` if nothing has been practised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty() && self.division.steps_answered == 0
    }

    /// Returns the topic with the lowest accuracy, if any was attempted.
    #[must_use]
    pub fn weakest_topic(&self) -> Option<&TopicReport> {
        self.topics
            .iter()
            .filter(|t| t.attempts > 0)
            .min_by(|a, b| a.accuracy.total_cmp(&b.accuracy))
    }
}

/// Totals across all practised topics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    /// Number of topics with at least one answer.
    pub topics_practised: usize,
    /// Answers checked across all topics.
    pub total_attempts: u32,
    /// Correct answers across all topics.
    pub total_correct: u32,
    /// `total_correct / total_attempts`.
    pub overall_accuracy: f64,
    /// Best streak in any topic.
    pub best_streak: u32,
}

/// One practised topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicReport {
    /// Topic identifier.
    pub topic: String,
    /// Answers checked.
    pub attempts: u32,
    /// Correct answers.
    pub correct: u32,
    /// Longest run of correct answers.
    pub best_streak: u32,
    /// `correct / attempts`.
    pub accuracy: f64,
}

impl From<TopicInput> for TopicReport {
    fn from(input: TopicInput) -> Self {
        Self {
            accuracy: accuracy(input.correct, input.attempts),
            topic: input.topic,
            attempts: input.attempts,
            correct: input.correct,
            best_streak: input.best_streak,
        }
    }
}

/// Long-division statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionReport {
    /// Problems finished in practice mode.
    pub problems_completed: u32,
    /// Step answers checked.
    pub steps_answered: u32,
    /// Wrong step answers.
    pub mistakes: u32,
    /// Share of step answers that were right first time.
    pub accuracy: f64,
}

impl From<DivisionInput> for DivisionReport {
    fn from(input: DivisionInput) -> Self {
        Self {
            problems_completed: input.problems_completed,
            steps_answered: input.steps_answered,
            mistakes: input.mistakes,
            accuracy: accuracy(
                input.steps_answered.saturating_sub(input.mistakes),
                input.steps_answered,
            ),
        }
    }
}

// ============================================================================
// ReportBuilder
// ============================================================================

/// Builder for constructing [`ProgressReport`] instances.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    learner: Option<String>,
    generated_at: Option<DateTime<Utc>>,
    topics: Vec<TopicInput>,
    division: DivisionInput,
}

impl ReportBuilder {
    /// Sets the learner name.
    #[must_use]
    pub fn learner(mut self, name: impl Into<String>) -> Self {
        self.learner = Some(name.into());
        self
    }

    /// Overrides the generation time (defaults to now).
    #[must_use]
    pub const fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Adds a topic.
    #[must_use]
    pub fn topic(mut self, topic: TopicInput) -> Self {
        self.topics.push(topic);
        self
    }

    /// Sets all topics at once.
    #[must_use]
    pub fn topics(mut self, topics: Vec<TopicInput>) -> Self {
        self.topics = topics;
        self
    }

    /// Sets the long-division statistics.
    #[must_use]
    pub const fn division(mut self, division: DivisionInput) -> Self {
        self.division = division;
        self
    }

    /// Builds the report.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidData` if a count is inconsistent (more
    /// correct answers than attempts, a streak longer than the correct
    /// answers, or more mistakes than steps answered).
    pub fn build(self) -> Result<ProgressReport> {
        for topic in &self.topics {
            if topic.correct > topic.attempts {
                return Err(ReportError::InvalidData(format!(
                    "topic '{}' has {} correct answers but only {} attempts",
                    topic.topic, topic.correct, topic.attempts
                )));
            }
            if topic.best_streak > topic.correct {
                return Err(ReportError::InvalidData(format!(
                    "topic '{}' has a streak of {} but only {} correct answers",
                    topic.topic, topic.best_streak, topic.correct
                )));
            }
        }
        if self.division.mistakes > self.division.steps_answered {
            return Err(ReportError::InvalidData(format!(
                "division has {} mistakes but only {} steps answered",
                self.division.mistakes, self.division.steps_answered
            )));
        }

        let topics: Vec<TopicReport> = self.topics.into_iter().map(TopicReport::from).collect();

        let total_attempts = topics.iter().map(|t| t.attempts).sum();
        let total_correct = topics.iter().map(|t| t.correct).sum();
        let summary = ReportSummary {
            topics_practised: topics.iter().filter(|t| t.attempts > 0).count(),
            total_attempts,
            total_correct,
            overall_accuracy: accuracy(total_correct, total_attempts),
            best_streak: topics.iter().map(|t| t.best_streak).max().unwrap_or(0),
        };

        Ok(ProgressReport {
            learner: self.learner,
            generated_at: self.generated_at.unwrap_or_else(Utc::now),
            summary,
            topics,
            division: self.division.into(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
