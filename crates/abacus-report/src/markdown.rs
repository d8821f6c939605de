//! Markdown report generation.
//!
//! This module provides the [`MarkdownGenerator`] struct for converting a
//! [`ProgressReport`] into a Markdown document for a parent or teacher. The
//! generated report includes:
//!
//! - A summary table with overall totals
//! - A per-topic table
//! - Long-division statistics
//! - A suggestion of what to practise next
//!
//! # Example
//!
//! ```rust
//! use abacus_report::{MarkdownGenerator, ProgressReport};
//!
//! let report = ProgressReport::default();
//! let markdown = MarkdownGenerator::new(&report).generate();
//! assert!(markdown.contains("# Abacus Progress Report"));
//! ```

use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::{ProgressReport, TopicReport};

/// Generates Markdown reports from progress statistics.
pub struct MarkdownGenerator<'a> {
    report: &'a ProgressReport,
}

impl<'a> MarkdownGenerator<'a> {
    /// Creates a new Markdown generator for the given report.
    #[must_use]
    pub const fn new(report: &'a ProgressReport) -> Self {
        Self { report }
    }

    /// Generates the complete Markdown report.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        self.write_title(&mut output);
        self.write_summary(&mut output);
        self.write_topics(&mut output);
        self.write_division(&mut output);
        self.write_focus(&mut output);
        self.write_footer(&mut output);

        output
    }

    /// Writes the report title.
    fn write_title(&self, output: &mut String) {
        match &self.report.learner {
            Some(name) => {
                let _ = writeln!(output, "# Abacus Progress Report: {}\n", escape_markdown(name));
            }
            None => {
                let _ = writeln!(output, "# Abacus Progress Report\n");
            }
        }
    }

    /// Writes the summary section with totals table.
    fn write_summary(&self, output: &mut String) {
        let summary = &self.report.summary;

        let _ = writeln!(output, "## Summary\n");
        let _ = writeln!(output, "| Metric | Value |");
        let _ = writeln!(output, "|--------|-------|");
        let _ = writeln!(
            output,
            "| Topics Practised | {} |",
            summary.topics_practised
        );
        let _ = writeln!(
            output,
            "| Answers | {} of {} correct ({}) |",
            summary.total_correct,
            summary.total_attempts,
            format_percent(summary.overall_accuracy)
        );
        let _ = writeln!(output, "| Best Streak | {} |", summary.best_streak);
        let _ = writeln!(output);
    }

    /// Writes the per-topic table.
    fn write_topics(&self, output: &mut String) {
        let _ = writeln!(output, "## Topics\n");

        if self.report.topics.is_empty() {
            let _ = writeln!(output, "*No topics practised yet.*\n");
            return;
        }

        let _ = writeln!(
            output,
            "| Topic | Attempts | Correct | Accuracy | Best Streak |"
        );
        let _ = writeln!(
            output,
            "|-------|----------|---------|----------|-------------|"
        );
        for topic in &self.report.topics {
            Self::write_topic_row(output, topic);
        }
        let _ = writeln!(output);
    }

    /// Writes a single topic row.
    fn write_topic_row(output: &mut String, topic: &TopicReport) {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} |",
            escape_markdown(&topic_title(&topic.topic)),
            topic.attempts,
            topic.correct,
            format_percent(topic.accuracy),
            topic.best_streak,
        );
    }

    /// Writes the long-division section.
    fn write_division(&self, output: &mut String) {
        let division = &self.report.division;

        let _ = writeln!(output, "## Long Division\n");

        if division.steps_answered == 0 {
            let _ = writeln!(output, "*No long division practised yet.*\n");
            return;
        }

        let _ = writeln!(output, "| Metric | Value |");
        let _ = writeln!(output, "|--------|-------|");
        let _ = writeln!(
            output,
            "| Problems Completed | {} |",
            division.problems_completed
        );
        let _ = writeln!(output, "| Steps Answered | {} |", division.steps_answered);
        let _ = writeln!(output, "| Mistakes | {} |", division.mistakes);
        let _ = writeln!(output, "| Accuracy | {} |", format_percent(division.accuracy));
        let _ = writeln!(output);
    }

    /// Writes a suggestion based on the weakest topic.
    fn write_focus(&self, output: &mut String) {
        let Some(weakest) = self.report.weakest_topic() else {
            return;
        };

        let _ = writeln!(output, "## Focus Next\n");
        let title = escape_markdown(&topic_title(&weakest.topic));
        if weakest.correct == weakest.attempts {
            let _ = writeln!(
                output,
                "Every practised topic is at 100%. Try a topic from the next term.\n"
            );
        } else {
            let _ = writeln!(
                output,
                "{title} has the lowest accuracy ({}). Re-read its lesson before more practice.\n",
                format_percent(weakest.accuracy)
            );
        }
    }

    /// Writes the report footer.
    fn write_footer(&self, output: &mut String) {
        let _ = writeln!(output, "---");
        let timestamp = format_timestamp(&self.report.generated_at);
        let _ = writeln!(output, "*Generated by Abacus at {timestamp}*");
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Formats a 0..=1 ratio as a whole percentage.
fn format_percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}

/// Formats a timestamp to a human-readable string.
///
/// Format: "YYYY-MM-DD HH:MM:SS UTC"
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Turns a topic identifier such as `place_value` into `Place value`.
fn topic_title(topic: &str) -> String {
    let spaced = topic.replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Escapes special Markdown characters in text.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '*' | '_' | '`' | '#' | '[' | ']' | '(' | ')' | '!' | '\\' | '<' | '>' | '|' => {
                result.push('\\');
                result.push(ch);
            }
            '\n' => result.push_str("<br>"),
            _ => result.push(ch),
        }
    }

    result
}

// ============================================================================
// Tests
// ============================================================================
