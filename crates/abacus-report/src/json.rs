//! JSON report generation.
//!
//! This module provides [`JsonGenerator`] for serializing progress reports to
//! JSON. Reports can be generated as compact single-line JSON or
//! pretty-printed for human readability.
//!
//! # Example
//!
//! ```rust
//! use abacus_report::{ProgressReport, TopicInput};
//! use abacus_report::json::JsonGenerator;
//!
//! let report = ProgressReport::builder()
//!     .topic(TopicInput::new("mass", 5, 4, 3))
//!     .build()
//!     .unwrap();
//!
//! let generator = JsonGenerator::new(&report);
//!
//! // Generate compact JSON
//! let compact = generator.generate().unwrap();
//!
//! // Generate pretty-printed JSON
//! let pretty = generator.generate_pretty().unwrap();
//!
//! // Write to file
//! // generator.write_to_file(Path::new("abacus-report.json"), true).unwrap();
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::{ProgressReport, ReportError, Result};

/// JSON report generator.
///
/// Wraps a [`ProgressReport`] reference and serializes it.
///
/// # Example
///
/// ```rust
/// use abacus_report::{ProgressReport, json::JsonGenerator};
///
/// let report = ProgressReport::default();
/// let json = JsonGenerator::new(&report).generate_pretty().unwrap();
/// assert!(json.contains("generatedAt"));
/// ```
pub struct JsonGenerator<'a> {
    report: &'a ProgressReport,
}

impl<'a> JsonGenerator<'a> {
    /// Creates a new JSON generator for the given report.
    #[must_use]
    pub const fn new(report: &'a ProgressReport) -> Self {
        Self { report }
    }

    /// Generates compact JSON output (single line, no extra whitespace).
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    pub fn generate(&self) -> Result<String> {
        serde_json::to_string(self.report).map_err(ReportError::from)
    }

    /// Generates pretty-printed JSON output with 2-space indentation.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    pub fn generate_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self.report).map_err(ReportError::from)
    }

    /// Writes the JSON report to a file, creating or overwriting it.
    ///
    /// Parent directories must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    /// Returns [`ReportError::Io`] if file creation or writing fails.
    pub fn write_to_file(&self, path: &Path, pretty: bool) -> Result<()> {
        let json = if pretty {
            self.generate_pretty()?
        } else {
            self.generate()?
        };

        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}
