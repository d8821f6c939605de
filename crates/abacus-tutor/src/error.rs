//! Error types for the Abacus tutor.
//!
//! This module defines the error hierarchy for all tutor operations,
//! including configuration loading, division settings, curriculum lookups,
//! widget state transitions and session bookkeeping.
//!
//! A wrong answer is never an error: widgets model it as a state.

use std::path::PathBuf;

/// A specialized `Result` type for tutor operations.
pub type Result<T> = std::result::Result<T, TutorError>;

/// Errors that can occur while driving tutor widgets.
///
/// Error variants are organized by subsystem and include actionable suggestions
/// where possible to help users resolve issues.
#[derive(Debug, thiserror::Error)]
pub enum TutorError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your abacus.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Division Settings Errors
    // ========================================================================
    /// The divisor entered in the division settings is not usable.
    #[error("Invalid divisor {divisor}: {reason}\n\nSuggestion: Choose a divisor between 1 and {max}")]
    InvalidDivisor {
        /// The rejected divisor.
        divisor: u64,
        /// Why it was rejected.
        reason: String,
        /// Largest divisor the settings accept.
        max: u32,
    },

    /// The dividend entered in the division settings is too large to lay out.
    #[error("Dividend {dividend} has more than {max_digits} digits\n\nSuggestion: Use a smaller dividend")]
    DividendOutOfRange {
        /// The rejected dividend.
        dividend: u64,
        /// Maximum number of digits the board can display.
        max_digits: usize,
    },

    // ========================================================================
    // Lookup Errors
    // ========================================================================
    /// A curriculum entry or session does not exist.
    #[error("{kind} not found: '{key}'")]
    NotFound {
        /// What was being looked up (e.g. "Topic", "Session").
        kind: &'static str,
        /// The key that was not found.
        key: String,
    },

    /// The session store is full.
    #[error("Session limit reached ({max} open sessions)\n\nSuggestion: Close finished sessions or raise maxSessions in abacus.json")]
    SessionLimit {
        /// Configured maximum number of open sessions.
        max: usize,
    },

    // ========================================================================
    // State Machine Errors
    // ========================================================================
    /// Invalid state transition attempted.
    #[error("Invalid state transition: cannot go from {from} to {to}")]
    InvalidStateTransition {
        /// The current state.
        from: String,
        /// The attempted target state.
        to: String,
    },

    // ========================================================================
    // General I/O Errors
    // ========================================================================
    /// General I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TutorError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `InvalidDivisor` error.
    #[must_use]
    pub fn invalid_divisor(divisor: u64, reason: impl Into<String>, max: u32) -> Self {
        Self::InvalidDivisor {
            divisor,
            reason: reason.into(),
            max,
        }
    }

    /// Creates a new `DividendOutOfRange` error.
    #[must_use]
    pub const fn dividend_out_of_range(dividend: u64, max_digits: usize) -> Self {
        Self::DividendOutOfRange {
            dividend,
            max_digits,
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(kind: &'static str, key: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    /// Creates a new `InvalidStateTransition` error.
    #[must_use]
    pub fn invalid_transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Returns `true` if the error comes from learner-supplied input.
    ///
    /// The API reports these as `400 Bad Request`.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDivisor { .. } | Self::DividendOutOfRange { .. }
        )
    }

    /// Returns `true` if this error is fatal at startup.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigParseError { .. } | Self::ConfigValidationError { .. }
        )
    }
}
