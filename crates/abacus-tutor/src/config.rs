//! Configuration types for the Abacus tutor.
//!
//! This module provides all configuration structures used to control the
//! tutor service: autoplay pacing, the range of random division problems,
//! session limits, problem seeding and report output.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::division::{MAX_DIVIDEND_DIGITS, MAX_DIVISOR};
use crate::error::{Result, TutorError};

/// The default config file name.
const CONFIG_FILE_NAME: &str = "abacus.json";

/// Default delay between autoplay steps in milliseconds.
const fn default_autoplay_interval_ms() -> u64 {
    1500
}

/// Default maximum number of open widget sessions.
const fn default_max_sessions() -> usize {
    256
}

/// Default output directory for reports.
fn default_output_dir() -> String {
    ".".to_string()
}

/// Default number of digits in a random dividend.
const fn default_dividend_digits() -> usize {
    3
}

/// Default smallest random divisor.
const fn default_min_divisor() -> u32 {
    2
}

/// Default largest random divisor.
const fn default_max_divisor() -> u32 {
    MAX_DIVISOR
}

/// Main configuration for the tutor service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Delay between steps when the division board plays itself.
    #[serde(default = "default_autoplay_interval_ms")]
    pub autoplay_interval_ms: u64,

    /// Range of randomly generated division problems.
    #[serde(default)]
    pub division: DivisionConfig,

    /// Maximum number of widget sessions kept open at once.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Seed for the problem generator; random when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Output directory for progress reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Which report files to write on shutdown.
    #[serde(default)]
    pub report_format: ReportFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            autoplay_interval_ms: default_autoplay_interval_ms(),
            division: DivisionConfig::default(),
            max_sessions: default_max_sessions(),
            seed: None,
            output_dir: default_output_dir(),
            report_format: ReportFormat::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `abacus.json` in the current directory. If found, loads and
    /// validates the configuration. If not found, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            TutorError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from a specific directory.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        Self::load_from_file(&config_path)
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns default configuration.
    /// If the file exists but contains invalid JSON, returns an error.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::ConfigParseError` if the file exists but contains
    /// invalid JSON or invalid enum values.
    ///
    /// Returns `TutorError::ConfigValidationError` if the configuration values
    /// are invalid (e.g., zero interval, inverted divisor range).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(TutorError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| TutorError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// Checks that:
    /// - `autoplay_interval_ms` is greater than 0
    /// - `division.dividend_digits` is between 1 and the board limit
    /// - `division.min_divisor` is at least 1 and not above `max_divisor`
    /// - `division.max_divisor` does not exceed the settings form limit
    /// - `max_sessions` is greater than 0
    /// - `output_dir` is not empty
    ///
    /// # Errors
    ///
    /// Returns `TutorError::ConfigValidationError` if any validation check fails.
    pub fn validate(&self) -> Result<()> {
        if self.autoplay_interval_ms == 0 {
            return Err(TutorError::config_validation(
                "autoplayIntervalMs must be greater than 0",
                "Set autoplayIntervalMs to at least 1 in your abacus.json",
            ));
        }

        let digits = self.division.dividend_digits;
        if digits == 0 || digits > MAX_DIVIDEND_DIGITS {
            return Err(TutorError::config_validation(
                format!("division.dividendDigits must be between 1 and {MAX_DIVIDEND_DIGITS}"),
                "Pick a dividend length the board can display",
            ));
        }

        if self.division.min_divisor == 0 {
            return Err(TutorError::config_validation(
                "division.minDivisor must be greater than 0",
                "Set division.minDivisor to at least 1 in your abacus.json",
            ));
        }

        if self.division.max_divisor > MAX_DIVISOR {
            return Err(TutorError::config_validation(
                format!("division.maxDivisor must not exceed {MAX_DIVISOR}"),
                "Long division practice uses single-digit divisors",
            ));
        }

        if self.division.min_divisor > self.division.max_divisor {
            return Err(TutorError::config_validation(
                "division.minDivisor must not exceed division.maxDivisor",
                "Swap the two values in your abacus.json",
            ));
        }

        if self.max_sessions == 0 {
            return Err(TutorError::config_validation(
                "maxSessions must be greater than 0",
                "Set maxSessions to at least 1 in your abacus.json",
            ));
        }

        if self.output_dir.trim().is_empty() {
            return Err(TutorError::config_validation(
                "outputDir must not be empty",
                "Provide a valid output directory path in your abacus.json (use '.' for current directory)",
            ));
        }

        Ok(())
    }
}

/// Range of randomly generated long-division problems.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionConfig {
    /// Number of digits in a random dividend.
    #[serde(default = "default_dividend_digits")]
    pub dividend_digits: usize,

    /// Smallest random divisor.
    #[serde(default = "default_min_divisor")]
    pub min_divisor: u32,

    /// Largest random divisor, and the largest divisor the settings accept.
    #[serde(default = "default_max_divisor")]
    pub max_divisor: u32,
}

impl Default for DivisionConfig {
    fn default() -> Self {
        Self {
            dividend_digits: default_dividend_digits(),
            min_divisor: default_min_divisor(),
            max_divisor: default_max_divisor(),
        }
    }
}

/// Which report files the CLI writes on shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Markdown only.
    Markdown,
    /// JSON only.
    Json,
    /// Both Markdown and JSON (default).
    #[default]
    Both,
}

impl ReportFormat {
    /// Parses a string into a `ReportFormat`, case-insensitively.
    fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Some(Self::Markdown),
            "json" => Some(Self::Json),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    /// Returns `true` if a Markdown report should be written.
    #[must_use]
    pub const fn wants_markdown(self) -> bool {
        matches!(self, Self::Markdown | Self::Both)
    }

    /// Returns `true` if a JSON report should be written.
    #[must_use]
    pub const fn wants_json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }
}

impl<'de> Deserialize<'de> for ReportFormat {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str_case_insensitive(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid report format '{s}': expected one of 'markdown', 'json', 'both'"
            ))
        })
    }
}

impl Serialize for ReportFormat {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let s = match self {
            Self::Markdown => "markdown",
            Self::Json => "json",
            Self::Both => "both",
        };
        serializer.serialize_str(s)
    }
}
