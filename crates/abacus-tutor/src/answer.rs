//! Expected answers and learner input normalisation.
//!
//! Learners type free text. Before comparison, numeric input is stripped of
//! digit-group separators (`1,200`, `1 200`, `1_200`) and surrounding
//! whitespace; text input is compared case-insensitively.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Digit-group separators accepted in numeric answers.
static GROUP_SEPARATORS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[,_\s]").ok());

/// Tolerance for answers given in kilograms.
pub const KILOGRAM_TOLERANCE: f64 = 0.001;

/// Tolerance for answers given in grams.
pub const GRAM_TOLERANCE: f64 = 0.1;

/// The expected answer to a practice problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Answer {
    /// Exact whole number.
    Integer {
        /// Expected value.
        value: i64,
    },
    /// Decimal number compared within a tolerance.
    Decimal {
        /// Expected value.
        value: f64,
        /// Accepted absolute difference (exclusive).
        tolerance: f64,
    },
    /// Word or symbol, compared case-insensitively.
    Text {
        /// Expected text.
        value: String,
    },
}

impl Answer {
    /// Creates an integer answer.
    #[must_use]
    pub const fn integer(value: i64) -> Self {
        Self::Integer { value }
    }

    /// Creates a decimal answer with the given tolerance.
    #[must_use]
    pub const fn decimal(value: f64, tolerance: f64) -> Self {
        Self::Decimal { value, tolerance }
    }

    /// Creates a text answer.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Checks learner input against this answer.
    ///
    /// Input that cannot be parsed as a number never matches a numeric
    /// answer.
    #[must_use]
    pub fn check(&self, input: &str) -> bool {
        match self {
            Self::Integer { value } => parse_integer(input) == Some(*value),
            Self::Decimal { value, tolerance } => {
                parse_decimal(input).is_some_and(|given| (given - value).abs() < *tolerance)
            }
            Self::Text { value } => normalize_text(input) == normalize_text(value),
        }
    }

    /// Renders the answer the way it is shown after a mistake.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Integer { value } => value.to_string(),
            Self::Decimal { value, .. } => format_decimal(*value),
            Self::Text { value } => value.clone(),
        }
    }
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// Strips surrounding whitespace and digit-group separators.
#[must_use]
pub fn normalize_number(input: &str) -> String {
    let trimmed = input.trim();
    match GROUP_SEPARATORS.as_ref() {
        Some(re) => re.replace_all(trimmed, "").into_owned(),
        None => trimmed.to_string(),
    }
}

/// Parses a whole number after normalisation, so `"03"` is 3.
#[must_use]
pub fn parse_integer(input: &str) -> Option<i64> {
    normalize_number(input).parse().ok()
}

/// Parses a decimal number after normalisation.
#[must_use]
pub fn parse_decimal(input: &str) -> Option<f64> {
    normalize_number(input)
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn normalize_text(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Formats a decimal without trailing zeros (`2.500` → `2.5`, `3.0` → `3`).
#[must_use]
pub fn format_decimal(value: f64) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
