//! Long-division step generation.
//!
//! A problem is expanded once into an immutable sequence of [`Step`]s, one
//! per elementary action of the written algorithm:
//!
//! ```text
//! Focus, Divide, Multiply, Subtract,            (first digit)
//! BringDown, Divide, Multiply, Subtract, ...    (every later digit)
//! Finish
//! ```
//!
//! Every interactive step carries the literal text the learner is expected
//! to type, so the tutor can check answers without re-deriving arithmetic.
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroU32;
//! use abacus_tutor::division::{generate_steps, Step};
//!
//! let divisor = NonZeroU32::new(5).unwrap();
//! let steps = generate_steps(17, divisor);
//! assert_eq!(steps.len(), 9);
//! assert_eq!(steps.last(), Some(&Step::Finish { quotient: 3, remainder: 2 }));
//! ```

use std::num::NonZeroU32;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::DivisionConfig;
use crate::error::{Result, TutorError};

/// Largest dividend length the board lays out.
pub const MAX_DIVIDEND_DIGITS: usize = 9;

/// Largest divisor the settings form accepts.
pub const MAX_DIVISOR: u32 = 9;

// ============================================================================
// Step
// ============================================================================

/// One atomic action of the long-division algorithm.
///
/// Columns are 0-indexed dividend digit positions, most significant first.
/// Rows follow the board layout: row 0 holds the quotient, row 1 the
/// dividend, and digit `i` writes its product on row `2i + 2` and its
/// difference on row `2i + 3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Step {
    /// The first dividend digit comes into play.
    Focus {
        /// Digit index in the dividend (always 0).
        index: usize,
        /// Value of that digit.
        value: u64,
    },
    /// The next dividend digit is appended to the running remainder.
    BringDown {
        /// The digit brought down.
        digit: u64,
        /// Remainder × 10 + digit.
        combined: u64,
        /// Dividend column the digit comes from.
        col: usize,
        /// Board row the digit is written on.
        row: usize,
        /// Expected learner input.
        answer: String,
    },
    /// The quotient digit for the current column is determined.
    Divide {
        /// The running value being divided.
        dividend: u64,
        /// The divisor.
        divisor: u32,
        /// Resulting quotient digit (0..=9).
        quotient_digit: u64,
        /// Quotient column.
        col: usize,
        /// Expected learner input.
        answer: String,
    },
    /// The quotient digit is multiplied back by the divisor.
    Multiply {
        /// Quotient digit from the preceding `Divide`.
        quotient_digit: u64,
        /// The divisor.
        divisor: u32,
        /// Quotient digit × divisor.
        product: u64,
        /// Column the product is right-aligned to.
        col: usize,
        /// Board row of the product.
        row: usize,
        /// Expected learner input.
        answer: String,
    },
    /// The product is subtracted to give the new remainder.
    Subtract {
        /// The running value.
        minuend: u64,
        /// The product being removed.
        subtrahend: u64,
        /// The new remainder.
        difference: u64,
        /// Column the difference is right-aligned to.
        col: usize,
        /// Board row of the difference.
        row: usize,
        /// Expected learner input.
        answer: String,
    },
    /// Terminal marker.
    Finish {
        /// Final quotient.
        quotient: u64,
        /// Final remainder.
        remainder: u64,
    },
}

/// Discriminant of a [`Step`], used for highlighting and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// See [`Step::Focus`].
    Focus,
    /// See [`Step::BringDown`].
    BringDown,
    /// See [`Step::Divide`].
    Divide,
    /// See [`Step::Multiply`].
    Multiply,
    /// See [`Step::Subtract`].
    Subtract,
    /// See [`Step::Finish`].
    Finish,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Focus => write!(f, "focus"),
            Self::BringDown => write!(f, "bring_down"),
            Self::Divide => write!(f, "divide"),
            Self::Multiply => write!(f, "multiply"),
            Self::Subtract => write!(f, "subtract"),
            Self::Finish => write!(f, "finish"),
        }
    }
}

impl Step {
    /// Returns the kind of this step.
    #[must_use]
    pub const fn kind(&self) -> StepKind {
        match self {
            Self::Focus { .. } => StepKind::Focus,
            Self::BringDown { .. } => StepKind::BringDown,
            Self::Divide { .. } => StepKind::Divide,
            Self::Multiply { .. } => StepKind::Multiply,
            Self::Subtract { .. } => StepKind::Subtract,
            Self::Finish { .. } => StepKind::Finish,
        }
    }

    /// Returns the text the learner must enter, if the step asks for input.
    ///
    /// `Focus` and `Finish` are narration only.
    #[must_use]
    pub fn expected_answer(&self) -> Option<&str> {
        match self {
            Self::BringDown { answer, .. }
            | Self::Divide { answer, .. }
            | Self::Multiply { answer, .. }
            | Self::Subtract { answer, .. } => Some(answer),
            Self::Focus { .. } | Self::Finish { .. } => None,
        }
    }

    /// Returns `true` if the learner has to answer this step in practice mode.
    #[must_use]
    pub const fn is_interactive(&self) -> bool {
        !matches!(self, Self::Focus { .. } | Self::Finish { .. })
    }

    /// Returns the dividend column this step works on.
    #[must_use]
    pub const fn col(&self) -> Option<usize> {
        match self {
            Self::Focus { index, .. } => Some(*index),
            Self::BringDown { col, .. }
            | Self::Divide { col, .. }
            | Self::Multiply { col, .. }
            | Self::Subtract { col, .. } => Some(*col),
            Self::Finish { .. } => None,
        }
    }

    /// Returns the instruction shown to the learner for this step.
    #[must_use]
    pub fn prompt(&self) -> String {
        match self {
            Self::Focus { value, .. } => {
                format!("Start with the first digit of the dividend: {value}.")
            }
            Self::BringDown { .. } => {
                "Bring down the next digit of the dividend. Which digit comes down?".to_string()
            }
            Self::Divide {
                dividend, divisor, ..
            } => format!("How many times does {divisor} go into {dividend}?"),
            Self::Multiply {
                quotient_digit,
                divisor,
                ..
            } => format!("Multiply {quotient_digit} × {divisor}."),
            Self::Subtract {
                minuend,
                subtrahend,
                ..
            } => format!("Subtract {minuend} − {subtrahend}."),
            Self::Finish {
                quotient,
                remainder,
            } => format!("Done! The quotient is {quotient} with remainder {remainder}."),
        }
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Expands `dividend ÷ divisor` into the full step sequence.
///
/// The result has `4 × digits(dividend)` steps followed by one `Finish`.
/// Because every running value is below `10 × divisor`, each quotient digit
/// is a single decimal digit for any non-zero divisor.
#[must_use]
pub fn generate_steps(dividend: u64, divisor: NonZeroU32) -> Vec<Step> {
    let divisor_small = divisor.get();
    let divisor_value = u64::from(divisor_small);
    let digits = digits_of(dividend);

    let mut steps = Vec::with_capacity(4 * digits.len() + 1);
    let mut remainder = 0u64;

    for (col, &digit) in digits.iter().enumerate() {
        let running = if col == 0 {
            steps.push(Step::Focus {
                index: 0,
                value: digit,
            });
            digit
        } else {
            let combined = remainder * 10 + digit;
            steps.push(Step::BringDown {
                digit,
                combined,
                col,
                row: 2 * col + 1,
                answer: digit.to_string(),
            });
            combined
        };

        let quotient_digit = running / divisor_value;
        steps.push(Step::Divide {
            dividend: running,
            divisor: divisor_small,
            quotient_digit,
            col,
            answer: quotient_digit.to_string(),
        });

        let product = quotient_digit * divisor_value;
        steps.push(Step::Multiply {
            quotient_digit,
            divisor: divisor_small,
            product,
            col,
            row: 2 * col + 2,
            answer: product.to_string(),
        });

        remainder = running - product;
        steps.push(Step::Subtract {
            minuend: running,
            subtrahend: product,
            difference: remainder,
            col,
            row: 2 * col + 3,
            answer: remainder.to_string(),
        });
    }

    steps.push(Step::Finish {
        quotient: dividend / divisor_value,
        remainder,
    });

    steps
}

/// Splits a number into its decimal digits, most significant first.
///
/// Zero is the single digit `0`.
#[must_use]
pub fn digits_of(n: u64) -> Vec<u64> {
    n.to_string()
        .bytes()
        .map(|b| u64::from(b - b'0'))
        .collect()
}

/// Number of decimal digits in `n` (1 for zero).
#[must_use]
pub fn digit_count(n: u64) -> usize {
    n.checked_ilog10().map_or(1, |log| log as usize + 1)
}

// ============================================================================
// Problems and settings
// ============================================================================

/// A validated long-division problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionProblem {
    /// The number being divided.
    pub dividend: u64,
    /// The number dividing it.
    pub divisor: NonZeroU32,
}

impl DivisionProblem {
    /// Draws a random problem from the configured range.
    ///
    /// The dividend has exactly `config.dividend_digits` digits.
    pub fn random(rng: &mut impl Rng, config: &DivisionConfig) -> Self {
        let digits = config.dividend_digits.clamp(1, MAX_DIVIDEND_DIGITS);
        // digits <= 9, so the cast cannot truncate
        #[allow(clippy::cast_possible_truncation)]
        let upper = 10u64.pow(digits as u32);
        let lower = if digits == 1 { 1 } else { upper / 10 };
        let dividend = rng.gen_range(lower..upper);

        let min = config.min_divisor.max(1);
        let max = config.max_divisor.max(min);
        let divisor = NonZeroU32::new(rng.gen_range(min..=max)).unwrap_or(NonZeroU32::MIN);

        Self { dividend, divisor }
    }

    /// Expands the problem into its step sequence.
    #[must_use]
    pub fn steps(&self) -> Vec<Step> {
        generate_steps(self.dividend, self.divisor)
    }

    /// Returns the quotient.
    #[must_use]
    pub fn quotient(&self) -> u64 {
        self.dividend / u64::from(self.divisor.get())
    }

    /// Returns the remainder.
    #[must_use]
    pub fn remainder(&self) -> u64 {
        self.dividend % u64::from(self.divisor.get())
    }
}

impl std::fmt::Display for DivisionProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ÷ {}", self.dividend, self.divisor)
    }
}

/// Raw values from the division settings form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionSettings {
    /// Requested dividend.
    pub dividend: u64,
    /// Requested divisor; may be zero until validated.
    pub divisor: u64,
}

impl DivisionSettings {
    /// Validates the form and produces a problem.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::InvalidDivisor` for a zero divisor or one above
    /// `max_divisor`, and `TutorError::DividendOutOfRange` when the dividend
    /// has more digits than the board can show.
    pub fn validate(&self, max_divisor: u32) -> Result<DivisionProblem> {
        if self.divisor == 0 {
            return Err(TutorError::invalid_divisor(
                0,
                "cannot divide by zero",
                max_divisor,
            ));
        }

        let divisor = u32::try_from(self.divisor)
            .ok()
            .filter(|d| *d <= max_divisor)
            .and_then(NonZeroU32::new)
            .ok_or_else(|| {
                TutorError::invalid_divisor(
                    self.divisor,
                    format!("divisors above {max_divisor} are not supported"),
                    max_divisor,
                )
            })?;

        if digit_count(self.dividend) > MAX_DIVIDEND_DIGITS {
            return Err(TutorError::dividend_out_of_range(
                self.dividend,
                MAX_DIVIDEND_DIGITS,
            ));
        }

        Ok(DivisionProblem {
            dividend: self.dividend,
            divisor,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
