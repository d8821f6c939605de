//! Comparing two proper fractions.

use rand::Rng;

use super::{comparison_symbol, Problem};
use crate::answer::Answer;

/// A proper fraction with a denominator between 2 and 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    /// Top number.
    pub numerator: u32,
    /// Bottom number.
    pub denominator: u32,
}

impl Fraction {
    fn random(rng: &mut impl Rng) -> Self {
        let denominator = rng.gen_range(2..=12);
        let numerator = rng.gen_range(1..denominator);
        Self {
            numerator,
            denominator,
        }
    }

    /// Compares by cross multiplication.
    #[must_use]
    pub fn compare(self, other: Self) -> std::cmp::Ordering {
        (self.numerator * other.denominator).cmp(&(other.numerator * self.denominator))
    }
}

impl std::fmt::Display for Fraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Asks for `<`, `>` or `=` between two fractions.
pub fn generate(rng: &mut impl Rng) -> Problem {
    let left = Fraction::random(rng);
    let right = Fraction::random(rng);

    Problem::new(
        format!("Compare {left} and {right}. Type <, > or =."),
        Answer::text(comparison_symbol(left.compare(right))),
    )
}
