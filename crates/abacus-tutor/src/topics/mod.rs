//! Problem generators for the quiz topics.
//!
//! Every generator is a pure function of the random source it is given, so a
//! seeded `StdRng` reproduces the same problem sequence.

use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::answer::Answer;
use crate::error::TutorError;

pub mod assessment;
pub mod comparing;
pub mod fractions;
pub mod geometry;
pub mod mass;
pub mod patterns;
pub mod place_value;
pub mod primes;
pub mod rounding;
pub mod word_problems;

// ============================================================================
// Topic kinds
// ============================================================================

/// The kind of widget a curriculum topic opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TopicKind {
    /// Value of a digit by its place.
    PlaceValue,
    /// Rounding to the nearest 10, 100 or 1000.
    Rounding,
    /// Comparing two whole numbers.
    Comparing,
    /// Comparing two proper fractions.
    Fractions,
    /// Kilogram and gram conversions.
    Mass,
    /// Recognising prime numbers.
    Primes,
    /// Continuing an arithmetic sequence.
    Patterns,
    /// Short story problems.
    WordProblems,
    /// Shapes and angles.
    Geometry,
    /// Mixed multiple-choice questions.
    Assessment,
    /// The step-by-step long-division tutor.
    LongDivision,
}

impl TopicKind {
    /// All topic kinds in curriculum order.
    pub const ALL: [Self; 11] = [
        Self::PlaceValue,
        Self::Rounding,
        Self::Comparing,
        Self::Fractions,
        Self::Mass,
        Self::Primes,
        Self::Patterns,
        Self::WordProblems,
        Self::Geometry,
        Self::Assessment,
        Self::LongDivision,
    ];

    /// Returns the snake_case identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlaceValue => "place_value",
            Self::Rounding => "rounding",
            Self::Comparing => "comparing",
            Self::Fractions => "fractions",
            Self::Mass => "mass",
            Self::Primes => "primes",
            Self::Patterns => "patterns",
            Self::WordProblems => "word_problems",
            Self::Geometry => "geometry",
            Self::Assessment => "assessment",
            Self::LongDivision => "long_division",
        }
    }

    /// Returns `true` for topics driven by the quiz practice machine.
    #[must_use]
    pub const fn is_quiz(self) -> bool {
        !matches!(self, Self::LongDivision)
    }
}

impl std::fmt::Display for TopicKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopicKind {
    type Err = TutorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| TutorError::not_found("Topic kind", s))
    }
}

impl Serialize for TopicKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TopicKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Problems
// ============================================================================

/// One generated practice problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem {
    /// The question shown to the learner.
    pub question: String,
    /// Options for multiple-choice questions; empty otherwise.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    /// Expected answer; never sent to the learner.
    #[serde(skip)]
    pub answer: Answer,
}

impl Problem {
    /// Creates a free-answer problem.
    #[must_use]
    pub fn new(question: impl Into<String>, answer: Answer) -> Self {
        Self {
            question: question.into(),
            choices: Vec::new(),
            answer,
        }
    }

    /// Attaches multiple-choice options.
    #[must_use]
    pub fn with_choices(mut self, choices: Vec<String>) -> Self {
        self.choices = choices;
        self
    }
}

/// Draws a problem for a quiz topic.
///
/// Returns `None` for [`TopicKind::LongDivision`], which has its own tutor.
pub fn generate(kind: TopicKind, rng: &mut impl Rng) -> Option<Problem> {
    let problem = match kind {
        TopicKind::PlaceValue => place_value::generate(rng),
        TopicKind::Rounding => rounding::generate(rng),
        TopicKind::Comparing => comparing::generate(rng),
        TopicKind::Fractions => fractions::generate(rng),
        TopicKind::Mass => mass::generate(rng),
        TopicKind::Primes => primes::generate(rng),
        TopicKind::Patterns => patterns::generate(rng),
        TopicKind::WordProblems => word_problems::generate(rng),
        TopicKind::Geometry => geometry::generate(rng),
        TopicKind::Assessment => assessment::generate(rng),
        TopicKind::LongDivision => return None,
    };
    Some(problem)
}

/// Formats a whole number with thousands separators (`47315` → `47,315`).
#[must_use]
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Returns `<`, `>` or `=` for the ordering of `a` against `b`.
#[must_use]
pub const fn comparison_symbol(ordering: std::cmp::Ordering) -> &'static str {
    match ordering {
        std::cmp::Ordering::Less => "<",
        std::cmp::Ordering::Greater => ">",
        std::cmp::Ordering::Equal => "=",
    }
}
