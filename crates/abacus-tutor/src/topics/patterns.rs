//! Continuing an arithmetic sequence.

use rand::Rng;

use super::Problem;
use crate::answer::Answer;

/// Terms shown before the blank.
const SHOWN_TERMS: i64 = 4;

/// Asks for the next term of a rising or falling arithmetic sequence.
pub fn generate(rng: &mut impl Rng) -> Problem {
    let step: i64 = rng.gen_range(2..=12);
    let rising = rng.gen_bool(0.7);

    let (start, step) = if rising {
        (rng.gen_range(1..=30), step)
    } else {
        // Keep every term, including the answer, non-negative.
        (rng.gen_range(step * SHOWN_TERMS..=step * SHOWN_TERMS + 30), -step)
    };

    let terms: Vec<String> = (0..SHOWN_TERMS)
        .map(|i| (start + i * step).to_string())
        .collect();

    Problem::new(
        format!("What number comes next? {}, ...", terms.join(", ")),
        Answer::integer(start + SHOWN_TERMS * step),
    )
}
