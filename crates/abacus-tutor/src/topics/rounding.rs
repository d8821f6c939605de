//! Rounding to the nearest 10, 100 or 1000.

use rand::Rng;

use super::{group_digits, Problem};
use crate::answer::Answer;

/// Rounds half up to the nearest multiple of `target`.
#[must_use]
pub const fn round_to(n: u64, target: u64) -> u64 {
    (n + target / 2) / target * target
}

/// Asks to round a 2 to 4 digit number to a place it actually has.
pub fn generate(rng: &mut impl Rng) -> Problem {
    let digits: u32 = rng.gen_range(2..=4);
    let number = rng.gen_range(10u64.pow(digits - 1)..10u64.pow(digits));
    let target = 10u64.pow(rng.gen_range(1..digits));
    let rounded = round_to(number, target);

    Problem::new(
        format!(
            "Round {} to the nearest {}.",
            group_digits(number),
            group_digits(target)
        ),
        Answer::integer(i64::try_from(rounded).unwrap_or(i64::MAX)),
    )
}
