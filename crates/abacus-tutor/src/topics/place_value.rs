//! Value of a digit by its place.

use rand::Rng;

use super::{group_digits, Problem};
use crate::answer::Answer;

const PLACE_NAMES: [&str; 6] = [
    "ones",
    "tens",
    "hundreds",
    "thousands",
    "ten thousands",
    "hundred thousands",
];

/// Asks for the value of one non-zero digit of a 4 to 6 digit number.
pub fn generate(rng: &mut impl Rng) -> Problem {
    let digits: u32 = rng.gen_range(4..=6);
    let number = rng.gen_range(10u64.pow(digits - 1)..10u64.pow(digits));

    // The leading digit is never zero, so there is always a candidate.
    let places: Vec<u32> = (0..digits)
        .filter(|place| (number / 10u64.pow(*place)) % 10 != 0)
        .collect();
    let place = places[rng.gen_range(0..places.len())];
    let digit = (number / 10u64.pow(place)) % 10;
    let value = digit * 10u64.pow(place);

    Problem::new(
        format!(
            "What is the value of the {} digit in {}?",
            PLACE_NAMES[place as usize],
            group_digits(number)
        ),
        Answer::integer(i64::try_from(value).unwrap_or(i64::MAX)),
    )
}
