//! Kilogram and gram conversions.

use rand::Rng;

use super::{group_digits, Problem};
use crate::answer::{format_decimal, Answer, GRAM_TOLERANCE, KILOGRAM_TOLERANCE};

/// Grams in one kilogram.
pub const GRAMS_PER_KILOGRAM: u32 = 1000;

/// Asks to convert between kilograms and grams.
///
/// Masses are multiples of 50 g up to 10 kg. Gram answers accept ±0.1 g and
/// kilogram answers ±0.001 kg.
pub fn generate(rng: &mut impl Rng) -> Problem {
    let grams: u32 = rng.gen_range(1..=200) * 50;
    let kilograms = f64::from(grams) / f64::from(GRAMS_PER_KILOGRAM);

    if rng.gen_bool(0.5) {
        Problem::new(
            format!("Convert {} kg to grams.", format_decimal(kilograms)),
            Answer::decimal(f64::from(grams), GRAM_TOLERANCE),
        )
    } else {
        Problem::new(
            format!("Convert {} g to kilograms.", group_digits(u64::from(grams))),
            Answer::decimal(kilograms, KILOGRAM_TOLERANCE),
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_tolerance_matches_unit() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..100 {
            let problem = generate(&mut rng);
            let Answer::Decimal { tolerance, .. } = problem.answer else {
                unreachable!("mass answers are decimals");
            };
            if problem.question.ends_with("to grams.") {
                assert!((tolerance - GRAM_TOLERANCE).abs() < f64::EPSILON);
            } else {
                assert!((tolerance - KILOGRAM_TOLERANCE).abs() < f64::EPSILON);
            }
        }
    }

    #[test]
    fn test_conversion_accepts_grouped_grams() {
        let answer = Answer::decimal(2500.0, GRAM_TOLERANCE);
        assert!(answer.check("2,500"));
        let answer = Answer::decimal(2.5, KILOGRAM_TOLERANCE);
        assert!(answer.check("2.50"));
    }
}
