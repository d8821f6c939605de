//! Comparing two whole numbers.

use rand::Rng;

use super::{comparison_symbol, group_digits, Problem};
use crate::answer::Answer;

/// Asks for `<`, `>` or `=` between two numbers below 10,000.
///
/// Roughly one problem in five compares a number with itself, and near
/// misses (same thousands) are favoured so the learner must read every digit.
pub fn generate(rng: &mut impl Rng) -> Problem {
    let left: u64 = rng.gen_range(0..10_000);
    let right = match rng.gen_range(0..5) {
        0 => left,
        1 | 2 => (left / 1000) * 1000 + rng.gen_range(0..1000),
        _ => rng.gen_range(0..10_000),
    };

    Problem::new(
        format!(
            "Compare {} and {}. Type <, > or =.",
            group_digits(left),
            group_digits(right)
        ),
        Answer::text(comparison_symbol(left.cmp(&right))),
    )
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_answers_are_symbols() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let problem = generate(&mut rng);
            let symbol = problem.answer.display();
            assert!(["<", ">", "="].contains(&symbol.as_str()));
            seen.insert(symbol);
        }
        assert_eq!(seen.len(), 3);
    }
}
