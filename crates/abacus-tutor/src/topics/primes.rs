//! Recognising prime numbers.

use rand::Rng;

use super::Problem;
use crate::answer::Answer;

/// Returns `true` if `n` is prime.
#[must_use]
pub const fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut divisor = 3;
    while divisor * divisor <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

/// Asks whether a number between 2 and 100 is prime.
pub fn generate(rng: &mut impl Rng) -> Problem {
    let n = rng.gen_range(2..=100);
    let answer = if is_prime(n) { "Yes" } else { "No" };

    Problem::new(
        format!("Is {n} a prime number? Answer Yes or No."),
        Answer::text(answer),
    )
}
