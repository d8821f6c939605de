//! Mixed multiple-choice questions.

use rand::seq::SliceRandom;
use rand::Rng;

use super::Problem;
use crate::answer::{parse_integer, Answer};

/// One entry of the question bank. The first choice is the correct one.
struct BankQuestion {
    question: &'static str,
    choices: [&'static str; 4],
}

const BANK: [BankQuestion; 10] = [
    BankQuestion {
        question: "Which number is the largest?",
        choices: ["9,081", "9,018", "8,910", "9,008"],
    },
    BankQuestion {
        question: "What is 7 × 8?",
        choices: ["56", "54", "64", "48"],
    },
    BankQuestion {
        question: "Which fraction is equal to 1/2?",
        choices: ["4/8", "3/5", "2/3", "5/8"],
    },
    BankQuestion {
        question: "How many grams are in 3 kilograms?",
        choices: ["3000", "300", "30", "30,000"],
    },
    BankQuestion {
        question: "Which of these numbers is prime?",
        choices: ["31", "27", "21", "33"],
    },
    BankQuestion {
        question: "What is 4,650 rounded to the nearest thousand?",
        choices: ["5000", "4000", "4600", "4700"],
    },
    BankQuestion {
        question: "How many sides does an octagon have?",
        choices: ["8", "6", "7", "10"],
    },
    BankQuestion {
        question: "What is 96 ÷ 8?",
        choices: ["12", "11", "14", "16"],
    },
    BankQuestion {
        question: "An angle of 135° is...",
        choices: ["obtuse", "acute", "right", "straight"],
    },
    BankQuestion {
        question: "What is the value of the 6 in 3,629?",
        choices: ["600", "6", "60", "6000"],
    },
];

/// Number of questions in the bank.
pub const BANK_SIZE: usize = BANK.len();

/// Draws a bank question with its choices shuffled.
///
/// The learner may answer with the choice text. Numeric choices accept any
/// digit grouping, so `3000` and `3,000` both match.
pub fn generate(rng: &mut impl Rng) -> Problem {
    let entry = &BANK[rng.gen_range(0..BANK.len())];
    let mut choices: Vec<String> = entry.choices.iter().map(ToString::to_string).collect();
    choices.shuffle(rng);

    Problem::new(entry.question, bank_answer(entry.choices[0])).with_choices(choices)
}

fn bank_answer(choice: &str) -> Answer {
    parse_integer(choice).map_or_else(|| Answer::text(choice), Answer::integer)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_choices_contain_answer() {
        let mut rng = StdRng::seed_from_u64(10);
        for _ in 0..100 {
            let problem = generate(&mut rng);
            assert_eq!(problem.choices.len(), 4);
            assert!(problem
                .choices
                .iter()
                .any(|choice| problem.answer.check(choice)));
        }
    }

    #[test]
    fn test_numeric_choices_accept_any_grouping() {
        let grouped = bank_answer("9,081");
        assert_eq!(grouped, Answer::integer(9081));
        assert!(grouped.check("9081"));
        assert!(grouped.check("9,081"));

        let plain = bank_answer("3000");
        assert!(plain.check("3,000"));
        assert!(plain.check("3 000"));
        assert!(!plain.check("300"));
    }

    #[test]
    fn test_text_choices_stay_text() {
        assert_eq!(bank_answer("obtuse"), Answer::text("obtuse"));
        assert!(bank_answer("4/8").check("4/8"));
        assert!(bank_answer("Obtuse").check("obtuse"));
    }

    #[test]
    fn test_bank_choices_are_distinct() {
        for entry in &BANK {
            let mut choices = entry.choices.to_vec();
            choices.sort_unstable();
            choices.dedup();
            assert_eq!(choices.len(), 4, "{}", entry.question);
        }
        assert_eq!(BANK_SIZE, 10);
    }
}
