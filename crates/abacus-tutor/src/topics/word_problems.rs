//! Short story problems.

use rand::seq::SliceRandom;
use rand::Rng;

use super::Problem;
use crate::answer::Answer;

const NAMES: [&str; 8] = [
    "Amara", "Ben", "Chloe", "Dev", "Elif", "Femi", "Grace", "Hugo",
];

const ITEMS: [&str; 6] = [
    "stickers", "marbles", "apples", "pencils", "books", "shells",
];

/// Which operation the story needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Add,
    Subtract,
    Multiply,
}

/// Draws a templated addition, subtraction or multiplication story.
pub fn generate(rng: &mut impl Rng) -> Problem {
    let name = NAMES.choose(rng).copied().unwrap_or("Sam");
    let item = ITEMS.choose(rng).copied().unwrap_or("counters");
    let operation = [Operation::Add, Operation::Subtract, Operation::Multiply]
        .choose(rng)
        .copied()
        .unwrap_or(Operation::Add);

    match operation {
        Operation::Add => {
            let have: i64 = rng.gen_range(12..=500);
            let more: i64 = rng.gen_range(5..=300);
            Problem::new(
                format!(
                    "{name} has {have} {item} and gets {more} more. How many {item} does {name} have now?"
                ),
                Answer::integer(have + more),
            )
        }
        Operation::Subtract => {
            let had: i64 = rng.gen_range(20..=500);
            let gave: i64 = rng.gen_range(1..had);
            Problem::new(
                format!(
                    "{name} had {had} {item} and gave away {gave}. How many {item} are left?"
                ),
                Answer::integer(had - gave),
            )
        }
        Operation::Multiply => {
            let groups: i64 = rng.gen_range(2..=12);
            let each: i64 = rng.gen_range(2..=12);
            Problem::new(
                format!(
                    "{name} packs {groups} boxes with {each} {item} in each box. How many {item} is that altogether?"
                ),
                Answer::integer(groups * each),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_answers_are_positive() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            let problem = generate(&mut rng);
            let Answer::Integer { value } = problem.answer else {
                unreachable!("story answers are integers");
            };
            assert!(value > 0, "{}", problem.question);
            assert!(problem.question.ends_with('?'));
        }
    }

    #[test]
    fn test_all_templates_used() {
        let mut rng = StdRng::seed_from_u64(1);
        let questions: Vec<String> = (0..100).map(|_| generate(&mut rng).question).collect();
        assert!(questions.iter().any(|q| q.contains("more.")));
        assert!(questions.iter().any(|q| q.contains("gave away")));
        assert!(questions.iter().any(|q| q.contains("altogether")));
    }
}
