//! Paginated lessons shown before practice.

use serde::Serialize;

use crate::topics::TopicKind;

/// One page of a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LessonPage {
    /// Page heading.
    pub heading: &'static str,
    /// Explanation text.
    pub body: &'static str,
    /// A worked example, if the page has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<&'static str>,
}

/// A topic's lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lesson {
    /// Lesson title.
    pub title: &'static str,
    /// Pages in reading order; never empty.
    pub pages: Vec<LessonPage>,
}

impl Lesson {
    /// Returns the page at `index`.
    #[must_use]
    pub fn page(&self, index: usize) -> Option<&LessonPage> {
        self.pages.get(index)
    }

    /// Returns the number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Returns `true` if the lesson has no pages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Returns `true` if `index` is the final page.
    #[must_use]
    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.pages.len()
    }
}

const fn page(heading: &'static str, body: &'static str, example: Option<&'static str>) -> LessonPage {
    LessonPage {
        heading,
        body,
        example,
    }
}

/// Returns the lesson for a topic.
#[must_use]
pub fn lesson_for(kind: TopicKind) -> Lesson {
    let (title, pages) = match kind {
        TopicKind::PlaceValue => (
            "Place Value",
            vec![
                page(
                    "Every digit has a place",
                    "In a whole number each digit sits in a place: ones, tens, hundreds, thousands and beyond. Each place is worth ten times the place to its right.",
                    None,
                ),
                page(
                    "Finding a digit's value",
                    "Multiply the digit by the value of its place.",
                    Some("In 47,315 the 7 is in the thousands place, so its value is 7 × 1000 = 7000."),
                ),
            ],
        ),
        TopicKind::Rounding => (
            "Rounding",
            vec![
                page(
                    "Look at the next digit",
                    "To round to a place, look at the digit just to its right. If it is 5 or more, round up. Otherwise round down.",
                    Some("3,456 to the nearest hundred: the tens digit is 5, so round up to 3,500."),
                ),
                page(
                    "Zeros after the place",
                    "After rounding, every digit to the right of the place becomes zero.",
                    Some("1,449 to the nearest ten is 1,450."),
                ),
            ],
        ),
        TopicKind::Comparing => (
            "Comparing Numbers",
            vec![
                page(
                    "Count the digits first",
                    "A whole number with more digits is larger. If both have the same number of digits, compare from the left.",
                    Some("4,120 > 987 because it has more digits."),
                ),
                page(
                    "The symbols",
                    "Use < for 'less than', > for 'greater than' and = for 'equal to'. The open side faces the larger number.",
                    Some("3,465 > 3,456"),
                ),
            ],
        ),
        TopicKind::Fractions => (
            "Comparing Fractions",
            vec![
                page(
                    "Same denominator",
                    "When the bottom numbers match, the fraction with the larger top number is larger.",
                    Some("5/8 > 3/8"),
                ),
                page(
                    "Cross multiply",
                    "For different denominators, multiply each numerator by the other fraction's denominator and compare the results.",
                    Some("3/4 and 5/8: 3 × 8 = 24 and 5 × 4 = 20, so 3/4 > 5/8."),
                ),
            ],
        ),
        TopicKind::Mass => (
            "Mass",
            vec![
                page(
                    "Kilograms and grams",
                    "There are 1000 grams in one kilogram.",
                    None,
                ),
                page(
                    "Converting",
                    "To change kilograms to grams, multiply by 1000. To change grams to kilograms, divide by 1000.",
                    Some("2.5 kg = 2500 g and 750 g = 0.75 kg."),
                ),
            ],
        ),
        TopicKind::Primes => (
            "Prime Numbers",
            vec![
                page(
                    "What is a prime?",
                    "A prime number has exactly two factors: 1 and itself. The number 1 is not prime.",
                    Some("7 is prime. 9 is not, because 3 × 3 = 9."),
                ),
                page(
                    "Testing a number",
                    "Try dividing by 2, 3, 5 and 7. If none of them divides a number up to 100 exactly (and it is not one of them), it is prime.",
                    None,
                ),
            ],
        ),
        TopicKind::Patterns => (
            "Number Patterns",
            vec![page(
                "Find the rule",
                "Work out how much each term changes from the one before. Apply the same change to find the next term.",
                Some("3, 7, 11, 15: each term is 4 more, so the next is 19."),
            )],
        ),
        TopicKind::WordProblems => (
            "Word Problems",
            vec![
                page(
                    "Read carefully",
                    "Find the numbers in the story and decide what the question asks for.",
                    None,
                ),
                page(
                    "Choose the operation",
                    "'More' and 'altogether' often mean add or multiply. 'Left' and 'gave away' often mean subtract.",
                    Some("Ben had 40 marbles and gave away 15. 40 − 15 = 25 are left."),
                ),
            ],
        ),
        TopicKind::Geometry => (
            "Shapes and Angles",
            vec![
                page(
                    "Polygons",
                    "A polygon is named by its number of sides: triangle (3), quadrilateral (4), pentagon (5), hexagon (6), heptagon (7), octagon (8).",
                    None,
                ),
                page(
                    "Angles",
                    "An acute angle is less than 90°. A right angle is exactly 90°. An obtuse angle is between 90° and 180°. A straight angle is 180°.",
                    None,
                ),
            ],
        ),
        TopicKind::Assessment => (
            "Assessment",
            vec![page(
                "Show what you know",
                "These questions mix every topic in the term. Type the text of the choice you think is correct.",
                None,
            )],
        ),
        TopicKind::LongDivision => (
            "Long Division",
            vec![
                page(
                    "Divide, multiply, subtract, bring down",
                    "Work from the leftmost digit. Divide, write the quotient digit above, multiply it back, subtract, then bring down the next digit.",
                    None,
                ),
                page(
                    "A worked example",
                    "Repeat the four steps until every digit of the dividend has been used. What is left is the remainder.",
                    Some("532 ÷ 4 = 133 remainder 0."),
                ),
            ],
        ),
    };

    Lesson { title, pages }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_topic_has_pages() {
        for kind in TopicKind::ALL {
            let lesson = lesson_for(kind);
            assert!(!lesson.is_empty(), "{kind}");
            assert!(!lesson.title.is_empty());
        }
    }

    #[test]
    fn test_page_navigation_helpers() {
        let lesson = lesson_for(TopicKind::Rounding);
        assert_eq!(lesson.len(), 2);
        assert!(!lesson.is_last(0));
        assert!(lesson.is_last(1));
        assert!(lesson.page(2).is_none());
        assert_eq!(lesson.page(0).map(|p| p.heading), Some("Look at the next digit"));
    }

    #[test]
    fn test_page_serialization_skips_missing_example() {
        let lesson = lesson_for(TopicKind::Mass);
        let json = serde_json::to_value(lesson.pages[0]).unwrap_or_default();
        assert!(json.get("example").is_none());
        assert_eq!(json["heading"], "Kilograms and grams");
    }
}
