//! The curriculum tree (Grade → Term → Topic) and a drill-down navigator.

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::{Result, TutorError};
use crate::topics::TopicKind;

/// A leaf of the curriculum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Topic {
    /// URL-safe identifier, unique across the curriculum.
    pub slug: &'static str,
    /// Display title.
    pub title: &'static str,
    /// Widget the topic opens.
    pub kind: TopicKind,
}

/// A school term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Term {
    /// Identifier within the grade.
    pub slug: &'static str,
    /// Display title.
    pub title: &'static str,
    /// Topics in teaching order.
    pub topics: Vec<Topic>,
}

/// A school grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grade {
    /// Identifier.
    pub slug: &'static str,
    /// Display title.
    pub title: &'static str,
    /// Terms in order.
    pub terms: Vec<Term>,
}

/// The whole curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Curriculum {
    /// Grades in order.
    pub grades: Vec<Grade>,
}

const fn topic(slug: &'static str, title: &'static str, kind: TopicKind) -> Topic {
    Topic { slug, title, kind }
}

static CURRICULUM: Lazy<Curriculum> = Lazy::new(|| Curriculum {
    grades: vec![
        Grade {
            slug: "grade-4",
            title: "Grade 4",
            terms: vec![
                Term {
                    slug: "term-1",
                    title: "Term 1",
                    topics: vec![
                        topic("place-value", "Place Value", TopicKind::PlaceValue),
                        topic("rounding", "Rounding", TopicKind::Rounding),
                        topic("comparing", "Comparing Numbers", TopicKind::Comparing),
                    ],
                },
                Term {
                    slug: "term-2",
                    title: "Term 2",
                    topics: vec![
                        topic("fractions", "Comparing Fractions", TopicKind::Fractions),
                        topic("mass", "Mass", TopicKind::Mass),
                        topic("patterns", "Number Patterns", TopicKind::Patterns),
                    ],
                },
            ],
        },
        Grade {
            slug: "grade-5",
            title: "Grade 5",
            terms: vec![
                Term {
                    slug: "term-1",
                    title: "Term 1",
                    topics: vec![
                        topic("long-division", "Long Division", TopicKind::LongDivision),
                        topic("primes", "Prime Numbers", TopicKind::Primes),
                        topic("word-problems", "Word Problems", TopicKind::WordProblems),
                    ],
                },
                Term {
                    slug: "term-2",
                    title: "Term 2",
                    topics: vec![
                        topic("geometry", "Shapes and Angles", TopicKind::Geometry),
                        topic("assessment", "Assessment", TopicKind::Assessment),
                    ],
                },
            ],
        },
    ],
});

/// Returns the built-in curriculum.
#[must_use]
pub fn curriculum() -> &'static Curriculum {
    &CURRICULUM
}

impl Curriculum {
    /// Looks up a grade by slug.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::NotFound` for an unknown slug.
    pub fn grade(&self, slug: &str) -> Result<&Grade> {
        self.grades
            .iter()
            .find(|g| g.slug == slug)
            .ok_or_else(|| TutorError::not_found("Grade", slug))
    }

    /// Finds a topic anywhere in the tree by slug.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::NotFound` for an unknown slug.
    pub fn find_topic(&self, slug: &str) -> Result<&Topic> {
        self.topics()
            .find(|t| t.slug == slug)
            .ok_or_else(|| TutorError::not_found("Topic", slug))
    }

    /// Iterates every topic in curriculum order.
    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.grades
            .iter()
            .flat_map(|g| g.terms.iter())
            .flat_map(|t| t.topics.iter())
    }
}

impl Grade {
    /// Looks up a term by slug.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::NotFound` for an unknown slug.
    pub fn term(&self, slug: &str) -> Result<&Term> {
        self.terms
            .iter()
            .find(|t| t.slug == slug)
            .ok_or_else(|| TutorError::not_found("Term", format!("{}/{slug}", self.slug)))
    }
}

impl Term {
    /// Looks up a topic by slug.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::NotFound` for an unknown slug.
    pub fn topic(&self, slug: &str) -> Result<&Topic> {
        self.topics
            .iter()
            .find(|t| t.slug == slug)
            .ok_or_else(|| TutorError::not_found("Topic", slug))
    }
}

// ============================================================================
// Navigator
// ============================================================================

/// A position in the curriculum tree, as indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum Location {
    /// The grade list.
    #[default]
    Grades,
    /// The terms of a grade.
    Terms {
        /// Grade index.
        grade: usize,
    },
    /// The topics of a term.
    Topics {
        /// Grade index.
        grade: usize,
        /// Term index.
        term: usize,
    },
    /// A selected topic.
    Topic {
        /// Grade index.
        grade: usize,
        /// Term index.
        term: usize,
        /// Topic index.
        topic: usize,
    },
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grades => write!(f, "grades"),
            Self::Terms { .. } => write!(f, "terms"),
            Self::Topics { .. } => write!(f, "topics"),
            Self::Topic { .. } => write!(f, "topic"),
        }
    }
}

/// Drill-down navigation with a back stack.
#[derive(Debug, Clone)]
pub struct Navigator {
    curriculum: &'static Curriculum,
    location: Location,
    history: Vec<Location>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(curriculum())
    }
}

impl Navigator {
    /// Starts at the grade list.
    #[must_use]
    pub const fn new(curriculum: &'static Curriculum) -> Self {
        Self {
            curriculum,
            location: Location::Grades,
            history: Vec::new(),
        }
    }

    /// Returns the current location.
    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    fn go(&mut self, location: Location) {
        self.history.push(self.location);
        self.location = location;
    }

    const fn grade_index(&self) -> Option<usize> {
        match self.location {
            Location::Grades => None,
            Location::Terms { grade }
            | Location::Topics { grade, .. }
            | Location::Topic { grade, .. } => Some(grade),
        }
    }

    const fn term_index(&self) -> Option<(usize, usize)> {
        match self.location {
            Location::Grades | Location::Terms { .. } => None,
            Location::Topics { grade, term } | Location::Topic { grade, term, .. } => {
                Some((grade, term))
            }
        }
    }

    /// Opens a grade from any location.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::NotFound` for an unknown slug.
    pub fn select_grade(&mut self, slug: &str) -> Result<&'static Grade> {
        let curriculum = self.curriculum;
        let (index, grade) = curriculum
            .grades
            .iter()
            .enumerate()
            .find(|(_, g)| g.slug == slug)
            .ok_or_else(|| TutorError::not_found("Grade", slug))?;
        self.go(Location::Terms { grade: index });
        Ok(grade)
    }

    /// Opens a term of the current grade.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::InvalidStateTransition` before a grade is chosen
    /// and `TutorError::NotFound` for an unknown slug.
    pub fn select_term(&mut self, slug: &str) -> Result<&'static Term> {
        let curriculum = self.curriculum;
        let grade_index = self
            .grade_index()
            .ok_or_else(|| TutorError::invalid_transition(self.location, "term"))?;
        let grade = &curriculum.grades[grade_index];
        let (index, term) = grade
            .terms
            .iter()
            .enumerate()
            .find(|(_, t)| t.slug == slug)
            .ok_or_else(|| TutorError::not_found("Term", format!("{}/{slug}", grade.slug)))?;
        self.go(Location::Topics {
            grade: grade_index,
            term: index,
        });
        Ok(term)
    }

    /// Opens a topic of the current term.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::InvalidStateTransition` before a term is chosen
    /// and `TutorError::NotFound` for an unknown slug.
    pub fn select_topic(&mut self, slug: &str) -> Result<&'static Topic> {
        let curriculum = self.curriculum;
        let (grade_index, term_index) = self
            .term_index()
            .ok_or_else(|| TutorError::invalid_transition(self.location, "topic"))?;
        let term = &curriculum.grades[grade_index].terms[term_index];
        let (index, topic) = term
            .topics
            .iter()
            .enumerate()
            .find(|(_, t)| t.slug == slug)
            .ok_or_else(|| TutorError::not_found("Topic", slug))?;
        self.go(Location::Topic {
            grade: grade_index,
            term: term_index,
            topic: index,
        });
        Ok(topic)
    }

    /// Returns to the previous location; stays on the grade list when the
    /// history is empty.
    pub fn back(&mut self) -> Location {
        self.location = self.history.pop().unwrap_or_default();
        self.location
    }

    /// Titles from the root down to the current location.
    #[must_use]
    pub fn breadcrumbs(&self) -> Vec<&'static str> {
        let curriculum = self.curriculum;
        let mut crumbs = Vec::new();
        if let Some(grade) = self.grade_index().and_then(|g| curriculum.grades.get(g)) {
            crumbs.push(grade.title);
            if let Some(term) = self.term_index().and_then(|(_, t)| grade.terms.get(t)) {
                crumbs.push(term.title);
                if let Location::Topic { topic, .. } = self.location {
                    if let Some(topic) = term.topics.get(topic) {
                        crumbs.push(topic.title);
                    }
                }
            }
        }
        crumbs
    }
}
