//! Live widget sessions and accumulated progress.
//!
//! The store owns every open topic widget and division tutor, the random
//! source used to draw problems, and per-topic statistics that outlive the
//! sessions they came from. It is shared across handlers behind a single
//! `tokio::sync::Mutex`.

use std::collections::{BTreeMap, HashMap};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::curriculum::curriculum;
use crate::division::{DivisionProblem, DivisionSettings, MAX_DIVISOR};
use crate::error::{Result, TutorError};
use crate::practice::{Feedback, TopicWidget};
use crate::topics::TopicKind;
use crate::tutor::{DivisionTutor, StepCheck};

/// Identifier of an open session.
pub type SessionId = u64;

/// Accumulated practice statistics for one topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicStats {
    /// Answers checked.
    pub attempts: u32,
    /// Correct answers.
    pub correct: u32,
    /// Longest streak in any session.
    pub best_streak: u32,
}

impl TopicStats {
    fn record(&mut self, feedback: &Feedback) {
        self.attempts += 1;
        if feedback.correct {
            self.correct += 1;
        }
        self.best_streak = self.best_streak.max(feedback.best_streak);
    }
}

/// Accumulated long-division statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionStats {
    /// Problems finished in practice mode.
    pub problems_completed: u32,
    /// Step answers checked.
    pub steps_answered: u32,
    /// Wrong step answers.
    pub mistakes: u32,
}

/// Progress for one topic, as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgress {
    /// Topic kind.
    pub topic: TopicKind,
    /// Statistics.
    #[serde(flatten)]
    pub stats: TopicStats,
}

/// Snapshot of all progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    /// Topics with at least one answer, in curriculum order.
    pub topics: Vec<TopicProgress>,
    /// Long-division statistics.
    pub division: DivisionStats,
    /// Sessions currently open.
    pub open_sessions: usize,
}

/// All open sessions.
#[derive(Debug)]
pub struct SessionStore {
    config: Config,
    rng: StdRng,
    next_id: SessionId,
    topics: HashMap<SessionId, TopicWidget>,
    divisions: HashMap<SessionId, DivisionTutor>,
    progress: BTreeMap<TopicKind, TopicStats>,
    division_stats: DivisionStats,
}

impl SessionStore {
    /// Creates an empty store.
    ///
    /// Problems are drawn from `config.seed` when set, otherwise from
    /// entropy.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            config,
            rng,
            next_id: 1,
            topics: HashMap::new(),
            divisions: HashMap::new(),
            progress: BTreeMap::new(),
            division_stats: DivisionStats::default(),
        }
    }

    /// Returns the configuration the store was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the number of open sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len() + self.divisions.len()
    }

    /// Returns `true` if no session is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn allocate(&mut self) -> Result<SessionId> {
        if self.len() >= self.config.max_sessions {
            return Err(TutorError::SessionLimit {
                max: self.config.max_sessions,
            });
        }
        let id = self.next_id;
        self.next_id += 1;
        Ok(id)
    }

    // ------------------------------------------------------------------------
    // Topic widgets
    // ------------------------------------------------------------------------

    /// Opens a widget for the curriculum topic `slug`.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::NotFound` for an unknown or non-quiz topic and
    /// `TutorError::SessionLimit` when the store is full.
    pub fn open_topic(&mut self, slug: &str) -> Result<SessionId> {
        let topic = curriculum().find_topic(slug)?;
        let widget = TopicWidget::new(topic.kind)?;
        let id = self.allocate()?;
        info!(session = id, topic = %topic.kind, "Topic session opened");
        self.topics.insert(id, widget);
        Ok(id)
    }

    /// Returns a topic widget.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::NotFound` for an unknown id.
    pub fn topic(&self, id: SessionId) -> Result<&TopicWidget> {
        self.topics
            .get(&id)
            .ok_or_else(|| TutorError::not_found("Session", id))
    }

    fn topic_parts(&mut self, id: SessionId) -> Result<(&mut TopicWidget, &mut StdRng)> {
        let widget = self
            .topics
            .get_mut(&id)
            .ok_or_else(|| TutorError::not_found("Session", id))?;
        Ok((widget, &mut self.rng))
    }

    /// Closes a topic widget. Its statistics are kept.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::NotFound` for an unknown id.
    pub fn close_topic(&mut self, id: SessionId) -> Result<()> {
        self.topics
            .remove(&id)
            .map(|_| debug!(session = id, "Topic session closed"))
            .ok_or_else(|| TutorError::not_found("Session", id))
    }

    /// Turns a lesson page forward.
    ///
    /// # Errors
    ///
    /// See [`TopicWidget::next_page`].
    pub fn next_page(&mut self, id: SessionId) -> Result<&TopicWidget> {
        let (widget, rng) = self.topic_parts(id)?;
        widget.next_page(rng)?;
        Ok(widget)
    }

    /// Turns a lesson page back.
    ///
    /// # Errors
    ///
    /// See [`TopicWidget::prev_page`].
    pub fn prev_page(&mut self, id: SessionId) -> Result<&TopicWidget> {
        let (widget, _) = self.topic_parts(id)?;
        widget.prev_page()?;
        Ok(widget)
    }

    /// Skips to practice.
    ///
    /// # Errors
    ///
    /// See [`TopicWidget::start_practice`].
    pub fn start_practice(&mut self, id: SessionId) -> Result<&TopicWidget> {
        let (widget, rng) = self.topic_parts(id)?;
        widget.start_practice(rng)?;
        Ok(widget)
    }

    /// Checks a practice answer and records it.
    ///
    /// # Errors
    ///
    /// See [`TopicWidget::submit`].
    pub fn submit(&mut self, id: SessionId, input: &str) -> Result<(TopicKind, Feedback)> {
        let (widget, _) = self.topic_parts(id)?;
        let feedback = widget.submit(input)?;
        let kind = widget.kind();
        self.progress.entry(kind).or_default().record(&feedback);
        Ok((kind, feedback))
    }

    /// Draws the next practice problem.
    ///
    /// # Errors
    ///
    /// See [`TopicWidget::next_problem`].
    pub fn next_problem(&mut self, id: SessionId) -> Result<&TopicWidget> {
        let (widget, rng) = self.topic_parts(id)?;
        widget.next_problem(rng)?;
        Ok(widget)
    }

    // ------------------------------------------------------------------------
    // Division tutors
    // ------------------------------------------------------------------------

    fn division_problem(&mut self, settings: Option<DivisionSettings>) -> Result<DivisionProblem> {
        match settings {
            Some(settings) => settings.validate(MAX_DIVISOR),
            None => Ok(DivisionProblem::random(&mut self.rng, &self.config.division)),
        }
    }

    /// Opens a division tutor on the given problem, or a random one.
    ///
    /// # Errors
    ///
    /// Returns the settings validation error, or `TutorError::SessionLimit`.
    pub fn open_division(&mut self, settings: Option<DivisionSettings>) -> Result<SessionId> {
        let problem = self.division_problem(settings)?;
        let id = self.allocate()?;
        info!(session = id, problem = %problem, "Division session opened");
        self.divisions.insert(id, DivisionTutor::new(problem));
        Ok(id)
    }

    /// Returns a division tutor.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::NotFound` for an unknown id.
    pub fn division(&self, id: SessionId) -> Result<&DivisionTutor> {
        self.divisions
            .get(&id)
            .ok_or_else(|| TutorError::not_found("Division session", id))
    }

    /// Returns a division tutor for mutation.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::NotFound` for an unknown id.
    pub fn division_mut(&mut self, id: SessionId) -> Result<&mut DivisionTutor> {
        self.divisions
            .get_mut(&id)
            .ok_or_else(|| TutorError::not_found("Division session", id))
    }

    /// Closes a division tutor, which also stops its autoplay.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::NotFound` for an unknown id.
    pub fn close_division(&mut self, id: SessionId) -> Result<()> {
        self.divisions
            .remove(&id)
            .map(|_| debug!(session = id, "Division session closed"))
            .ok_or_else(|| TutorError::not_found("Division session", id))
    }

    /// Replaces a tutor's problem.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::NotFound` or the settings validation error.
    pub fn new_division_problem(
        &mut self,
        id: SessionId,
        settings: Option<DivisionSettings>,
    ) -> Result<&DivisionTutor> {
        // Look up first so an unknown id does not consume randomness.
        self.division(id)?;
        let problem = self.division_problem(settings)?;
        let tutor = self.division_mut(id)?;
        tutor.new_problem(problem);
        Ok(tutor)
    }

    /// Checks a division step answer and records it.
    ///
    /// # Errors
    ///
    /// See [`DivisionTutor::submit`].
    pub fn submit_division(&mut self, id: SessionId, text: &str) -> Result<StepCheck> {
        let check = self.division_mut(id)?.submit(text)?;
        self.division_stats.steps_answered += 1;
        if !check.correct {
            self.division_stats.mistakes += 1;
        } else if check.complete {
            self.division_stats.problems_completed += 1;
        }
        Ok(check)
    }

    // ------------------------------------------------------------------------
    // Progress
    // ------------------------------------------------------------------------

    /// Returns accumulated statistics.
    #[must_use]
    pub fn progress(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            topics: self
                .progress
                .iter()
                .map(|(topic, stats)| TopicProgress {
                    topic: *topic,
                    stats: *stats,
                })
                .collect(),
            division: self.division_stats,
            open_sessions: self.len(),
        }
    }
}
