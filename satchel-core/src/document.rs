//! The per-learner progress document
//!
//! One document per username holds everything durable: cumulative XP
//! and a map of topic progress. The document is the unit of
//! persistence - the store reads and overwrites it whole, and the
//! sync client's mirror is an in-memory copy of it.
//!
//! Entries are created lazily on first interaction and never deleted.
//! XP is additive and append-only; it is never recomputed from the
//! attempt history.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything durable for one learner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDocument {
    /// Cumulative experience points, monotonically non-decreasing
    pub xp: u64,

    /// Per-topic progress, keyed by topic id; absence means "not started"
    #[serde(default)]
    pub topics: BTreeMap<String, TopicProgress>,
}

/// Progress within one topic the learner has touched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgress {
    /// Per-quiz attempt state, keyed by quiz id
    #[serde(default)]
    pub quiz_attempts: BTreeMap<String, QuizAttempt>,

    /// One-way latch set when the topic's essay is saved
    #[serde(default)]
    pub essay_submitted: bool,

    /// One-way latch gating the topic's reward mini-game.
    /// Once true it never reverts within this subsystem.
    #[serde(default)]
    pub reward_unlocked: bool,
}

/// Attempt state for a single quiz
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    /// Total attempts; >= 1 whenever the entry exists
    pub attempts: u32,

    /// True once answered correctly at least once; never reverts
    pub correct: bool,
}

impl ProgressDocument {
    /// Fresh empty document for a first-time learner
    pub fn new() -> Self {
        Self::default()
    }

    /// Topic entry, created lazily
    pub(crate) fn topic_mut(&mut self, topic_id: &str) -> &mut TopicProgress {
        self.topics.entry(topic_id.to_string()).or_default()
    }

    /// Read-only topic snapshot; a zero-value `TopicProgress` when the
    /// topic has not been touched, never an absent value.
    pub fn topic(&self, topic_id: &str) -> TopicProgress {
        self.topics.get(topic_id).cloned().unwrap_or_default()
    }
}
