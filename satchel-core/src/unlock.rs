//! Reward-unlock evaluator
//!
//! Each topic's reward mini-game is gated by a list of requirements
//! drawn from the content tables. Requirement kinds are a tagged enum
//! so new kinds can be added without touching the evaluator's control
//! flow elsewhere; evaluation is a single dispatch over the variants.

use serde::{Deserialize, Serialize};

use crate::document::ProgressDocument;

/// One requirement a topic's reward can demand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Requirement {
    /// Every listed quiz must have been answered correctly at least once
    #[serde(rename_all = "camelCase")]
    AllQuizzesCorrect { quiz_ids: Vec<String> },

    /// The topic's essay must have been saved
    EssaySubmitted,
}

impl Requirement {
    /// Whether this requirement currently holds for the topic
    fn holds(&self, doc: &ProgressDocument, topic_id: &str) -> bool {
        let topic = doc.topic(topic_id);
        match self {
            Requirement::AllQuizzesCorrect { quiz_ids } => quiz_ids
                .iter()
                .all(|q| topic.quiz_attempts.get(q).is_some_and(|a| a.correct)),
            Requirement::EssaySubmitted => topic.essay_submitted,
        }
    }
}

/// Pure predicate: true only if every requirement currently holds.
/// Does not mutate state; repeated calls with no intervening mutation
/// return the same value.
pub fn is_reward_unlockable(
    doc: &ProgressDocument,
    topic_id: &str,
    requirements: &[Requirement],
) -> bool {
    requirements.iter().all(|r| r.holds(doc, topic_id))
}

impl ProgressDocument {
    /// One-way latch: set `reward_unlocked` unconditionally. Callers
    /// are expected to check [`is_reward_unlockable`] first. Idempotent;
    /// returns whether this call transitioned the latch, so the caller
    /// can treat a `true` as the one-time celebration trigger.
    pub fn mark_reward_unlocked(&mut self, topic_id: &str) -> bool {
        let topic = self.topic_mut(topic_id);
        if topic.reward_unlocked {
            return false;
        }
        topic.reward_unlocked = true;
        true
    }
}
