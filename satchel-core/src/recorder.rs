//! Quiz/essay recorder - the mutation half of the engine
//!
//! All operations act on an in-memory [`ProgressDocument`] mirror;
//! the caller is expected to flush the mirror to the store after each
//! mutation that must survive a reload.

use crate::document::ProgressDocument;

/// XP values supplied by the content layer
///
/// The recorder never re-derives XP from history; it adds the policy
/// value once at the event that earns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpPolicy {
    /// Earned when the very first attempt on a quiz is correct
    pub first_try: u64,

    /// Earned when a later attempt first achieves a correct answer
    pub retry: u64,

    /// Earned once when a topic's essay is saved
    pub essay: u64,
}

impl Default for XpPolicy {
    fn default() -> Self {
        Self {
            first_try: 10,
            retry: 5,
            essay: 15,
        }
    }
}

impl ProgressDocument {
    /// Record one quiz attempt and return the XP granted (0 if none).
    ///
    /// Creates the attempt entry if absent, increments `attempts`, and
    /// sets `correct = correct || is_correct` - a prior correct answer
    /// is never un-set. XP is granted only on the attempt that first
    /// achieves a correct answer: `first_try` when that is attempt 1,
    /// `retry` otherwise. A repeat correct answer on an already-solved
    /// quiz earns nothing.
    ///
    /// Unknown topic or quiz ids are tolerated - catalogs are external
    /// content and an unknown id simply creates a new entry.
    pub fn record_quiz_attempt(
        &mut self,
        topic_id: &str,
        quiz_id: &str,
        is_correct: bool,
        policy: &XpPolicy,
    ) -> u64 {
        let attempt = self
            .topic_mut(topic_id)
            .quiz_attempts
            .entry(quiz_id.to_string())
            .or_default();

        let already_solved = attempt.correct;
        attempt.attempts += 1;
        attempt.correct |= is_correct;

        let granted = if is_correct && !already_solved {
            if attempt.attempts == 1 {
                policy.first_try
            } else {
                policy.retry
            }
        } else {
            0
        };

        self.xp += granted;
        granted
    }

    /// Mark the topic's essay as saved. Idempotent latch; returns
    /// whether this call was the one that transitioned it. The essay
    /// XP is added only at the transition.
    pub fn mark_essay_submitted(&mut self, topic_id: &str, policy: &XpPolicy) -> bool {
        let topic = self.topic_mut(topic_id);
        if topic.essay_submitted {
            return false;
        }
        topic.essay_submitted = true;
        self.xp += policy.essay;
        true
    }
}
