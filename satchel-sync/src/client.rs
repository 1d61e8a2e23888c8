//! Progress sync client
//!
//! Owns the session's in-memory mirror of the learner's document.
//! Reads flow store -> mirror on load; writes flow mirror -> store on
//! flush, as whole-document overwrites.
//!
//! Concurrency model: the mirror is exclusively owned by this session,
//! so mutations are strictly ordered. Across sessions, tabs, or
//! devices for the same username there is NO coordination: the store
//! keeps whichever flush completes last (last-writer-wins), with no
//! merge and no versioning. That is a deliberate product trade-off
//! for a single-learner, low-write-rate system - do not "fix" it here
//! by adding locking without a product decision.

use tracing::{debug, warn};

use crate::transport::{ProgressTransport, TransportError};
use satchel_core::{
    unlock, ProgressDocument, Requirement, TopicProgress, Username, XpPolicy,
};

/// Lifecycle of the mirror for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No load attempted yet
    Uninitialized,
    /// Fetch in flight
    Loading,
    /// Mirror initialized from a stored document
    Ready,
    /// No prior document existed; mirror initialized fresh (not an error)
    Empty,
    /// Load failed for a reason other than "not found"
    Failed,
}

/// Session-local client over a learner's progress document
pub struct SyncClient<T: ProgressTransport> {
    transport: T,
    username: Username,
    token: String,
    policy: XpPolicy,
    state: SyncState,
    mirror: ProgressDocument,
}

impl<T: ProgressTransport> SyncClient<T> {
    /// Create a client for a username with its derived write token.
    /// No I/O happens until [`SyncClient::load`].
    pub fn new(transport: T, username: Username, token: impl Into<String>) -> Self {
        Self {
            transport,
            username,
            token: token.into(),
            policy: XpPolicy::default(),
            state: SyncState::Uninitialized,
            mirror: ProgressDocument::new(),
        }
    }

    /// Override the default XP policy with content-supplied values
    pub fn with_policy(mut self, policy: XpPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Read-only view of the mirror
    pub fn mirror(&self) -> &ProgressDocument {
        &self.mirror
    }

    /// Fetch the stored document and initialize the mirror.
    ///
    /// `Ready` with the fetched document, `Empty` with a fresh one
    /// when none exists, `Failed` on any other error - in which case
    /// the mirror stays a valid empty document so the session can
    /// keep working offline and flush later.
    pub async fn load(&mut self) -> Result<SyncState, TransportError> {
        self.state = SyncState::Loading;

        match self.transport.fetch(&self.username).await {
            Ok(Some(document)) => {
                debug!(username = %self.username, xp = document.xp, "progress loaded");
                self.mirror = document;
                self.state = SyncState::Ready;
                Ok(self.state)
            }
            Ok(None) => {
                debug!(username = %self.username, "no prior progress, starting fresh");
                self.mirror = ProgressDocument::new();
                self.state = SyncState::Empty;
                Ok(self.state)
            }
            Err(e) => {
                warn!(username = %self.username, error = %e, "progress load failed");
                self.mirror = ProgressDocument::new();
                self.state = SyncState::Failed;
                Err(e)
            }
        }
    }

    /// Push the current mirror snapshot to the store.
    ///
    /// The only write path. Flushes are not queued or coalesced: two
    /// in-flight flushes complete in whatever order the network
    /// returns, and the store keeps the last write. A failed flush
    /// leaves the mirror unchanged and valid; re-flushing is safe
    /// because writes are whole-document overwrites.
    pub async fn flush(&self) -> Result<(), TransportError> {
        self.transport
            .store(&self.username, &self.token, &self.mirror)
            .await
    }

    /// Record a quiz attempt on the mirror; returns the XP granted
    pub fn record_quiz_attempt(&mut self, topic_id: &str, quiz_id: &str, is_correct: bool) -> u64 {
        self.mirror
            .record_quiz_attempt(topic_id, quiz_id, is_correct, &self.policy)
    }

    /// Mark the topic's essay saved; returns whether this call
    /// transitioned the latch
    pub fn mark_essay_submitted(&mut self, topic_id: &str) -> bool {
        self.mirror.mark_essay_submitted(topic_id, &self.policy)
    }

    /// Snapshot of a topic's progress (zero-value when untouched)
    pub fn topic_progress(&self, topic_id: &str) -> TopicProgress {
        self.mirror.topic(topic_id)
    }

    /// Whether the topic's reward requirements are currently satisfied
    pub fn is_reward_unlockable(&self, topic_id: &str, requirements: &[Requirement]) -> bool {
        unlock::is_reward_unlockable(&self.mirror, topic_id, requirements)
    }

    /// One-way reward latch; `true` means this call unlocked it and
    /// the caller should flush and fire the one-time celebration
    pub fn mark_reward_unlocked(&mut self, topic_id: &str) -> bool {
        self.mirror.mark_reward_unlocked(topic_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory transport standing in for the gateway
    #[derive(Default)]
    struct FakeTransport {
        documents: Mutex<HashMap<String, ProgressDocument>>,
        fail_fetch: bool,
        fail_store: bool,
    }

    impl FakeTransport {
        fn with_document(username: &str, document: ProgressDocument) -> Self {
            let transport = Self::default();
            transport
                .documents
                .lock()
                .unwrap()
                .insert(username.to_string(), document);
            transport
        }

        fn stored(&self, username: &str) -> Option<ProgressDocument> {
            self.documents.lock().unwrap().get(username).cloned()
        }
    }

    #[async_trait]
    impl ProgressTransport for FakeTransport {
        async fn fetch(
            &self,
            username: &Username,
        ) -> Result<Option<ProgressDocument>, TransportError> {
            if self.fail_fetch {
                return Err(TransportError::Service("fetch down".into()));
            }
            Ok(self.documents.lock().unwrap().get(username.as_str()).cloned())
        }

        async fn store(
            &self,
            username: &Username,
            _token: &str,
            document: &ProgressDocument,
        ) -> Result<(), TransportError> {
            if self.fail_store {
                return Err(TransportError::Service("store down".into()));
            }
            self.documents
                .lock()
                .unwrap()
                .insert(username.as_str().to_string(), document.clone());
            Ok(())
        }
    }

    fn client_over(transport: FakeTransport) -> SyncClient<FakeTransport> {
        SyncClient::new(transport, Username::parse("alice123").unwrap(), "token")
    }

    #[tokio::test]
    async fn test_load_existing_document_is_ready() {
        let mut existing = ProgressDocument::new();
        existing.xp = 42;
        let mut client = client_over(FakeTransport::with_document("alice123", existing));

        assert_eq!(client.state(), SyncState::Uninitialized);
        let state = client.load().await.unwrap();
        assert_eq!(state, SyncState::Ready);
        assert_eq!(client.mirror().xp, 42);
    }

    #[tokio::test]
    async fn test_load_missing_document_is_empty_not_error() {
        let mut client = client_over(FakeTransport::default());
        let state = client.load().await.unwrap();
        assert_eq!(state, SyncState::Empty);
        assert_eq!(client.mirror(), &ProgressDocument::new());
    }

    #[tokio::test]
    async fn test_load_failure_leaves_usable_mirror() {
        let mut client = client_over(FakeTransport {
            fail_fetch: true,
            ..Default::default()
        });

        assert!(client.load().await.is_err());
        assert_eq!(client.state(), SyncState::Failed);

        // Session can still record offline
        let granted = client.record_quiz_attempt("t1", "q1", true);
        assert!(granted > 0);
    }

    #[tokio::test]
    async fn test_flush_pushes_whole_snapshot() {
        let mut client = client_over(FakeTransport::default());
        client.load().await.unwrap();

        client.record_quiz_attempt("t1", "q1", true);
        client.mark_essay_submitted("t1");
        client.flush().await.unwrap();

        let stored = client.transport.stored("alice123").unwrap();
        assert_eq!(&stored, client.mirror());
        assert!(stored.topics["t1"].essay_submitted);
    }

    #[tokio::test]
    async fn test_failed_flush_keeps_mirror_intact() {
        let mut client = client_over(FakeTransport {
            fail_store: true,
            ..Default::default()
        });
        client.load().await.unwrap();
        client.record_quiz_attempt("t1", "q1", true);

        let before = client.mirror().clone();
        assert!(client.flush().await.is_err());
        assert_eq!(client.mirror(), &before);
    }

    #[tokio::test]
    async fn test_retry_xp_awarded_through_client() {
        // wrong then right earns the retry value
        let mut client = client_over(FakeTransport::default());
        client.load().await.unwrap();

        assert_eq!(client.record_quiz_attempt("t1", "q1", false), 0);
        let granted = client.record_quiz_attempt("t1", "q1", true);
        assert_eq!(granted, XpPolicy::default().retry);

        let topic = client.topic_progress("t1");
        assert_eq!(topic.quiz_attempts["q1"].attempts, 2);
        assert!(topic.quiz_attempts["q1"].correct);
    }

    #[tokio::test]
    async fn test_unlock_protocol_through_client() {
        // quizzes, then essay, then the one-way latch
        let requirements = vec![
            Requirement::AllQuizzesCorrect {
                quiz_ids: vec!["q1".into(), "q2".into()],
            },
            Requirement::EssaySubmitted,
        ];
        let mut client = client_over(FakeTransport::default());
        client.load().await.unwrap();

        client.record_quiz_attempt("t1", "q1", true);
        client.record_quiz_attempt("t1", "q2", true);
        assert!(!client.is_reward_unlockable("t1", &requirements));

        client.mark_essay_submitted("t1");
        assert!(client.is_reward_unlockable("t1", &requirements));

        assert!(client.mark_reward_unlocked("t1"));
        assert!(!client.mark_reward_unlocked("t1"));
        assert!(client.topic_progress("t1").reward_unlocked);
    }

    #[tokio::test]
    async fn test_last_writer_wins_across_sessions() {
        // Two sessions for the same username clobber each other's
        // writes; the store keeps whichever flush lands last.
        let shared = FakeTransport::default();
        let alice = Username::parse("alice123").unwrap();

        let mut doc_a = ProgressDocument::new();
        doc_a.record_quiz_attempt("t1", "q1", true, &XpPolicy::default());
        let mut doc_b = ProgressDocument::new();
        doc_b.record_quiz_attempt("t2", "q9", true, &XpPolicy::default());

        shared.store(&alice, "token", &doc_a).await.unwrap();
        shared.store(&alice, "token", &doc_b).await.unwrap();

        let stored = shared.stored("alice123").unwrap();
        assert_eq!(stored, doc_b);
        assert!(!stored.topics.contains_key("t1"));
    }
}
