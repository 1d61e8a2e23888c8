//! Satchel core - learner progress model and rules
//!
//! The pure half of the progress engine: the per-learner progress
//! document, the quiz/essay recorder that mutates it, and the
//! reward-unlock evaluator that reads it. No I/O lives here; the
//! gateway and sync client wrap these types with storage and
//! transport.

pub mod document;
pub mod recorder;
pub mod unlock;
pub mod username;

pub use document::{ProgressDocument, QuizAttempt, TopicProgress};
pub use recorder::XpPolicy;
pub use unlock::Requirement;
pub use username::{Username, UsernameError};
