//! Satchel sync - the client half of the progress engine
//!
//! Holds the session's in-memory mirror of a learner's progress
//! document, loads it from the gateway on entry, and pushes whole
//! snapshots back on flush. Recorder and unlock operations act on the
//! mirror through [`SyncClient`]; each mutation that must survive a
//! reload should be followed by a flush.

pub mod client;
pub mod transport;

pub use client::{SyncClient, SyncState};
pub use transport::{HttpTransport, ProgressTransport, TransportError};
