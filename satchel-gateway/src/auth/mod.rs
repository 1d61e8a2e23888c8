//! Write-token authentication
//!
//! There is no account database: the write token for a username is
//! deterministically derivable from the server secret. This is a
//! capability check against third-party forgery, not a per-user
//! credential - an explicit trade-off for a zero-signup product.

pub mod token;

pub use token::{derive_token, verify_token};
