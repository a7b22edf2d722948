//! # Redline Session
//!
//! The edit-session state machine: the authoritative controller of legal
//! mutation windows. [`EditSession`] is the full API surface consumed by a
//! rendering layer — it owns the committed snapshot, orchestrates snapshot
//! capture, commit, and cancel, and guards every mutation behind the
//! `Viewing`/`Editing` machine.
//!
//! The controller is an explicit object constructed once per instance with
//! its collaborators injected — no ambient singletons, no environment
//! probing. The remote capability is a constructor-time value, which also
//! makes it trivially mockable in tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Controller configuration
pub mod config;

/// Controller errors and commit outcome
pub mod error;

/// The edit-session controller
pub mod session;

pub use config::SessionConfig;
pub use error::{CommitOutcome, SessionError};
pub use session::EditSession;
