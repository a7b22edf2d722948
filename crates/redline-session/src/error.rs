//! Controller errors and commit outcome

use redline_core::{ControllerState, ItemId};
use redline_store::StoreError;
use thiserror::Error;

/// Errors surfaced by the edit-session controller.
///
/// Everything here is recoverable: illegal operations are rejected no-ops
/// (the document and snapshots are untouched), and `NotInitialized` is fatal
/// to the calling operation only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// An API call arrived before one-time setup completed.
    #[error("controller not initialized (operation: {operation})")]
    NotInitialized {
        /// The rejected operation.
        operation: &'static str,
    },

    /// A mutation was attempted outside an edit session.
    #[error("cannot {operation} outside an edit session")]
    NotEditing {
        /// The rejected operation.
        operation: &'static str,
    },

    /// A transition was attempted from the wrong state.
    #[error("cannot {operation} while {from}")]
    IllegalTransition {
        /// The rejected operation.
        operation: &'static str,
        /// The state the controller was in.
        from: ControllerState,
    },

    /// Commit was attempted without the remote capability.
    #[error("remote commit capability is not available on this instance")]
    CapabilityMissing,

    /// A mutation addressed an item that does not exist.
    #[error("no item with id {id}")]
    UnknownItem {
        /// The missing id.
        id: ItemId,
    },

    /// The store or its collaborators failed underneath the controller.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How a commit concluded.
///
/// Both variants mean the state transition succeeded and the committed
/// snapshot advanced; `LocalOnly` records that the remote push failed and the
/// document is durable locally only — a warning, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The remote persistence service accepted the document.
    Committed,
    /// The remote push failed; local durability only.
    LocalOnly {
        /// Why the remote push failed.
        reason: String,
    },
}

impl CommitOutcome {
    /// Whether the remote service accepted the document.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Committed)
    }
}
