//! Controller and session state types
//!
//! The controller cycles between two states for the life of an instance;
//! there is no terminal state. [`SessionState`] is the portion of controller
//! state that rides in the persisted projection next to the document.

use crate::types::Document;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two states of the edit-session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerState {
    /// The document may be read but not mutated.
    #[default]
    Viewing,
    /// Mutations are legal; a working baseline exists for cancel.
    Editing,
}

impl ControllerState {
    /// Whether mutations are currently legal.
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing)
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Viewing => write!(f, "viewing"),
            Self::Editing => write!(f, "editing"),
        }
    }
}

/// Session metadata persisted alongside the document.
///
/// `baseline` is the working snapshot deep-copied at `enter_edit` and used
/// only for cancel restoration within one session. `change_count` is the last
/// published uncommitted count, kept so a freshly loaded instance reports the
/// same number without recomputing against a snapshot it may not have read
/// yet.
///
/// The per-instance remote capability flag is deliberately NOT part of this
/// type: instances sharing a substrate may differ in capability, so it never
/// enters the persisted projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Current controller state.
    pub controller: ControllerState,
    /// Working snapshot for cancel restoration, present only while editing.
    pub baseline: Option<Document>,
    /// Last published uncommitted-change count.
    pub change_count: usize,
}

impl SessionState {
    /// The initial state: viewing, no baseline, zero changes.
    pub fn viewing() -> Self {
        Self {
            controller: ControllerState::Viewing,
            baseline: None,
            change_count: 0,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::viewing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_state_serde_form() {
        let viewing = serde_json::to_string(&ControllerState::Viewing).expect("serializable");
        assert_eq!(viewing, "\"viewing\"");
        let editing: ControllerState =
            serde_json::from_str("\"editing\"").expect("deserializable");
        assert!(editing.is_editing());
    }

    #[test]
    fn default_session_is_viewing() {
        let session = SessionState::default();
        assert_eq!(session.controller, ControllerState::Viewing);
        assert!(session.baseline.is_none());
        assert_eq!(session.change_count, 0);
    }
}
