//! Worker lifecycle states and transitions
//!
//! ```text
//! parsed -> installing -> waiting -> activating -> active -> redundant
//!               |                        |
//!               +-> redundant            +-> waiting (cleanup failed)
//! ```
//!
//! A failed install makes the version redundant; the host may retry it.
//! Re-running install on a waiting or active worker is not a transition:
//! the bucket is refreshed while the worker stays where it is.

use crate::error::{ProxyError, ProxyResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a proxy version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    /// Registered, install not yet run
    #[default]
    Parsed,
    Installing,
    /// Installed, not yet controlling pages
    Waiting,
    Activating,
    /// Controlling pages; fetches are routed through the bucket
    Active,
    /// Failed install or superseded
    Redundant,
}

impl WorkerState {
    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(self, next: WorkerState) -> bool {
        use WorkerState::*;
        matches!(
            (self, next),
            (Parsed | Redundant, Installing)
                | (Installing, Waiting | Redundant)
                | (Waiting, Activating)
                | (Activating, Active | Waiting)
                | (Waiting | Active, Redundant)
        )
    }

    /// Whether the bucket has been fully populated at least once
    pub fn is_installed(self) -> bool {
        matches!(self, WorkerState::Waiting | WorkerState::Active)
    }

    /// Whether intercepted requests go through the routing policies
    pub fn controls_clients(self) -> bool {
        self == WorkerState::Active
    }

    /// Apply a transition, returning the new state
    pub fn transition(self, next: WorkerState) -> ProxyResult<WorkerState> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ProxyError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Waiting => "waiting",
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Redundant => "redundant",
        };
        f.write_str(name)
    }
}
