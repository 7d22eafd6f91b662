//! Busy/idle tracking for user-triggered actions.
//!
//! Each action may have at most one call in flight. The flag is released when
//! the returned [`ActionGuard`] is dropped, including when the owning future is
//! dropped before completion.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use super::error::ConsoleError;

/// A user-triggered remote action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Login,
    Execute,
    SubmitRule,
    RefreshAudit,
}

impl Action {
    const ALL: [Action; 4] = [
        Action::Login,
        Action::Execute,
        Action::SubmitRule,
        Action::RefreshAudit,
    ];

    fn index(self) -> usize {
        match self {
            Action::Login => 0,
            Action::Execute => 1,
            Action::SubmitRule => 2,
            Action::RefreshAudit => 3,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Login => write!(f, "login"),
            Action::Execute => write!(f, "command execution"),
            Action::SubmitRule => write!(f, "rule submission"),
            Action::RefreshAudit => write!(f, "audit refresh"),
        }
    }
}

/// In-flight flags, one per [`Action`].
#[derive(Debug, Default)]
pub struct Activity {
    flags: [AtomicBool; 4],
}

impl Activity {
    /// Mark `action` busy, or fail with [`ConsoleError::Busy`] if it already is.
    pub fn begin(self: &Arc<Self>, action: Action) -> Result<ActionGuard, ConsoleError> {
        self.flags[action.index()]
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ConsoleError::Busy(action))?;

        Ok(ActionGuard {
            activity: Arc::clone(self),
            action,
        })
    }

    pub fn is_busy(&self, action: Action) -> bool {
        self.flags[action.index()].load(Ordering::Acquire)
    }

    /// Actions currently in flight
    pub fn busy(&self) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|action| self.is_busy(*action))
            .collect()
    }
}

/// Holds an action busy until dropped.
#[derive(Debug)]
pub struct ActionGuard {
    activity: Arc<Activity>,
    action: Action,
}

impl ActionGuard {
    pub fn action(&self) -> Action {
        self.action
    }
}

impl Drop for ActionGuard {
    fn drop(&mut self) {
        self.activity.flags[self.action.index()].store(false, Ordering::Release);
    }
}
