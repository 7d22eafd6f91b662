//! Operator session and the components that reconcile it with the gateway.
//!
//! [`Session`] is the single shared state. [`SessionManager`] owns identity
//! and credentials; [`CommandConsole`], [`RuleAdmin`], and [`AuditViewer`]
//! operate only once the session is authenticated.

pub mod activity;
pub mod audit;
pub mod console;
pub mod error;
pub mod manager;
pub mod rules;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use activity::{Action, ActionGuard, Activity};
pub use audit::AuditViewer;
pub use console::{CommandConsole, CommandOutcome};
pub use error::ConsoleError;
pub use manager::{RestoreOutcome, SessionManager};
pub use rules::RuleAdmin;
pub use state::{SessionPhase, SessionSnapshot, SessionState};

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::models::{Credential, Identity, RuleDraft, Transcript};

/// Cloneable handle to the shared session state.
#[derive(Clone, Default)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
    activity: Arc<Activity>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn phase(&self) -> SessionPhase {
        let state = self.state.lock().await;
        self.phase_of(&state)
    }

    fn phase_of(&self, state: &SessionState) -> SessionPhase {
        if state.identity.is_some() {
            SessionPhase::Authenticated
        } else if self.activity.is_busy(Action::Login) {
            SessionPhase::Authenticating
        } else {
            SessionPhase::Anonymous
        }
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.state.lock().await.identity.clone()
    }

    pub async fn transcript(&self) -> Transcript {
        self.state.lock().await.transcript.clone()
    }

    pub async fn rule_draft(&self) -> RuleDraft {
        self.state.lock().await.rule_draft.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            phase: self.phase_of(&state),
            in_flight: self.activity.busy(),
            has_pending_credential: state.has_pending_credential(),
            state: state.clone(),
        }
    }

    pub fn is_busy(&self, action: Action) -> bool {
        self.activity.is_busy(action)
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    pub(crate) fn begin(&self, action: Action) -> Result<ActionGuard, ConsoleError> {
        self.activity.begin(action)
    }

    /// Credential and identity of the authenticated session, plus its epoch.
    pub(crate) async fn authenticated(&self) -> Result<(Credential, Identity, u64), ConsoleError> {
        let state = self.state.lock().await;
        match (&state.credential, &state.identity) {
            (Some(credential), Some(identity)) => {
                Ok((credential.clone(), identity.clone(), state.epoch))
            }
            _ => Err(ConsoleError::NotAuthenticated),
        }
    }

    /// Like [`Session::authenticated`] but also requires the admin role.
    pub(crate) async fn admin(&self, action: Action) -> Result<(Credential, u64), ConsoleError> {
        let (credential, identity, epoch) = self.authenticated().await?;
        if !identity.is_admin() {
            return Err(ConsoleError::PermissionDenied { action });
        }
        Ok((credential, epoch))
    }
}
