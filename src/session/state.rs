use serde::{Deserialize, Serialize};

use crate::models::{AuditRecord, Credential, Identity, RuleDraft, Transcript};

use super::activity::Action;

/// Lifecycle of the operator session:
/// `anonymous -> authenticating -> authenticated -> anonymous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Anonymous => write!(f, "anonymous"),
            SessionPhase::Authenticating => write!(f, "authenticating"),
            SessionPhase::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Everything the console holds locally about the current operator.
///
/// Mutated only by the session components. Credentials are never serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Credential of the authenticated session
    #[serde(skip)]
    pub(crate) credential: Option<Credential>,
    /// Credential loaded from storage, not yet validated
    #[serde(skip)]
    pub(crate) pending_credential: Option<Credential>,
    /// Present iff authenticated
    pub(crate) identity: Option<Identity>,
    pub(crate) transcript: Transcript,
    /// Command line not yet submitted
    pub(crate) command_input: String,
    pub(crate) rule_draft: RuleDraft,
    /// Last successfully fetched audit trail
    pub(crate) audit_records: Vec<AuditRecord>,
    /// Bumped on every login and logout. Responses that resolve after the
    /// session they were issued in has ended are dropped.
    #[serde(skip)]
    pub(crate) epoch: u64,
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn command_input(&self) -> &str {
        &self.command_input
    }

    pub fn rule_draft(&self) -> &RuleDraft {
        &self.rule_draft
    }

    pub fn audit_records(&self) -> &[AuditRecord] {
        &self.audit_records
    }

    pub fn has_pending_credential(&self) -> bool {
        self.pending_credential.is_some()
    }

    /// Start a fresh authenticated session.
    pub(crate) fn begin_session(&mut self, credential: Credential, identity: Identity) {
        let epoch = self.epoch.wrapping_add(1);
        *self = SessionState {
            credential: Some(credential),
            identity: Some(identity),
            epoch,
            ..SessionState::default()
        };
    }

    /// Drop identity, credentials, and all session-scoped state.
    pub(crate) fn end_session(&mut self) {
        let epoch = self.epoch.wrapping_add(1);
        *self = SessionState {
            epoch,
            ..SessionState::default()
        };
    }
}

/// Point-in-time, serializable view of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub in_flight: Vec<Action>,
    pub has_pending_credential: bool,
    #[serde(flatten)]
    pub state: SessionState,
}
