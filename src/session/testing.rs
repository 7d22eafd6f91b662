//! Scripted in-process gateway for component tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::client::{ApiError, GatewayApi};
use crate::models::{
    AuditRecord, CommandStatus, Credential, ExecutionResult, Identity, RecordId, Role, RuleDraft,
};

use super::activity::Action;

pub(crate) fn admin() -> Identity {
    Identity {
        username: "root".to_string(),
        role: Role::Admin,
        credits: 100,
    }
}

pub(crate) fn member() -> Identity {
    Identity {
        username: "alice".to_string(),
        role: Role::Member,
        credits: 10,
    }
}

pub(crate) fn executed(message: &str, credits: i64) -> ExecutionResult {
    verdict("EXECUTED", message, credits)
}

pub(crate) fn verdict(status: &str, message: &str, credits: i64) -> ExecutionResult {
    ExecutionResult {
        status: CommandStatus::new(status),
        message: message.to_string(),
        credits_remaining: credits,
    }
}

pub(crate) fn audit_record(id: i64, command: &str, status: &str) -> AuditRecord {
    AuditRecord {
        id: RecordId::Number(id),
        timestamp: "2024-05-01T12:00:00".to_string(),
        username: "root".to_string(),
        command: command.to_string(),
        status: status.to_string(),
    }
}

pub(crate) fn refused(status: u16, detail: &str) -> ApiError {
    ApiError::Status {
        status,
        detail: detail.to_string(),
    }
}

pub(crate) fn unreachable() -> ApiError {
    ApiError::Transport("connection refused".to_string())
}

/// Gateway answering from queued responses and a credential table.
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    identities: Mutex<HashMap<String, Identity>>,
    offline: AtomicBool,
    executions: Mutex<VecDeque<Result<ExecutionResult, ApiError>>>,
    rule_results: Mutex<VecDeque<Result<(), ApiError>>>,
    audit_results: Mutex<VecDeque<Result<Vec<AuditRecord>, ApiError>>>,
    gates: Mutex<HashMap<Action, oneshot::Receiver<()>>>,
    calls: Mutex<Vec<String>>,
    submitted_rules: Mutex<Vec<RuleDraft>>,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_user(self, credential: &str, identity: Identity) -> Self {
        self.identities
            .lock()
            .unwrap()
            .insert(credential.to_string(), identity);
        self
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn queue_execution(&self, result: Result<ExecutionResult, ApiError>) {
        self.executions.lock().unwrap().push_back(result);
    }

    pub(crate) fn queue_rule(&self, result: Result<(), ApiError>) {
        self.rule_results.lock().unwrap().push_back(result);
    }

    pub(crate) fn queue_audit(&self, result: Result<Vec<AuditRecord>, ApiError>) {
        self.audit_results.lock().unwrap().push_back(result);
    }

    /// Hold the next call backing `action` until the returned sender fires.
    pub(crate) fn hold_next(&self, action: Action) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(action, rx);
        tx
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn submitted_rules(&self) -> Vec<RuleDraft> {
        self.submitted_rules.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    async fn pass_gate(&self, action: Action) {
        let gate = self.gates.lock().unwrap().remove(&action);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }
}

#[async_trait]
impl GatewayApi for ScriptedGateway {
    async fn fetch_identity(&self, credential: &Credential) -> Result<Identity, ApiError> {
        self.record("GET /users/me");
        self.pass_gate(Action::Login).await;
        if self.offline.load(Ordering::SeqCst) {
            return Err(unreachable());
        }
        self.identities
            .lock()
            .unwrap()
            .get(credential.expose())
            .cloned()
            .ok_or_else(|| refused(401, "Invalid API Key"))
    }

    async fn execute_command(
        &self,
        _credential: &Credential,
        command: &str,
    ) -> Result<ExecutionResult, ApiError> {
        self.record(format!("POST /commands/execute {command}"));
        self.pass_gate(Action::Execute).await;
        self.executions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unreachable()))
    }

    async fn create_rule(&self, _credential: &Credential, draft: &RuleDraft) -> Result<(), ApiError> {
        self.record("POST /rules");
        self.pass_gate(Action::SubmitRule).await;
        self.submitted_rules.lock().unwrap().push(draft.clone());
        self.rule_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn list_audit_logs(&self, _credential: &Credential) -> Result<Vec<AuditRecord>, ApiError> {
        self.record("GET /audit-logs");
        self.pass_gate(Action::RefreshAudit).await;
        self.audit_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
