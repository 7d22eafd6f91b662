mod error;
pub mod http;

pub use error::ApiError;
pub use http::HttpGateway;

use async_trait::async_trait;

use crate::models::{AuditRecord, Credential, ExecutionResult, Identity, RuleDraft};

/// Remote command-gating service.
///
/// Every call carries the credential; the gateway alone decides identity,
/// policy outcome, credit accounting, and rule validity.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// `GET /users/me`
    async fn fetch_identity(&self, credential: &Credential) -> Result<Identity, ApiError>;

    /// `POST /commands/execute`
    async fn execute_command(
        &self,
        credential: &Credential,
        command: &str,
    ) -> Result<ExecutionResult, ApiError>;

    /// `POST /rules`
    async fn create_rule(&self, credential: &Credential, draft: &RuleDraft) -> Result<(), ApiError>;

    /// `GET /audit-logs`
    async fn list_audit_logs(&self, credential: &Credential) -> Result<Vec<AuditRecord>, ApiError>;
}
