use std::sync::Arc;

use tracing::{info, warn};

use crate::client::GatewayApi;
use crate::models::AuditRecord;

use super::Session;
use super::activity::Action;
use super::error::ConsoleError;

/// Pulls the gateway audit trail on request. Admin only.
pub struct AuditViewer {
    api: Arc<dyn GatewayApi>,
    session: Session,
}

impl AuditViewer {
    pub fn new(api: Arc<dyn GatewayApi>, session: Session) -> Self {
        Self { api, session }
    }

    /// Currently displayed records
    pub async fn records(&self) -> Vec<AuditRecord> {
        self.session.lock().await.audit_records.clone()
    }

    /// Fetch the full audit trail and replace the displayed set with it.
    ///
    /// On failure the previously displayed set is kept as is.
    pub async fn refresh(&self) -> Result<Vec<AuditRecord>, ConsoleError> {
        let (credential, epoch) = self.session.admin(Action::RefreshAudit).await?;
        let _guard = self.session.begin(Action::RefreshAudit)?;

        let records = self
            .api
            .list_audit_logs(&credential)
            .await
            .map_err(|err| {
                warn!("Failed to fetch audit logs: {}", err);
                ConsoleError::from_api(err)
            })?;

        let mut state = self.session.lock().await;
        if state.epoch == epoch {
            state.audit_records = records.clone();
        }
        info!("Loaded {} audit records", records.len());
        Ok(records)
    }
}
