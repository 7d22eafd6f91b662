use std::sync::Arc;

use anyhow::{Context, Result};

use crate::client::{GatewayApi, HttpGateway};
use crate::config::ConsoleConfig;
use crate::session::{AuditViewer, CommandConsole, RuleAdmin, Session, SessionManager};
use crate::store::{CredentialStore, FileCredentialStore};

/// The four session components wired around one shared [`Session`].
pub struct ConsoleApp {
    pub session: Session,
    pub manager: SessionManager,
    pub console: CommandConsole,
    pub rules: RuleAdmin,
    pub audit: AuditViewer,
}

impl ConsoleApp {
    pub fn new(api: Arc<dyn GatewayApi>, store: Arc<dyn CredentialStore>) -> Self {
        let session = Session::new();
        Self {
            manager: SessionManager::new(Arc::clone(&api), store, session.clone()),
            console: CommandConsole::new(Arc::clone(&api), session.clone()),
            rules: RuleAdmin::new(Arc::clone(&api), session.clone()),
            audit: AuditViewer::new(api, session.clone()),
            session,
        }
    }

    /// HTTP gateway plus file-backed credential storage, as configured.
    pub fn from_config(config: &ConsoleConfig) -> Result<Self> {
        let api = HttpGateway::new(&config.api).context("Failed to create HTTP client")?;
        let store = FileCredentialStore::new(config.storage_path());
        Ok(Self::new(Arc::new(api), Arc::new(store)))
    }
}
