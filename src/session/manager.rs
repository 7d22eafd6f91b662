use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::{ApiError, GatewayApi};
use crate::models::{Credential, EntryKind, Identity};
use crate::store::{CREDENTIAL_KEY, CredentialStore};

use super::Session;
use super::activity::Action;
use super::error::ConsoleError;

/// Result of loading a persisted credential at startup
#[derive(Debug)]
pub enum RestoreOutcome {
    /// Nothing persisted
    NoCredential,
    /// Credential loaded as pending, not yet validated
    Pending,
    /// Credential re-validated; the session is authenticated
    Restored(Identity),
    /// The gateway rejected the credential; it was removed from storage
    Rejected,
    /// The gateway could not be reached; the credential stays pending
    Unreachable(ApiError),
}

/// Sole writer of identity and credentials.
pub struct SessionManager {
    api: Arc<dyn GatewayApi>,
    store: Arc<dyn CredentialStore>,
    session: Session,
}

impl SessionManager {
    pub fn new(
        api: Arc<dyn GatewayApi>,
        store: Arc<dyn CredentialStore>,
        session: Session,
    ) -> Self {
        Self {
            api,
            store,
            session,
        }
    }

    /// Load the persisted credential as pending and, if asked, re-validate it.
    ///
    /// A persisted credential is never trusted on its own: the session stays
    /// anonymous until the gateway confirms the identity.
    pub async fn restore(&self, revalidate: bool) -> Result<RestoreOutcome, ConsoleError> {
        let stored = self
            .store
            .get(CREDENTIAL_KEY)
            .await
            .map_err(ConsoleError::Storage)?;

        let credential = match stored.map(Credential::new) {
            Some(credential) if !credential.is_blank() => credential,
            _ => return Ok(RestoreOutcome::NoCredential),
        };

        {
            let mut state = self.session.lock().await;
            if let Some(identity) = &state.identity {
                return Ok(RestoreOutcome::Restored(identity.clone()));
            }
            state.pending_credential = Some(credential.clone());
        }
        debug!("Loaded persisted credential as pending");

        if !revalidate {
            return Ok(RestoreOutcome::Pending);
        }

        match self.login(credential).await {
            Ok(identity) => Ok(RestoreOutcome::Restored(identity)),
            Err(ConsoleError::AuthenticationFailed {
                source: Some(err), ..
            }) if err.is_transport() => {
                warn!("Gateway unreachable, persisted credential kept pending: {}", err);
                Ok(RestoreOutcome::Unreachable(err))
            }
            Err(ConsoleError::AuthenticationFailed { reason, .. }) => {
                warn!("Persisted credential rejected ({}), discarding it", reason);
                self.session.lock().await.pending_credential = None;
                self.store
                    .remove(CREDENTIAL_KEY)
                    .await
                    .map_err(ConsoleError::Storage)?;
                Ok(RestoreOutcome::Rejected)
            }
            Err(other) => Err(other),
        }
    }

    /// Validate `candidate` against the gateway and open a session.
    ///
    /// Nothing is committed unless the gateway confirms the identity and the
    /// credential has been persisted.
    pub async fn login(&self, candidate: Credential) -> Result<Identity, ConsoleError> {
        if candidate.is_blank() {
            return Err(ConsoleError::AuthenticationFailed {
                reason: "empty API key".to_string(),
                source: None,
            });
        }

        let epoch = {
            let state = self.session.lock().await;
            if let Some(identity) = &state.identity {
                return Err(ConsoleError::AlreadyAuthenticated {
                    username: identity.username.clone(),
                });
            }
            state.epoch
        };

        let _guard = self.session.begin(Action::Login)?;

        let identity = self.api.fetch_identity(&candidate).await.map_err(|err| {
            let reason = match &err {
                ApiError::Transport(_) => "gateway unreachable".to_string(),
                ApiError::Status {
                    status: 401 | 403, ..
                } => "invalid API key".to_string(),
                other => other.to_string(),
            };
            ConsoleError::AuthenticationFailed {
                reason,
                source: Some(err),
            }
        })?;

        // Held until the session is committed so a logout cannot interleave
        let mut state = self.session.lock().await;
        if state.epoch != epoch {
            warn!("Logged out while login was in flight; discarding it");
            return Err(ConsoleError::AuthenticationFailed {
                reason: "logged out during login".to_string(),
                source: None,
            });
        }

        self.store
            .set(CREDENTIAL_KEY, candidate.expose())
            .await
            .map_err(ConsoleError::Storage)?;

        state.begin_session(candidate, identity.clone());
        state.transcript.push(
            EntryKind::Info,
            format!("System initialized. Welcome, {}.", identity.username),
        );
        drop(state);

        info!(
            "Authenticated as {} ({}), {} credits",
            identity.username, identity.role, identity.credits
        );
        Ok(identity)
    }

    /// Close the session and forget the credential. Local only.
    pub async fn logout(&self) {
        self.session.lock().await.end_session();

        if let Err(err) = self.store.remove(CREDENTIAL_KEY).await {
            warn!("Failed to remove persisted credential: {:#}", err);
        }
        info!("Session closed");
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
