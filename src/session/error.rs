use crate::client::ApiError;

use super::activity::Action;

/// Errors surfaced by session operations.
///
/// Policy rejections of a command are not errors: they are recorded in the
/// transcript and returned as a [`super::CommandOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Login failed; no session state was changed
    #[error("access denied: {reason}")]
    AuthenticationFailed {
        reason: String,
        #[source]
        source: Option<ApiError>,
    },

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("already authenticated as {username}")]
    AlreadyAuthenticated { username: String },

    #[error("{action} requires the admin role")]
    PermissionDenied { action: Action },

    #[error("{0} already in progress")]
    Busy(Action),

    /// The gateway could not be reached
    #[error("connection lost or server failure: {0}")]
    Transport(#[source] ApiError),

    /// The gateway refused a rule draft
    #[error("rule rejected: {detail}")]
    ValidationFailed { detail: String },

    /// The gateway answered with an unexpected failure
    #[error("request failed: {0}")]
    Gateway(#[source] ApiError),

    #[error("credential storage failed: {0:#}")]
    Storage(#[source] anyhow::Error),
}

impl ConsoleError {
    /// True when the failure means the gateway was never reached.
    pub fn is_transport(&self) -> bool {
        match self {
            ConsoleError::Transport(_) => true,
            ConsoleError::AuthenticationFailed {
                source: Some(err), ..
            } => err.is_transport(),
            _ => false,
        }
    }

    /// Classify a non-login gateway failure.
    pub(crate) fn from_api(err: ApiError) -> Self {
        if err.is_transport() {
            ConsoleError::Transport(err)
        } else {
            ConsoleError::Gateway(err)
        }
    }
}
