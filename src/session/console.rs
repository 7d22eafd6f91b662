use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::{ApiError, GatewayApi};
use crate::models::{EntryKind, ExecutionResult};

use super::Session;
use super::activity::Action;
use super::error::ConsoleError;

/// Generic transcript line when no response was obtained.
pub const CONNECTION_LOST: &str = "Error: Connection lost or server failure.";

/// What happened to one submitted command
#[derive(Debug)]
pub enum CommandOutcome {
    /// Blank input; nothing was sent or recorded
    Ignored,
    /// The gateway executed the command
    Executed(ExecutionResult),
    /// The gateway refused the command by policy
    Rejected(ExecutionResult),
    /// No usable response; credits untouched
    Failed(ApiError),
    /// The session ended while the command was in flight; the response was dropped
    Abandoned,
}

impl CommandOutcome {
    pub fn credits_remaining(&self) -> Option<i64> {
        match self {
            CommandOutcome::Executed(result) | CommandOutcome::Rejected(result) => {
                Some(result.credits_remaining)
            }
            _ => None,
        }
    }
}

/// Submits commands and reconciles the transcript and credit balance.
pub struct CommandConsole {
    api: Arc<dyn GatewayApi>,
    session: Session,
}

impl CommandConsole {
    pub fn new(api: Arc<dyn GatewayApi>, session: Session) -> Self {
        Self { api, session }
    }

    /// Replace the pending command line. Refused while a command is in flight.
    pub async fn set_input(&self, text: impl Into<String>) -> Result<(), ConsoleError> {
        if self.session.is_busy(Action::Execute) {
            return Err(ConsoleError::Busy(Action::Execute));
        }
        self.session.lock().await.command_input = text.into();
        Ok(())
    }

    pub async fn input(&self) -> String {
        self.session.lock().await.command_input.clone()
    }

    /// Execute the pending command line, then clear it.
    ///
    /// Blank input is ignored and left in place. Any attempt that reached the
    /// gateway (or failed to) clears the line whatever the verdict.
    pub async fn submit(&self) -> Result<CommandOutcome, ConsoleError> {
        let command = self.input().await;
        let outcome = self.execute(&command).await?;

        if !matches!(outcome, CommandOutcome::Ignored) {
            self.session.lock().await.command_input.clear();
        }
        Ok(outcome)
    }

    /// Send `command` to the gateway.
    ///
    /// The echo entry is appended before the request leaves; exactly one
    /// result entry follows it once the call resolves. Credits are taken from
    /// the response, whatever the verdict.
    pub async fn execute(&self, command: &str) -> Result<CommandOutcome, ConsoleError> {
        if command.trim().is_empty() {
            return Ok(CommandOutcome::Ignored);
        }

        let (credential, _, epoch) = self.session.authenticated().await?;
        let _guard = self.session.begin(Action::Execute)?;

        self.session
            .lock()
            .await
            .transcript
            .push(EntryKind::UserEcho, format!("> {}", command));
        debug!("Submitting command ({} chars)", command.len());

        let response = self.api.execute_command(&credential, command).await;

        let mut state = self.session.lock().await;
        if state.epoch != epoch {
            warn!("Session ended while a command was in flight; dropping its response");
            return Ok(CommandOutcome::Abandoned);
        }

        let outcome = match response {
            Ok(result) => {
                let kind = if result.status.is_executed() {
                    EntryKind::Success
                } else {
                    EntryKind::Error
                };
                state.transcript.push(kind, result.summary());
                if let Some(identity) = state.identity.as_mut() {
                    identity.credits = result.credits_remaining;
                }
                info!(
                    "Command {}: {} credits remaining",
                    result.status, result.credits_remaining
                );

                if result.status.is_executed() {
                    CommandOutcome::Executed(result)
                } else {
                    CommandOutcome::Rejected(result)
                }
            }
            Err(err) => {
                warn!("Command failed: {}", err);
                state.transcript.push(EntryKind::Error, failure_text(&err));
                CommandOutcome::Failed(err)
            }
        };

        Ok(outcome)
    }
}

fn failure_text(err: &ApiError) -> String {
    match err {
        ApiError::Status { status, detail } => {
            format!("Error: gateway refused the request (HTTP {}): {}", status, detail)
        }
        ApiError::Transport(_) | ApiError::InvalidResponse(_) => CONNECTION_LOST.to_string(),
    }
}
