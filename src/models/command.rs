use serde::{Deserialize, Serialize};

/// Body of `POST /commands/execute`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandRequest {
    pub command: String,
}

/// Verdict string returned by the gateway for an execution request.
///
/// Only `EXECUTED` has meaning to the console; every other value (`BLOCKED`,
/// `DENIED`, ...) is a policy rejection and is displayed verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CommandStatus(String);

impl CommandStatus {
    pub const EXECUTED: &'static str = "EXECUTED";

    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn is_executed(&self) -> bool {
        self.0 == Self::EXECUTED
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Response of `POST /commands/execute`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status: CommandStatus,
    pub message: String,
    pub credits_remaining: i64,
}

impl ExecutionResult {
    /// Transcript line for this result: `[<status>] <message>`.
    pub fn summary(&self) -> String {
        format!("[{}] {}", self.status, self.message)
    }
}
