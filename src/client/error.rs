/// Failure of a single gateway call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was obtained (connection refused, reset, DNS, ...)
    #[error("transport error: {0}")]
    Transport(String),

    /// The gateway answered with a non-success HTTP status
    #[error("gateway returned HTTP {status}: {detail}")]
    Status { status: u16, detail: String },

    /// The gateway answered but the body did not match the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// True when the gateway was never reached.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// HTTP status of a gateway refusal, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Extract a human-readable reason from an error body.
///
/// Prefers a JSON `detail` (or `message`) field; otherwise the trimmed raw text,
/// capped at 200 characters.
pub(crate) fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "message", "error"] {
            match value.get(key) {
                Some(serde_json::Value::String(s)) => return s.clone(),
                Some(other) if !other.is_null() => return other.to_string(),
                _ => {}
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "(empty body)".to_string();
    }
    if trimmed.chars().count() > 200 {
        format!("{}...", trimmed.chars().take(197).collect::<String>())
    } else {
        trimmed.to_string()
    }
}
