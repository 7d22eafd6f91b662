use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Audit record identifier. The gateway may use numeric or string keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// One entry of `GET /audit-logs`. Read-only on the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditRecord {
    pub id: RecordId,
    pub timestamp: String,
    pub username: String,
    pub command: String,
    pub status: String,
}

impl AuditRecord {
    pub fn is_executed(&self) -> bool {
        self.status == crate::models::CommandStatus::EXECUTED
    }

    /// Parse the gateway timestamp. Accepts RFC 3339 and naive ISO 8601
    /// (interpreted as UTC).
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    /// Local time-of-day, or the raw timestamp when it cannot be parsed.
    pub fn local_time(&self) -> String {
        match self.parsed_timestamp() {
            Some(dt) => dt.with_timezone(&Local).format("%H:%M:%S").to_string(),
            None => self.timestamp.clone(),
        }
    }
}
