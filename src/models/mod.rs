pub mod audit;
pub mod command;
pub mod identity;
pub mod rule;
pub mod transcript;

pub use audit::{AuditRecord, RecordId};
pub use command::{CommandRequest, CommandStatus, ExecutionResult};
pub use identity::{Credential, Identity, Role};
pub use rule::{RuleAction, RuleDraft};
pub use transcript::{EntryKind, Transcript, TranscriptEntry};
