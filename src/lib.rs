pub mod app;
pub mod client;
pub mod config;
pub mod models;
pub mod session;
pub mod store;
pub mod terminal;

// Re-export main types
pub use app::ConsoleApp;
pub use client::{ApiError, GatewayApi, HttpGateway};
pub use config::ConsoleConfig;
pub use models::{AuditRecord, Credential, EntryKind, ExecutionResult, Identity, Role, RuleAction, RuleDraft};
pub use session::{
    AuditViewer, CommandConsole, CommandOutcome, ConsoleError, RestoreOutcome, RuleAdmin, Session,
    SessionManager, SessionPhase,
};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
