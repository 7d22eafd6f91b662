pub mod files;
pub mod memory;

pub use files::FileCredentialStore;
pub use memory::MemoryCredentialStore;

use anyhow::Result;
use async_trait::async_trait;

/// Slot holding the raw credential between runs.
pub const CREDENTIAL_KEY: &str = "api_key";

/// Durable keyed storage for client-side secrets
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
