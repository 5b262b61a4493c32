use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::file_store::FileStore;
use super::memory_store::MemoryStore;
use crate::config::StoreConfig;

/// The three named storage slots of the access layer: the two credentials
/// plus the transient verification token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialSlot {
    Access,
    Refresh,
    VerifyAccount,
}

impl CredentialSlot {
    /// The storage key each slot is persisted under.
    pub fn key(&self) -> &'static str {
        match self {
            CredentialSlot::Access => "access_token",
            CredentialSlot::Refresh => "refresh_token",
            CredentialSlot::VerifyAccount => "verify_account_token",
        }
    }
}

/// The CredentialStore trait abstracts typed get/set/remove over the named
/// slots. Pure pass-through: no validation, no expiry logic, and none of the
/// operations fail (a backend that cannot persist logs and carries on).
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, slot: CredentialSlot) -> Option<String>;
    async fn set(&self, slot: CredentialSlot, value: &str);
    async fn remove(&self, slot: CredentialSlot);
}

/// Creates a concrete store implementation based on the StoreConfig.
pub fn create_store(config: &StoreConfig) -> Arc<dyn CredentialStore> {
    match config {
        StoreConfig::Memory => {
            info!("Using in-memory credential store.");
            Arc::new(MemoryStore::new())
        }
        StoreConfig::File(file_config) => {
            info!("Using file credential store at '{}'.", file_config.path);
            Arc::new(FileStore::new(file_config))
        }
    }
}
