use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::base::{CredentialSlot, CredentialStore};

/// Process-local credential storage. The default backend, and the one the
/// tests use; nothing survives a restart.
pub struct MemoryStore {
    slots: Mutex<HashMap<CredentialSlot, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, slot: CredentialSlot) -> Option<String> {
        self.slots.lock().await.get(&slot).cloned()
    }

    async fn set(&self, slot: CredentialSlot, value: &str) {
        self.slots.lock().await.insert(slot, value.to_string());
    }

    async fn remove(&self, slot: CredentialSlot) {
        self.slots.lock().await.remove(&slot);
    }
}
