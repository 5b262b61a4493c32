use std::path::PathBuf;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::warn;

use super::base::{CredentialSlot, CredentialStore};

/// The config struct for the file-backed credential store.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct FileStoreConfig {
    pub path: String,
}

/// On-disk document shape. One small JSON file holding the three slots.
#[derive(Serialize, Deserialize, Default)]
struct CredentialFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verify_account_token: Option<String>,
}

impl CredentialFile {
    fn slot(&self, slot: CredentialSlot) -> &Option<String> {
        match slot {
            CredentialSlot::Access => &self.access_token,
            CredentialSlot::Refresh => &self.refresh_token,
            CredentialSlot::VerifyAccount => &self.verify_account_token,
        }
    }

    fn slot_mut(&mut self, slot: CredentialSlot) -> &mut Option<String> {
        match slot {
            CredentialSlot::Access => &mut self.access_token,
            CredentialSlot::Refresh => &mut self.refresh_token,
            CredentialSlot::VerifyAccount => &mut self.verify_account_token,
        }
    }
}

/// A `CredentialStore` that persists credentials across restarts.
/// Read-modify-write cycles run under a single lock so concurrent refreshes
/// and terminations never interleave on the file.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(config: &FileStoreConfig) -> Self {
        FileStore {
            path: PathBuf::from(&config.path),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> CredentialFile {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(
                    "Credential file '{}' is not valid JSON ({}), starting empty.",
                    self.path.display(),
                    e
                );
                CredentialFile::default()
            }),
            // Missing file means nothing stored yet.
            Err(_) => CredentialFile::default(),
        }
    }

    async fn save(&self, file: &CredentialFile) {
        let contents = match serde_json::to_string_pretty(file) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to serialize credential file: {}", e);
                return;
            }
        };
        if let Err(e) = tokio::fs::write(&self.path, contents).await {
            warn!(
                "Failed to write credential file '{}': {}",
                self.path.display(),
                e
            );
        }
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn get(&self, slot: CredentialSlot) -> Option<String> {
        let _guard = self.lock.lock().await;
        self.load().await.slot(slot).clone()
    }

    async fn set(&self, slot: CredentialSlot, value: &str) {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await;
        *file.slot_mut(slot) = Some(value.to_string());
        self.save(&file).await;
    }

    async fn remove(&self, slot: CredentialSlot) {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await;
        *file.slot_mut(slot) = None;
        self.save(&file).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileStore {
        FileStore::new(&FileStoreConfig {
            path: dir
                .path()
                .join("credentials.json")
                .to_string_lossy()
                .to_string(),
        })
    }

    #[tokio::test]
    async fn test_persists_across_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.set(CredentialSlot::Access, "t1").await;
        store.set(CredentialSlot::Refresh, "r1").await;

        let reopened = store_in(&dir);
        assert_eq!(
            reopened.get(CredentialSlot::Access).await,
            Some("t1".to_string())
        );
        assert_eq!(
            reopened.get(CredentialSlot::Refresh).await,
            Some("r1".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        assert_eq!(store.get(CredentialSlot::Access).await, None);
    }

    #[tokio::test]
    async fn test_remove_clears_only_one_slot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.set(CredentialSlot::Access, "t1").await;
        store.set(CredentialSlot::VerifyAccount, "v1").await;

        store.remove(CredentialSlot::Access).await;
        assert_eq!(store.get(CredentialSlot::Access).await, None);
        assert_eq!(
            store.get(CredentialSlot::VerifyAccount).await,
            Some("v1".to_string())
        );
    }
}
