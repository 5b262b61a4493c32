use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::store::file_store::FileStoreConfig;

/// The available credential store backends, differentiated via a "backend"
/// tag in the YAML. The memory backend is the default and needs no options.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Default)]
#[serde(tag = "backend")]
pub enum StoreConfig {
    #[default]
    #[serde(rename = "memory")]
    Memory,
    #[serde(rename = "file")]
    File(FileStoreConfig),
}
