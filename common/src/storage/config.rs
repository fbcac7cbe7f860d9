//! Storage configuration.
//!
//! Configuration values deserialize from TOML or any other serde format:
//!
//! ```toml
//! [storage]
//! type = "SlateDb"
//! path = "lots"
//! settings_path = "slatedb.toml"
//!
//! [storage.object_store]
//! type = "Local"
//! path = "/var/lib/lot-ledger"
//! ```

use serde::{Deserialize, Serialize};

/// Selects and configures the storage backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StorageConfig {
    /// Process-local ordered map. Contents are lost when the process exits.
    #[default]
    InMemory,
    /// SlateDB over an object store. Requires the `slatedb` feature.
    SlateDb(SlateDbStorageConfig),
}

/// Settings for a SlateDB-backed store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlateDbStorageConfig {
    /// Path prefix of the database inside the object store.
    pub path: String,
    /// Object store holding the database files.
    pub object_store: ObjectStoreConfig,
    /// Optional SlateDB settings file. SlateDB's own defaults and environment
    /// are used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_path: Option<String>,
}

/// Object store backing a SlateDB database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectStoreConfig {
    #[default]
    InMemory,
    Local(LocalObjectStoreConfig),
}

/// Local filesystem object store rooted at `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalObjectStoreConfig {
    pub path: String,
}
