//! Configuration options for the lot ledger.

use common::StorageConfig;
use serde::{Deserialize, Serialize};

/// Configuration for opening a [`LotLedger`](crate::LotLedger).
///
/// ```toml
/// [storage]
/// type = "InMemory"
///
/// [write]
/// await_durable = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Options applied to every write the ledger makes.
    #[serde(default)]
    pub write: WriteOptions,
}

/// Options for write operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// If true, waits for the write to be durable before returning.
    /// Default: false (returns once the write is visible to readers).
    pub await_durable: bool,
}

impl From<&WriteOptions> for common::WriteOptions {
    fn from(options: &WriteOptions) -> Self {
        common::WriteOptions {
            await_durable: options.await_durable,
        }
    }
}

#[cfg(test)]
mod tests {
    use common::storage::config::{LocalObjectStoreConfig, ObjectStoreConfig, SlateDbStorageConfig};

    use super::*;

    #[test]
    fn should_default_to_in_memory_storage() {
        // when
        let config: Config = toml::from_str("").unwrap();

        // then
        assert_eq!(config.storage, StorageConfig::InMemory);
        assert!(!config.write.await_durable);
    }

    #[test]
    fn should_parse_slatedb_config() {
        // given
        let toml = r#"
            [storage]
            type = "SlateDb"
            path = "lots"

            [storage.object_store]
            type = "Local"
            path = "/var/lib/lot-ledger"

            [write]
            await_durable = true
        "#;

        // when
        let config: Config = toml::from_str(toml).unwrap();

        // then
        assert_eq!(
            config.storage,
            StorageConfig::SlateDb(SlateDbStorageConfig {
                path: "lots".to_string(),
                object_store: ObjectStoreConfig::Local(LocalObjectStoreConfig {
                    path: "/var/lib/lot-ledger".to_string(),
                }),
                settings_path: None,
            })
        );
        assert!(config.write.await_durable);
    }
}
