//! Storage factory for creating storage instances from configuration.

use std::sync::Arc;

use super::config::StorageConfig;
use super::in_memory::InMemoryStorage;
use super::{Storage, StorageResult};

/// Creates a storage instance based on the provided configuration.
///
/// # Errors
///
/// Returns `StorageError::Storage` if the backend cannot be opened, or if the
/// configuration names a backend this build was compiled without.
pub async fn create_storage(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
    match config {
        StorageConfig::InMemory => Ok(Arc::new(InMemoryStorage::new())),
        #[cfg(feature = "slatedb")]
        StorageConfig::SlateDb(slate_config) => {
            let storage = slatedb_backend::create_slatedb_storage(slate_config).await?;
            Ok(Arc::new(storage))
        }
        #[cfg(not(feature = "slatedb"))]
        StorageConfig::SlateDb(_) => Err(super::StorageError::Storage(
            "SlateDB storage requested but the `slatedb` feature is not enabled".to_string(),
        )),
    }
}

#[cfg(feature = "slatedb")]
mod slatedb_backend {
    use std::sync::Arc;

    use slatedb::DbBuilder;
    use slatedb::config::Settings;
    use slatedb::object_store::{self, ObjectStore};

    use crate::storage::config::{ObjectStoreConfig, SlateDbStorageConfig};
    use crate::storage::slate::SlateDbStorage;
    use crate::storage::{StorageError, StorageResult};

    fn create_object_store(config: &ObjectStoreConfig) -> StorageResult<Arc<dyn ObjectStore>> {
        match config {
            ObjectStoreConfig::InMemory => Ok(Arc::new(object_store::memory::InMemory::new())),
            ObjectStoreConfig::Local(local_config) => {
                std::fs::create_dir_all(&local_config.path).map_err(|e| {
                    StorageError::Storage(format!(
                        "Failed to create storage directory '{}': {}",
                        local_config.path, e
                    ))
                })?;
                let store = object_store::local::LocalFileSystem::new_with_prefix(
                    &local_config.path,
                )
                .map_err(|e| {
                    StorageError::Storage(format!("Failed to create local filesystem store: {}", e))
                })?;
                Ok(Arc::new(store))
            }
        }
    }

    pub(super) async fn create_slatedb_storage(
        config: &SlateDbStorageConfig,
    ) -> StorageResult<SlateDbStorage> {
        let object_store = create_object_store(&config.object_store)?;

        let settings = match &config.settings_path {
            Some(path) => Settings::from_file(path).map_err(|e| {
                StorageError::Storage(format!(
                    "Failed to load SlateDB settings from {}: {}",
                    path, e
                ))
            })?,
            None => Settings::load().unwrap_or_default(),
        };

        let db = DbBuilder::new(config.path.clone(), object_store)
            .with_settings(settings)
            .build()
            .await
            .map_err(|e| StorageError::Storage(format!("Failed to create SlateDB: {}", e)))?;

        Ok(SlateDbStorage::new(Arc::new(db)))
    }
}
