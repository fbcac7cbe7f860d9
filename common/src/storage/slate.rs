//! SlateDB-backed storage.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use slatedb::{Db, DbIterator, WriteBatch};

use super::{RecordOp, Storage, WriteOptions};
use crate::{BytesRange, Record, StorageError, StorageIterator, StorageRead, StorageResult};

/// [`Storage`] over an embedded SlateDB database.
///
/// Scans iterate SlateDB's merged view lazily; nothing is buffered beyond
/// what the database itself holds in its block cache.
pub struct SlateDbStorage {
    db: Arc<Db>,
}

impl SlateDbStorage {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StorageRead for SlateDbStorage {
    #[tracing::instrument(level = "trace", skip_all)]
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        let value = self
            .db
            .get(&key)
            .await
            .map_err(StorageError::from_storage)?;
        Ok(value.map(|value| Record::new(key, value)))
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        if range.is_empty() {
            return Ok(Box::new(SlateDbIterator { inner: None }));
        }
        let inner = self
            .db
            .scan(range)
            .await
            .map_err(StorageError::from_storage)?;
        Ok(Box::new(SlateDbIterator { inner: Some(inner) }))
    }
}

struct SlateDbIterator {
    inner: Option<DbIterator>,
}

#[async_trait]
impl StorageIterator for SlateDbIterator {
    #[tracing::instrument(level = "trace", skip_all)]
    async fn next(&mut self) -> StorageResult<Option<Record>> {
        let Some(inner) = self.inner.as_mut() else {
            return Ok(None);
        };
        let next = inner.next().await.map_err(StorageError::from_storage)?;
        Ok(next.map(|kv| Record::new(kv.key, kv.value)))
    }
}

#[async_trait]
impl Storage for SlateDbStorage {
    async fn apply_with_options(
        &self,
        ops: Vec<RecordOp>,
        options: WriteOptions,
    ) -> StorageResult<()> {
        let mut batch = WriteBatch::new();
        for op in ops {
            match op {
                RecordOp::Put(record) => batch.put(record.key, record.value),
                RecordOp::Delete(key) => batch.delete(key),
            }
        }

        let mut write_options = slatedb::config::WriteOptions::default();
        write_options.await_durable = options.await_durable;
        self.db
            .write_with_options(batch, &write_options)
            .await
            .map(|_| ())
            .map_err(StorageError::from_storage)
    }

    async fn flush(&self) -> StorageResult<()> {
        self.db.flush().await.map_err(StorageError::from_storage)
    }

    async fn close(&self) -> StorageResult<()> {
        self.db.close().await.map_err(StorageError::from_storage)
    }
}
