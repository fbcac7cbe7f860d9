//! Lot-specific storage wrappers.
//!
//! [`LotStorage`] and [`LotStorageRead`] are the ledger's adapter over the
//! ordered key-value store: they speak lot ids and stored values, and hide
//! the key layout from [`crate::serde`].

use std::sync::Arc;

use bytes::Bytes;
use common::{Record, RecordOp, Storage, StorageIterator, StorageRead};

use crate::config::WriteOptions;
use crate::error::Result;
use crate::serde::{decode_key, decode_key_lossy, encode_key, encode_key_range};

/// Read-only lot storage operations.
#[derive(Clone)]
pub(crate) struct LotStorageRead {
    storage: Arc<dyn StorageRead>,
}

impl LotStorageRead {
    pub(crate) fn new(storage: Arc<dyn StorageRead>) -> Self {
        Self { storage }
    }

    /// Gets the stored value of a lot, or None if the key is absent.
    pub(crate) async fn get(&self, lot_id: &str) -> Result<Option<Bytes>> {
        let record = self.storage.get(encode_key(lot_id)).await?;
        Ok(record.map(|r| r.value))
    }

    /// Opens an ordered scan over lot ids in `[start, end)`; empty bounds are
    /// open.
    pub(crate) async fn scan(&self, start: &str, end: &str) -> Result<LotScanIterator> {
        let inner = self.storage.scan_iter(encode_key_range(start, end)).await?;
        Ok(LotScanIterator { inner })
    }
}

/// Iterator over raw `(lot id, stored value)` pairs from storage.
pub(crate) struct LotScanIterator {
    inner: Box<dyn StorageIterator + Send>,
}

impl LotScanIterator {
    /// Returns the next pair, or None if iteration is complete.
    ///
    /// A key whose id is not valid UTF-8 is returned lossily rather than
    /// failing the scan.
    pub(crate) async fn next(&mut self) -> Result<Option<(String, Bytes)>> {
        let Some(r) = self.inner.next().await? else {
            return Ok(None);
        };
        let lot_id = match decode_key(&r.key) {
            Ok(lot_id) => lot_id,
            Err(e) => {
                let lot_id = decode_key_lossy(&r.key);
                tracing::warn!(lot_id = %lot_id, error = %e, "undecodable lot key in scan");
                lot_id
            }
        };
        Ok(Some((lot_id, r.value)))
    }
}

/// Read-write lot storage operations.
#[derive(Clone)]
pub(crate) struct LotStorage {
    storage: Arc<dyn Storage>,
}

impl LotStorage {
    pub(crate) fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Creates a new storage with an in-memory backend.
    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        use common::storage::in_memory::InMemoryStorage;
        Self::new(Arc::new(InMemoryStorage::new()))
    }

    /// Returns a read-only view of this storage.
    pub(crate) fn as_read(&self) -> LotStorageRead {
        LotStorageRead::new(Arc::clone(&self.storage) as Arc<dyn StorageRead>)
    }

    /// Puts stored lot values in one atomic batch, overwriting existing keys.
    pub(crate) async fn put_all(
        &self,
        values: Vec<(String, Bytes)>,
        options: &WriteOptions,
    ) -> Result<()> {
        let ops = values
            .into_iter()
            .map(|(lot_id, value)| RecordOp::Put(Record::new(encode_key(&lot_id), value)))
            .collect();
        self.storage.apply_with_options(ops, options.into()).await?;
        Ok(())
    }

    /// Puts a single stored lot value, overwriting any existing one.
    pub(crate) async fn put(&self, lot_id: &str, value: Bytes, options: &WriteOptions) -> Result<()> {
        self.put_all(vec![(lot_id.to_string(), value)], options).await
    }

    /// Deletes a lot key. No-op if the key does not exist.
    pub(crate) async fn delete(&self, lot_id: &str, options: &WriteOptions) -> Result<()> {
        let op = RecordOp::Delete(encode_key(lot_id));
        self.storage
            .apply_with_options(vec![op], options.into())
            .await?;
        Ok(())
    }

    /// Flushes pending writes to durable storage.
    pub(crate) async fn flush(&self) -> Result<()> {
        self.storage.flush().await?;
        Ok(())
    }

    /// Closes the storage, releasing resources.
    pub(crate) async fn close(&self) -> Result<()> {
        self.storage.close().await?;
        Ok(())
    }
}
