//! Read-only lot access and the [`LotRead`] trait.

use std::sync::Arc;

use async_trait::async_trait;
use common::StorageRead;
use common::storage::factory::create_storage;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{Lot, LotEntry, LotRecord};
use crate::serde::decode_lot;
use crate::storage::{LotScanIterator, LotStorageRead};

/// Trait for read operations on the lot ledger.
///
/// Shared by [`LotLedger`](crate::LotLedger) and [`LotLedgerReader`].
#[async_trait]
pub trait LotRead: Send + Sync {
    /// Returns the stored bytes of a lot exactly as written.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the lot is absent or its stored value is empty.
    async fn read_raw(&self, lot_id: &str) -> Result<String>;

    /// Reads and decodes a lot.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] as for [`read_raw`](LotRead::read_raw), and
    /// [`Error::Decode`] if the stored value is not a lot record.
    async fn read(&self, lot_id: &str) -> Result<Lot> {
        let raw = self.read_raw(lot_id).await?;
        decode_lot(raw.as_bytes())
    }

    /// Returns true iff the lot is present with a non-empty value.
    async fn exists(&self, lot_id: &str) -> Result<bool>;

    /// Scans lots with ids in `[start, end)` in ascending id order. An empty
    /// bound leaves that side open.
    async fn scan(&self, start: &str, end: &str) -> Result<LotIterator>;

    /// Scans every lot in the ledger.
    async fn list_all(&self) -> Result<LotIterator> {
        self.scan("", "").await
    }
}

/// A read-only view of the lot ledger.
pub struct LotLedgerReader {
    storage: LotStorageRead,
}

impl LotLedgerReader {
    /// Opens a read-only view of the ledger's store.
    pub async fn open(config: Config) -> Result<Self> {
        let storage = create_storage(&config.storage).await?;
        Ok(Self::new(storage as Arc<dyn StorageRead>))
    }

    /// Creates a reader over an existing storage implementation.
    pub fn new(storage: Arc<dyn StorageRead>) -> Self {
        Self {
            storage: LotStorageRead::new(storage),
        }
    }

    pub(crate) fn from_storage(storage: LotStorageRead) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl LotRead for LotLedgerReader {
    async fn read_raw(&self, lot_id: &str) -> Result<String> {
        read_raw(&self.storage, lot_id).await
    }

    async fn exists(&self, lot_id: &str) -> Result<bool> {
        exists(&self.storage, lot_id).await
    }

    async fn scan(&self, start: &str, end: &str) -> Result<LotIterator> {
        scan(&self.storage, start, end).await
    }
}

#[tracing::instrument(level = "debug", skip(storage))]
pub(crate) async fn read_raw(storage: &LotStorageRead, lot_id: &str) -> Result<String> {
    match storage.get(lot_id).await? {
        Some(value) if !value.is_empty() => Ok(String::from_utf8_lossy(&value).into_owned()),
        _ => Err(Error::lot_not_found(lot_id)),
    }
}

#[tracing::instrument(level = "debug", skip(storage))]
pub(crate) async fn exists(storage: &LotStorageRead, lot_id: &str) -> Result<bool> {
    let value = storage.get(lot_id).await?;
    Ok(value.is_some_and(|v| !v.is_empty()))
}

#[tracing::instrument(level = "debug", skip(storage))]
pub(crate) async fn scan(storage: &LotStorageRead, start: &str, end: &str) -> Result<LotIterator> {
    let inner = storage.scan(start, end).await?;
    Ok(LotIterator::new(inner))
}

/// Single-pass iterator over lot entries in ascending key order.
///
/// Values that are not lot records come back as [`LotRecord::Raw`] instead of
/// failing the scan. The underlying scan is released when the iterator is
/// dropped.
pub struct LotIterator {
    inner: LotScanIterator,
}

impl LotIterator {
    pub(crate) fn new(inner: LotScanIterator) -> Self {
        Self { inner }
    }

    /// Returns the next entry, or None if iteration is complete.
    ///
    /// # Errors
    ///
    /// [`Error::StoreUnavailable`] if the store fails mid-scan.
    pub async fn next(&mut self) -> Result<Option<LotEntry>> {
        let Some((key, value)) = self.inner.next().await? else {
            return Ok(None);
        };

        let record = match decode_lot(&value) {
            Ok(lot) => LotRecord::Decoded(lot),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "stored value is not a lot record, returning it raw");
                LotRecord::Raw(String::from_utf8_lossy(&value).into_owned())
            }
        };
        Ok(Some(LotEntry { key, record }))
    }

    /// Drains the iterator into a Vec.
    pub async fn collect(mut self) -> Result<Vec<LotEntry>> {
        let mut entries = Vec::new();
        while let Some(entry) = self.next().await? {
            entries.push(entry);
        }
        Ok(entries)
    }
}
