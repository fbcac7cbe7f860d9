//! Core LotLedger implementation with the lot lifecycle operations.

use std::sync::Arc;

use async_trait::async_trait;
use common::Storage;
use common::storage::factory::create_storage;

use crate::config::{Config, WriteOptions};
use crate::error::{Error, Result};
use crate::model::Lot;
use crate::reader::{self, LotIterator, LotLedgerReader, LotRead};
use crate::serde::encode_lot;
use crate::storage::LotStorage;

/// The bootstrap lots written by [`LotLedger::seed`].
pub fn seed_lots() -> Vec<Lot> {
    vec![
        Lot::new("001", "Seed", "2021-03-05", "1 gram"),
        Lot::new("002", "Propagated Cuttings", "2025-04-05", "25 plants"),
        Lot::new("003", "Seed", "2050-06-09", "2 grams"),
        Lot::new("004", "Propagated Cuttings", "2100-01-10", "10 plants"),
        Lot::new("005", "Seed", "2121-09-05", "1.5 grams"),
    ]
}

/// The lot catalogue, providing read and write operations over an injected
/// store.
///
/// Each method is one unit of work: a single write, or a read followed by a
/// write of the same key. Serializing units of work that touch the same lot
/// is left to whatever drives the ledger; the ledger keeps no state of its
/// own beyond the store handle.
///
/// A lot moves `Absent → create/seed → Present → (update | transfer)* →
/// delete → Absent`. `create` is the only transition that does not check the
/// current state.
///
/// # Example
///
/// ```ignore
/// use lot_ledger::{Config, LotLedger, LotRead};
///
/// let ledger = LotLedger::open(Config::default()).await?;
/// ledger.create("006", "Seed", "2026-10-01", "3 grams").await?;
/// ledger.transfer("006", "Greenhouse 4").await?;
///
/// let lot = ledger.read("006").await?;
/// assert_eq!(lot.owner.as_deref(), Some("Greenhouse 4"));
/// ```
pub struct LotLedger {
    storage: LotStorage,
    write_options: WriteOptions,
}

impl LotLedger {
    /// Opens a ledger over the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be initialized.
    pub async fn open(config: Config) -> Result<Self> {
        let storage = create_storage(&config.storage).await?;
        Ok(Self::new(storage).with_write_options(config.write))
    }

    /// Creates a ledger over an existing storage implementation.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage: LotStorage::new(storage),
            write_options: WriteOptions::default(),
        }
    }

    /// Sets the options applied to every write.
    pub fn with_write_options(mut self, options: WriteOptions) -> Self {
        self.write_options = options;
        self
    }

    /// Returns a read-only view sharing this ledger's store.
    pub fn reader(&self) -> LotLedgerReader {
        LotLedgerReader::from_storage(self.storage.as_read())
    }

    /// Writes the five bootstrap lots `001`..`005`, overwriting any lots
    /// already stored under those ids.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn seed(&self) -> Result<()> {
        let lots = seed_lots();
        let mut values = Vec::with_capacity(lots.len());
        for lot in &lots {
            values.push((lot.lot_id.clone(), encode_lot(lot)?));
        }
        self.storage.put_all(values, &self.write_options).await?;
        for lot in &lots {
            tracing::info!(lot_id = %lot.lot_id, "lot initialized");
        }
        Ok(())
    }

    /// Creates an unowned lot and returns it.
    ///
    /// No existence check is made: creating an id that is already stored
    /// silently replaces the stored lot.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] if `lot_id` is empty, [`Error::StoreUnavailable`]
    /// if the write cannot be committed.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn create(
        &self,
        lot_id: &str,
        propagation_method: &str,
        propagation_date: &str,
        propagation_quantity: &str,
    ) -> Result<Lot> {
        if lot_id.is_empty() {
            return Err(Error::InvalidInput("lot id must not be empty".to_string()));
        }
        let lot = Lot::new(
            lot_id,
            propagation_method,
            propagation_date,
            propagation_quantity,
        );
        self.put(&lot).await?;
        Ok(lot)
    }

    /// Replaces every field of an existing lot.
    ///
    /// The owner is not carried over: an updated lot is unowned until it is
    /// transferred again.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the lot does not exist.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn update(
        &self,
        lot_id: &str,
        propagation_method: &str,
        propagation_date: &str,
        propagation_quantity: &str,
    ) -> Result<()> {
        if !self.exists(lot_id).await? {
            return Err(Error::lot_not_found(lot_id));
        }
        let lot = Lot::new(
            lot_id,
            propagation_method,
            propagation_date,
            propagation_quantity,
        );
        self.put(&lot).await
    }

    /// Removes a lot.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the lot does not exist.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn delete(&self, lot_id: &str) -> Result<()> {
        if !self.exists(lot_id).await? {
            return Err(Error::lot_not_found(lot_id));
        }
        self.storage.delete(lot_id, &self.write_options).await?;
        tracing::debug!(lot_id = %lot_id, "lot deleted");
        Ok(())
    }

    /// Sets the owner of an existing lot, leaving every other field as stored.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the lot does not exist, [`Error::Decode`] if the
    /// stored value is not a lot record.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn transfer(&self, lot_id: &str, new_owner: &str) -> Result<()> {
        let mut lot = self.read(lot_id).await?;
        lot.owner = Some(new_owner.to_string());
        self.put_under(lot_id, &lot).await
    }

    /// Flushes pending writes to durable storage.
    pub async fn flush(&self) -> Result<()> {
        self.storage.flush().await
    }

    /// Closes the ledger, releasing the store.
    pub async fn close(self) -> Result<()> {
        self.storage.close().await
    }

    async fn put(&self, lot: &Lot) -> Result<()> {
        self.put_under(&lot.lot_id, lot).await
    }

    // Transfer writes back under the key it read, even if the stored LotID
    // field disagrees with it.
    async fn put_under(&self, lot_id: &str, lot: &Lot) -> Result<()> {
        let value = encode_lot(lot)?;
        self.storage.put(lot_id, value, &self.write_options).await?;
        tracing::debug!(lot_id = %lot_id, "lot written");
        Ok(())
    }
}

#[async_trait]
impl LotRead for LotLedger {
    async fn read_raw(&self, lot_id: &str) -> Result<String> {
        reader::read_raw(&self.storage.as_read(), lot_id).await
    }

    async fn exists(&self, lot_id: &str) -> Result<bool> {
        reader::exists(&self.storage.as_read(), lot_id).await
    }

    async fn scan(&self, start: &str, end: &str) -> Result<LotIterator> {
        reader::scan(&self.storage.as_read(), start, end).await
    }
}
