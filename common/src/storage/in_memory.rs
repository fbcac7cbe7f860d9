use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use super::{RecordOp, Storage, WriteOptions};
use crate::{BytesRange, Record, StorageError, StorageIterator, StorageRead, StorageResult};

type Map = BTreeMap<Bytes, Bytes>;

/// In-memory implementation of the Storage trait using a BTreeMap.
///
/// The map is copy-on-write: iterators hold a reference to the version of the
/// map that was current when the scan started, so a scan observes a
/// point-in-time view without copying the data up front. A writer only clones
/// the map when an iterator is still holding the previous version.
pub struct InMemoryStorage {
    data: RwLock<Arc<Map>>,
}

impl InMemoryStorage {
    /// Creates a new InMemoryStorage instance with an empty store.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(Arc::new(BTreeMap::new())),
        }
    }

    fn current(&self) -> StorageResult<Arc<Map>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(format!("Failed to acquire read lock: {}", e)))?;
        Ok(Arc::clone(&data))
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageRead for InMemoryStorage {
    /// Retrieves a single record by key from the in-memory store.
    #[tracing::instrument(level = "trace", skip_all)]
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        let data = self.current()?;
        Ok(data.get(&key).map(|value| Record::new(key, value.clone())))
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        let done = range.is_empty();
        Ok(Box::new(InMemoryIterator {
            data: self.current()?,
            cursor: range.start,
            end: range.end,
            done,
        }))
    }
}

/// Lazy cursor over one version of the map.
///
/// Each call to `next` seeks past the last returned key, so the iterator never
/// materializes the range.
struct InMemoryIterator {
    data: Arc<Map>,
    cursor: Bound<Bytes>,
    end: Bound<Bytes>,
    done: bool,
}

#[async_trait]
impl StorageIterator for InMemoryIterator {
    #[tracing::instrument(level = "trace", skip_all)]
    async fn next(&mut self) -> StorageResult<Option<Record>> {
        if self.done {
            return Ok(None);
        }

        let next = self
            .data
            .range((self.cursor.clone(), self.end.clone()))
            .next()
            .map(|(k, v)| Record::new(k.clone(), v.clone()));

        match next {
            Some(record) => {
                self.cursor = Bound::Excluded(record.key.clone());
                Ok(Some(record))
            }
            None => {
                self.done = true;
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    /// Applies the batch under a single write lock acquisition.
    ///
    /// Write options are ignored since there is no durable storage to await.
    async fn apply_with_options(
        &self,
        ops: Vec<RecordOp>,
        _options: WriteOptions,
    ) -> StorageResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Internal(format!("Failed to acquire write lock: {}", e)))?;

        let map = Arc::make_mut(&mut *data);
        for op in ops {
            match op {
                RecordOp::Put(record) => {
                    map.insert(record.key, record.value);
                }
                RecordOp::Delete(key) => {
                    map.remove(&key);
                }
            }
        }

        Ok(())
    }

    async fn flush(&self) -> StorageResult<()> {
        // No-op for in-memory storage - all writes are immediately visible
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Injected failure that fires either once or on every call.
#[cfg(feature = "test-utils")]
#[derive(Clone)]
enum Failure {
    /// Error is returned once, then automatically cleared.
    Once(StorageError),
    /// Error is returned on every subsequent call until explicitly cleared.
    Persistent(StorageError),
}

#[cfg(feature = "test-utils")]
type FailSlot = arc_swap::ArcSwap<Option<Failure>>;

/// Checks a [`FailSlot`] and returns an error if one is set.
///
/// For [`Failure::Once`], the slot is atomically swapped to `None` so the
/// error fires exactly once.
#[cfg(feature = "test-utils")]
fn check_failure(slot: &FailSlot) -> StorageResult<()> {
    let guard = slot.load();
    match guard.as_ref() {
        None => Ok(()),
        Some(Failure::Persistent(err)) => Err(err.clone()),
        Some(Failure::Once(_)) => {
            let prev = slot.swap(Arc::new(None));
            match prev.as_ref() {
                Some(Failure::Once(err)) => Err(err.clone()),
                _ => Ok(()),
            }
        }
    }
}

/// A storage wrapper that delegates to an inner [`Storage`] but can inject
/// failures into reads, scans and writes on demand.
///
/// Failures can be *persistent* (returned on every call until cleared) or
/// *once* (returned on the next call, then automatically cleared).
///
/// Gated behind the `test-utils` feature.
///
/// ```ignore
/// let storage = FailingStorage::wrap(Arc::new(InMemoryStorage::new()));
/// storage.fail_apply(StorageError::Storage("disk full".into()));
/// // every apply call now returns Err(...)
/// ```
#[cfg(feature = "test-utils")]
pub struct FailingStorage {
    inner: Arc<dyn Storage>,
    fail_get: FailSlot,
    fail_scan: FailSlot,
    fail_apply: FailSlot,
}

#[cfg(feature = "test-utils")]
impl FailingStorage {
    /// Wraps an existing storage, with all failure injections initially `None`.
    pub fn wrap(inner: Arc<dyn Storage>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_get: arc_swap::ArcSwap::from_pointee(None),
            fail_scan: arc_swap::ArcSwap::from_pointee(None),
            fail_apply: arc_swap::ArcSwap::from_pointee(None),
        })
    }

    /// Makes `get` return the given error on every subsequent call.
    pub fn fail_get(&self, err: StorageError) {
        self.fail_get.store(Arc::new(Some(Failure::Persistent(err))));
    }

    /// Makes `scan_iter` return the given error on every subsequent call.
    pub fn fail_scan(&self, err: StorageError) {
        self.fail_scan
            .store(Arc::new(Some(Failure::Persistent(err))));
    }

    /// Makes `apply` return the given error on every subsequent call.
    pub fn fail_apply(&self, err: StorageError) {
        self.fail_apply
            .store(Arc::new(Some(Failure::Persistent(err))));
    }

    /// Makes `apply` return the given error on the next call only.
    pub fn fail_apply_once(&self, err: StorageError) {
        self.fail_apply.store(Arc::new(Some(Failure::Once(err))));
    }

    /// Clears every injected failure.
    pub fn clear(&self) {
        self.fail_get.store(Arc::new(None));
        self.fail_scan.store(Arc::new(None));
        self.fail_apply.store(Arc::new(None));
    }
}

#[cfg(feature = "test-utils")]
#[async_trait]
impl StorageRead for FailingStorage {
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        check_failure(&self.fail_get)?;
        self.inner.get(key).await
    }

    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        check_failure(&self.fail_scan)?;
        self.inner.scan_iter(range).await
    }
}

#[cfg(feature = "test-utils")]
#[async_trait]
impl Storage for FailingStorage {
    async fn apply_with_options(
        &self,
        ops: Vec<RecordOp>,
        options: WriteOptions,
    ) -> StorageResult<()> {
        check_failure(&self.fail_apply)?;
        self.inner.apply_with_options(ops, options).await
    }

    async fn flush(&self) -> StorageResult<()> {
        self.inner.flush().await
    }

    async fn close(&self) -> StorageResult<()> {
        self.inner.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(key: &'static str, value: &'static str) -> RecordOp {
        Record::new(Bytes::from(key), Bytes::from(value)).into()
    }

    async fn collect(iter: &mut Box<dyn StorageIterator + Send + 'static>) -> Vec<Record> {
        let mut records = vec![];
        while let Some(record) = iter.next().await.unwrap() {
            records.push(record);
        }
        records
    }

    #[tokio::test]
    async fn should_return_none_when_key_not_found() {
        // given
        let storage = InMemoryStorage::new();

        // when
        let result = storage.get(Bytes::from("missing_key")).await.unwrap();

        // then
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn should_store_and_overwrite_record() {
        // given
        let storage = InMemoryStorage::new();
        storage.apply(vec![put("key", "initial")]).await.unwrap();

        // when
        storage.apply(vec![put("key", "updated")]).await.unwrap();
        let result = storage.get(Bytes::from("key")).await.unwrap();

        // then
        assert_eq!(result.unwrap().value, Bytes::from("updated"));
    }

    #[tokio::test]
    async fn should_apply_puts_and_deletes_in_one_batch() {
        // given
        let storage = InMemoryStorage::new();
        storage.apply(vec![put("a", "1")]).await.unwrap();

        // when
        storage
            .apply(vec![put("b", "2"), RecordOp::Delete(Bytes::from("a"))])
            .await
            .unwrap();

        // then
        assert!(storage.get(Bytes::from("a")).await.unwrap().is_none());
        assert!(storage.get(Bytes::from("b")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn should_keep_empty_value_distinct_from_missing_key() {
        // given
        let storage = InMemoryStorage::new();

        // when
        storage
            .apply(vec![Record::empty(Bytes::from("empty")).into()])
            .await
            .unwrap();

        // then
        let result = storage.get(Bytes::from("empty")).await.unwrap();
        assert_eq!(result.unwrap().value, Bytes::new());
    }

    #[tokio::test]
    async fn should_scan_all_records_in_key_order() {
        // given
        let storage = InMemoryStorage::new();
        storage
            .apply(vec![put("c", "3"), put("a", "1"), put("b", "2")])
            .await
            .unwrap();

        // when
        let records = storage.scan(BytesRange::unbounded()).await.unwrap();

        // then
        let keys: Vec<_> = records.iter().map(|r| r.key.clone()).collect();
        assert_eq!(keys, vec![Bytes::from("a"), Bytes::from("b"), Bytes::from("c")]);
    }

    #[tokio::test]
    async fn should_scan_records_in_bounded_range() {
        // given
        let storage = InMemoryStorage::new();
        storage
            .apply(vec![put("a", "1"), put("b", "2"), put("c", "3"), put("d", "4")])
            .await
            .unwrap();

        // when
        let range = BytesRange::new(
            Bound::Included(Bytes::from("b")),
            Bound::Excluded(Bytes::from("d")),
        );
        let records = storage.scan(range).await.unwrap();

        // then
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key, Bytes::from("b"));
        assert_eq!(records[1].key, Bytes::from("c"));
    }

    #[tokio::test]
    async fn should_return_nothing_for_inverted_range() {
        // given
        let storage = InMemoryStorage::new();
        storage.apply(vec![put("a", "1")]).await.unwrap();

        // when
        let range = BytesRange::new(
            Bound::Included(Bytes::from("z")),
            Bound::Excluded(Bytes::from("a")),
        );
        let records = storage.scan(range).await.unwrap();

        // then
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn should_return_empty_vec_when_scanning_empty_storage() {
        // given
        let storage = InMemoryStorage::new();

        // when
        let records = storage.scan(BytesRange::unbounded()).await.unwrap();

        // then
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn should_not_see_writes_made_after_scan_started() {
        // given
        let storage = InMemoryStorage::new();
        storage.apply(vec![put("a", "1"), put("c", "3")]).await.unwrap();
        let mut iter = storage.scan_iter(BytesRange::unbounded()).await.unwrap();
        let first = iter.next().await.unwrap().unwrap();

        // when
        storage
            .apply(vec![put("b", "2"), RecordOp::Delete(Bytes::from("c"))])
            .await
            .unwrap();
        let rest = collect(&mut iter).await;

        // then
        assert_eq!(first.key, Bytes::from("a"));
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].key, Bytes::from("c"));
        assert!(storage.get(Bytes::from("c")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_keep_returning_none_after_exhaustion() {
        // given
        let storage = InMemoryStorage::new();
        storage.apply(vec![put("a", "1")]).await.unwrap();
        let mut iter = storage.scan_iter(BytesRange::unbounded()).await.unwrap();

        // when
        let first = iter.next().await.unwrap();
        let second = iter.next().await.unwrap();
        let third = iter.next().await.unwrap();

        // then
        assert!(first.is_some());
        assert!(second.is_none());
        assert!(third.is_none());
    }

    #[cfg(feature = "test-utils")]
    #[tokio::test]
    async fn should_fail_apply_once_then_recover() {
        // given
        let storage = FailingStorage::wrap(Arc::new(InMemoryStorage::new()));
        storage.fail_apply_once(StorageError::Storage("disk full".into()));

        // when
        let first = storage.apply(vec![put("a", "1")]).await;
        let second = storage.apply(vec![put("a", "1")]).await;

        // then
        assert_eq!(first, Err(StorageError::Storage("disk full".into())));
        assert!(second.is_ok());
        assert!(storage.get(Bytes::from("a")).await.unwrap().is_some());
    }
}
