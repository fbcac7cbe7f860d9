//! Storage primitives shared by the lot ledger crates.
//!
//! `common` defines the narrow storage interface ([`StorageRead`], [`Storage`],
//! [`StorageIterator`]) that record crates build on, together with the
//! backends that implement it and a factory that picks one from
//! [`StorageConfig`].

pub mod bytes;
pub mod storage;

pub use bytes::BytesRange;
pub use storage::config::StorageConfig;
pub use storage::factory::create_storage;
pub use storage::{
    Record, RecordOp, Storage, StorageError, StorageIterator, StorageRead, StorageResult,
    WriteOptions,
};
