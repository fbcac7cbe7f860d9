//! Lot Ledger - traceable agricultural lots over an ordered key-value store.
//!
//! Each lot (a batch of seed or cuttings) is one JSON record keyed by its lot
//! id. The ledger enforces the lot lifecycle on top of a narrow storage
//! interface and leaves ordering, isolation and transport to the environment
//! that drives it.
//!
//! # Key Concepts
//!
//! - **LotLedger**: the main entry point providing every lifecycle operation.
//! - **LotLedgerReader**: a read-only view of the store, useful for consumers
//!   that should not have write access.
//! - **LotRead**: trait defining read operations shared by both types.
//! - **LotContract**: dispatches string invocations (`CreateAsset`,
//!   `GetAllAssets`, ...) and answers in the ledger's JSON wire format.
//!
//! # Example
//!
//! ```ignore
//! use lot_ledger::{Config, LotLedger, LotRead};
//!
//! let ledger = LotLedger::open(Config::default()).await?;
//! ledger.seed().await?;
//! ledger.transfer("002", "Greenhouse 4").await?;
//!
//! let mut iter = ledger.list_all().await?;
//! while let Some(entry) = iter.next().await? {
//!     println!("{}: {:?}", entry.key, entry.record);
//! }
//! ```

mod config;
mod contract;
mod error;
mod ledger;
mod model;
mod reader;
mod serde;
mod storage;

pub use config::{Config, WriteOptions};
pub use contract::{Function, LotContract};
pub use error::{Error, Result};
pub use ledger::{LotLedger, seed_lots};
pub use model::{LOT_RECORD_TYPE, Lot, LotEntry, LotRecord, RecordType};
pub use reader::{LotIterator, LotLedgerReader, LotRead};
