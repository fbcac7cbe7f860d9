//! Record codec and storage key layout for lots.
//!
//! ```text
//! Storage key: | version (u8) | record_tag (u8) | lot id (utf-8) |
//! Value:       JSON object, see [`Lot`]
//! ```
//!
//! The two-byte prefix keeps lot records in their own slice of a shared
//! keyspace, so a full listing scans only `[version|tag, version|tag+1)`.

use std::ops::Bound;

use bytes::{BufMut, Bytes, BytesMut};
use common::BytesRange;

use crate::error::{Error, Result};
use crate::model::Lot;

/// Key format version.
pub const KEY_VERSION: u8 = 0x01;

/// Record tag: lot type 0x1 in high 4 bits, reserved 0x0 in low 4 bits.
pub const LOT_RECORD_TAG: u8 = 0x10;

const KEY_PREFIX: [u8; 2] = [KEY_VERSION, LOT_RECORD_TAG];

/// Encodes a lot id into its storage key.
pub fn encode_key(lot_id: &str) -> Bytes {
    let mut buf = BytesMut::with_capacity(KEY_PREFIX.len() + lot_id.len());
    buf.put_slice(&KEY_PREFIX);
    buf.put_slice(lot_id.as_bytes());
    buf.freeze()
}

/// Decodes a storage key back into the lot id, validating the prefix.
pub fn decode_key(storage_key: &[u8]) -> Result<String> {
    if storage_key.len() < KEY_PREFIX.len() {
        return Err(Error::Encoding(format!(
            "key too short: expected at least 2 bytes, got {}",
            storage_key.len()
        )));
    }

    if storage_key[0] != KEY_VERSION {
        return Err(Error::Encoding(format!(
            "invalid key version: expected 0x{:02x}, got 0x{:02x}",
            KEY_VERSION, storage_key[0]
        )));
    }

    if storage_key[1] != LOT_RECORD_TAG {
        return Err(Error::Encoding(format!(
            "invalid record tag: expected 0x{:02x}, got 0x{:02x}",
            LOT_RECORD_TAG, storage_key[1]
        )));
    }

    String::from_utf8(storage_key[2..].to_vec())
        .map_err(|e| Error::Encoding(format!("lot id is not valid utf-8: {}", e)))
}

/// Decodes the lot id of a key already known to carry the lot prefix,
/// replacing invalid UTF-8 with U+FFFD.
pub fn decode_key_lossy(storage_key: &[u8]) -> String {
    let id = storage_key.get(KEY_PREFIX.len()..).unwrap_or_default();
    String::from_utf8_lossy(id).into_owned()
}

/// Maps a lot id range onto the storage keyspace.
///
/// `start` is inclusive and `end` exclusive. An empty string leaves that side
/// open, so `("", "")` covers every lot and nothing else.
pub fn encode_key_range(start: &str, end: &str) -> BytesRange {
    let all_lots = BytesRange::prefix(Bytes::from_static(&KEY_PREFIX));

    let start = if start.is_empty() {
        all_lots.start
    } else {
        Bound::Included(encode_key(start))
    };
    let end = if end.is_empty() {
        all_lots.end
    } else {
        Bound::Excluded(encode_key(end))
    };

    BytesRange::new(start, end)
}

/// Serializes a lot into its stored form.
pub fn encode_lot(lot: &Lot) -> Result<Bytes> {
    serde_json::to_vec(lot)
        .map(Bytes::from)
        .map_err(|e| Error::Encoding(format!("failed to serialize lot {}: {}", lot.lot_id, e)))
}

/// Parses a stored value as a lot.
pub fn decode_lot(value: &[u8]) -> Result<Lot> {
    serde_json::from_slice(value).map_err(|e| Error::Decode(e.to_string()))
}
