//! Data types for lot records.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// The `docType` value stored alongside every lot record.
pub const LOT_RECORD_TYPE: &str = "asset";

/// Marker for the `docType` tag of a lot record.
///
/// Serializes as [`LOT_RECORD_TYPE`] and refuses to deserialize any other
/// value, so a record of another kind sharing the keyspace never decodes as a
/// lot. Records written without a tag decode to the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordType;

impl Serialize for RecordType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(LOT_RECORD_TYPE)
    }
}

impl<'de> Deserialize<'de> for RecordType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        if tag == LOT_RECORD_TYPE {
            Ok(RecordType)
        } else {
            Err(serde::de::Error::custom(format!(
                "unexpected docType {:?}, expected {:?}",
                tag, LOT_RECORD_TYPE
            )))
        }
    }
}

/// A traceable batch of seed or cuttings.
///
/// Field names on the wire follow the ledger's JSON format (`LotID`,
/// `PropagationMethod`, ...). `owner` stays `None` until the lot is
/// transferred. Stored fields outside that set are kept in `extra` and
/// written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    #[serde(rename = "LotID")]
    pub lot_id: String,
    #[serde(rename = "PropagationMethod")]
    pub propagation_method: String,
    /// Nominally an ISO-8601 date. Never validated.
    #[serde(rename = "PropagationDate")]
    pub propagation_date: String,
    /// Quantity and unit as free text, e.g. "25 plants".
    #[serde(rename = "PropagationQuantity")]
    pub propagation_quantity: String,
    #[serde(rename = "Owner", default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(rename = "docType", default)]
    pub record_type: RecordType,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Lot {
    /// Creates an unowned lot.
    pub fn new(
        lot_id: impl Into<String>,
        propagation_method: impl Into<String>,
        propagation_date: impl Into<String>,
        propagation_quantity: impl Into<String>,
    ) -> Self {
        Self {
            lot_id: lot_id.into(),
            propagation_method: propagation_method.into(),
            propagation_date: propagation_date.into(),
            propagation_quantity: propagation_quantity.into(),
            owner: None,
            record_type: RecordType,
            extra: Map::new(),
        }
    }
}

/// A stored value as seen by a listing: either a decoded lot or, when the
/// bytes are not a lot record, their text as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LotRecord {
    Decoded(Lot),
    Raw(String),
}

impl LotRecord {
    /// Returns the decoded lot, if any.
    pub fn as_lot(&self) -> Option<&Lot> {
        match self {
            LotRecord::Decoded(lot) => Some(lot),
            LotRecord::Raw(_) => None,
        }
    }
}

/// A key and its record, returned by iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LotEntry {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Record")]
    pub record: LotRecord,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn should_serialize_with_ledger_field_names() {
        // given
        let lot = Lot::new("001", "Seed", "2021-03-05", "1 gram");

        // when
        let value = serde_json::to_value(&lot).unwrap();

        // then
        assert_eq!(
            value,
            json!({
                "LotID": "001",
                "PropagationMethod": "Seed",
                "PropagationDate": "2021-03-05",
                "PropagationQuantity": "1 gram",
                "docType": "asset"
            })
        );
    }

    #[test]
    fn should_serialize_owner_once_set() {
        // given
        let mut lot = Lot::new("001", "Seed", "2021-03-05", "1 gram");
        lot.owner = Some("Greenhouse 4".to_string());

        // when
        let value = serde_json::to_value(&lot).unwrap();

        // then
        assert_eq!(value["Owner"], "Greenhouse 4");
    }

    #[test]
    fn should_accept_record_without_doc_type() {
        // given
        let json = r#"{"LotID":"006","PropagationMethod":"Seed","PropagationDate":"2021-01-01","PropagationQuantity":"3 grams"}"#;

        // when
        let lot: Lot = serde_json::from_str(json).unwrap();

        // then
        assert_eq!(lot, Lot::new("006", "Seed", "2021-01-01", "3 grams"));
    }

    #[test]
    fn should_reject_record_of_another_type() {
        // given
        let json = r#"{"LotID":"006","PropagationMethod":"Seed","PropagationDate":"2021-01-01","PropagationQuantity":"3 grams","docType":"shipment"}"#;

        // when
        let result = serde_json::from_str::<Lot>(json);

        // then
        assert!(result.unwrap_err().to_string().contains("unexpected docType"));
    }

    #[test]
    fn should_keep_unknown_fields_through_decode_and_encode() {
        // given
        let json = r#"{"LotID":"007","PropagationMethod":"Seed","PropagationDate":"2021-01-01","PropagationQuantity":"3 grams","Grower":"Hillside Farm"}"#;

        // when
        let lot: Lot = serde_json::from_str(json).unwrap();
        let value = serde_json::to_value(&lot).unwrap();

        // then
        assert_eq!(lot.extra["Grower"], "Hillside Farm");
        assert_eq!(value["Grower"], "Hillside Farm");
        assert_eq!(value["docType"], "asset");
    }

    #[test]
    fn should_serialize_entries_with_raw_fallback() {
        // given
        let entries = vec![
            LotEntry {
                key: "001".to_string(),
                record: LotRecord::Decoded(Lot::new("001", "Seed", "2021-03-05", "1 gram")),
            },
            LotEntry {
                key: "002".to_string(),
                record: LotRecord::Raw("not json".to_string()),
            },
        ];

        // when
        let value = serde_json::to_value(&entries).unwrap();

        // then
        assert_eq!(value[0]["Key"], "001");
        assert_eq!(value[0]["Record"]["PropagationQuantity"], "1 gram");
        assert_eq!(value[1]["Record"], "not json");
    }
}
