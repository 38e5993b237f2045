use livewatch_core::{Payload, Record, RecordId, RecordStatus, Snapshot};
use serde_json::{Map, Value};

use crate::{FailureKind, FetchError};

/// Key fields tried in order when resolving a record's id.
const ID_FIELDS: [&str; 2] = ["id", "complaint_id"];
const STATUS_FIELD: &str = "status";

/// Decode a JSON record list into a snapshot.
///
/// Accepts either a bare array of objects or an object with a `records` array.
/// Every record needs an `id` (or `complaint_id`) and a `status`; one bad record
/// fails the whole list.
pub fn decode_records(bytes: &[u8]) -> Result<Snapshot, FetchError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("records") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(FetchError::new(
                    FailureKind::Decode,
                    "expected an array or an object with a `records` array",
                ))
            }
        },
        _ => {
            return Err(FetchError::new(
                FailureKind::Decode,
                "expected an array of records",
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(object) => decode_record(index, object),
            _ => Err(FetchError::new(
                FailureKind::Decode,
                format!("record {index} is not an object"),
            )),
        })
        .collect()
}

fn decode_record(index: usize, mut object: Map<String, Value>) -> Result<Record, FetchError> {
    let id = resolve_id(&object).ok_or_else(|| {
        FetchError::new(
            FailureKind::Decode,
            format!("record {index} has no usable id"),
        )
    })?;
    let status = match object.get(STATUS_FIELD) {
        Some(Value::String(label)) => RecordStatus::parse(label),
        _ => {
            return Err(FetchError::new(
                FailureKind::Decode,
                format!("record {id} has no status"),
            ))
        }
    };

    for field in ID_FIELDS.iter().chain(std::iter::once(&STATUS_FIELD)) {
        object.remove(*field);
    }
    let payload: Payload = object
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(text) => Some((key, text)),
            other => Some((key, other.to_string())),
        })
        .collect();

    Ok(Record {
        id,
        status,
        payload,
    })
}

fn resolve_id(object: &Map<String, Value>) -> Option<RecordId> {
    ID_FIELDS.iter().find_map(|field| match object.get(*field)? {
        Value::String(text) if !text.trim().is_empty() => Some(RecordId::new(text.trim())),
        Value::Number(number) => Some(RecordId::new(number.to_string())),
        _ => None,
    })
}
