//! Typed boundary between raw `listings` documents and [`Listing`].
//!
//! The store hands back untyped JSON objects. Each one is decoded strictly;
//! documents with missing or out-of-range fields are quarantined (logged and
//! left out of the snapshot) instead of being trusted.

use serde_json::{Map, Value};
use tracing::warn;

use super::domain::{Listing, ListingId, ListingPatch, ListingStatus, NewListing};
use super::submission::MAX_IMAGES;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("document {id} is not an object")]
    NotAnObject { id: String },
    #[error("document {id}: {reason}")]
    Schema { id: String, reason: String },
    #[error("document {id}: field '{field}' {problem}")]
    Constraint {
        id: String,
        field: &'static str,
        problem: &'static str,
    },
}

/// Decodes one stored document, injecting the store-assigned id.
pub fn decode(id: &str, fields: &Value) -> Result<Listing, DocumentError> {
    let Value::Object(map) = fields else {
        return Err(DocumentError::NotAnObject { id: id.to_string() });
    };

    let mut map = map.clone();
    map.insert("id".to_string(), Value::String(id.to_string()));

    let mut listing: Listing =
        serde_json::from_value(Value::Object(map)).map_err(|err| DocumentError::Schema {
            id: id.to_string(),
            reason: err.to_string(),
        })?;

    let constraint = |field: &'static str, problem: &'static str| DocumentError::Constraint {
        id: id.to_string(),
        field,
        problem,
    };

    if listing.price == 0 {
        return Err(constraint("price", "must be positive"));
    }
    if listing.rooms == 0 {
        return Err(constraint("rooms", "must be positive"));
    }
    if listing.max_people == 0 {
        return Err(constraint("maxPeople", "must be positive"));
    }
    if listing.images.len() > MAX_IMAGES {
        return Err(constraint("images", "holds more than five entries"));
    }

    // A reason is only meaningful on a rejected listing.
    if listing.status != ListingStatus::Rejected {
        listing.rejection_reason = None;
    }

    Ok(listing)
}

/// Decodes a whole collection snapshot, dropping documents that fail validation.
pub fn decode_snapshot<'a, I>(documents: I) -> Vec<Listing>
where
    I: IntoIterator<Item = (&'a String, &'a Value)>,
{
    documents
        .into_iter()
        .filter_map(|(id, fields)| match decode(id, fields) {
            Ok(listing) => Some(listing),
            Err(err) => {
                warn!(document = %id, error = %err, "quarantined malformed listing document");
                None
            }
        })
        .collect()
}

pub fn encode_new(listing: &NewListing) -> Result<Value, serde_json::Error> {
    serde_json::to_value(listing)
}

/// Applies a patch to the raw document, touching only the patched fields.
pub fn apply_patch(
    id: &ListingId,
    fields: &mut Value,
    patch: ListingPatch,
) -> Result<(), DocumentError> {
    let Value::Object(map) = fields else {
        return Err(DocumentError::NotAnObject { id: id.to_string() });
    };

    let schema_error = |err: serde_json::Error| DocumentError::Schema {
        id: id.to_string(),
        reason: err.to_string(),
    };

    if let Some(status) = patch.status {
        map.insert("status".to_string(), Value::String(status.as_str().to_string()));
    }
    if let Some(reason) = patch.rejection_reason {
        map.insert(
            "rejectionReason".to_string(),
            reason.map(Value::String).unwrap_or(Value::Null),
        );
    }
    if let Some(hidden) = patch.hidden {
        map.insert("hidden".to_string(), Value::Bool(hidden));
    }
    if let Some(transition) = patch.transition {
        let entry = serde_json::to_value(transition).map_err(schema_error)?;
        push_history(map, entry);
    }

    Ok(())
}

fn push_history(map: &mut Map<String, Value>, entry: Value) {
    match map.get_mut("statusHistory") {
        Some(Value::Array(items)) => items.push(entry),
        _ => {
            map.insert("statusHistory".to_string(), Value::Array(vec![entry]));
        }
    }
}
