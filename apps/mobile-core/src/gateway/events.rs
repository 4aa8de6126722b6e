//! Wire format of pushed events, and their decoding.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use sitedocs_common::{ObjectSite, WorkItem};

use crate::error::ClientError;

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Frame tags pushed by the service. Spellings are the wire's own; the
/// backend mixes snake case and kebab case, so keep them verbatim.
pub struct EventTag;

impl EventTag {
    pub const ASSIGNED_TO_OBJECT: &'static str = "assigned_to_object";
    pub const WORK: &'static str = "work";
    pub const WORK_UPDATE: &'static str = "work-update";
    pub const WORK_DELETED: &'static str = "work-deleted";
    pub const OBJECT_DELETED: &'static str = "object-deleted";
}

// ---------------------------------------------------------------------------
// Wire frame
// ---------------------------------------------------------------------------

/// Raw shape of a pushed frame: `{"type": <tag>, "object": <payload>}`.
#[derive(Debug, Deserialize)]
struct Frame {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    object: Option<Value>,
}

// ---------------------------------------------------------------------------
// Decoded events
// ---------------------------------------------------------------------------

/// A change notification, decoded as far as the frame allows.
///
/// An absent payload means the frame carried a known tag but no usable body;
/// the reconciler answers those with a full refetch instead of guessing.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    /// This account was assigned to a site.
    ObjectAssigned { object: Option<ObjectSite> },
    /// A work record was created in one of this account's collections.
    WorkCreated { work: Option<WorkItem> },
    /// Fields of an existing record changed. The patch holds only the
    /// changed fields plus the record's `id`.
    WorkUpdated { patch: Option<Map<String, Value>> },
    WorkDeleted { work_id: Option<i64> },
    ObjectDeleted { object_id: Option<i64> },
}

/// Decode one text frame.
///
/// Unknown tags come back as `Ok(None)` so newer server versions can push
/// event kinds this client does not know yet. Anything that is not a JSON
/// object with a string `type` is `MalformedEvent`.
pub fn decode(text: &str) -> Result<Option<GatewayEvent>, ClientError> {
    let frame: Frame =
        serde_json::from_str(text).map_err(|err| ClientError::MalformedEvent {
            reason: err.to_string(),
        })?;

    let event = match frame.tag.as_str() {
        EventTag::ASSIGNED_TO_OBJECT => GatewayEvent::ObjectAssigned {
            object: entity_payload(frame.object),
        },
        EventTag::WORK => GatewayEvent::WorkCreated {
            work: entity_payload(frame.object),
        },
        EventTag::WORK_UPDATE => GatewayEvent::WorkUpdated {
            patch: frame.object.and_then(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            }),
        },
        EventTag::WORK_DELETED => GatewayEvent::WorkDeleted {
            work_id: id_payload(frame.object.as_ref(), "workId"),
        },
        EventTag::OBJECT_DELETED => GatewayEvent::ObjectDeleted {
            object_id: id_payload(frame.object.as_ref(), "objectId"),
        },
        other => {
            tracing::debug!(tag = %other, "ignoring unknown event tag");
            return Ok(None);
        }
    };
    Ok(Some(event))
}

/// Decode a full-entity payload. A body that does not match the entity shape
/// is downgraded to "absent" so the reconciler falls back to a refetch.
fn entity_payload<T: DeserializeOwned>(payload: Option<Value>) -> Option<T> {
    let value = payload?;
    match serde_json::from_value(value) {
        Ok(entity) => Some(entity),
        Err(err) => {
            tracing::debug!(error = %err, "event payload does not match entity shape");
            None
        }
    }
}

/// Pull the bare identifier out of a delete payload.
fn id_payload(payload: Option<&Value>, key: &str) -> Option<i64> {
    payload?.get(key).and_then(Value::as_i64)
}
