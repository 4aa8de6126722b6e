//! Reconciliation of pushed events against in-memory collections.
//!
//! Each rule is a pure function of (collection, event). Anything ambiguous
//! resolves to `NeedsRefetch` rather than a guess; the driver then replaces
//! the collection with the server's current view.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use sitedocs_common::{ObjectSite, WorkItem};

use crate::gateway::GatewayEvent;

/// What applying one event did to a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The collection changed.
    Applied,
    /// The event did not apply here: a duplicate insert, an update for an
    /// unknown id, a delete of something already gone, or an event meant
    /// for another entity kind.
    Ignored,
    /// The event was too incomplete to apply safely.
    NeedsRefetch,
}

/// A collection entry that can absorb gateway events.
pub trait Reconcile: Sized {
    fn id(&self) -> i64;

    /// Apply one event to `items`. Events arrive on a single stream per
    /// consumer and are applied strictly in that order.
    fn reconcile(items: &mut Vec<Self>, event: &GatewayEvent) -> Outcome;
}

// ---------------------------------------------------------------------------
// Shared rules
// ---------------------------------------------------------------------------

/// Insert `item` unless an entry with its id already exists. Create events
/// can be delivered more than once; the second copy must change nothing.
fn insert_new<T: Reconcile>(items: &mut Vec<T>, item: T) -> Outcome {
    if items.iter().any(|existing| existing.id() == item.id()) {
        return Outcome::Ignored;
    }
    items.push(item);
    Outcome::Applied
}

/// Shallow-merge the patch's top-level fields into the entry it names.
///
/// The entry round-trips through JSON so only fields present in the patch
/// change. An update for an id not in the collection is a benign race (the
/// record was deleted before its update arrived) and is dropped, not
/// inserted; an update implies prior existence.
fn merge_by_id<T>(items: &mut Vec<T>, patch: &Map<String, Value>) -> Outcome
where
    T: Reconcile + Serialize + DeserializeOwned,
{
    let Some(id) = patch.get("id").and_then(Value::as_i64) else {
        return Outcome::NeedsRefetch;
    };
    let Some(slot) = items.iter_mut().find(|item| item.id() == id) else {
        return Outcome::Ignored;
    };

    let mut merged = match serde_json::to_value(&*slot) {
        Ok(Value::Object(map)) => map,
        _ => return Outcome::NeedsRefetch,
    };
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }

    match serde_json::from_value(Value::Object(merged)) {
        Ok(updated) => {
            *slot = updated;
            Outcome::Applied
        }
        // The merged row no longer matches the entity shape; let the
        // server's view win.
        Err(_) => Outcome::NeedsRefetch,
    }
}

/// Deletes are idempotent: removing an id that is not present is fine.
fn remove_by_id<T: Reconcile>(items: &mut Vec<T>, id: i64) -> Outcome {
    let before = items.len();
    items.retain(|item| item.id() != id);
    if items.len() == before {
        Outcome::Ignored
    } else {
        Outcome::Applied
    }
}

// ---------------------------------------------------------------------------
// Entity bindings
// ---------------------------------------------------------------------------

impl Reconcile for ObjectSite {
    fn id(&self) -> i64 {
        self.id
    }

    fn reconcile(items: &mut Vec<Self>, event: &GatewayEvent) -> Outcome {
        match event {
            GatewayEvent::ObjectAssigned {
                object: Some(object),
            } => insert_new(items, object.clone()),
            GatewayEvent::ObjectAssigned { object: None } => Outcome::NeedsRefetch,
            GatewayEvent::ObjectDeleted {
                object_id: Some(id),
            } => remove_by_id(items, *id),
            GatewayEvent::ObjectDeleted { object_id: None } => Outcome::NeedsRefetch,
            _ => Outcome::Ignored,
        }
    }
}

impl Reconcile for WorkItem {
    fn id(&self) -> i64 {
        self.id
    }

    fn reconcile(items: &mut Vec<Self>, event: &GatewayEvent) -> Outcome {
        match event {
            GatewayEvent::WorkCreated { work: Some(work) } => insert_new(items, work.clone()),
            GatewayEvent::WorkCreated { work: None } => Outcome::NeedsRefetch,
            GatewayEvent::WorkUpdated { patch: Some(patch) } => merge_by_id(items, patch),
            GatewayEvent::WorkUpdated { patch: None } => Outcome::NeedsRefetch,
            GatewayEvent::WorkDeleted { work_id: Some(id) } => remove_by_id(items, *id),
            GatewayEvent::WorkDeleted { work_id: None } => Outcome::NeedsRefetch,
            _ => Outcome::Ignored,
        }
    }
}
