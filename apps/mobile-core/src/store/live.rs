//! Shared, watchable collections driven by gateway events.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use parking_lot::RwLock;
use tokio::sync::{mpsc, watch};

use super::reconcile::{Outcome, Reconcile};
use crate::error::ClientError;
use crate::gateway::GatewayEvent;

/// An in-memory collection owned by one consumer (one screen instance).
///
/// Clones share the same contents. Snapshots are taken under a short read
/// lock; every change bumps a revision watch so the UI knows to re-render.
pub struct LiveList<T> {
    items: Arc<RwLock<Vec<T>>>,
    revision: watch::Sender<u64>,
}

impl<T> Clone for LiveList<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            revision: self.revision.clone(),
        }
    }
}

impl<T: Reconcile + Clone> LiveList<T> {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            items: Arc::new(RwLock::new(Vec::new())),
            revision,
        }
    }

    /// Current contents.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.read().clone()
    }

    /// Replace the whole collection with a fresh server view, discarding any
    /// speculative local state.
    pub fn replace(&self, items: Vec<T>) {
        *self.items.write() = items;
        self.bump();
    }

    /// Apply one event. `NeedsRefetch` leaves the collection untouched; the
    /// caller decides when to fetch.
    pub fn apply(&self, event: &GatewayEvent) -> Outcome {
        let outcome = {
            let mut items = self.items.write();
            T::reconcile(&mut items, event)
        };
        if outcome == Outcome::Applied {
            self.bump();
        }
        outcome
    }

    /// Bumped on every change. Subscribe to know when to take a snapshot.
    pub fn revision(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

/// Consume events until the stream ends, reconciling each into `list`.
///
/// Events apply strictly in arrival order. When one cannot be applied the
/// whole collection is replaced through `refetch`, which is expected to go
/// through the authenticated request wrapper. A failed refetch is logged and
/// the stream continues; the collection stays stale until the next refetch.
/// The task ends when the event channel is disposed and drops its sender.
pub async fn drive<T, F>(list: LiveList<T>, mut events: mpsc::Receiver<GatewayEvent>, refetch: F)
where
    T: Reconcile + Clone,
    F: Fn() -> BoxFuture<'static, Result<Vec<T>, ClientError>>,
{
    while let Some(event) = events.recv().await {
        match list.apply(&event) {
            Outcome::Applied | Outcome::Ignored => {}
            Outcome::NeedsRefetch => {
                tracing::debug!("event not applicable as-is, refetching collection");
                match refetch().await {
                    Ok(items) => list.replace(items),
                    Err(err) => {
                        tracing::warn!(error = %err, "collection refetch failed");
                    }
                }
            }
        }
    }
    tracing::debug!("event stream ended, stopping collection sync");
}
