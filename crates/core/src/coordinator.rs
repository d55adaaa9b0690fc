//! Sequencing of mutating ring operations.
//!
//! The remote acks for join/leave/insert carry no usable data, so the side
//! effects the client shows (a fresh snapshot, a route-highlight animation)
//! have to be ordered here: mutate first, refresh after the ack, and for
//! inserts emit the highlight for the routing target that was previewed
//! before the insert was submitted.

use std::sync::Arc;

use crate::bus::RingEvent;
use crate::bus::RingEventBus;
use crate::error::Error;
use crate::error::Result;
use crate::preview::KeyPreviewEngine;
use crate::remote::SharedRemoteRing;
use crate::ring::store::RingState;
use crate::ring::store::RingStateStore;

/// A user-triggered mutation. Created transiently, consumed once by
/// [`OperationCoordinator::submit`], then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Ask the cluster to spawn a new node with a server-chosen id.
    Join,
    /// Ask one node to leave the ring.
    Leave { node_id: u64 },
    /// Store a key/value pair.
    Insert { key: String, value: String },
}

/// Orchestrates the other components around each [`Operation`]. Owns no
/// persistent state of its own.
pub struct OperationCoordinator {
    remote: SharedRemoteRing,
    store: Arc<RingStateStore>,
    preview: Arc<KeyPreviewEngine>,
    bus: Arc<RingEventBus>,
}

impl OperationCoordinator {
    pub fn new(
        remote: SharedRemoteRing,
        store: Arc<RingStateStore>,
        preview: Arc<KeyPreviewEngine>,
        bus: Arc<RingEventBus>,
    ) -> Self {
        Self {
            remote,
            store,
            preview,
            bus,
        }
    }

    /// The one path from the remote node list into the store. Every refresh
    /// trigger (periodic poll, post-join, post-leave, post-insert, manual)
    /// goes through here, so overlapping refreshes share one set of ordering
    /// semantics: they apply in completion order, last writer wins.
    ///
    /// On failure the store is left untouched.
    pub async fn refresh(&self) -> Result<RingState> {
        let records = self.remote.list_nodes().await?;
        self.store.apply_refresh(&records)
    }

    /// Run `operation` to completion: submit the mutating call, await its
    /// ack, then refresh. A failed call reports its error and changes no
    /// local state.
    pub async fn submit(&self, operation: Operation) -> Result<()> {
        match operation {
            Operation::Join => self.join().await,
            Operation::Leave { node_id } => self.leave(node_id).await,
            Operation::Insert { key, value } => self.insert(key, value).await,
        }
    }

    async fn join(&self) -> Result<()> {
        self.remote.join().await?;
        self.refresh().await?;
        Ok(())
    }

    async fn leave(&self, node_id: u64) -> Result<()> {
        self.remote.leave(node_id).await?;
        // Selection drops even if other nodes remain; the refresh then
        // repairs it to the lowest surviving id.
        self.store.clear_selection()?;
        self.refresh().await?;
        Ok(())
    }

    async fn insert(&self, key: String, value: String) -> Result<()> {
        if key.is_empty() || value.is_empty() {
            return Err(Error::Validation(
                "insert requires a non-empty key and value".to_string(),
            ));
        }

        // The insert ack carries no routing information. The highlight
        // target is the preview computed for this exact key, captured now,
        // at submission time. Reading it after the ack instead would race
        // against newer edits and could name a different key's target.
        let target = self
            .preview
            .current()?
            .filter(|p| p.for_key == key)
            .map(|p| p.target_node_id);

        // The typed key resets as soon as the insert is on its way.
        self.preview.set_key("")?;

        self.remote.insert(&key, &value).await?;
        self.refresh().await?;

        if let Some(node_id) = target {
            self.bus.emit(RingEvent::RouteHighlighted { node_id })?;
        } else {
            tracing::debug!(%key, "insert had no matching preview; skipping route highlight");
        }
        Ok(())
    }
}
