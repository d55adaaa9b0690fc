//! One handle over the whole engine.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::bus::RingEvent;
use crate::bus::RingEventBus;
use crate::coordinator::Operation;
use crate::coordinator::OperationCoordinator;
use crate::error::Error;
use crate::error::Result;
use crate::preview::KeyPreview;
use crate::preview::KeyPreviewEngine;
use crate::remote::NodeInfo;
use crate::remote::SharedRemoteRing;
use crate::ring::store::RingState;
use crate::ring::store::RingStateStore;

/// The engine behind a single client session.
///
/// Owns the store, the preview engine, the event bus and the coordinator,
/// and exposes the imperative surface consumed by presentation code. Created
/// once at startup and passed around by handle; there is no ambient global.
pub struct RingSession {
    store: Arc<RingStateStore>,
    preview: Arc<KeyPreviewEngine>,
    bus: Arc<RingEventBus>,
    coordinator: OperationCoordinator,
    remote: SharedRemoteRing,
    node_info: Mutex<Option<NodeInfo>>,
}

impl RingSession {
    pub fn new(remote: SharedRemoteRing) -> Arc<Self> {
        let store = Arc::new(RingStateStore::new());
        let preview = Arc::new(KeyPreviewEngine::new(remote.clone()));
        let bus = Arc::new(RingEventBus::new());
        let coordinator = OperationCoordinator::new(
            remote.clone(),
            store.clone(),
            preview.clone(),
            bus.clone(),
        );
        Arc::new(Self {
            store,
            preview,
            bus,
            coordinator,
            remote,
            node_info: Mutex::new(None),
        })
    }

    fn lock_node_info(&self) -> Result<MutexGuard<Option<NodeInfo>>> {
        self.node_info.lock().map_err(|_| Error::Lock)
    }

    /// Pull the node list and apply it. See
    /// [`OperationCoordinator::refresh`] for the ordering semantics.
    pub async fn refresh(&self) -> Result<RingState> {
        self.coordinator.refresh().await
    }

    /// Select a node by id; ignored if the id is not a current member.
    pub fn select(&self, id: u64) -> Result<()> {
        self.store.select(id)
    }

    /// Submit a mutating operation and drive it to completion.
    pub async fn submit(&self, operation: Operation) -> Result<()> {
        self.coordinator.submit(operation).await
    }

    /// Record a key edit for the debounced preview.
    pub fn set_key(&self, key: &str) -> Result<()> {
        self.preview.set_key(key)
    }

    /// Fetch the opaque info payload for `id`, keep it as the displayed
    /// blob, and select the node if it is still a member.
    ///
    /// On any failure the previously held info stays in place; a malformed
    /// payload must not blank out the last good read.
    pub async fn fetch_node_info(&self, id: u64) -> Result<NodeInfo> {
        let info = self.remote.node_info(id).await?;
        *self.lock_node_info()? = Some(info.clone());
        self.store.select(id)?;
        Ok(info)
    }

    /// The last successfully fetched node info, if any.
    pub fn node_info(&self) -> Result<Option<NodeInfo>> {
        Ok(self.lock_node_info()?.clone())
    }

    /// The current snapshot/selection pair.
    pub fn state(&self) -> Result<RingState> {
        self.store.state()
    }

    /// The current key preview, if one has resolved.
    pub fn key_preview(&self) -> Result<Option<KeyPreview>> {
        self.preview.current()
    }

    /// Attach a subscriber to the event bus.
    pub fn subscribe(&self) -> Result<async_channel::Receiver<RingEvent>> {
        self.bus.subscribe()
    }

    /// The preview engine, for spawning its debounce daemon.
    pub fn preview_engine(&self) -> Arc<KeyPreviewEngine> {
        self.preview.clone()
    }
}
