//! The remote ring surface.
//!
//! The cluster is reachable only through six HTTP operations. They are
//! modeled here as a trait so the engine can run against an in-memory fake in
//! tests; `ringview-rpc` provides the reqwest-backed implementation.
//!
//! No operation retries. A failed call surfaces a typed error to the caller
//! and has no further side effect.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::error::Result;

/// A membership record as reported by the cluster.
///
/// The `successor` pointer is display-only. Routing targets come exclusively
/// from [`HashPreview::successor`]; the node-list pointer may lag behind
/// stabilization and the server is free to omit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NodeRecord {
    pub id: u64,
    #[serde(default, deserialize_with = "lenient_id")]
    pub successor: Option<u64>,
    #[serde(rename = "messagesCount")]
    pub messages_count: u64,
}

/// Where the cluster would route a key: its hash and the responsible node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct HashPreview {
    pub hash: u64,
    pub successor: u64,
}

/// Opaque node-info payload.
///
/// The server returns arbitrary structured JSON here. The engine validates
/// well-formedness and keeps the pretty-printed text for display; it imposes
/// no schema beyond that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo(pub String);

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The engine accepts any shared [`RemoteRing`] trait object.
pub type SharedRemoteRing = Arc<dyn RemoteRing + Send + Sync>;

/// Typed asynchronous wrapper over the six remote operations.
#[async_trait]
pub trait RemoteRing {
    /// Fetch the full membership list. Records may arrive in any order.
    async fn list_nodes(&self) -> Result<Vec<NodeRecord>>;

    /// Fetch the opaque info payload for one node.
    async fn node_info(&self, id: u64) -> Result<NodeInfo>;

    /// Ask the cluster where `key` would route. An empty key short-circuits
    /// to `Ok(None)` without a network call.
    async fn hash_preview(&self, key: &str) -> Result<Option<HashPreview>>;

    /// Ask the cluster to spawn a new node. The ack carries no usable data.
    async fn join(&self) -> Result<()>;

    /// Ask node `id` to leave the ring.
    async fn leave(&self, id: u64) -> Result<()>;

    /// Store a key/value pair. Both must be non-empty; violations fail with
    /// [`Error::Validation`](crate::error::Error::Validation) before any
    /// network call.
    async fn insert(&self, key: &str, value: &str) -> Result<()>;
}

/// The server reports a node without a successor as `""`. Anything that is
/// not an unsigned integer decodes to `None` instead of failing the refresh.
fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where D: Deserializer<'de> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_u64())
}
