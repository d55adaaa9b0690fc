use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Error;
use crate::error::Result;
use crate::remote::HashPreview;
use crate::remote::NodeInfo;
use crate::remote::NodeRecord;
use crate::remote::RemoteRing;
use crate::session::RingSession;

mod test_coordinator;

pub fn record(id: u64, messages_count: u64) -> NodeRecord {
    NodeRecord {
        id,
        successor: None,
        messages_count,
    }
}

/// In-memory stand-in for the remote cluster. Responses are scripted per
/// test; every call is counted so tests can assert that validation failures
/// never reach the network.
#[derive(Default)]
pub struct FakeRing {
    nodes: Mutex<Vec<NodeRecord>>,
    previews: Mutex<HashMap<String, HashPreview>>,
    preview_delays: Mutex<HashMap<String, Duration>>,
    info: Mutex<HashMap<u64, NodeInfo>>,

    pub fail_list_nodes: AtomicBool,
    pub fail_node_info: AtomicBool,
    pub fail_join: AtomicBool,
    pub fail_leave: AtomicBool,
    pub fail_insert: AtomicBool,

    pub list_nodes_calls: AtomicUsize,
    pub join_calls: AtomicUsize,
    pub leave_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
    hash_keys: Mutex<Vec<String>>,
}

impl FakeRing {
    pub fn set_nodes(&self, records: Vec<NodeRecord>) {
        *self.nodes.lock().unwrap() = records;
    }

    pub fn set_preview(&self, key: &str, hash: u64, successor: u64) {
        self.previews
            .lock()
            .unwrap()
            .insert(key.to_string(), HashPreview { hash, successor });
    }

    /// Make the preview response for `key` arrive late.
    pub fn delay_preview(&self, key: &str, delay: Duration) {
        self.preview_delays
            .lock()
            .unwrap()
            .insert(key.to_string(), delay);
    }

    pub fn set_info(&self, id: u64, text: &str) {
        self.info
            .lock()
            .unwrap()
            .insert(id, NodeInfo(text.to_string()));
    }

    /// Keys that reached the hash endpoint, in request order.
    pub fn hash_keys(&self) -> Vec<String> {
        self.hash_keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteRing for FakeRing {
    async fn list_nodes(&self) -> Result<Vec<NodeRecord>> {
        self.list_nodes_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list_nodes.load(Ordering::SeqCst) {
            return Err(Error::Transport("connection refused".to_string()));
        }
        Ok(self.nodes.lock().unwrap().clone())
    }

    async fn node_info(&self, id: u64) -> Result<NodeInfo> {
        if self.fail_node_info.load(Ordering::SeqCst) {
            return Err(Error::Decode("NodeInfo", "expected value".to_string()));
        }
        self.info
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::Transport(format!("no node {id}")))
    }

    async fn hash_preview(&self, key: &str) -> Result<Option<HashPreview>> {
        if key.is_empty() {
            return Ok(None);
        }
        self.hash_keys.lock().unwrap().push(key.to_string());
        let delay = self.preview_delays.lock().unwrap().get(key).copied();
        if let Some(delay) = delay {
            futures_timer::Delay::new(delay).await;
        }
        self.previews
            .lock()
            .unwrap()
            .get(key)
            .copied()
            .map(Some)
            .ok_or_else(|| Error::Transport(format!("no scripted preview for {key}")))
    }

    async fn join(&self) -> Result<()> {
        self.join_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_join.load(Ordering::SeqCst) {
            return Err(Error::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    async fn leave(&self, id: u64) -> Result<()> {
        self.leave_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_leave.load(Ordering::SeqCst) {
            return Err(Error::Transport(format!("leave {id} refused")));
        }
        Ok(())
    }

    async fn insert(&self, key: &str, value: &str) -> Result<()> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if key.is_empty() || value.is_empty() {
            return Err(Error::Validation(
                "insert requires a non-empty key and value".to_string(),
            ));
        }
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(Error::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

pub fn prepare_session() -> (Arc<FakeRing>, Arc<RingSession>) {
    let remote = Arc::new(FakeRing::default());
    let session = RingSession::new(remote.clone());
    (remote, session)
}
