//! Debounced key→hash routing preview.
//!
//! Consumers feed every key edit through [`KeyPreviewEngine::set_key`]; a
//! daemon started with [`KeyPreviewEngine::wait`] watches the edit stream,
//! waits for a quiet period, and asks the cluster where the settled key would
//! route. A monotonic request generation guards the result: a completion is
//! applied only if no newer edit happened while it was in flight, so slow
//! responses can never overwrite the preview for a newer key.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use futures::future::FutureExt;
use futures::pin_mut;
use futures::select;
use futures_timer::Delay;

use crate::consts::KEY_DEBOUNCE;
use crate::error::Error;
use crate::error::Result;
use crate::remote::SharedRemoteRing;

/// The resolved preview for the most recently settled key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPreview {
    pub for_key: String,
    pub hash: u64,
    pub target_node_id: u64,
    pub request_seq: u64,
}

#[derive(Debug, Clone)]
struct KeyEdit {
    key: String,
    seq: u64,
}

#[derive(Debug, Default)]
struct PreviewState {
    key: String,
    seq: u64,
    preview: Option<KeyPreview>,
}

/// Owner of the current [`KeyPreview`].
///
/// A newer preview supersedes the old one; nothing is merged. An empty key
/// clears the preview synchronously, without a network call.
pub struct KeyPreviewEngine {
    remote: SharedRemoteRing,
    state: Mutex<PreviewState>,
    edit_tx: async_channel::Sender<KeyEdit>,
    edit_rx: async_channel::Receiver<KeyEdit>,
}

impl KeyPreviewEngine {
    pub fn new(remote: SharedRemoteRing) -> Self {
        let (edit_tx, edit_rx) = async_channel::unbounded();
        Self {
            remote,
            state: Mutex::new(PreviewState::default()),
            edit_tx,
            edit_rx,
        }
    }

    fn lock_state(&self) -> Result<MutexGuard<PreviewState>> {
        self.state.lock().map_err(|_| Error::Lock)
    }

    /// Record a key edit and bump the request generation.
    ///
    /// Empty edits clear the preview immediately. Every edit, empty or not,
    /// is forwarded to the debounce daemon so a pending quiet period restarts
    /// rather than firing for a superseded key.
    pub fn set_key(&self, key: &str) -> Result<()> {
        let edit = {
            let mut state = self.lock_state()?;
            state.seq += 1;
            state.key = key.to_string();
            if key.is_empty() {
                state.preview = None;
            }
            KeyEdit {
                key: state.key.clone(),
                seq: state.seq,
            }
        };
        self.edit_tx.try_send(edit).map_err(|_| Error::ChannelClosed)
    }

    /// The currently typed key.
    pub fn key(&self) -> Result<String> {
        Ok(self.lock_state()?.key.clone())
    }

    /// The current preview, if one has resolved for the current generation.
    pub fn current(&self) -> Result<Option<KeyPreview>> {
        Ok(self.lock_state()?.preview.clone())
    }

    /// Run the debounce daemon. Spawn this once per engine.
    ///
    /// Each received edit opens a quiet period of [`KEY_DEBOUNCE`]; further
    /// edits restart it. Only when the stream stays quiet does the latest key
    /// go out as a preview request.
    pub async fn wait(self: Arc<Self>) {
        loop {
            let Ok(mut edit) = self.edit_rx.recv().await else {
                return;
            };
            loop {
                let timeout = Delay::new(KEY_DEBOUNCE).fuse();
                let next = self.edit_rx.recv().fuse();
                pin_mut!(timeout, next);
                select! {
                    e = next => match e {
                        Ok(e) => edit = e,
                        Err(_) => return,
                    },
                    _ = timeout => break,
                }
            }
            if edit.key.is_empty() {
                continue;
            }
            self.request_preview(edit)
                .await
                .unwrap_or_else(|e| tracing::warn!("hash preview failed: {e}"));
        }
    }

    async fn request_preview(&self, edit: KeyEdit) -> Result<()> {
        let Some(resolved) = self.remote.hash_preview(&edit.key).await? else {
            return Ok(());
        };
        let mut state = self.lock_state()?;
        // The generation check: a completion for anything but the latest
        // edit is discarded, not applied.
        if state.seq != edit.seq {
            tracing::debug!(key = %edit.key, seq = edit.seq, "discarding stale hash preview");
            return Ok(());
        }
        state.preview = Some(KeyPreview {
            for_key: edit.key,
            hash: resolved.hash,
            target_node_id: resolved.successor,
            request_seq: edit.seq,
        });
        Ok(())
    }
}
