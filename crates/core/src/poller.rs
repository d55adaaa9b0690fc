//! Periodic membership refresh daemon.

use std::sync::Arc;
use std::time::Duration;

use futures::future::FutureExt;
use futures::pin_mut;
use futures::select;
use futures_timer::Delay;

use crate::session::RingSession;

/// Drives [`RingSession::refresh`] on a fixed interval.
///
/// A failed poll is logged and the loop keeps going; the store stays on its
/// last-known-good state until a poll succeeds again.
#[derive(Clone)]
pub struct Poller {
    session: Arc<RingSession>,
}

impl Poller {
    pub fn new(session: Arc<RingSession>) -> Self {
        Self { session }
    }

    /// Run the poll loop. Spawn this once; it never returns.
    pub async fn wait(self: Arc<Self>, interval: Duration) {
        loop {
            let timeout = Delay::new(interval).fuse();
            pin_mut!(timeout);
            select! {
                _ = timeout => {
                    self.session
                        .refresh()
                        .await
                        .map(drop)
                        .unwrap_or_else(|e| tracing::error!("periodic refresh failed: {e}"));
                }
            }
        }
    }
}
