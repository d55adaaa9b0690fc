//! Event channel between the engine and its consumers.

use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::error::Error;
use crate::error::Result;

/// Used to notify consumers of events that occur in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RingEvent {
    /// A freshly inserted key was routed to this node.
    RouteHighlighted {
        node_id: u64,
    },
}

/// Fan-out channel for [`RingEvent`].
///
/// Zero, one, or many subscribers may be attached; each receives every event
/// emitted after it subscribed, in emission order. There is no replay: a
/// subscriber attaching after an emission will not see it.
#[derive(Debug, Default)]
pub struct RingEventBus {
    subscribers: Mutex<Vec<async_channel::Sender<RingEvent>>>,
}

impl RingEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_subscribers(&self) -> Result<MutexGuard<Vec<async_channel::Sender<RingEvent>>>> {
        self.subscribers.lock().map_err(|_| Error::Lock)
    }

    /// Attach a new subscriber and return its receiving end.
    pub fn subscribe(&self) -> Result<async_channel::Receiver<RingEvent>> {
        let (tx, rx) = async_channel::unbounded();
        self.lock_subscribers()?.push(tx);
        Ok(rx)
    }

    /// Deliver `event` to every live subscriber. Subscribers whose receiver
    /// has been dropped are pruned here.
    pub fn emit(&self, event: RingEvent) -> Result<()> {
        let mut subscribers = self.lock_subscribers()?;
        subscribers.retain(|tx| tx.try_send(event).is_ok());
        tracing::debug!(?event, subscribers = subscribers.len(), "ring event emitted");
        Ok(())
    }

    /// Number of currently attached subscribers.
    pub fn subscriber_count(&self) -> Result<usize> {
        Ok(self.lock_subscribers()?.len())
    }
}
