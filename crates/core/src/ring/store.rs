//! The single serialization point for membership mutation.

use std::sync::Mutex;
use std::sync::MutexGuard;

use serde::Serialize;

use super::RingSnapshot;
use crate::error::Error;
use crate::error::Result;
use crate::remote::NodeRecord;

/// Snapshot plus selection, published as one unit.
///
/// Invariant: if `selection` is set it names a member of `snapshot`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RingState {
    pub snapshot: RingSnapshot,
    pub selection: Option<u64>,
}

/// Canonical holder of [`RingState`].
///
/// Every refresh result funnels through [`apply_refresh`](Self::apply_refresh)
/// regardless of what triggered it. Overlapping refreshes are not serialized
/// against each other; they apply in completion order and the last writer
/// wins.
#[derive(Debug, Default)]
pub struct RingStateStore {
    state: Mutex<RingState>,
}

impl RingStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_state(&self) -> Result<MutexGuard<RingState>> {
        self.state.lock().map_err(|_| Error::Lock)
    }

    /// Rebuild the snapshot from raw records and repair the selection:
    /// keep it if the id is still a member, otherwise fall back to the lowest
    /// id, or clear it when the ring is empty. Snapshot and selection are
    /// swapped in under one lock so observers never see them disagree.
    ///
    /// Returns the state as published.
    pub fn apply_refresh(&self, records: &[NodeRecord]) -> Result<RingState> {
        let snapshot = RingSnapshot::from_records(records);
        let mut state = self.lock_state()?;
        let selection = match state.selection {
            Some(id) if snapshot.contains(id) => Some(id),
            _ => snapshot.first_id(),
        };
        *state = RingState {
            snapshot,
            selection,
        };
        tracing::debug!(
            nodes = state.snapshot.len(),
            selection = ?state.selection,
            "ring refresh applied"
        );
        Ok(state.clone())
    }

    /// Select `id` if it is a current member. Selecting a vanished node is
    /// ignored, never an error.
    pub fn select(&self, id: u64) -> Result<()> {
        let mut state = self.lock_state()?;
        if state.snapshot.contains(id) {
            state.selection = Some(id);
        }
        Ok(())
    }

    /// Drop the selection without touching the snapshot.
    pub fn clear_selection(&self) -> Result<()> {
        self.lock_state()?.selection = None;
        Ok(())
    }

    /// The current snapshot/selection pair.
    pub fn state(&self) -> Result<RingState> {
        Ok(self.lock_state()?.clone())
    }

    pub fn snapshot(&self) -> Result<RingSnapshot> {
        Ok(self.lock_state()?.snapshot.clone())
    }

    pub fn selection(&self) -> Result<Option<u64>> {
        Ok(self.lock_state()?.selection)
    }
}
