//! Client-side synchronization engine for a Chord DHT cluster.
//!
//! The Chord protocol itself (consistent hashing, successor pointers, ring
//! stabilization) runs on a remote server and is reached through the small
//! HTTP surface modeled by [`remote::RemoteRing`]. This crate keeps a local,
//! invariant-preserving view of that ring in sync:
//!
//! - [`ring::store::RingStateStore`] holds the sorted membership snapshot and
//!   the current selection, and is the single point of mutation for both.
//! - [`preview::KeyPreviewEngine`] debounces a typed key and races hash
//!   previews against further edits, discarding stale completions.
//! - [`coordinator::OperationCoordinator`] sequences join/leave/insert so the
//!   follow-up refresh and route-highlight events land in causal order.
//! - [`bus::RingEventBus`] fans engine events out to any number of consumers.
//! - [`session::RingSession`] ties the pieces together behind one handle.
//!
//! All remote calls are plain async suspension points; overlapping refreshes
//! settle in completion order, and only the preview generation check enforces
//! ordering against staleness.

pub mod bus;
pub mod consts;
pub mod coordinator;
pub mod error;
pub mod poller;
pub mod preview;
pub mod remote;
pub mod ring;
pub mod session;

#[cfg(test)]
mod tests;
