//! ringview-rpc client
//!
//! Reqwest-backed implementation of the
//! [`RemoteRing`](ringview_core::remote::RemoteRing) surface, speaking the
//! ring server's fixed REST contract.

pub mod client;
pub mod types;

pub use client::Client;
