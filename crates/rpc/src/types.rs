//! Request and response envelopes of the ring server.

use ringview_core::remote::NodeRecord;
use serde::Deserialize;
use serde::Serialize;

/// Body of `GET /nodes`.
#[derive(Debug, Deserialize)]
pub struct NodesResponse {
    pub nodes: Vec<NodeRecord>,
}

/// Body of `POST /insert`.
#[derive(Debug, Serialize)]
pub struct InsertRequest<'a> {
    pub key: &'a str,
    pub value: &'a str,
}
