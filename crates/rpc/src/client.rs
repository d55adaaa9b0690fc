//! The HTTP client.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use ringview_core::error::Error;
use ringview_core::error::Result;
use ringview_core::remote::HashPreview;
use ringview_core::remote::NodeInfo;
use ringview_core::remote::NodeRecord;
use ringview_core::remote::RemoteRing;
use serde::de::DeserializeOwned;

use crate::types::InsertRequest;
use crate::types::NodesResponse;

/// Typed wrapper over the ring server's REST endpoints.
///
/// One instance per session; `reqwest::Client` pools connections internally.
/// Calls are issued exactly once, with no retry and no deadline beyond the
/// transport's own.
pub struct Client {
    client: HttpClient,
    base_url: String,
}

impl Client {
    /// Creates a new Client instance against the given base URL.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: HttpClient::default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_body(&self, req: reqwest::RequestBuilder) -> Result<bytes::Bytes> {
        req.send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::Transport(e.to_string()))?
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }

    async fn get_json<T>(&self, req: reqwest::RequestBuilder, what: &'static str) -> Result<T>
    where T: DeserializeOwned {
        let body = self.read_body(req).await?;
        serde_json::from_slice(&body).map_err(|e| Error::Decode(what, e.to_string()))
    }
}

#[async_trait]
impl RemoteRing for Client {
    async fn list_nodes(&self) -> Result<Vec<NodeRecord>> {
        let req = self.client.get(self.url("/nodes"));
        let resp: NodesResponse = self.get_json(req, "NodesResponse").await?;
        Ok(resp.nodes)
    }

    async fn node_info(&self, id: u64) -> Result<NodeInfo> {
        let req = self.client.get(self.url(&format!("/info/{id}")));
        // Arbitrary structured JSON; validate well-formedness, keep the
        // pretty-printed text, impose no schema.
        let value: serde_json::Value = self.get_json(req, "NodeInfo").await?;
        let text =
            serde_json::to_string_pretty(&value).map_err(|e| Error::Decode("NodeInfo", e.to_string()))?;
        Ok(NodeInfo(text))
    }

    async fn hash_preview(&self, key: &str) -> Result<Option<HashPreview>> {
        if key.is_empty() {
            return Ok(None);
        }
        let req = self.client.get(self.url("/hash")).query(&[("key", key)]);
        let preview: HashPreview = self.get_json(req, "HashPreview").await?;
        Ok(Some(preview))
    }

    async fn join(&self) -> Result<()> {
        // The ack body reports the new node's id; the follow-up node-list
        // refresh is authoritative, so it is not decoded here.
        self.read_body(self.client.post(self.url("/join"))).await?;
        Ok(())
    }

    async fn leave(&self, id: u64) -> Result<()> {
        self.read_body(self.client.post(self.url(&format!("/leave/{id}"))))
            .await?;
        Ok(())
    }

    async fn insert(&self, key: &str, value: &str) -> Result<()> {
        if key.is_empty() || value.is_empty() {
            return Err(Error::Validation(
                "insert requires a non-empty key and value".to_string(),
            ));
        }
        let req = self
            .client
            .post(self.url("/insert"))
            .json(&InsertRequest { key, value });
        self.read_body(req).await?;
        Ok(())
    }
}
