//! HTTP client for the Neo4j REST API.
//!
//! Uses the `/db/data/` endpoints: nodes are created with `POST node`,
//! saved with `PUT node/{id}/properties`, related with
//! `POST node/{id}/relationships`, and indexed with `POST index/node/{family}`.
//! Credentials may be given as user info in the base URL.

use crate::error::StoreError;
use crate::store::{GraphStore, GraphVertex, Properties, RelationshipKind, VersionInfo, VertexId};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Response to a node creation
#[derive(Debug, Deserialize)]
struct NodeResponse {
    #[serde(rename = "self")]
    self_uri: String,
    #[serde(default)]
    metadata: Option<NodeMetadata>,
}

#[derive(Debug, Deserialize)]
struct NodeMetadata {
    id: u64,
}

/// Response of the service root
#[derive(Debug, Deserialize)]
struct ServiceRoot {
    #[serde(default)]
    neo4j_version: Option<String>,
}

/// Request body for relationship creation
#[derive(Debug, Serialize)]
struct RelationshipRequest<'a> {
    to: String,
    #[serde(rename = "type")]
    kind: &'a str,
    data: &'a Properties,
}

/// Request body for adding a node to an index
#[derive(Debug, Serialize)]
struct IndexRequest<'a> {
    key: &'a str,
    value: &'a Value,
    uri: String,
}

/// Neo4j graph store reached over HTTP.
#[derive(Clone)]
pub struct Neo4jStore {
    http: Client,
    base_url: String,
}

impl fmt::Debug for Neo4jStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Neo4jStore")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Neo4jStore {
    /// Creates a client for the server at `base_url` (e.g. `http://localhost:7474`).
    ///
    /// Trailing slashes are stripped. No request timeout is set.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the server root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn data_url(&self, path: &str) -> String {
        format!("{}/db/data/{}", self.base_url, path)
    }

    fn node_uri(&self, id: VertexId) -> String {
        self.data_url(&format!("node/{}", id))
    }

    /// Maps a non-2xx response to [StoreError::Status].
    async fn check(resp: Response, url: &str) -> Result<Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        })
    }
}

/// Extracts the node id from a node response, preferring the metadata
/// block and falling back to the last segment of the node URI.
fn node_id(node: &NodeResponse) -> Result<VertexId, StoreError> {
    if let Some(metadata) = &node.metadata {
        return Ok(VertexId(metadata.id));
    }

    node.self_uri
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
        .map(VertexId)
        .ok_or_else(|| StoreError::InvalidResponse(format!("no node id in {:?}", node.self_uri)))
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn probe(&self) -> Result<VersionInfo, StoreError> {
        let url = self.data_url("");
        let resp = self.http.get(&url).send().await?;
        let root: ServiceRoot = Self::check(resp, &url).await?.json().await?;

        Ok(VersionInfo {
            version: root.neo4j_version.unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn create_vertex(&self, properties: Properties) -> Result<GraphVertex, StoreError> {
        let url = self.data_url("node");
        let resp = self.http.post(&url).json(&properties).send().await?;
        let node: NodeResponse = Self::check(resp, &url).await?.json().await?;
        let id = node_id(&node)?;
        debug!(%id, "created node");

        Ok(GraphVertex { id, properties })
    }

    async fn save_vertex(&self, vertex: &GraphVertex) -> Result<(), StoreError> {
        let url = self.data_url(&format!("node/{}/properties", vertex.id));
        let resp = self.http.put(&url).json(&vertex.properties).send().await?;
        Self::check(resp, &url).await?;
        Ok(())
    }

    async fn create_edge(
        &self,
        from: &GraphVertex,
        to: &GraphVertex,
        kind: RelationshipKind,
        properties: Properties,
    ) -> Result<(), StoreError> {
        let url = self.data_url(&format!("node/{}/relationships", from.id));
        let body = RelationshipRequest {
            to: self.node_uri(to.id),
            kind: kind.as_str(),
            data: &properties,
        };
        let resp = self.http.post(&url).json(&body).send().await?;
        Self::check(resp, &url).await?;
        Ok(())
    }

    async fn insert_index_entry(
        &self,
        family: &str,
        key: &str,
        value: &Value,
        vertex: &GraphVertex,
    ) -> Result<(), StoreError> {
        let url = self.data_url(&format!("index/node/{}", family));
        let body = IndexRequest {
            key,
            value,
            uri: self.node_uri(vertex.id),
        };
        let resp = self.http.post(&url).json(&body).send().await?;
        Self::check(resp, &url).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_from_metadata() {
        let node: NodeResponse = serde_json::from_str(
            r#"{"self": "http://localhost:7474/db/data/node/7", "metadata": {"id": 42}}"#,
        )
        .unwrap();
        assert_eq!(node_id(&node).unwrap(), VertexId(42));
    }

    #[test]
    fn test_node_id_from_self_uri() {
        let node: NodeResponse =
            serde_json::from_str(r#"{"self": "http://localhost:7474/db/data/node/123"}"#).unwrap();
        assert_eq!(node_id(&node).unwrap(), VertexId(123));
    }

    #[test]
    fn test_node_id_missing() {
        let node: NodeResponse =
            serde_json::from_str(r#"{"self": "http://localhost:7474/db/data/node/"}"#).unwrap();
        assert!(matches!(node_id(&node), Err(StoreError::InvalidResponse(_))));
    }

    #[test]
    fn test_urls() {
        let store = Neo4jStore::new("http://localhost:7474/");
        assert_eq!(store.base_url(), "http://localhost:7474");
        assert_eq!(store.node_uri(VertexId(5)), "http://localhost:7474/db/data/node/5");
        assert_eq!(store.data_url("index/node/all"), "http://localhost:7474/db/data/index/node/all");
    }

    #[test]
    fn test_relationship_body() {
        let mut data = Properties::new();
        data.insert("length".to_string(), Value::from(0.5));
        let body = RelationshipRequest {
            to: "http://localhost:7474/db/data/node/2".to_string(),
            kind: RelationshipKind::Child.as_str(),
            data: &data,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["type"], "CHILD");
        assert_eq!(json["data"]["length"], 0.5);
    }
}
