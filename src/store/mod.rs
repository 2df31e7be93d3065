//! Graph store abstraction.
//!
//! The persistence engine talks to the store only through the [GraphStore]
//! trait. Every operation is asynchronous and completes with a value or a
//! [StoreError]; each individual call is trusted to be atomic.
//!
//! Implementations:
//! * [Neo4jStore](neo4j::Neo4jStore) - Neo4j REST API over HTTP
//! * [MemoryStore](memory::MemoryStore) - in-process graph, used for dry runs and tests

pub mod memory;
pub mod neo4j;

pub use memory::MemoryStore;
pub use neo4j::Neo4jStore;

use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// Attribute map of a vertex or an edge.
pub type Properties = serde_json::Map<String, Value>;

/// Index family holding `name` and `bootstrap` entries of every vertex.
pub const INDEX_ALL: &str = "all";
/// Index family holding the roots of persisted trees, keyed by tree id.
pub const INDEX_ROOTS: &str = "roots";

/// Index key and vertex property holding the name.
pub const KEY_NAME: &str = "name";
/// Index key and vertex property holding the bootstrap label.
pub const KEY_BOOTSTRAP: &str = "bootstrap";
/// Root property holding the verbatim Newick source text.
pub const KEY_NEWICK: &str = "newick";
/// Root property holding the creation time (unix epoch milliseconds).
pub const KEY_TIMESTAMP: &str = "timestamp";
/// Edge property holding the branch length.
pub const KEY_LENGTH: &str = "length";

/// Store-assigned identity of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub u64);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle on a persisted vertex: its identity plus the properties last written.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphVertex {
    pub id: VertexId,
    pub properties: Properties,
}

impl GraphVertex {
    /// Returns the property stored under `key`, if any.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Sets a property locally; call [GraphStore::save_vertex] to persist it.
    pub fn set_property(&mut self, key: &str, value: impl Into<Value>) {
        self.properties.insert(key.to_string(), value.into());
    }
}

/// Type of a directed relationship between two vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    /// Parent to child branch of a tree
    Child,
}

impl RelationshipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::Child => "CHILD",
        }
    }
}

/// Answer of a liveness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: String,
}

/// Asynchronous graph store client.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Checks connectivity, returning the store version.
    async fn probe(&self) -> Result<VersionInfo, StoreError>;

    /// Creates a vertex with the given properties.
    async fn create_vertex(&self, properties: Properties) -> Result<GraphVertex, StoreError>;

    /// Replaces the stored properties of `vertex` with its current properties.
    async fn save_vertex(&self, vertex: &GraphVertex) -> Result<(), StoreError>;

    /// Creates a directed relationship `from -> to`.
    async fn create_edge(
        &self,
        from: &GraphVertex,
        to: &GraphVertex,
        kind: RelationshipKind,
        properties: Properties,
    ) -> Result<(), StoreError>;

    /// Adds `vertex` to index `family`, under `key` = `value`.
    async fn insert_index_entry(
        &self,
        family: &str,
        key: &str,
        value: &Value,
        vertex: &GraphVertex,
    ) -> Result<(), StoreError>;
}
