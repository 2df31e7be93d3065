//! In-process graph store.
//!
//! Keeps vertices, edges and index entries in memory behind a mutex, and
//! records every mutation in call order. Used for `--dry-run` and tests.

use crate::error::StoreError;
use crate::store::{GraphStore, GraphVertex, Properties, RelationshipKind, VersionInfo, VertexId};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// A stored edge.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryEdge {
    pub from: VertexId,
    pub to: VertexId,
    pub kind: RelationshipKind,
    pub properties: Properties,
}

/// A stored index entry.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub family: String,
    pub key: String,
    pub value: Value,
    pub vertex: VertexId,
}

/// One mutation, as recorded in the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateVertex(VertexId),
    SaveVertex(VertexId),
    CreateEdge { from: VertexId, to: VertexId },
    InsertIndex { family: String, key: String, vertex: VertexId },
}

/// Contents of a [MemoryStore].
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    pub vertices: BTreeMap<VertexId, Properties>,
    pub edges: Vec<MemoryEdge>,
    pub index_entries: Vec<IndexEntry>,
    pub journal: Vec<Mutation>,
    pub probes: usize,
}

impl MemoryGraph {
    /// Returns `true` if nothing was ever asked of the store.
    pub fn is_untouched(&self) -> bool {
        self.probes == 0 && self.journal.is_empty()
    }

    /// Returns the vertices listed in `family` under `key` = `value`.
    pub fn lookup(&self, family: &str, key: &str, value: &Value) -> Vec<VertexId> {
        self.index_entries
            .iter()
            .filter(|e| e.family == family && e.key == key && &e.value == value)
            .map(|e| e.vertex)
            .collect()
    }

    /// Returns the number of entries in index `family`.
    pub fn num_index_entries(&self, family: &str) -> usize {
        self.index_entries.iter().filter(|e| e.family == family).count()
    }

    /// Returns the targets of all edges leaving `vertex`.
    pub fn children_of(&self, vertex: VertexId) -> Vec<VertexId> {
        self.edges.iter().filter(|e| e.from == vertex).map(|e| e.to).collect()
    }

    /// Returns the sources of all edges entering `vertex`.
    pub fn parents_of(&self, vertex: VertexId) -> Vec<VertexId> {
        self.edges.iter().filter(|e| e.to == vertex).map(|e| e.from).collect()
    }

    /// Returns the property `key` of `vertex`.
    pub fn property(&self, vertex: VertexId, key: &str) -> Option<&Value> {
        self.vertices.get(&vertex).and_then(|p| p.get(key))
    }

    /// Returns the vertices whose `name` property equals `name`.
    pub fn vertices_named(&self, name: &str) -> Vec<VertexId> {
        self.vertices
            .iter()
            .filter(|(_, p)| p.get(crate::store::KEY_NAME).and_then(Value::as_str) == Some(name))
            .map(|(&id, _)| id)
            .collect()
    }
}

/// Graph store keeping everything in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    graph: Mutex<MemoryGraph>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current contents.
    pub fn snapshot(&self) -> MemoryGraph {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryGraph> {
        // Every mutation is a single push or insert, a poisoned graph is still consistent
        self.graph.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn require_vertex(graph: &MemoryGraph, id: VertexId) -> Result<(), StoreError> {
    if graph.vertices.contains_key(&id) {
        Ok(())
    } else {
        Err(StoreError::Rejected(format!("unknown vertex {}", id)))
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn probe(&self) -> Result<VersionInfo, StoreError> {
        self.lock().probes += 1;
        Ok(VersionInfo {
            version: format!("memory-{}", env!("CARGO_PKG_VERSION")),
        })
    }

    async fn create_vertex(&self, properties: Properties) -> Result<GraphVertex, StoreError> {
        let mut graph = self.lock();
        let id = VertexId(graph.vertices.len() as u64);
        graph.vertices.insert(id, properties.clone());
        graph.journal.push(Mutation::CreateVertex(id));

        Ok(GraphVertex { id, properties })
    }

    async fn save_vertex(&self, vertex: &GraphVertex) -> Result<(), StoreError> {
        let mut graph = self.lock();
        require_vertex(&graph, vertex.id)?;
        graph.vertices.insert(vertex.id, vertex.properties.clone());
        graph.journal.push(Mutation::SaveVertex(vertex.id));
        Ok(())
    }

    async fn create_edge(
        &self,
        from: &GraphVertex,
        to: &GraphVertex,
        kind: RelationshipKind,
        properties: Properties,
    ) -> Result<(), StoreError> {
        let mut graph = self.lock();
        require_vertex(&graph, from.id)?;
        require_vertex(&graph, to.id)?;
        graph.edges.push(MemoryEdge {
            from: from.id,
            to: to.id,
            kind,
            properties,
        });
        graph.journal.push(Mutation::CreateEdge {
            from: from.id,
            to: to.id,
        });
        Ok(())
    }

    async fn insert_index_entry(
        &self,
        family: &str,
        key: &str,
        value: &Value,
        vertex: &GraphVertex,
    ) -> Result<(), StoreError> {
        let mut graph = self.lock();
        require_vertex(&graph, vertex.id)?;
        graph.index_entries.push(IndexEntry {
            family: family.to_string(),
            key: key.to_string(),
            value: value.clone(),
            vertex: vertex.id,
        });
        graph.journal.push(Mutation::InsertIndex {
            family: family.to_string(),
            key: key.to_string(),
            vertex: vertex.id,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_edge_to_unknown_vertex_rejected() {
        let store = MemoryStore::new();
        let a = store.create_vertex(Properties::new()).await.unwrap();
        let ghost = GraphVertex {
            id: VertexId(99),
            properties: Properties::new(),
        };

        let result = store
            .create_edge(&a, &ghost, RelationshipKind::Child, Properties::new())
            .await;
        assert!(matches!(result, Err(StoreError::Rejected(_))));
        assert!(store.snapshot().edges.is_empty());
    }

    #[tokio::test]
    async fn test_save_replaces_properties() {
        let store = MemoryStore::new();
        let mut vertex = store.create_vertex(Properties::new()).await.unwrap();
        vertex.set_property("name", "Takahe");
        store.save_vertex(&vertex).await.unwrap();

        let graph = store.snapshot();
        assert_eq!(graph.vertices_named("Takahe"), vec![vertex.id]);
        assert_eq!(
            graph.journal,
            vec![Mutation::CreateVertex(vertex.id), Mutation::SaveVertex(vertex.id)]
        );
    }

    #[tokio::test]
    async fn test_probe_is_counted() {
        let store = MemoryStore::new();
        assert!(store.snapshot().is_untouched());
        store.probe().await.unwrap();
        let graph = store.snapshot();
        assert_eq!(graph.probes, 1);
        assert!(!graph.is_untouched());
    }
}
