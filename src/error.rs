//! Error types for grafting trees into a graph store.

use crate::model::VertexIndex;
use crate::parser::ParsingError;
use std::fmt;
use thiserror::Error;

/// Errors reported by a [GraphStore](crate::store::GraphStore) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network or connection error
    #[error("network error: {0}")]
    Network(String),

    /// Store answered with a non-success status
    #[error("unexpected status {status} from {url}: {body}")]
    Status { status: u16, url: String, body: String },

    /// Response could not be interpreted
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Store refused the mutation, e.g. an edge to an unknown vertex
    #[error("rejected: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Network(e.to_string())
    }
}

/// Kind of store operation issued while persisting a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CreateVertex,
    CreateEdge { child: VertexIndex },
    InsertIndex { family: &'static str, key: &'static str },
    SaveVertex,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CreateVertex => write!(f, "vertex creation"),
            Operation::CreateEdge { child } => write!(f, "edge creation to child {child}"),
            Operation::InsertIndex { family, key } => write!(f, "index insertion into {family:?}/{key:?}"),
            Operation::SaveVertex => write!(f, "vertex save"),
        }
    }
}

/// A store operation failed while persisting a tree.
///
/// Carries the operation kind, the tree vertex it was issued for, and the
/// underlying cause.
#[derive(Debug, Error)]
#[error("{operation} failed for vertex {vertex} ({}): {source}", .name.as_deref().unwrap_or("unnamed"))]
pub struct PersistError {
    pub operation: Operation,
    pub vertex: VertexIndex,
    pub name: Option<String>,
    #[source]
    pub source: StoreError,
}

/// Top-level error of a graft run.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed command line input
    #[error("{0}")]
    Usage(String),

    /// Input is not a usable Newick tree; raised before any store contact
    #[error("could not parse tree: {0}")]
    Parse(#[from] ParsingError),

    /// Liveness probe failed; raised before any mutation
    #[error("could not reach graph store: {0}")]
    Connectivity(#[source] StoreError),

    /// A mutation failed mid-traversal; earlier writes are not rolled back
    #[error("persisting tree failed: {0}")]
    Persist(#[from] PersistError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
