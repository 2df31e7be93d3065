//! Newick-graph is a library and tool to persist phylogenetic trees given as
//! Newick strings into a graph database.
//!
//! Each tree vertex becomes a graph vertex, each branch a directed `CHILD`
//! edge carrying the branch length, and every vertex is listed in the
//! `"all"` index by name and bootstrap. The root is named after the tree id,
//! carries the Newick source and a timestamp, and is listed in the `"roots"`
//! index.
//! Core functionality provided:
//! - Newick: Parse a single n-ary Newick tree, see [crate::newick].
//! - Tree model: arena-based [PhyloTree](crate::model::PhyloTree), shared
//!   read-only between persistence tasks.
//! - Persistence engine: concurrent depth-first traversal that writes all
//!   children and index entries of a vertex in parallel and only links a
//!   child once its whole subtree is written, see [crate::engine].
//! - Graph stores: the [GraphStore](crate::store::GraphStore) trait, a Neo4j
//!   REST client and an in-memory graph, see [crate::store].
//!
//! Limitations:
//! - One tree per run
//! - No retries and no rollback; a failed graft leaves a partial graph
//!
//! # Usage
//! Graft a tree into an in-memory store:
//! ```
//! use newick_graph::graft::{GraftOptions, GraftRequest, graft};
//! use newick_graph::store::MemoryStore;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = Arc::new(MemoryStore::new());
//! let request = GraftRequest {
//!     tree_id: "puffins".to_string(),
//!     source: "(Fratercula_cirrhata,(Fratercula_arctica,Fratercula_corniculata));".to_string(),
//! };
//! let report = graft(Arc::clone(&store), request, &GraftOptions::default()).await.unwrap();
//!
//! assert_eq!(report.node_count, 5);
//! assert_eq!(store.snapshot().edges.len(), 4);
//! # });
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod graft;
pub mod model;
pub mod newick;
pub mod parser;
pub mod progress;
pub mod store;

pub use error::{Error, Result};
pub use graft::graft;
