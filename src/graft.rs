//! One full run: parse a Newick text and graft it into a graph store.
//!
//! Phases, each failing fast:
//! 1. parse the source (no store contact on failure)
//! 2. require the root to have at least one child
//! 3. probe the store
//! 4. rename the root to the tree id
//! 5. persist the tree
//! 6. finalize the root

use crate::engine::{self, EngineOptions};
use crate::error::{Error, Result};
use crate::newick::{self, InternalLabels, NewickParser};
use crate::parser::ParsingError;
use crate::progress::{Progress, ProgressTarget};
use crate::store::{GraphStore, GraphVertex};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// What to graft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraftRequest {
    /// Identifier of the tree; becomes the root's name and its `"roots"` key.
    pub tree_id: String,
    /// Newick source text, stored verbatim on the root.
    pub source: String,
}

/// How to graft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraftOptions {
    pub engine: EngineOptions,
    pub progress: ProgressTarget,
    pub internal_labels: InternalLabels,
}

impl Default for GraftOptions {
    fn default() -> Self {
        Self {
            engine: EngineOptions::default(),
            progress: ProgressTarget::Hidden,
            internal_labels: InternalLabels::default(),
        }
    }
}

/// Outcome of a successful graft.
#[derive(Debug, Clone)]
pub struct GraftReport {
    /// The finalized root vertex
    pub root: GraphVertex,
    /// Wall time from parsing to finalization
    pub elapsed: Duration,
    /// Number of tree vertices persisted
    pub node_count: usize,
}

/// Grafts the tree in `request` into `store`.
///
/// # Errors
/// * [Error::Parse] - source is not a Newick tree, or its root has no children
/// * [Error::Connectivity] - the store probe failed; nothing was written
/// * [Error::Persist] - a mutation failed; earlier writes remain in the store
pub async fn graft<S>(store: Arc<S>, request: GraftRequest, options: &GraftOptions) -> Result<GraftReport>
where
    S: GraphStore + ?Sized + 'static,
{
    let start = Instant::now();
    let GraftRequest { tree_id, source } = request;

    let parser = NewickParser::new().with_internal_labels(options.internal_labels);
    let (mut tree, stats) = newick::parse_str_with(&parser, &source)?;
    if tree.root().is_leaf() {
        return Err(ParsingError::unusable_tree("Root vertex has no children".to_string()).into());
    }
    info!(
        tree_id = %tree_id,
        nodes = stats.node_count,
        leaves = stats.leaf_count,
        "parsed tree"
    );

    let version = store.probe().await.map_err(Error::Connectivity)?;
    info!(version = %version.version, "graph store reachable");

    tree.set_root_name(tree_id.as_str());
    debug_assert!(tree.is_valid());
    let tree = Arc::new(tree);

    let progress = Arc::new(Progress::new(stats.node_count, options.progress));
    let persisted =
        engine::persist_tree(Arc::clone(&store), Arc::clone(&tree), Arc::clone(&progress), &options.engine).await;
    let root = match persisted {
        Ok(root) => {
            progress.finish();
            root
        }
        Err(e) => {
            progress.abandon();
            return Err(e.into());
        }
    };

    let root = engine::finalize_root(store.as_ref(), &tree, root, &tree_id, &source).await?;

    Ok(GraftReport {
        root,
        elapsed: start.elapsed(),
        node_count: stats.node_count,
    })
}
