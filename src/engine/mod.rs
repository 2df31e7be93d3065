//! Concurrent tree-to-graph persistence.
//!
//! [persist_tree] writes one vertex per tree vertex, one `CHILD` edge per
//! branch and two `"all"` index entries per vertex. Per vertex:
//!
//! 1. create the vertex `{name, bootstrap}`
//! 2. count progress, arm a [CompletionBarrier] with `children + 2`
//! 3. persist every child concurrently; once a child's subtree is done,
//!    create the edge to it and signal the barrier
//! 4. concurrently, write the `name` and `bootstrap` index entries,
//!    each signalling the barrier
//! 5. when the barrier fires, hand the vertex to the parent's continuation
//!
//! So an edge to a child is only created once the child's whole subtree,
//! including all index entries below it, is written.
//!
//! The first failing store call aborts the traversal: it is returned from
//! [persist_tree] immediately and no further store calls are issued. Calls
//! already in flight may still complete. Nothing is rolled back.

pub mod barrier;
pub mod finalize;

pub use barrier::CompletionBarrier;
pub use finalize::finalize_root;

use crate::error::{Operation, PersistError, StoreError};
use crate::model::{PhyloTree, Vertex, VertexIndex};
use crate::progress::Progress;
use crate::store::{
    GraphStore, GraphVertex, INDEX_ALL, KEY_BOOTSTRAP, KEY_LENGTH, KEY_NAME, Properties, RelationshipKind,
};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Semaphore, mpsc, oneshot};
use tracing::{debug, info, warn};

/// Tuning of the persistence engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Maximum number of store calls in flight at once.
    /// `None` leaves fan-out unbounded.
    pub max_in_flight: Option<usize>,
}

/// Receives the vertex of a fully persisted subtree.
type Continuation = Box<dyn FnOnce(GraphVertex) + Send + 'static>;

/// Persists `tree` into `store`, returning the root vertex once every vertex,
/// edge and `"all"` index entry of the tree is written.
///
/// `progress` is advanced once per created vertex.
pub async fn persist_tree<S>(
    store: Arc<S>,
    tree: Arc<PhyloTree>,
    progress: Arc<Progress>,
    options: &EngineOptions,
) -> Result<GraphVertex, PersistError>
where
    S: GraphStore + ?Sized + 'static,
{
    info!(
        vertices = tree.num_vertices(),
        max_in_flight = ?options.max_in_flight,
        "persisting tree"
    );

    let (error_tx, mut error_rx) = mpsc::unbounded_channel();
    let traversal = Arc::new(Traversal {
        store,
        tree: Arc::clone(&tree),
        progress,
        abort: Abort::new(error_tx),
        limiter: options.max_in_flight.map(|n| Semaphore::new(n.max(1))),
    });

    let (done_tx, done_rx) = oneshot::channel();
    traversal.persist(
        tree.root_index(),
        Box::new(move |root| {
            let _ = done_tx.send(root);
        }),
    );

    // `traversal` keeps a sender alive, so the error branch never closes
    tokio::select! {
        biased;
        Some(error) = error_rx.recv() => Err(error),
        Ok(root) = done_rx => {
            info!(id = %root.id, "tree persisted");
            Ok(root)
        }
    }
}

// =#========================================================================#=
// TRAVERSAL
// =#========================================================================#=
/// State shared by all tasks of one traversal.
struct Traversal<S: ?Sized> {
    store: Arc<S>,
    tree: Arc<PhyloTree>,
    progress: Arc<Progress>,
    abort: Abort,
    limiter: Option<Semaphore>,
}

impl<S> Traversal<S>
where
    S: GraphStore + ?Sized + 'static,
{
    /// Launches persistence of the subtree at `index`; `done` receives its
    /// vertex once the whole subtree is written.
    fn persist(self: &Arc<Self>, index: VertexIndex, done: Continuation) {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.persist_vertex(index, done).await });
    }

    async fn persist_vertex(self: Arc<Self>, index: VertexIndex, done: Continuation) {
        let node = self.tree.vertex(index);

        let call = self.store.create_vertex(vertex_properties(node));
        let Some(vertex) = self.issue(Operation::CreateVertex, index, call).await else {
            return;
        };
        let vertex = Arc::new(vertex);
        self.progress.advance();
        debug!(index, id = %vertex.id, "vertex created");

        let barrier = {
            let vertex = Arc::clone(&vertex);
            CompletionBarrier::new(node.num_children() + 2, move || {
                debug!(index, "subtree persisted");
                done(GraphVertex::clone(&vertex));
            })
        };

        for &child in node.children() {
            let this = Arc::clone(&self);
            let parent = Arc::clone(&vertex);
            let barrier = Arc::clone(&barrier);
            self.persist(
                child,
                Box::new(move |child_vertex| {
                    tokio::spawn(async move { this.link(index, parent, child, child_vertex, barrier).await });
                }),
            );
        }

        for (key, value) in index_values(node) {
            let this = Arc::clone(&self);
            let vertex = Arc::clone(&vertex);
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                let operation = Operation::InsertIndex { family: INDEX_ALL, key };
                let call = this.store.insert_index_entry(INDEX_ALL, key, &value, &vertex);
                if this.issue(operation, index, call).await.is_some() {
                    barrier.signal();
                }
            });
        }
    }

    /// Creates the edge from `parent` to the persisted subtree `child`.
    async fn link(
        self: Arc<Self>,
        parent_index: VertexIndex,
        parent: Arc<GraphVertex>,
        child: VertexIndex,
        child_vertex: GraphVertex,
        barrier: Arc<CompletionBarrier>,
    ) {
        let properties = edge_properties(self.tree.vertex(child));
        let call = self
            .store
            .create_edge(&parent, &child_vertex, RelationshipKind::Child, properties);

        if self.issue(Operation::CreateEdge { child }, parent_index, call).await.is_some() {
            barrier.signal();
        }
    }

    /// Runs a store call for the vertex at `index` unless the traversal was
    /// aborted, honouring the in-flight limit.
    ///
    /// A failure aborts the traversal before the permit is released.
    /// `None` means the call was skipped or failed.
    async fn issue<T, F>(&self, operation: Operation, index: VertexIndex, call: F) -> Option<T>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        if self.abort.is_raised() {
            return None;
        }

        let _permit = match &self.limiter {
            Some(limiter) => Some(limiter.acquire().await.ok()?),
            None => None,
        };
        if self.abort.is_raised() {
            return None;
        }

        match call.await {
            Ok(value) => Some(value),
            Err(e) => {
                self.fail(operation, index, e);
                None
            }
        }
    }

    fn fail(&self, operation: Operation, index: VertexIndex, source: StoreError) {
        let error = PersistError {
            operation,
            vertex: index,
            name: self.tree.vertex(index).name().map(str::to_string),
            source,
        };
        self.abort.raise(error);
    }
}

// =#========================================================================#=
// ABORT
// =#========================================================================#=
/// First-error-wins abort flag of a traversal.
struct Abort {
    raised: AtomicBool,
    errors: mpsc::UnboundedSender<PersistError>,
}

impl Abort {
    fn new(errors: mpsc::UnboundedSender<PersistError>) -> Self {
        Self {
            raised: AtomicBool::new(false),
            errors,
        }
    }

    fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    fn raise(&self, error: PersistError) {
        if self.raised.swap(true, Ordering::AcqRel) {
            debug!(%error, "ignoring failure after abort");
            return;
        }

        warn!(%error, "aborting traversal");
        let _ = self.errors.send(error);
    }
}

// =#========================================================================#=
// ATTRIBUTES
// =#========================================================================#=
/// Vertex attributes `{name, bootstrap}`; absent values are left out.
fn vertex_properties(node: &Vertex) -> Properties {
    let mut properties = Properties::new();
    if let Some(name) = node.name() {
        properties.insert(KEY_NAME.to_string(), Value::from(name));
    }
    if let Some(bootstrap) = node.bootstrap() {
        properties.insert(KEY_BOOTSTRAP.to_string(), Value::from(bootstrap));
    }
    properties
}

/// Edge attributes `{length}` of the branch above `child`.
fn edge_properties(child: &Vertex) -> Properties {
    let mut properties = Properties::new();
    if let Some(length) = child.branch_length() {
        properties.insert(KEY_LENGTH.to_string(), Value::from(*length));
    }
    properties
}

/// The two `"all"` index entries of a vertex: name (or `""`) and
/// bootstrap (or `null`).
fn index_values(node: &Vertex) -> [(&'static str, Value); 2] {
    [
        (KEY_NAME, Value::from(node.name().unwrap_or(""))),
        (KEY_BOOTSTRAP, node.bootstrap().map_or(Value::Null, Value::from)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newick::parse_str;

    #[test]
    fn test_attributes_of_unnamed_vertex() {
        let (tree, _) = parse_str("(,B:1.5)0.9;").unwrap();
        let root = tree.root();
        assert!(vertex_properties(root).get(KEY_NAME).is_none());
        assert_eq!(vertex_properties(root)[KEY_BOOTSTRAP], "0.9");

        let [(name_key, name), (bootstrap_key, bootstrap)] = index_values(root);
        assert_eq!((name_key, name), (KEY_NAME, Value::from("")));
        assert_eq!((bootstrap_key, bootstrap), (KEY_BOOTSTRAP, Value::from("0.9")));

        let leaf = tree.vertex(root.children()[0]);
        assert_eq!(index_values(leaf)[1].1, Value::Null);
        assert!(edge_properties(leaf).is_empty());

        let b = tree.vertex(root.children()[1]);
        assert_eq!(edge_properties(b)[KEY_LENGTH], 1.5);
    }
}
