//! Data model for n-ary phylogenetic trees.
//!
//! Trees are represented by [PhyloTree], which uses the arena pattern to store
//! [Vertex] nodes referenced by [VertexIndex]. Leaves carry a name, internal
//! vertices may carry a name and a bootstrap label, and every non-root vertex
//! may carry a [BranchLength](vertex::BranchLength).
//!
//! Trees are built bottom-up by the [Newick parser](crate::newick) and are
//! read-only afterwards, except for the root name, which a graft overwrites
//! with the tree identifier before anything is persisted.

pub mod tree;
pub mod vertex;

pub use tree::PhyloTree;
pub use tree::VertexIndex;
pub use vertex::BranchLength;
pub use vertex::Vertex;
