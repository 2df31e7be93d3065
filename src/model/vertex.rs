//! Vertex module for phylogenetic tree representation.

use crate::model::tree::VertexIndex;
use std::fmt;
use std::ops::Deref;

/// During construction, a vertex might not have its parent set yet.
const NO_PARENT_SET: VertexIndex = usize::MAX;

// =#========================================================================#=
// VERTEX
// =#========================================================================#=
/// Represents a vertex (node) of an n-ary phylogenetic tree.
///
/// A vertex is a leaf if it has no children. The root is the one vertex
/// without a parent. Internal vertices may carry a name as well as a
/// bootstrap label, i.e. a confidence annotation of the branch above them.
///
/// # Invariants
/// - `index` is the index in the arena
/// - `parent` is [NO_PARENT_SET] only for the root and during construction
/// - `branch_length` is finite if set
/// - `children` are kept in the order they appeared in the Newick string
#[derive(PartialEq, Debug, Clone)]
pub struct Vertex {
    index: VertexIndex,
    parent: VertexIndex,
    children: Vec<VertexIndex>,
    name: Option<String>,
    bootstrap: Option<String>,
    branch_length: Option<BranchLength>,
}

impl Vertex {
    /// Creates a new leaf vertex.
    ///
    /// # Arguments
    /// * `index` - The unique index of this vertex in the tree (arena)
    /// * `name` - Label of the leaf, if any
    /// * `branch_length` - Distance to parent vertex
    pub fn new_leaf(index: VertexIndex, name: Option<String>, branch_length: Option<BranchLength>) -> Self {
        Vertex {
            index,
            parent: NO_PARENT_SET,
            children: Vec::new(),
            name,
            bootstrap: None,
            branch_length,
        }
    }

    /// Creates a new vertex with the given children.
    ///
    /// # Arguments
    /// * `index` - The unique index of this vertex in the tree (arena)
    /// * `children` - Indices of the children, in order
    /// * `name` - Name of the vertex, if any
    /// * `bootstrap` - Bootstrap label of the branch above, if any
    /// * `branch_length` - Distance to parent vertex
    pub fn new_internal(
        index: VertexIndex,
        children: Vec<VertexIndex>,
        name: Option<String>,
        bootstrap: Option<String>,
        branch_length: Option<BranchLength>,
    ) -> Self {
        Vertex {
            index,
            parent: NO_PARENT_SET,
            children,
            name,
            bootstrap,
            branch_length,
        }
    }

    /// Returns the index of this vertex.
    pub fn index(&self) -> VertexIndex {
        self.index
    }

    /// Returns the name of this vertex, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Overwrites the name of this vertex.
    pub(crate) fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    /// Returns the bootstrap label of this vertex, if any.
    pub fn bootstrap(&self) -> Option<&str> {
        self.bootstrap.as_deref()
    }

    /// Returns the branch length to the parent, if set.
    pub fn branch_length(&self) -> Option<BranchLength> {
        self.branch_length
    }

    /// Returns whether this vertex has a [BranchLength].
    pub fn has_branch_length(&self) -> bool {
        self.branch_length.is_some()
    }

    /// Returns the children of this vertex (empty for leaves).
    pub fn children(&self) -> &[VertexIndex] {
        &self.children
    }

    /// Returns the number of children.
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if this vertex is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns `true` if this vertex has children.
    pub fn is_internal(&self) -> bool {
        !self.children.is_empty()
    }

    /// Sets the parent of this vertex.
    pub(crate) fn set_parent(&mut self, parent: VertexIndex) {
        self.parent = parent;
    }

    /// Returns the index of the parent, or `None` for the root
    /// (or if the parent has not been set yet during construction).
    pub fn parent(&self) -> Option<VertexIndex> {
        if self.parent == NO_PARENT_SET {
            None
        } else {
            Some(self.parent)
        }
    }

    /// Returns `true` if this vertex has a parent set.
    pub fn has_parent(&self) -> bool {
        self.parent != NO_PARENT_SET
    }
}

// =#========================================================================#=
// BRANCH LENGTH
// =#========================================================================#=
/// Branch length in a phylogenetic tree, enforced finite.
///
/// Represents the evolutionary distance between a vertex and its parent.
/// Negative lengths are allowed, as produced e.g. by neighbor joining.
/// The value is guaranteed to be finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchLength(f64);

impl BranchLength {
    /// Creates a new branch length.
    ///
    /// # Panics
    /// Panics if `length` is NaN or infinite.
    /// Use [BranchLength::try_new] for untrusted input.
    pub fn new(length: f64) -> Self {
        assert!(length.is_finite(), "Branch length must be finite, got {}", length);
        BranchLength(length)
    }

    /// Creates a new branch length, returning `None` if `length`
    /// is NaN or infinite.
    pub fn try_new(length: f64) -> Option<Self> {
        if length.is_finite() {
            Some(BranchLength(length))
        } else {
            None
        }
    }
}

impl Deref for BranchLength {
    type Target = f64;
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl fmt::Display for BranchLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
