//! Tree module for phylogenetic tree representation.
//!
//! This module provides the core data structure for representing phylogenetic trees:
//! - [PhyloTree]: n-ary tree using the arena pattern for efficient memory layout
//!   and cheap sharing between concurrent tasks (vertices are referenced by index).
//! - [VertexIndex] is used to index vertices.

use crate::model::vertex::{BranchLength, Vertex};

/// Index of a vertex in a tree (arena).
pub type VertexIndex = usize;

/// *During construction only*, index for unset root.
const NO_ROOT_SET_INDEX: VertexIndex = usize::MAX;

// =#========================================================================#=
// PHYLO TREE
// =#========================================================================#=
/// An n-ary phylogenetic tree represented using the arena pattern on [Vertex].
///
/// Vertices are stored in a contiguous vector and referenced by [VertexIndex].
/// Aim is to avoid referencing troubles (a tree is shared read-only between
/// many tasks while being persisted) and to provide cache locality for traversals.
///
/// # Structure
/// - All vertices (root, internal, and leaves) are stored in the arena
/// - Index of root is maintained
/// - No assumption on order of indices is maintained
/// - Branch lengths are optional, but if provided must be finite
///
/// # Construction
/// Bottom-up: add leaves, then vertices with children, and finally mark the root.
/// Test validity with [PhyloTree::is_valid].
///
/// # Example
/// ```
/// use newick_graph::model::PhyloTree;
/// use newick_graph::model::vertex::BranchLength;
///
/// // Create a tree: ((A:0.2,B:0.2)90:0.2,C:0.4);
/// let mut tree = PhyloTree::with_capacity(5);
/// let a = tree.add_leaf(Some("A".into()), Some(BranchLength::new(0.2)));
/// let b = tree.add_leaf(Some("B".into()), Some(BranchLength::new(0.2)));
/// let c = tree.add_leaf(Some("C".into()), Some(BranchLength::new(0.4)));
/// let ab = tree.add_internal(vec![a, b], None, Some("90".into()), Some(BranchLength::new(0.2)));
/// let root = tree.add_internal(vec![ab, c], None, None, None);
/// tree.set_root(root);
///
/// assert!(tree.is_valid());
/// assert_eq!(tree.num_vertices(), 5);
/// assert_eq!(tree.num_edges(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct PhyloTree {
    /// Vertices of this tree (arena pattern)
    vertices: Vec<Vertex>,

    /// Index of the root of this tree
    root_index: VertexIndex,
}

// ============================================================================
// New, Construction, Getters / Accessors (pub)
// ============================================================================
impl PhyloTree {
    /// Creates a new empty tree with capacity for `num_vertices` vertices.
    pub fn with_capacity(num_vertices: usize) -> Self {
        PhyloTree {
            vertices: Vec::with_capacity(num_vertices),
            root_index: NO_ROOT_SET_INDEX,
        }
    }

    /// Adds a leaf to the tree, assigning a unique index, which gets returned.
    ///
    /// # Arguments
    /// * `name` - Label of the leaf
    /// * `branch_length` - Length of incoming branch, i.e. distance to parent
    pub fn add_leaf(&mut self, name: Option<String>, branch_length: Option<BranchLength>) -> VertexIndex {
        let index = self.vertices.len();
        self.vertices.push(Vertex::new_leaf(index, name, branch_length));
        index
    }

    /// Adds a vertex with the given children to the tree, assigning a unique
    /// index, which gets returned. Sets this vertex as parent of its children.
    ///
    /// # Panics
    /// Panics if a child index is out of bounds.
    pub fn add_internal(
        &mut self,
        children: Vec<VertexIndex>,
        name: Option<String>,
        bootstrap: Option<String>,
        branch_length: Option<BranchLength>,
    ) -> VertexIndex {
        let index = self.vertices.len();
        for &child in &children {
            self.vertices[child].set_parent(index);
        }
        self.vertices
            .push(Vertex::new_internal(index, children, name, bootstrap, branch_length));
        index
    }

    /// Marks the vertex at `index` as root of this tree.
    pub fn set_root(&mut self, index: VertexIndex) {
        self.root_index = index;
    }

    /// Overwrites the name of the root vertex.
    ///
    /// # Panics
    /// Panics if the root hasn't been set.
    pub fn set_root_name(&mut self, name: impl Into<String>) {
        let root_index = self.root_index;
        self.vertices[root_index].set_name(name.into());
    }

    /// Returns whether root of tree has been set.
    pub fn is_root_set(&self) -> bool {
        self.root_index != NO_ROOT_SET_INDEX
    }

    /// Returns the index of the root vertex.
    pub fn root_index(&self) -> VertexIndex {
        self.root_index
    }

    /// Returns a reference to the root vertex.
    ///
    /// # Panics
    /// Panics if the root hasn't been set and thus tree hasn't been fully constructed yet.
    pub fn root(&self) -> &Vertex {
        &self[self.root_index]
    }

    /// Returns a reference to the vertex at the given index.
    ///
    /// # Panics
    /// Panics if the index is out of bounds.
    pub fn vertex(&self, index: VertexIndex) -> &Vertex {
        &self[index]
    }

    /// Returns the number of vertices in this tree.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of leaves in this tree.
    pub fn num_leaves(&self) -> usize {
        self.vertices.iter().filter(|&v| v.is_leaf()).count()
    }

    /// Returns the number of vertices with children in this tree (root included).
    pub fn num_internal(&self) -> usize {
        self.vertices.iter().filter(|&v| v.is_internal()).count()
    }

    /// Returns the number of parent-child branches, i.e. one less than the
    /// number of vertices for a non-empty tree.
    pub fn num_edges(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    /// Returns the sum of all branch lengths below the root.
    pub fn total_branch_length(&self) -> f64 {
        self.vertices
            .iter()
            .filter(|v| v.index() != self.root_index)
            .filter_map(|v| v.branch_length())
            .map(|bl| *bl)
            .sum::<f64>()
    }

    /// Validates the tree structure and all index references.
    ///
    /// Checks:
    /// - Root index is set and within bounds, and the root has no parent
    /// - All vertex indices match their position in the arena
    /// - All child indices are valid and point back to correct parent
    /// - All non-root vertices have a parent listing them as a child
    /// - Every vertex is reachable from the root exactly once
    pub fn is_valid(&self) -> bool {
        if self.root_index >= self.vertices.len() {
            return false;
        }
        if self.vertices[self.root_index].has_parent() {
            return false;
        }

        for (index, vertex) in self.vertices.iter().enumerate() {
            if vertex.index() != index {
                return false;
            }

            for &child in vertex.children() {
                if child >= self.vertices.len() || self.vertices[child].parent() != Some(index) {
                    return false;
                }
            }

            if index != self.root_index {
                match vertex.parent() {
                    None => return false,
                    Some(parent) => {
                        if parent >= self.vertices.len()
                            || !self.vertices[parent].children().contains(&index)
                        {
                            return false;
                        }
                    }
                }
            }
        }

        // Each vertex visited once from the root means no cycles and no orphans
        let mut seen = vec![false; self.vertices.len()];
        for vertex in self.pre_order_iter() {
            if seen[vertex.index()] {
                return false;
            }
            seen[vertex.index()] = true;
        }
        seen.into_iter().all(|s| s)
    }

    /// Returns an iterator over the tree in pre-order (parents before children).
    ///
    /// Children are visited in their stored order.
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self)
    }
}

impl std::ops::Index<VertexIndex> for PhyloTree {
    type Output = Vertex;

    fn index(&self, index: VertexIndex) -> &Self::Output {
        &self.vertices[index]
    }
}

// =#========================================================================#=
// ITERATORS
// =#========================================================================#=
/// Iterator for pre-order traversal (parents before children).
///
/// Uses an explicit stack, so deep trees do not overflow the call stack.
pub struct PreOrderIter<'a> {
    tree: &'a PhyloTree,
    stack: Vec<VertexIndex>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a PhyloTree) -> Self {
        let mut stack = Vec::new();
        if tree.is_root_set() {
            stack.push(tree.root_index);
        }
        PreOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let vertex = &self.tree[index];

        // Push children in reverse, so the first child is processed first
        self.stack.extend(vertex.children().iter().rev());

        Some(vertex)
    }
}
