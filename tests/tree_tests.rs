use newick_graph::model::PhyloTree;
use newick_graph::model::vertex::BranchLength;

fn kiwi_tree() -> PhyloTree {
    // ((Apteryx_haastii:1,Apteryx_owenii:1)90:1.5,Apteryx_mantelli:0.5,Apteryx_australis:0.5);
    let mut tree = PhyloTree::with_capacity(6);
    let haastii = tree.add_leaf(Some("Apteryx_haastii".into()), Some(BranchLength::new(1.0)));
    let owenii = tree.add_leaf(Some("Apteryx_owenii".into()), Some(BranchLength::new(1.0)));
    let spotted = tree.add_internal(vec![haastii, owenii], None, Some("90".into()), Some(BranchLength::new(1.5)));
    let mantelli = tree.add_leaf(Some("Apteryx_mantelli".into()), Some(BranchLength::new(0.5)));
    let australis = tree.add_leaf(Some("Apteryx_australis".into()), Some(BranchLength::new(0.5)));
    let root = tree.add_internal(vec![spotted, mantelli, australis], None, None, None);
    tree.set_root(root);
    tree
}

#[test]
fn test_building_tree() {
    let tree = kiwi_tree();

    // Counts
    assert_eq!(tree.num_leaves(), 4);
    assert_eq!(tree.num_internal(), 2);
    assert_eq!(tree.num_vertices(), 6);
    assert_eq!(tree.num_edges(), 5);
    assert_eq!(tree.total_branch_length(), 4.5);
    assert!(tree.is_valid());

    // Root
    let root = tree.root();
    assert_eq!(root.index(), tree.root_index());
    assert_eq!(root.parent(), None);
    assert_eq!(root.num_children(), 3);

    // Leaf
    let owenii = &tree[1];
    assert!(owenii.is_leaf());
    assert_eq!(owenii.name(), Some("Apteryx_owenii"));
    assert_eq!(owenii.parent(), Some(2));

    // Internal
    let spotted = &tree[2];
    assert!(spotted.is_internal());
    assert_eq!(spotted.bootstrap(), Some("90"));
    assert_eq!(spotted.branch_length().unwrap(), BranchLength::new(1.5));
}

#[test]
fn test_set_root_name() {
    let mut tree = kiwi_tree();
    tree.set_root_name("kiwis");
    assert_eq!(tree.root().name(), Some("kiwis"));
    assert!(tree.is_valid());
}

#[test]
fn test_pre_order_traversal() {
    let tree = kiwi_tree();

    let pre: Vec<_> = tree.pre_order_iter().map(|v| v.index()).collect();
    assert_eq!(pre, vec![5, 2, 0, 1, 3, 4]);
}

#[test]
fn test_root_not_set_is_invalid() {
    let mut tree = PhyloTree::with_capacity(2);
    tree.add_leaf(Some("Kea".into()), None);
    assert!(!tree.is_root_set());
    assert!(!tree.is_valid());
}

#[test]
fn test_orphan_is_invalid() {
    let mut tree = PhyloTree::with_capacity(4);
    let a = tree.add_leaf(Some("A".into()), None);
    let b = tree.add_leaf(Some("B".into()), None);
    tree.add_leaf(Some("orphan".into()), None);
    let root = tree.add_internal(vec![a, b], None, None, None);
    tree.set_root(root);
    assert!(!tree.is_valid());
}

#[test]
#[should_panic]
fn test_get_root_panics_on_empty_tree() {
    let tree = PhyloTree::with_capacity(2);
    tree.root(); // Should panic
}

#[test]
#[should_panic]
fn test_get_vertex_out_of_bounds() {
    let tree = PhyloTree::with_capacity(2);
    let _ = &tree[55];
}
