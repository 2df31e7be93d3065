#![allow(unused)]

use newick_graph::model::Vertex;
use newick_graph::model::vertex::BranchLength;

// ============= Branch Length Tests =============
#[test]
fn test_branch_lengths() {
    let test_length = 1.234;
    let vertex = Vertex::new_internal(5, vec![1, 2], None, None, Some(BranchLength::new(test_length)));
    assert_eq!(*vertex.branch_length().unwrap(), test_length);
}

#[test]
fn test_negative_branch_length() {
    let negative_length = BranchLength::new(-0.25);
    assert_eq!(*negative_length, -0.25);
}

#[test]
#[should_panic]
fn test_nan_branch_length() {
    let nan_length = BranchLength::new(f64::NAN);
}

#[test]
#[should_panic]
fn test_infinite_branch_length() {
    let infinite_length = BranchLength::new(f64::INFINITY);
}

#[test]
fn test_try_new_branch_length() {
    assert_eq!(BranchLength::try_new(0.0), Some(BranchLength::new(0.0)));
    assert_eq!(BranchLength::try_new(-0.5), Some(BranchLength::new(-0.5)));
    assert_eq!(BranchLength::try_new(f64::NEG_INFINITY), None);
    assert_eq!(BranchLength::try_new(f64::NAN), None);
}

// ============= Vertex Variant Consistency Tests =============
#[test]
fn test_is_x() {
    let leaf = Vertex::new_leaf(0, Some("Kakapo".into()), Some(BranchLength::new(0.5)));
    assert!(leaf.is_leaf());
    assert!(!leaf.is_internal());

    let vertex = Vertex::new_internal(0, vec![1, 2, 3], None, None, Some(BranchLength::new(0.5)));
    assert!(vertex.is_internal());
    assert_eq!(vertex.num_children(), 3);
}

#[test]
fn test_internal_labels() {
    let internal = Vertex::new_internal(0, vec![1, 2], Some("Nestoridae".into()), Some("97".into()), None);
    assert_eq!(internal.name(), Some("Nestoridae"));
    assert_eq!(internal.bootstrap(), Some("97"));

    let bare = Vertex::new_internal(0, vec![1, 2], None, None, None);
    assert_eq!(bare.name(), None);
    assert_eq!(bare.bootstrap(), None);
    assert!(!bare.has_branch_length());
}

#[test]
fn test_parent_unset() {
    let vertex = Vertex::new_internal(0, vec![1, 2], None, None, Some(BranchLength::new(0.5)));
    assert_eq!(vertex.parent(), None);
    assert!(!vertex.has_parent());

    let leaf = Vertex::new_leaf(0, None, Some(BranchLength::new(0.5)));
    assert_eq!(leaf.parent(), None);
    assert!(!leaf.has_parent());
}

#[test]
fn test_leaf_has_no_children() {
    let vertex = Vertex::new_leaf(0, Some("Kea".into()), Some(BranchLength::new(0.5)));
    assert!(vertex.children().is_empty());
    assert_eq!(vertex.bootstrap(), None);
}
