//! Integration tests for free-form forest edits, directly and through a session.

use rstest::{fixture, rstest};

use treeviz::application::{ApplicationError, TreeSession};
use treeviz::domain::tree::{flatten, has_consistent_parents};
use treeviz::domain::{DomainError, Forest, Handle, NodeId, SequentialIds, TreeMode, Value};
use treeviz::util::testing;

/// Custom session with one unconnected root per value, ids 1..=n.
#[fixture]
fn loose(#[default(vec![1.0, 2.0, 3.0, 4.0, 5.0])] values: Vec<Value>) -> TreeSession {
    testing::init_test_setup();
    let mut session = TreeSession::new(TreeMode::Custom);
    for value in values {
        session.insert(value).expect("finite value");
    }
    session
}

fn assert_consistent(session: &TreeSession) {
    assert!(session.forest().edges_consistent());
    assert!(session.roots().iter().all(has_consistent_parents));
    assert!(session.roots().iter().all(|r| r.parent_id.is_none()));
}

#[rstest]
fn given_root_and_child_when_deleting_edge_then_child_becomes_root(mut loose: TreeSession) {
    // Arrange
    loose
        .reparent(NodeId(2), NodeId(1), Handle::Top)
        .expect("valid link");
    assert_eq!(loose.edges().len(), 1);

    // Act
    loose.delete_edge(NodeId(1), NodeId(2)).expect("edge exists");

    // Assert
    let two = loose.roots().last().expect("new root");
    assert_eq!(two.id, NodeId(2));
    assert_eq!(two.parent_id, None);
    assert!(loose.edges().is_empty());
    assert_consistent(&loose);
}

#[rstest]
fn given_chain_when_linking_root_below_its_leaf_then_rejected(mut loose: TreeSession) {
    // 1 -> 2 -> 3
    loose.reparent(NodeId(2), NodeId(1), Handle::Top).expect("valid");
    loose.reparent(NodeId(3), NodeId(2), Handle::Top).expect("valid");
    let before = loose.forest().clone();

    let result = loose.reparent(NodeId(1), NodeId(3), Handle::Bottom);

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::CycleDetected { .. }))
    ));
    assert_eq!(loose.forest(), &before);
}

#[rstest]
#[case::self_loop(NodeId(1), NodeId(1))]
#[case::unknown_child(NodeId(42), NodeId(1))]
#[case::unknown_parent(NodeId(1), NodeId(42))]
fn given_invalid_pair_when_reparenting_then_forest_untouched(
    mut loose: TreeSession,
    #[case] child: NodeId,
    #[case] parent: NodeId,
) {
    let before = loose.forest().clone();
    assert!(loose.reparent(child, parent, Handle::Bottom).is_err());
    assert_eq!(loose.forest(), &before);
}

#[rstest]
fn given_every_link_attempt_when_applied_then_forest_stays_acyclic(mut loose: TreeSession) {
    // Try every ordered pair with both handles; accepted or not, no cycles.
    for child in 1..=5 {
        for parent in 1..=5 {
            for handle in [Handle::Top, Handle::Bottom] {
                let _ = loose.reparent(NodeId(child), NodeId(parent), handle);
                assert_consistent(&loose);
            }
        }
    }
    let total: usize = loose.roots().iter().map(|r| flatten(r).len()).sum();
    assert_eq!(total, 5, "no node lost or duplicated");
}

#[rstest]
fn given_default_limit_when_linking_third_child_then_rejected(mut loose: TreeSession) {
    loose.reparent(NodeId(2), NodeId(1), Handle::Top).expect("first");
    loose.reparent(NodeId(3), NodeId(1), Handle::Top).expect("second");

    let result = loose.reparent(NodeId(4), NodeId(1), Handle::Top);
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::FanOutExceeded { max: 2, .. }))
    ));

    loose.set_max_children(None);
    loose.reparent(NodeId(4), NodeId(1), Handle::Top).expect("unlimited");
    assert_eq!(loose.find(NodeId(1)).map(|n| n.children.len()), Some(3));
}

#[rstest]
fn given_subtree_when_deleting_node_then_all_descendants_and_edges_vanish(mut loose: TreeSession) {
    // 1 -> 2 -> {3, 4}, 5 alone
    loose.reparent(NodeId(2), NodeId(1), Handle::Top).expect("valid");
    loose.reparent(NodeId(3), NodeId(2), Handle::Top).expect("valid");
    loose.reparent(NodeId(4), NodeId(2), Handle::Top).expect("valid");

    loose.delete_node(NodeId(2)).expect("node exists");

    for gone in [2, 3, 4] {
        assert!(loose.find(NodeId(gone)).is_none());
    }
    assert!(loose
        .edges()
        .iter()
        .all(|e| ![2, 3, 4].contains(&e.parent_id.0) && ![2, 3, 4].contains(&e.child_id.0)));
    assert_eq!(loose.roots().len(), 2);
    assert_consistent(&loose);
}

#[rstest]
fn given_custom_forest_when_inserting_duplicate_then_ignored(
    #[with(vec![7.0, 8.0])] loose: TreeSession,
) {
    let mut loose = loose;
    assert_eq!(loose.insert(8.0).expect("finite"), None);
    assert_eq!(loose.roots().len(), 2);
}

#[test]
fn given_forest_when_built_directly_then_edges_follow_children() {
    testing::init_test_setup();
    let mut forest: Forest = Forest::new();
    let mut ids = SequentialIds::new();
    let a = forest.custom_insert(1.0, &mut ids).expect("new value");
    let b = forest.custom_insert(2.0, &mut ids).expect("new value");

    forest
        .reparent(b, a, Handle::Top, Some(2))
        .expect("valid link");
    forest.refresh_edges();

    assert_eq!(forest.len(), 2);
    assert!(forest.edge_exists(a, b));
    assert_eq!(forest.edges.len(), 1);
}
