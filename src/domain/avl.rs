//! AVL rebalancing by subtree lifting
//!
//! A node whose only child has grown two levels is rotated by lifting that
//! child and re-attaching the node below it by BST placement. Everywhere
//! else the tree is rebuilt bottom-up: each node joins its two balanced
//! subtrees, rotating down the taller side's spine when their heights differ
//! by more than one. Node ids, values and payloads survive every rotation.

use tracing::{debug, instrument, trace, warn};

use crate::domain::bst::attach_subtree;
use crate::domain::node::Node;
use crate::domain::tree::{height, height_of, max_fan_out};

/// Shape of a single-child rotation, named by branch directions from the
/// unbalanced node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    RightRight,
    RightLeft,
    LeftLeft,
    LeftRight,
    /// Greater-side child that itself has two children.
    RightDouble,
    /// Lesser-side child that itself has two children.
    LeftDouble,
}

impl Rotation {
    /// Classify lifting `pivot`, the only child of `node`.
    ///
    /// Returns `None` when `pivot` is a leaf or holds more than two children.
    pub fn classify<P>(node: &Node<P>, pivot: &Node<P>) -> Option<Rotation> {
        let greater = pivot.value > node.value;
        match (greater, pivot.children.as_slice()) {
            (true, [_, _]) => Some(Rotation::RightDouble),
            (false, [_, _]) => Some(Rotation::LeftDouble),
            (true, [grandchild]) if grandchild.value > pivot.value => Some(Rotation::RightRight),
            (true, [_]) => Some(Rotation::RightLeft),
            (false, [grandchild]) if grandchild.value > pivot.value => Some(Rotation::LeftRight),
            (false, [_]) => Some(Rotation::LeftLeft),
            _ => None,
        }
    }

    /// Index of the pivot's child that receives the demoted node, `None`
    /// for the pivot itself.
    fn demotion_slot(self) -> Option<usize> {
        match self {
            Rotation::RightRight | Rotation::LeftLeft => None,
            Rotation::RightLeft | Rotation::LeftRight | Rotation::RightDouble => Some(0),
            Rotation::LeftDouble => Some(1),
        }
    }
}

/// Height-balanced copy of the tree rooted at `root`.
///
/// Call after every [`bst_insert`](crate::domain::bst::bst_insert) in AVL
/// mode, or once to convert a BST. The returned root keeps the original
/// root's `parent_id`. A tree holding a node with three or more children is
/// not a BST: it is logged and returned unchanged.
#[instrument(level = "debug", skip(root), fields(root = %root.id))]
pub fn avl_balance<P: Clone>(root: &Node<P>) -> Node<P> {
    let fan_out = max_fan_out(root);
    if fan_out > 2 {
        warn!(children = fan_out, "invalid AVL tree, balancing skipped");
        return root.clone();
    }
    rebalance(root.clone())
}

fn rebalance<P>(node: Node<P>) -> Node<P> {
    let parent_id = node.parent_id;
    let only_child_grown = matches!(node.children.as_slice(), [only] if height(only) == 2);
    let mut balanced = if node.is_leaf() {
        node
    } else if only_child_grown {
        lift_only_child(node)
    } else {
        let (key, left, right) = split(node);
        join(key, left.map(rebalance), right.map(rebalance))
    };
    balanced.parent_id = parent_id;
    balanced
}

/// Rotate a node whose only child has grown a level of its own.
///
/// The child is lifted into the node's place and the node is demoted by BST
/// placement, below the child itself or below one of its leaves.
fn lift_only_child<P>(mut node: Node<P>) -> Node<P> {
    let Some(rotation) = Rotation::classify(&node, &node.children[0]) else {
        warn!(id = %node.children[0].id, "invalid AVL node, rotation skipped");
        return node;
    };

    let mut pivot = node.children.remove(0);
    pivot.parent_id = node.parent_id;
    debug!(?rotation, pivot = %pivot.id, demoted = %node.id, "rotating");

    let lifted = match rotation.demotion_slot() {
        None => attach_subtree(pivot, node),
        Some(slot) => {
            let grandchild = pivot.children.remove(slot);
            pivot
                .children
                .insert(slot, attach_subtree(grandchild, node));
            pivot
        }
    };
    rebalance(lifted)
}

type Parts<P> = (Node<P>, Option<Node<P>>, Option<Node<P>>);

/// Take `node` apart into (childless node, lesser child, greater child).
///
/// A lone child goes to the side its value falls on.
fn split<P>(mut node: Node<P>) -> Parts<P> {
    let mut children = std::mem::take(&mut node.children).into_iter();
    match (children.next(), children.next()) {
        (None, _) => (node, None, None),
        (Some(only), None) if only.value < node.value => (node, Some(only), None),
        (Some(only), None) => (node, None, Some(only)),
        (Some(left), Some(right)) => (node, Some(left), Some(right)),
    }
}

/// Inverse of [`split`]: hang `left` then `right` below `node`.
fn graft<P>(mut node: Node<P>, left: Option<Node<P>>, right: Option<Node<P>>) -> Node<P> {
    node.children.clear();
    for child in [left, right].into_iter().flatten() {
        node.push_child(child);
    }
    node
}

fn rotate_left<P>(node: Node<P>) -> Node<P> {
    let (top, left, right) = split(node);
    let Some(pivot) = right else {
        return graft(top, left, None);
    };
    let (pivot, inner, outer) = split(pivot);
    trace!(pivot = %pivot.id, demoted = %top.id, "rotate left");
    graft(pivot, Some(graft(top, left, inner)), outer)
}

fn rotate_right<P>(node: Node<P>) -> Node<P> {
    let (top, left, right) = split(node);
    let Some(pivot) = left else {
        return graft(top, None, right);
    };
    let (pivot, outer, inner) = split(pivot);
    trace!(pivot = %pivot.id, demoted = %top.id, "rotate right");
    graft(pivot, outer, Some(graft(top, inner, right)))
}

/// Balanced tree of `left`, `key`, `right`, where both sides are already
/// balanced and every value in `left` is below `key`'s, every value in
/// `right` above it.
fn join<P>(key: Node<P>, left: Option<Node<P>>, right: Option<Node<P>>) -> Node<P> {
    let (left_height, right_height) = (height_of(left.as_ref()), height_of(right.as_ref()));
    match (left, right) {
        (Some(left), right) if left_height > right_height + 1 => {
            debug!(pivot = %left.id, demoted = %key.id, "left heavy");
            join_right(left, key, right)
        }
        (left, Some(right)) if right_height > left_height + 1 => {
            debug!(pivot = %right.id, demoted = %key.id, "right heavy");
            join_left(left, key, right)
        }
        (left, right) => graft(key, left, right),
    }
}

/// `left` is taller than `right` by more than one: descend its greater spine.
fn join_right<P>(left: Node<P>, key: Node<P>, right: Option<Node<P>>) -> Node<P> {
    let right_height = height_of(right.as_ref());
    let (top, outer, inner) = split(left);
    let outer_height = height_of(outer.as_ref());
    match inner {
        Some(inner) if height(&inner) > right_height + 1 => {
            let joined = join_right(inner, key, right);
            if height(&joined) <= outer_height + 1 {
                graft(top, outer, Some(joined))
            } else {
                rotate_left(graft(top, outer, Some(joined)))
            }
        }
        inner => {
            let joined = graft(key, inner, right);
            if height(&joined) <= outer_height + 1 {
                graft(top, outer, Some(joined))
            } else {
                rotate_left(graft(top, outer, Some(rotate_right(joined))))
            }
        }
    }
}

/// Mirror of [`join_right`].
fn join_left<P>(left: Option<Node<P>>, key: Node<P>, right: Node<P>) -> Node<P> {
    let left_height = height_of(left.as_ref());
    let (top, inner, outer) = split(right);
    let outer_height = height_of(outer.as_ref());
    match inner {
        Some(inner) if height(&inner) > left_height + 1 => {
            let joined = join_left(left, key, inner);
            if height(&joined) <= outer_height + 1 {
                graft(top, Some(joined), outer)
            } else {
                rotate_right(graft(top, Some(joined), outer))
            }
        }
        inner => {
            let joined = graft(key, left, inner);
            if height(&joined) <= outer_height + 1 {
                graft(top, Some(joined), outer)
            } else {
                rotate_right(graft(top, Some(rotate_left(joined)), outer))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::{NodeId, Value};
    use crate::domain::tree::{has_consistent_parents, is_balanced};

    const SUPER: NodeId = NodeId(99);

    fn leaf(value: Value, id: u64) -> Node {
        Node::new(value, NodeId(id))
    }

    fn chain(a: Value, b: Value, c: Value) -> Node {
        let mut root = leaf(a, 1).with_child(leaf(b, 2).with_child(leaf(c, 3)));
        root.parent_id = Some(SUPER);
        root
    }

    fn shape(node: &Node) -> Vec<(Value, u64, Option<u64>)> {
        crate::domain::tree::flatten(node)
            .into_iter()
            .map(|n| (n.value, n.id.0, n.parent_id.map(|p| p.0)))
            .collect()
    }

    #[test]
    fn given_right_right_chain_when_balancing_then_middle_becomes_root() {
        let seven = avl_balance(&chain(6.0, 7.0, 8.0));
        assert_eq!(
            shape(&seven),
            vec![(7.0, 2, Some(99)), (6.0, 1, Some(2)), (8.0, 3, Some(2))]
        );
    }

    #[test]
    fn given_right_left_chain_when_balancing_then_grandchild_becomes_root() {
        let seven = avl_balance(&chain(6.0, 8.0, 7.0));
        assert_eq!(
            shape(&seven),
            vec![(7.0, 3, Some(99)), (6.0, 1, Some(3)), (8.0, 2, Some(3))]
        );
    }

    #[test]
    fn given_left_left_chain_when_balancing_then_middle_becomes_root() {
        let seven = avl_balance(&chain(8.0, 7.0, 6.0));
        assert_eq!(
            shape(&seven),
            vec![(7.0, 2, Some(99)), (6.0, 3, Some(2)), (8.0, 1, Some(2))]
        );
    }

    #[test]
    fn given_left_right_chain_when_balancing_then_grandchild_becomes_root() {
        let seven = avl_balance(&chain(8.0, 6.0, 7.0));
        assert_eq!(
            shape(&seven),
            vec![(7.0, 3, Some(99)), (6.0, 2, Some(3)), (8.0, 1, Some(3))]
        );
    }

    #[test]
    fn given_right_double_when_balancing_then_root_moves_under_left_grandchild() {
        let pivot = leaf(8.0, 2).with_child(leaf(7.0, 3)).with_child(leaf(9.0, 4));
        let mut root = leaf(6.0, 1).with_child(pivot);
        root.parent_id = Some(SUPER);

        assert_eq!(
            Rotation::classify(&root, &root.children[0]),
            Some(Rotation::RightDouble)
        );
        let eight = avl_balance(&root);
        assert_eq!(
            shape(&eight),
            vec![
                (8.0, 2, Some(99)),
                (7.0, 3, Some(2)),
                (6.0, 1, Some(3)),
                (9.0, 4, Some(2)),
            ]
        );
    }

    #[test]
    fn given_left_double_when_balancing_then_root_moves_under_right_grandchild() {
        let pivot = leaf(4.0, 2).with_child(leaf(3.0, 3)).with_child(leaf(5.0, 4));
        let mut root = leaf(6.0, 1).with_child(pivot);
        root.parent_id = Some(SUPER);

        let four = avl_balance(&root);
        assert_eq!(
            shape(&four),
            vec![
                (4.0, 2, Some(99)),
                (3.0, 3, Some(2)),
                (5.0, 4, Some(2)),
                (6.0, 1, Some(4)),
            ]
        );
    }

    #[test]
    fn given_deep_right_imbalance_when_balancing_then_right_child_is_lifted() {
        //   2                 4
        //  / \              /   \
        // 1   4     =>     2     5
        //    / \          / \     \
        //   3   5        1   3     6
        //        \
        //         6
        let mut root = leaf(2.0, 1).with_child(leaf(1.0, 2)).with_child(
            leaf(4.0, 3)
                .with_child(leaf(3.0, 4))
                .with_child(leaf(5.0, 5).with_child(leaf(6.0, 6))),
        );
        root.parent_id = Some(SUPER);

        let four = avl_balance(&root);
        assert_eq!(
            shape(&four),
            vec![
                (4.0, 3, Some(99)),
                (2.0, 1, Some(3)),
                (1.0, 2, Some(1)),
                (3.0, 4, Some(1)),
                (5.0, 5, Some(3)),
                (6.0, 6, Some(5)),
            ]
        );
        assert!(is_balanced(&four));
        assert!(has_consistent_parents(&four));
    }

    #[test]
    fn given_balanced_tree_when_balancing_then_unchanged() {
        let root = leaf(5.0, 1)
            .with_child(leaf(3.0, 2).with_child(leaf(1.0, 3)))
            .with_child(leaf(8.0, 4));
        assert_eq!(avl_balance(&root), root);
        let single = leaf(1.0, 1);
        assert_eq!(avl_balance(&single), single);
    }

    #[test]
    fn given_left_heavy_with_taller_inner_side_when_balancing_then_rotates_twice() {
        //       10                 7
        //      /  \              /   \
        //     5    12    =>     5     10
        //    / \              / \      \
        //   3   7            3   6      12
        //      /
        //     6
        let mut root = leaf(10.0, 1)
            .with_child(
                leaf(5.0, 2)
                    .with_child(leaf(3.0, 3))
                    .with_child(leaf(7.0, 4).with_child(leaf(6.0, 5))),
            )
            .with_child(leaf(12.0, 6));
        root.parent_id = Some(SUPER);

        let seven = avl_balance(&root);
        assert_eq!(
            shape(&seven),
            vec![
                (7.0, 4, Some(99)),
                (5.0, 2, Some(4)),
                (3.0, 3, Some(2)),
                (6.0, 5, Some(2)),
                (10.0, 1, Some(4)),
                (12.0, 6, Some(1)),
            ]
        );
        assert!(is_balanced(&seven));
    }

    #[test]
    fn given_insert_below_inner_grandchild_when_balancing_then_terminates_balanced() {
        use crate::domain::bst::bst_insert;
        use crate::domain::ids::SequentialIds;
        use crate::domain::tree::{flatten, is_bst};

        let values = [1.0, 4.0, 11.0, 7.0, 9.0, 10.0, 5.0, 6.0, 2.0, 3.0, 12.0, 8.0];
        let mut ids = SequentialIds::new();
        let mut root: Node = Node::new(values[0], NodeId(0));
        for &value in &values[1..] {
            root = avl_balance(&bst_insert(&root, value, &mut ids));
            assert!(is_bst(&root), "ordering lost after {value}");
            assert!(is_balanced(&root), "balance lost after {value}");
        }
        assert!(has_consistent_parents(&root));
        assert_eq!(flatten(&root).len(), values.len());
    }

    #[test]
    fn given_node_with_three_children_when_balancing_then_unchanged() {
        let root = leaf(5.0, 1)
            .with_child(leaf(1.0, 2))
            .with_child(leaf(2.0, 3))
            .with_child(leaf(9.0, 4).with_child(leaf(10.0, 5).with_child(leaf(11.0, 6))));
        assert_eq!(avl_balance(&root), root);
    }
}
