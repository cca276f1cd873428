//! Structural utilities: read-only traversals and subtree removal
//!
//! Every insertion mode and every edit is built on these helpers. None of
//! them look at the node payload.

use std::collections::HashSet;

use tracing::instrument;

use crate::domain::node::{Edge, Node, NodeId, Value};

/// Pre-order list of every node in the tree rooted at `root`.
pub fn flatten<P>(root: &Node<P>) -> Vec<&Node<P>> {
    let mut nodes = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        nodes.push(node);
        // Push children in reverse order for left-to-right traversal
        for child in node.children.iter().rev() {
            stack.push(child);
        }
    }
    nodes
}

/// Number of nodes on the longest root-to-leaf path. A single node has height 1.
pub fn height<P>(root: &Node<P>) -> usize {
    1 + root.children.iter().map(height).max().unwrap_or(0)
}

/// Height of an optional subtree; an absent child counts as 0.
pub fn height_of<P>(node: Option<&Node<P>>) -> usize {
    node.map_or(0, height)
}

/// Depth-first search by identity.
pub fn find_by_id<P>(root: &Node<P>, id: NodeId) -> Option<&Node<P>> {
    if root.id == id {
        return Some(root);
    }
    root.children.iter().find_map(|child| find_by_id(child, id))
}

pub fn find_by_id_mut<P>(root: &mut Node<P>, id: NodeId) -> Option<&mut Node<P>> {
    if root.id == id {
        return Some(root);
    }
    root.children
        .iter_mut()
        .find_map(|child| find_by_id_mut(child, id))
}

/// Search every root of a forest.
pub fn find_in_forest<P>(roots: &[Node<P>], id: NodeId) -> Option<&Node<P>> {
    roots.iter().find_map(|root| find_by_id(root, id))
}

pub fn find_in_forest_mut<P>(roots: &mut [Node<P>], id: NodeId) -> Option<&mut Node<P>> {
    roots.iter_mut().find_map(|root| find_by_id_mut(root, id))
}

/// New forest with the node `id` and its whole subtree excised.
///
/// Children of the removed node are not promoted.
#[instrument(level = "debug", skip(roots))]
pub fn remove_by_id<P: Clone>(roots: &[Node<P>], id: NodeId) -> Vec<Node<P>> {
    roots
        .iter()
        .filter(|node| node.id != id)
        .map(|node| Node {
            value: node.value,
            id: node.id,
            children: remove_by_id(&node.children, id),
            parent_id: node.parent_id,
            payload: node.payload.clone(),
        })
        .collect()
}

/// Detach the node `id` (with its subtree) from wherever it sits in `nodes`.
pub(crate) fn take_by_id<P>(nodes: &mut Vec<Node<P>>, id: NodeId) -> Option<Node<P>> {
    if let Some(pos) = nodes.iter().position(|node| node.id == id) {
        return Some(nodes.remove(pos));
    }
    for node in nodes.iter_mut() {
        if let Some(found) = take_by_id(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Edge list implied by the `children` arrays, parent before descendants.
pub fn edges_of<P>(root: &Node<P>) -> Vec<Edge> {
    let mut edges = Vec::new();
    collect_edges(root, &mut edges);
    edges
}

fn collect_edges<P>(node: &Node<P>, edges: &mut Vec<Edge>) {
    for child in &node.children {
        edges.push(Edge::new(node.id, child.id));
        collect_edges(child, edges);
    }
}

pub fn forest_edges<P>(roots: &[Node<P>]) -> Vec<Edge> {
    roots.iter().flat_map(edges_of).collect()
}

/// Ids of `root` and all its descendants.
pub fn subtree_ids<P>(root: &Node<P>) -> HashSet<NodeId> {
    flatten(root).into_iter().map(|node| node.id).collect()
}

/// True when `id` is `root` itself or one of its descendants.
pub fn is_descendant<P>(root: &Node<P>, id: NodeId) -> bool {
    find_by_id(root, id).is_some()
}

pub fn contains_value<P>(roots: &[Node<P>], value: Value) -> bool {
    roots
        .iter()
        .flat_map(|root| flatten(root))
        .any(|node| node.value == value)
}

/// Largest number of children held by any node.
pub fn max_fan_out<P>(root: &Node<P>) -> usize {
    flatten(root)
        .into_iter()
        .map(|node| node.children.len())
        .max()
        .unwrap_or(0)
}

/// Every child's `parent_id` points at the node holding it.
pub fn has_consistent_parents<P>(root: &Node<P>) -> bool {
    flatten(root).into_iter().all(|node| {
        node.children
            .iter()
            .all(|child| child.parent_id == Some(node.id))
    })
}

/// BST ordering: left subtree < node < right subtree, no duplicates.
///
/// A lone child may sit on either side; its whole subtree must then lie on
/// that side.
pub fn is_bst<P>(root: &Node<P>) -> bool {
    within_bounds(root, None, None)
}

fn within_bounds<P>(node: &Node<P>, low: Option<Value>, high: Option<Value>) -> bool {
    if low.is_some_and(|low| node.value <= low) || high.is_some_and(|high| node.value >= high) {
        return false;
    }
    match node.children.as_slice() {
        [] => true,
        [only] if only.value < node.value => within_bounds(only, low, Some(node.value)),
        [only] => within_bounds(only, Some(node.value), high),
        [left, right] => {
            within_bounds(left, low, Some(node.value))
                && within_bounds(right, Some(node.value), high)
        }
        _ => false,
    }
}

/// AVL balance: sibling heights differ by at most one, a missing child has height 0.
pub fn is_balanced<P>(root: &Node<P>) -> bool {
    flatten(root)
        .into_iter()
        .all(|node| match node.children.as_slice() {
            [] => true,
            [only] => height(only) <= 1,
            [left, right] => height(left).abs_diff(height(right)) <= 1,
            _ => false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    //      5
    //     / \
    //    3   8
    //   /   / \
    //  1   7   9
    fn sample() -> Node {
        Node::new(5.0, NodeId(1))
            .with_child(Node::new(3.0, NodeId(2)).with_child(Node::new(1.0, NodeId(3))))
            .with_child(
                Node::new(8.0, NodeId(4))
                    .with_child(Node::new(7.0, NodeId(5)))
                    .with_child(Node::new(9.0, NodeId(6))),
            )
    }

    #[test]
    fn given_tree_when_flattening_then_returns_pre_order() {
        let tree = sample();
        let values: Vec<Value> = flatten(&tree).iter().map(|n| n.value).collect();
        assert_eq!(values, vec![5.0, 3.0, 1.0, 8.0, 7.0, 9.0]);
    }

    #[test]
    fn given_tree_when_measuring_height_then_counts_nodes() {
        let tree = sample();
        assert_eq!(height(&tree), 3);
        assert_eq!(height(&tree.children[0].children[0]), 1);
        assert_eq!(height_of::<()>(None), 0);
    }

    #[test]
    fn given_unknown_id_when_searching_then_returns_none() {
        let tree = sample();
        assert!(find_by_id(&tree, NodeId(42)).is_none());
        assert_eq!(find_by_id(&tree, NodeId(5)).map(|n| n.value), Some(7.0));
    }

    #[test]
    fn given_nested_node_when_taking_then_detaches_subtree() {
        let mut roots = vec![sample()];
        let taken = take_by_id(&mut roots, NodeId(4)).expect("node 4 exists");
        assert_eq!(taken.children.len(), 2);
        assert_eq!(flatten(&roots[0]).len(), 3);
        assert!(take_by_id(&mut roots, NodeId(4)).is_none());
    }

    #[test]
    fn given_tree_when_generating_edges_then_parent_precedes_descendants() {
        let tree = sample();
        let edges = edges_of(&tree);
        assert_eq!(
            edges,
            vec![
                Edge::new(NodeId(1), NodeId(2)),
                Edge::new(NodeId(2), NodeId(3)),
                Edge::new(NodeId(1), NodeId(4)),
                Edge::new(NodeId(4), NodeId(5)),
                Edge::new(NodeId(4), NodeId(6)),
            ]
        );
    }

    #[test]
    fn given_misplaced_single_child_when_validating_then_not_a_bst() {
        // 5 -> 3 -> 6: 6 sits in the lesser subtree of 5
        let tree: Node = Node::new(5.0, NodeId(1))
            .with_child(Node::new(3.0, NodeId(2)).with_child(Node::new(6.0, NodeId(3))));
        assert!(!is_bst(&tree));
        assert!(is_bst(&sample()));
    }

    #[test]
    fn given_chain_when_checking_balance_then_unbalanced() {
        let chain: Node = Node::new(6.0, NodeId(1))
            .with_child(Node::new(7.0, NodeId(2)).with_child(Node::new(8.0, NodeId(3))));
        assert!(!is_balanced(&chain));
        assert!(is_balanced(&sample()));
    }
}
