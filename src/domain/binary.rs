//! Level-order ("binary") insertion

use std::collections::{HashSet, VecDeque};

use tracing::{debug, instrument};

use crate::domain::ids::IdSource;
use crate::domain::node::{Edge, Node, NodeId, Value};
use crate::domain::tree::find_by_id_mut;

/// Insert `value` at the first node, breadth first and left to right, that
/// has fewer than two children.
///
/// Values are not ordered and duplicates are allowed. Returns the new tree
/// together with the single edge the insertion created.
#[instrument(level = "debug", skip(root, ids))]
pub fn binary_insert<P, I>(root: &Node<P>, value: Value, ids: &mut I) -> (Node<P>, Edge)
where
    P: Clone + Default,
    I: IdSource + ?Sized,
{
    let mut tree = root.clone();
    let target = first_open_slot(&tree).unwrap_or(tree.id);

    let new_node = Node::new(value, ids.next_id());
    let edge = Edge::new(target, new_node.id);
    if let Some(parent) = find_by_id_mut(&mut tree, target) {
        parent.push_child(new_node);
    }
    debug!(%edge, "level-order slot filled");
    (tree, edge)
}

/// Id of the first node in breadth-first order with fewer than two children.
fn first_open_slot<P>(root: &Node<P>) -> Option<NodeId> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(root.id);
    queue.push_back(root);

    while let Some(node) = queue.pop_front() {
        if node.children.len() < 2 {
            return Some(node.id);
        }
        for child in &node.children {
            if visited.insert(child.id) {
                queue.push_back(child);
            }
        }
    }
    None
}
