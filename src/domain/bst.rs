//! Ordered (BST) insertion with duplicate rejection

use tracing::{debug, instrument, trace, warn};

use crate::domain::ids::IdSource;
use crate::domain::node::{Node, Value};

/// Insert `value` into a copy of the tree rooted at `root`.
///
/// The input is never mutated. When `value` is met on the descent path the
/// copy is returned with its shape unchanged and no id is drawn. A node
/// holding three or more children is an invalid BST: it is logged and left
/// as it is.
///
/// The edge list is not maintained here; regenerate it with
/// [`edges_of`](crate::domain::tree::edges_of).
#[instrument(level = "debug", skip(root, ids))]
pub fn bst_insert<P, I>(root: &Node<P>, value: Value, ids: &mut I) -> Node<P>
where
    P: Clone + Default,
    I: IdSource + ?Sized,
{
    if !has_free_slot(root, value) {
        debug!(value, "no free slot, not inserted");
        return root.clone();
    }
    let new_node = Node::new(value, ids.next_id());
    attach_subtree(root.clone(), new_node)
}

/// True when descending toward `value` ends at a free slot rather than at
/// an equal value or at a node with three or more children.
fn has_free_slot<P>(node: &Node<P>, value: Value) -> bool {
    if node.value == value {
        return false;
    }
    match node.children.as_slice() {
        [] => true,
        [only] if (only.value < node.value) == (value < node.value) => {
            has_free_slot(only, value)
        }
        [_] => true,
        [left, right] => has_free_slot(if value > node.value { right } else { left }, value),
        children => {
            let count = children.len();
            warn!(id = %node.id, children = count, "invalid BST node, insertion skipped");
            false
        }
    }
}

/// Place a whole subtree by the value of its root, descending like
/// [`bst_insert`].
///
/// The rebalancer uses this to re-attach a demoted node together with its
/// remaining children.
pub fn attach_subtree<P>(mut node: Node<P>, mut subtree: Node<P>) -> Node<P> {
    if subtree.value == node.value {
        trace!(value = node.value, "duplicate value, not inserted");
        return node;
    }

    match node.children.len() {
        0 => {
            subtree.parent_id = Some(node.id);
            node.children.push(subtree);
        }
        1 => {
            let child_value = node.children[0].value;
            if child_value < node.value && node.value < subtree.value {
                // Greater side of this node, after the lesser child
                subtree.parent_id = Some(node.id);
                node.children.push(subtree);
            } else if subtree.value < node.value && node.value < child_value {
                // Lesser side of this node, before the greater child
                subtree.parent_id = Some(node.id);
                node.children.insert(0, subtree);
            } else {
                let child = node.children.remove(0);
                node.children.push(attach_subtree(child, subtree));
            }
        }
        2 => {
            if subtree.value > node.value {
                if let Some(right) = node.children.pop() {
                    node.children.push(attach_subtree(right, subtree));
                }
            } else {
                let left = node.children.remove(0);
                node.children.insert(0, attach_subtree(left, subtree));
            }
        }
        count => {
            warn!(id = %node.id, children = count, "invalid BST node, insertion skipped");
        }
    }
    node
}
