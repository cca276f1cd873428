//! Forest with an explicit edge list, and the free-form edit operations
//!
//! Every edit validates first and mutates only on success, so a rejected
//! edit leaves roots and edges exactly as they were.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ids::IdSource;
use crate::domain::node::{Edge, Node, NodeId, Value};
use crate::domain::tree::{
    contains_value, find_in_forest, find_in_forest_mut, flatten, forest_edges, is_descendant,
    remove_by_id, subtree_ids, take_by_id,
};

/// Connector a link gesture started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handle {
    /// Top handle of the prospective child, dropped onto the new parent.
    /// Only roots show this handle.
    Top,
    /// Bottom handle of the prospective parent, dropped onto the new child.
    Bottom,
}

/// Ordered roots plus the edges drawn between their nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "P: Deserialize<'de> + Default"))]
pub struct Forest<P = ()> {
    pub roots: Vec<Node<P>>,
    pub edges: Vec<Edge>,
}

impl<P> Default for Forest<P> {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            edges: Vec::new(),
        }
    }
}

impl<P> Forest<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forest over existing roots, edges derived from their children.
    pub fn from_roots(roots: Vec<Node<P>>) -> Self {
        let edges = forest_edges(&roots);
        Self { roots, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn find(&self, id: NodeId) -> Option<&Node<P>> {
        find_in_forest(&self.roots, id)
    }

    /// Total number of nodes across all roots.
    pub fn len(&self) -> usize {
        self.roots
            .iter()
            .map(|root| flatten(root).len())
            .sum()
    }

    /// Rebuild the edge list from the `children` arrays.
    pub fn refresh_edges(&mut self) {
        self.edges = forest_edges(&self.roots);
    }

    /// True when the edge list matches the `children` arrays exactly.
    pub fn edges_consistent(&self) -> bool {
        let mut derived = forest_edges(&self.roots);
        let mut recorded = self.edges.clone();
        derived.sort_by_key(|e| (e.parent_id, e.child_id));
        recorded.sort_by_key(|e| (e.parent_id, e.child_id));
        derived == recorded
    }

    /// Attach `child` (with its subtree) below `parent`.
    ///
    /// `max_children` is the parent's fan-out limit, `None` for unlimited.
    #[instrument(level = "debug", skip(self))]
    pub fn reparent(
        &mut self,
        child: NodeId,
        parent: NodeId,
        handle: Handle,
        max_children: Option<usize>,
    ) -> DomainResult<()> {
        if child == parent {
            return Err(DomainError::SelfLoop(child));
        }
        let child_node = self.find(child).ok_or(DomainError::NodeNotFound(child))?;
        let parent_node = self
            .find(parent)
            .ok_or(DomainError::NodeNotFound(parent))?;

        if is_descendant(child_node, parent) {
            return Err(DomainError::CycleDetected { parent, child });
        }
        match child_node.parent_id {
            Some(current) if current == parent => {
                return Err(DomainError::AlreadyLinked { child, parent });
            }
            Some(current) if handle == Handle::Top => {
                return Err(DomainError::AlreadyHasParent {
                    child,
                    parent: current,
                });
            }
            _ => {}
        }
        if let Some(max) = max_children {
            if parent_node.children.len() >= max {
                return Err(DomainError::FanOutExceeded { parent, max });
            }
        }

        let Some(mut moved) = take_by_id(&mut self.roots, child) else {
            return Err(DomainError::NodeNotFound(child));
        };
        if let Some(old_parent) = moved.parent_id {
            self.edges
                .retain(|edge| *edge != Edge::new(old_parent, child));
        }
        moved.parent_id = Some(parent);
        match find_in_forest_mut(&mut self.roots, parent) {
            Some(target) => target.children.push(moved),
            // Unreachable after validation; keep the node rather than lose it.
            None => {
                moved.parent_id = None;
                self.roots.push(moved);
                return Err(DomainError::NodeNotFound(parent));
            }
        }
        self.edges.push(Edge::new(parent, child));
        debug!(%child, %parent, "reparented");
        Ok(())
    }

    /// Cut the edge `parent -> child`; the child subtree becomes a new root.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_edge(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        let linked = self
            .find(child)
            .is_some_and(|node| node.parent_id == Some(parent));
        if !linked {
            return Err(DomainError::EdgeNotFound { parent, child });
        }
        let Some(mut detached) = take_by_id(&mut self.roots, child) else {
            return Err(DomainError::NodeNotFound(child));
        };
        detached.parent_id = None;
        self.roots.push(detached);
        self.edges.retain(|edge| *edge != Edge::new(parent, child));
        debug!(%parent, %child, "edge deleted");
        Ok(())
    }

    pub fn edge_exists(&self, parent: NodeId, child: NodeId) -> bool {
        self.edges.contains(&Edge::new(parent, child))
    }
}

impl<P: Clone> Forest<P> {
    /// Remove `id` with its whole subtree and every edge touching it.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_node(&mut self, id: NodeId) -> DomainResult<()> {
        let removed = self
            .find(id)
            .map(subtree_ids)
            .ok_or(DomainError::NodeNotFound(id))?;

        self.roots = remove_by_id(&self.roots, id);
        self.edges.retain(|edge| {
            !removed.contains(&edge.parent_id) && !removed.contains(&edge.child_id)
        });
        debug!(%id, removed = removed.len(), "node deleted");
        Ok(())
    }
}

impl<P: Default> Forest<P> {
    /// Append a new unconnected root holding `value`.
    ///
    /// Returns `None` without touching the forest when some node already
    /// holds `value`.
    #[instrument(level = "debug", skip(self, ids))]
    pub fn custom_insert<I>(&mut self, value: Value, ids: &mut I) -> Option<NodeId>
    where
        I: IdSource + ?Sized,
    {
        if contains_value(&self.roots, value) {
            debug!(value, "duplicate value, not inserted");
            return None;
        }
        let node = Node::new(value, ids.next_id());
        let id = node.id;
        self.roots.push(node);
        Some(id)
    }
}
