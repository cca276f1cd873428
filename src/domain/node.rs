//! Node, edge and id types shared by every tree algorithm

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric comparison key of a node.
pub type Value = f64;

/// Opaque node identity, stable for the node's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One tree vertex owning its children.
///
/// `payload` is carried through every clone, rotation and move but never
/// inspected by the engine. Renderers use it for layout hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "P: Deserialize<'de> + Default"))]
pub struct Node<P = ()> {
    pub value: Value,
    pub id: NodeId,
    pub children: Vec<Node<P>>,
    pub parent_id: Option<NodeId>,
    #[serde(default)]
    pub payload: P,
}

impl<P: Default> Node<P> {
    /// Create a detached leaf.
    pub fn new(value: Value, id: NodeId) -> Self {
        Self {
            value,
            id,
            children: Vec::new(),
            parent_id: None,
            payload: P::default(),
        }
    }
}

impl<P> Node<P> {
    /// Attach `child` as the last child, fixing up its parent link.
    pub fn push_child(&mut self, mut child: Node<P>) {
        child.parent_id = Some(self.id);
        self.children.push(child);
    }

    /// Builder variant of [`Node::push_child`].
    pub fn with_child(mut self, child: Node<P>) -> Self {
        self.push_child(child);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl<P> fmt::Display for Node<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.id)
    }
}

/// Parent to child connection, as drawn by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub parent_id: NodeId,
    pub child_id: NodeId,
}

impl Edge {
    pub fn new(parent_id: NodeId, child_id: NodeId) -> Self {
        Self {
            parent_id,
            child_id,
        }
    }

    /// True when either endpoint is `id`.
    pub fn touches(&self, id: NodeId) -> bool {
        self.parent_id == id || self.child_id == id
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.parent_id, self.child_id)
    }
}
