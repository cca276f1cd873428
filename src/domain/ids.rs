//! Node id generation

use crate::domain::node::{Node, NodeId};
use crate::domain::tree::flatten;

/// Source of fresh node ids. Ids must never repeat during a session.
pub trait IdSource {
    fn next_id(&mut self) -> NodeId;
}

/// Monotonic counter, the default id source.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialIds {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Counter that starts above every id already present in `roots`.
    pub fn after<P>(roots: &[Node<P>]) -> Self {
        let max = roots
            .iter()
            .flat_map(|root| flatten(root))
            .map(|node| node.id.0)
            .max()
            .unwrap_or(0);
        Self { next: max + 1 }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}
