//! Depth-first traversal as a lazy event sequence

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::node::{Node, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalOrder {
    #[default]
    PreOrder,
    InOrder,
    PostOrder,
}

impl TraversalOrder {
    pub const ALL: [TraversalOrder; 3] = [
        TraversalOrder::PreOrder,
        TraversalOrder::InOrder,
        TraversalOrder::PostOrder,
    ];
}

impl fmt::Display for TraversalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraversalOrder::PreOrder => "pre-order",
            TraversalOrder::InOrder => "in-order",
            TraversalOrder::PostOrder => "post-order",
        };
        f.write_str(name)
    }
}

impl FromStr for TraversalOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "pre" | "pre-order" | "preorder" => Ok(TraversalOrder::PreOrder),
            "in" | "in-order" | "inorder" => Ok(TraversalOrder::InOrder),
            "post" | "post-order" | "postorder" => Ok(TraversalOrder::PostOrder),
            other => Err(format!("unknown traversal order: {other}")),
        }
    }
}

/// Point in a node's traversal an event marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisitPhase {
    /// First arrival at the node.
    PreVisit,
    /// The order's visiting point.
    Visit,
    /// Leaving the node for good.
    PostVisit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitEvent {
    pub id: NodeId,
    pub phase: VisitPhase,
}

impl VisitEvent {
    pub fn new(id: NodeId, phase: VisitPhase) -> Self {
        Self { id, phase }
    }
}

enum Step<'a, P> {
    Enter(&'a Node<P>),
    Emit(NodeId, VisitPhase),
}

/// Lazy pre/in/post-order walk over one tree.
///
/// Each node produces exactly one event of every phase.
pub struct Walk<'a, P> {
    order: TraversalOrder,
    stack: Vec<Step<'a, P>>,
}

pub fn walk<P>(root: &Node<P>, order: TraversalOrder) -> Walk<'_, P> {
    Walk {
        order,
        stack: vec![Step::Enter(root)],
    }
}

/// Walk every root of a forest, left to right.
pub fn walk_forest<P>(roots: &[Node<P>], order: TraversalOrder) -> Walk<'_, P> {
    Walk {
        order,
        stack: roots.iter().rev().map(Step::Enter).collect(),
    }
}

/// Only the `Visit` events of [`walk`], i.e. the classic visit order.
pub fn visits<P>(root: &Node<P>, order: TraversalOrder) -> impl Iterator<Item = NodeId> + '_ {
    walk(root, order)
        .filter(|event| event.phase == VisitPhase::Visit)
        .map(|event| event.id)
}

/// Number of leading children that form the lesser side for in-order.
fn lesser_side<P>(node: &Node<P>) -> usize {
    match node.children.as_slice() {
        [] => 0,
        [only] if only.value < node.value => 1,
        [_] => 0,
        _ => 1,
    }
}

impl<'a, P> Walk<'a, P> {
    fn expand(&mut self, node: &'a Node<P>) {
        let visit_at = match self.order {
            TraversalOrder::PreOrder => 0,
            TraversalOrder::InOrder => lesser_side(node),
            TraversalOrder::PostOrder => node.children.len(),
        };
        // Stack is LIFO: push the node's remaining steps back to front
        self.stack.push(Step::Emit(node.id, VisitPhase::PostVisit));
        for (i, child) in node.children.iter().enumerate().rev() {
            if i + 1 == visit_at {
                self.stack.push(Step::Emit(node.id, VisitPhase::Visit));
            }
            self.stack.push(Step::Enter(child));
        }
        if visit_at == 0 {
            self.stack.push(Step::Emit(node.id, VisitPhase::Visit));
        }
    }
}

impl<P> Iterator for Walk<'_, P> {
    type Item = VisitEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.stack.pop()? {
            Step::Enter(node) => {
                self.expand(node);
                Some(VisitEvent::new(node.id, VisitPhase::PreVisit))
            }
            Step::Emit(id, phase) => Some(VisitEvent::new(id, phase)),
        }
    }
}
