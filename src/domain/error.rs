//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::mode::TreeMode;
use crate::domain::node::{NodeId, Value};

/// Domain errors are rejected edits. The forest is untouched whenever one
/// is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("edge not found: {parent} -> {child}")]
    EdgeNotFound { parent: NodeId, child: NodeId },

    #[error("cannot link node {0} to itself")]
    SelfLoop(NodeId),

    #[error("cycle detected: {parent} is inside the subtree of {child}")]
    CycleDetected { parent: NodeId, child: NodeId },

    #[error("node {child} already has parent {parent}")]
    AlreadyHasParent { child: NodeId, parent: NodeId },

    #[error("node {child} is already a child of {parent}")]
    AlreadyLinked { child: NodeId, parent: NodeId },

    #[error("node {parent} already has {max} children")]
    FanOutExceeded { parent: NodeId, max: usize },

    #[error("invalid value: {0}")]
    InvalidValue(Value),

    #[error("forest does not satisfy {mode} mode: {reason}")]
    ModeMismatch { mode: TreeMode, reason: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
