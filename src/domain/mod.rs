//! Domain layer: tree model and algorithms
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod avl;
pub mod binary;
pub mod bst;
pub mod error;
pub mod forest;
pub mod ids;
pub mod layout;
pub mod mode;
pub mod node;
pub mod traversal;
pub mod tree;

pub use avl::{avl_balance, Rotation};
pub use binary::binary_insert;
pub use bst::{attach_subtree, bst_insert};
pub use error::{DomainError, DomainResult};
pub use forest::{Forest, Handle};
pub use ids::{IdSource, SequentialIds};
pub use layout::{dimension_clamp, layout_forest, LayoutParams, Placement, Viewport};
pub use mode::{Complexity, TreeMode};
pub use node::{Edge, Node, NodeId, Value};
pub use traversal::{visits, walk, walk_forest, TraversalOrder, VisitEvent, VisitPhase, Walk};
