//! Application layer: the editing session and traversal playback
//!
//! This layer drives the domain algorithms and owns the only async piece.

pub mod animation;
pub mod error;
pub mod session;

pub use animation::TraversalPlayer;
pub use error::{ApplicationError, ApplicationResult};
pub use session::{PendingLink, TreeSession};
