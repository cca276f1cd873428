//! Tree engine for an interactive visualizer
//!
//! Layers, innermost first:
//! - [`domain`]: nodes, insertion modes, AVL rebalancing, free-form edits,
//!   layout and traversal. Pure, no I/O.
//! - [`application`]: the editing session and timed traversal playback.
//! - [`config`]: layered settings.
//! - [`cli`]: the `treeviz` command line.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
