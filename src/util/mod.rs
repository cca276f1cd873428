//! Utilities shared across layers

pub mod testing;
