//! CLI command implementations

pub mod cache;
pub mod exists;
pub mod render;
pub mod warm;
