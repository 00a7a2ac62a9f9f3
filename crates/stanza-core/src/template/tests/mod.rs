//! Tests for the template language
//!
//! Organized by construct. Inheritance and caching are exercised through the
//! engine in the crate's integration tests.

// Test helper functions
mod helpers;

// Rendering tests
mod render_basic;
mod render_loops;
mod conditionals;

// Error and edge case tests
mod errors;
