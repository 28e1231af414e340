//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Token registry lookups and the banned-key filter
//! - Bind state assignment and collision handling
//! - Type tests (labels, bindings, modifiers)

#[cfg(test)]
mod bind_state_tests;
