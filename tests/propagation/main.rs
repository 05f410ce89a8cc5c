//! Propagation Integration Tests
//!
//! End-to-end tests for REQUIRED propagation through the public facade:
//! concrete scenarios, the member sign-up flows, isolation between call
//! chains, and property tests over random nesting trees.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test propagation
//!
//! # Property tests only
//! cargo test --test propagation properties::
//! ```

mod common;

mod isolation;
mod properties;
mod scenarios;
mod service;
