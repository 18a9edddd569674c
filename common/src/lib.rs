pub mod config;
pub mod yaml_include;

/// Common utilities shared across the ordering workspace
///
/// This crate provides shared functionality that can be used by the
/// service crates and their test suites, including:
///
/// - Layered YAML configuration loading
/// - Shared test error types, assertion macros and request helpers

// Test helpers module - available for both development and test builds
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

// Re-export commonly used test utilities for easier access
#[cfg(any(test, feature = "test-helpers"))]
pub use test_helpers::{TestError, TestResult, test_utils};
