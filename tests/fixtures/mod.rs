// Shared test fixtures and utilities for integration tests
//
// This module provides:
// - Configuration fixtures (configs.rs)
// - Test helper functions and elements (helpers.rs)

pub mod configs;
pub mod helpers;
