//! Common test utilities for API integration tests
//!
//! This module provides shared test infrastructure for integration tests,
//! including test fixtures, a call-recording service and helper functions.

#![allow(unused_imports)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
