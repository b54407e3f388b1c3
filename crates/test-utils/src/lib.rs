// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for unified-query
//!
//! This crate provides common testing components including:
//! - A small object domain (cooks, assistants, kitchens) with query sources
//! - Anonymous-type builders for transparent identifiers
//! - A fluent builder for query-operator call trees
//! - Expression and query model assertions
//! - Tracing initialisation for tests

pub mod assertions;
pub mod builder;
pub mod fixtures;

// Re-exports for convenience
pub use assertions::TreeAssertions;
pub use builder::QueryBuilder;
pub use fixtures::{
    DomainFixtures, anonymous_member_init, anonymous_new, anonymous_type, member, property,
};

use tracing_subscriber::EnvFilter;

/// Install a `RUST_LOG`-driven subscriber writing to the test output
///
/// Safe to call from every test; only the first call installs the subscriber.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
