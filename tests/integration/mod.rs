//! Lifecycle integration tests

pub mod lifecycle;
