//! End-to-end HTTP tests

pub mod http;
