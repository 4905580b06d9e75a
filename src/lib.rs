#![deny(missing_docs)]

//! Core library for the Record Gateway service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Generated API reference (OpenAPI document and HTML page).
pub mod docs;
/// Record operations over the exam and student collections.
pub mod gateway;
/// Structured logging and tracing setup.
pub mod logging;
/// Write activity counters.
pub mod metrics;
/// Document store contract and backends.
pub mod store;
