//! Common types for the order service.
//!
//! This crate defines the data types shared by every other crate in the
//! workspace: the order model, HTTP request and error types, storage
//! namespaces, and the configuration validation helpers used by pluggable
//! backends.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Order, line item, product and reporting types.
pub mod order;
/// Registry trait for pluggable implementations.
pub mod registry;
/// Storage namespaces for persisted data.
pub mod storage;
/// Configuration validation types for pluggable implementations.
pub mod validation;

pub use api::*;
pub use order::*;
pub use registry::ImplementationRegistry;
pub use storage::*;
pub use validation::*;
