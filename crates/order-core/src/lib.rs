//! Core order management logic.
//!
//! Provides status normalization, the status transition table, the order
//! store abstraction with its storage-backed implementation, and the
//! [`OrderWorkflow`] service that ties them together.

pub mod builder;
pub mod error;
pub mod state;
pub mod store;
pub mod workflow;

pub use builder::{BuilderError, OrderServiceBuilder};
pub use error::OrderError;
pub use state::{AliasStatusNormalizer, StatusNormalizer, StatusTransitions};
pub use store::{OrderStore, StorageOrderStore, StoreError};
pub use workflow::OrderWorkflow;
