//! Order status handling.
//!
//! Normalization turns caller input into an [`order_types::OrderStatus`];
//! the transition table decides which status changes are permitted.

pub mod normalizer;
pub mod transitions;

pub use normalizer::{AliasStatusNormalizer, StatusNormalizer};
pub use transitions::{allowed_transitions, validate, StatusTransitions};

#[cfg(test)]
pub use normalizer::MockStatusNormalizer;
