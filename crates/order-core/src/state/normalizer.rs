//! Mapping of caller-supplied status text onto [`OrderStatus`].

use crate::OrderError;
use once_cell::sync::Lazy;
use order_types::OrderStatus;
use std::collections::HashMap;

#[cfg(test)]
use mockall::automock;

/// Turns free-form status input into a canonical status.
#[cfg_attr(test, automock)]
pub trait StatusNormalizer: Send + Sync {
	/// Returns the canonical status for `status`, or `InvalidArgument` when the
	/// input is empty or unrecognized.
	fn normalize(&self, status: &str) -> Result<OrderStatus, OrderError>;
}

/// Alias keys are lowercase with spaces removed.
static ALIASES: Lazy<HashMap<&'static str, OrderStatus>> = Lazy::new(|| {
	HashMap::from([
		("created", OrderStatus::Created),
		("inprogress", OrderStatus::InProgress),
		("in_progress", OrderStatus::InProgress),
		("completed", OrderStatus::Completed),
		("failed", OrderStatus::Failed),
	])
});

/// Default normalizer backed by a fixed alias table.
///
/// Input is trimmed and has its spaces removed before the alias lookup, so
/// `"In Progress"`, `"inprogress"` and `" IN_PROGRESS "` all resolve to
/// [`OrderStatus::InProgress`]. Anything the aliases miss is compared with the
/// canonical names, ignoring case.
#[derive(Debug, Default, Clone, Copy)]
pub struct AliasStatusNormalizer;

impl AliasStatusNormalizer {
	pub fn new() -> Self {
		Self
	}
}

impl StatusNormalizer for AliasStatusNormalizer {
	fn normalize(&self, status: &str) -> Result<OrderStatus, OrderError> {
		let trimmed = status.trim();
		if trimmed.is_empty() {
			return Err(OrderError::InvalidArgument("Status is required.".into()));
		}

		let key = trimmed.replace(' ', "").to_lowercase();
		if let Some(status) = ALIASES.get(key.as_str()) {
			return Ok(*status);
		}

		OrderStatus::from_name(trimmed)
			.ok_or_else(|| OrderError::InvalidArgument(format!("Unknown status '{}'.", status)))
	}
}
