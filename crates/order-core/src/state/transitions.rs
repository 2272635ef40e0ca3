//! Order status state machine.
//!
//! ```text
//! Created ──► In Progress ──► Completed
//!    │          ▲     │
//!    │          │     │
//!    └──► Failed ◄────┘
//! ```
//!
//! `Completed` is terminal. A failed order may be retried by moving it back to
//! `In Progress`.

use crate::OrderError;
use once_cell::sync::Lazy;
use order_types::OrderStatus;
use std::collections::{HashMap, HashSet};

/// Static transition table - each status maps to its allowed next statuses.
static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	HashMap::from([
		(
			OrderStatus::Created,
			HashSet::from([OrderStatus::InProgress, OrderStatus::Failed]),
		),
		(
			OrderStatus::InProgress,
			HashSet::from([OrderStatus::Completed, OrderStatus::Failed]),
		),
		(OrderStatus::Failed, HashSet::from([OrderStatus::InProgress])),
		(OrderStatus::Completed, HashSet::new()),
	])
});

/// Returns the statuses an order may move to from `current`.
pub fn allowed_transitions(current: OrderStatus) -> impl Iterator<Item = OrderStatus> {
	OrderStatus::all().filter(move |target| current.can_transition_to(*target))
}

/// Checks a transition between two canonical status names.
///
/// Both names are matched against the canonical names ignoring case; no alias
/// handling is done, so callers normalize first.
pub fn validate(current: &str, target: &str) -> Result<(), OrderError> {
	let Some(from) = OrderStatus::from_name(current) else {
		return Err(OrderError::InvalidTransition(format!(
			"Unknown current status '{}'.",
			current
		)));
	};

	match OrderStatus::from_name(target) {
		Some(to) if from.can_transition_to(to) => Ok(()),
		_ => Err(OrderError::InvalidTransition(format!(
			"Cannot change status from '{}' to '{}'.",
			current, target
		))),
	}
}

/// Typed transition checks on [`OrderStatus`].
pub trait StatusTransitions {
	fn can_transition_to(&self, target: OrderStatus) -> bool;

	/// True when no transition leaves this status.
	fn is_terminal(&self) -> bool;
}

impl StatusTransitions for OrderStatus {
	fn can_transition_to(&self, target: OrderStatus) -> bool {
		TRANSITIONS
			.get(self)
			.is_some_and(|allowed| allowed.contains(&target))
	}

	fn is_terminal(&self) -> bool {
		TRANSITIONS.get(self).is_none_or(HashSet::is_empty)
	}
}
