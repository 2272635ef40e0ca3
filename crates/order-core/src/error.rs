//! Error type shared by the order workflow and its collaborators.

use crate::store::StoreError;
use order_types::APIError;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by order operations.
///
/// Each variant maps to one HTTP status at the API boundary.
#[derive(Debug, Error)]
pub enum OrderError {
	/// The caller supplied a missing or malformed value.
	#[error("{0}")]
	InvalidArgument(String),
	/// The requested status change is not allowed from the current status.
	#[error("{0}")]
	InvalidTransition(String),
	#[error("Order '{0}' not found.")]
	NotFound(Uuid),
	/// The order changed between being read and being written.
	#[error("{0}")]
	Conflict(String),
	/// The store failed for reasons unrelated to the request.
	#[error("Persistence error: {0}")]
	Persistence(String),
}

impl From<StoreError> for OrderError {
	fn from(err: StoreError) -> Self {
		match err {
			StoreError::NotFound(id) => OrderError::NotFound(id),
			StoreError::UnknownProduct(_) => OrderError::InvalidArgument(err.to_string()),
			StoreError::Conflict { .. } => OrderError::Conflict(err.to_string()),
			StoreError::Storage(e) => OrderError::Persistence(e.to_string()),
		}
	}
}

impl From<OrderError> for APIError {
	fn from(err: OrderError) -> Self {
		match err {
			OrderError::InvalidArgument(message) => APIError::BadRequest {
				error_type: "INVALID_ARGUMENT".to_string(),
				message,
				details: None,
			},
			OrderError::NotFound(_) => APIError::NotFound {
				error_type: "ORDER_NOT_FOUND".to_string(),
				message: err.to_string(),
			},
			OrderError::InvalidTransition(message) => APIError::Conflict {
				error_type: "INVALID_TRANSITION".to_string(),
				message,
			},
			OrderError::Conflict(message) => APIError::Conflict {
				error_type: "CONFLICT".to_string(),
				message,
			},
			OrderError::Persistence(message) => {
				tracing::error!(error = %message, "Order store failure");
				APIError::InternalServerError {
					error_type: "INTERNAL_ERROR".to_string(),
					message: "An unexpected error occurred.".to_string(),
				}
			},
		}
	}
}
