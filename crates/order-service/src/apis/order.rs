//! Order endpoints.
//!
//! Handlers translate HTTP input into workflow calls and workflow errors into
//! [`APIError`] responses. Malformed identifiers and bodies are rejected here
//! with 400 before the workflow is involved.

use crate::server::AppState;
use axum::{
	extract::{rejection::JsonRejection, Path, Query, State},
	http::StatusCode,
	response::Json,
};
use order_types::{
	APIError, CreateOrderRequest, MonthlyProfit, OrderDetail, OrderListQuery, OrderSummary,
	UpdateOrderStatusRequest,
};
use uuid::Uuid;

/// Parses an order id taken from the request path.
fn parse_order_id(id: &str) -> Result<Uuid, APIError> {
	Uuid::parse_str(id).map_err(|_| APIError::BadRequest {
		error_type: "INVALID_ORDER_ID".to_string(),
		message: format!("Order ID must be a valid UUID: {}", id),
		details: None,
	})
}

/// Unwraps a JSON body, reporting any rejection as a bad request.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, APIError> {
	payload.map(|Json(body)| body).map_err(|rejection| {
		tracing::debug!(error = %rejection, "Rejected request body");
		APIError::BadRequest {
			error_type: "INVALID_REQUEST".to_string(),
			message: rejection.body_text(),
			details: None,
		}
	})
}

/// Handles GET /orders.
pub async fn list_orders(
	State(state): State<AppState>,
	Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<OrderSummary>>, APIError> {
	let orders = state.orders.list_orders(query.status.as_deref()).await?;
	Ok(Json(orders))
}

/// Handles GET /orders/{id}.
pub async fn get_order(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<OrderDetail>, APIError> {
	let id = parse_order_id(&id)?;
	Ok(Json(state.orders.get_order(id).await?))
}

/// Handles POST /orders.
pub async fn create_order(
	State(state): State<AppState>,
	payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderDetail>), APIError> {
	let request = json_body(payload)?;
	let order = state.orders.create_order(request).await?;
	Ok((StatusCode::CREATED, Json(order)))
}

/// Handles PUT /orders/{id}/status.
pub async fn update_order_status(
	State(state): State<AppState>,
	Path(id): Path<String>,
	payload: Result<Json<UpdateOrderStatusRequest>, JsonRejection>,
) -> Result<Json<OrderDetail>, APIError> {
	let id = parse_order_id(&id)?;
	let request = json_body(payload)?;

	match state.orders.update_status(id, &request.status).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!(order_id = %id, error = %e, "Status update failed");
			Err(APIError::from(e))
		},
	}
}

/// Handles GET /orders/profit-by-month.
pub async fn profit_by_month(
	State(state): State<AppState>,
) -> Result<Json<Vec<MonthlyProfit>>, APIError> {
	Ok(Json(state.orders.monthly_profit().await?))
}
