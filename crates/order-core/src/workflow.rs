//! Order workflow service.
//!
//! Combines status normalization, the transition table and an [`OrderStore`]
//! into the operations exposed by the API.

use crate::state::{self, StatusNormalizer};
use crate::store::OrderStore;
use crate::OrderError;
use order_types::{CreateOrderRequest, MonthlyProfit, OrderDetail, OrderSummary};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Entry point for all order operations.
pub struct OrderWorkflow {
	store: Arc<dyn OrderStore>,
	normalizer: Arc<dyn StatusNormalizer>,
}

impl OrderWorkflow {
	pub fn new(store: Arc<dyn OrderStore>, normalizer: Arc<dyn StatusNormalizer>) -> Self {
		Self { store, normalizer }
	}

	/// Lists orders newest first, optionally restricted to one status.
	///
	/// A missing or blank filter lists every order.
	#[instrument(skip_all, fields(status = status.unwrap_or_default()))]
	pub async fn list_orders(&self, status: Option<&str>) -> Result<Vec<OrderSummary>, OrderError> {
		let orders = match status.filter(|s| !s.trim().is_empty()) {
			Some(requested) => {
				let status = self.normalizer.normalize(requested)?;
				self.store.fetch_by_status(status).await?
			},
			None => self.store.fetch_all().await?,
		};

		tracing::debug!(count = orders.len(), "Listed orders");
		Ok(orders)
	}

	#[instrument(skip_all, fields(order_id = %order_id))]
	pub async fn get_order(&self, order_id: Uuid) -> Result<OrderDetail, OrderError> {
		let order = self
			.store
			.fetch_by_id(order_id)
			.await?
			.ok_or(OrderError::NotFound(order_id))?;
		Ok(OrderDetail::from(&order))
	}

	/// Validates and persists a new order.
	#[instrument(skip_all, fields(reseller_id = %request.reseller_id, items = request.items.len()))]
	pub async fn create_order(&self, request: CreateOrderRequest) -> Result<OrderDetail, OrderError> {
		validate_create_request(&request)?;

		let order = self
			.store
			.create(request.reseller_id, request.customer_id, &request.items)
			.await?;

		tracing::info!(order_id = %order.id, "Order created");
		Ok(OrderDetail::from(&order))
	}

	/// Moves an order to the status named by `requested`.
	///
	/// The write only succeeds if the order is unchanged since it was read;
	/// otherwise `Conflict` is returned and nothing is written.
	#[instrument(skip_all, fields(order_id = %order_id, requested = %requested))]
	pub async fn update_status(
		&self,
		order_id: Uuid,
		requested: &str,
	) -> Result<OrderDetail, OrderError> {
		let target = self.normalizer.normalize(requested)?;

		let current = self
			.store
			.fetch_by_id(order_id)
			.await?
			.ok_or(OrderError::NotFound(order_id))?;

		state::validate(current.status.as_str(), target.as_str())?;

		self.store
			.update_status(order_id, target, current.version)
			.await
			.inspect_err(|e| {
				tracing::warn!(error = %e, "Status write rejected");
			})?;

		let updated = self
			.store
			.fetch_by_id(order_id)
			.await?
			.ok_or(OrderError::NotFound(order_id))?;

		tracing::info!(from = %current.status, to = %updated.status, "Order status changed");
		Ok(OrderDetail::from(&updated))
	}

	pub async fn monthly_profit(&self) -> Result<Vec<MonthlyProfit>, OrderError> {
		Ok(self.store.monthly_profit().await?)
	}
}

/// Checks the shape of a create request before anything touches the store.
fn validate_create_request(request: &CreateOrderRequest) -> Result<(), OrderError> {
	if request.reseller_id.is_nil() {
		return Err(OrderError::InvalidArgument("Reseller id is required.".into()));
	}
	if request.customer_id.is_nil() {
		return Err(OrderError::InvalidArgument("Customer id is required.".into()));
	}
	if request.items.is_empty() {
		return Err(OrderError::InvalidArgument(
			"At least one order item is required.".into(),
		));
	}

	let mut seen = HashSet::with_capacity(request.items.len());
	for item in &request.items {
		if item.product_id.is_nil() {
			return Err(OrderError::InvalidArgument("Product id is required.".into()));
		}
		if item.quantity == 0 {
			return Err(OrderError::InvalidArgument(format!(
				"Quantity for product '{}' must be greater than zero.",
				item.product_id
			)));
		}
		if !seen.insert(item.product_id) {
			return Err(OrderError::InvalidArgument(format!(
				"Product '{}' appears more than once.",
				item.product_id
			)));
		}
	}

	Ok(())
}
