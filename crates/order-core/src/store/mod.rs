//! Persistence boundary for orders.
//!
//! The workflow only talks to [`OrderStore`]; [`StorageOrderStore`] is the
//! implementation backed by the pluggable key/value storage service.

use async_trait::async_trait;
use order_storage::StorageError;
use order_types::{CreateOrderItem, MonthlyProfit, Order, OrderStatus, OrderSummary, Product};
use thiserror::Error;
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

pub mod storage;

pub use storage::StorageOrderStore;

/// Errors returned by an [`OrderStore`].
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("Order '{0}' not found.")]
	NotFound(Uuid),
	#[error("Product '{0}' does not exist.")]
	UnknownProduct(Uuid),
	/// The stored version no longer matches the one the caller read.
	#[error("Order was modified concurrently (expected version {expected}, found {actual}).")]
	Conflict { expected: u64, actual: u64 },
	#[error(transparent)]
	Storage(#[from] StorageError),
}

/// Reads and writes orders and the product catalog.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OrderStore: Send + Sync {
	async fn fetch_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

	/// All orders, newest first.
	async fn fetch_all(&self) -> Result<Vec<OrderSummary>, StoreError>;

	/// Orders currently in `status`, newest first.
	async fn fetch_by_status(&self, status: OrderStatus) -> Result<Vec<OrderSummary>, StoreError>;

	/// Persists a new order in `Created` status, pricing each item from the catalog.
	async fn create(
		&self,
		reseller_id: Uuid,
		customer_id: Uuid,
		items: &[CreateOrderItem],
	) -> Result<Order, StoreError>;

	/// Writes a new status if the stored version still equals `expected_version`.
	async fn update_status(
		&self,
		id: Uuid,
		status: OrderStatus,
		expected_version: u64,
	) -> Result<(), StoreError>;

	/// Profit per calendar month of order creation, oldest month first.
	async fn monthly_profit(&self) -> Result<Vec<MonthlyProfit>, StoreError>;

	/// Adds or replaces a catalog product.
	async fn register_product(&self, product: Product) -> Result<(), StoreError>;
}
