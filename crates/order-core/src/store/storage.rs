//! [`OrderStore`] implementation on top of [`StorageService`].
//!
//! Orders live in the `orders` namespace and catalog products in the
//! `products` namespace, both keyed by their UUID. Mutations are serialized
//! through a single async mutex so the version check and the write of
//! `update_status` happen atomically with respect to other writers.

use super::{OrderStore, StoreError};
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use order_storage::{StorageError, StorageService};
use order_types::{
	CreateOrderItem, MonthlyProfit, Order, OrderItem, OrderStatus, OrderSummary, Product,
	StorageKey,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Order store persisting through a pluggable storage backend.
pub struct StorageOrderStore {
	storage: Arc<StorageService>,
	/// Held for the duration of every write.
	write_lock: Mutex<()>,
}

impl StorageOrderStore {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self {
			storage,
			write_lock: Mutex::new(()),
		}
	}

	async fn load_orders(&self) -> Result<Vec<Order>, StoreError> {
		let mut orders: Vec<Order> = self
			.storage
			.retrieve_all(StorageKey::Orders.as_str())
			.await?;
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(orders)
	}

	async fn load_product(&self, id: Uuid) -> Result<Product, StoreError> {
		match self
			.storage
			.retrieve(StorageKey::Products.as_str(), &id.to_string())
			.await
		{
			Ok(product) => Ok(product),
			Err(StorageError::NotFound) => Err(StoreError::UnknownProduct(id)),
			Err(e) => Err(e.into()),
		}
	}
}

#[async_trait]
impl OrderStore for StorageOrderStore {
	async fn fetch_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
		match self
			.storage
			.retrieve(StorageKey::Orders.as_str(), &id.to_string())
			.await
		{
			Ok(order) => Ok(Some(order)),
			Err(StorageError::NotFound) => Ok(None),
			Err(e) => Err(e.into()),
		}
	}

	async fn fetch_all(&self) -> Result<Vec<OrderSummary>, StoreError> {
		let orders = self.load_orders().await?;
		Ok(orders.iter().map(OrderSummary::from).collect())
	}

	async fn fetch_by_status(&self, status: OrderStatus) -> Result<Vec<OrderSummary>, StoreError> {
		let orders = self.load_orders().await?;
		Ok(orders
			.iter()
			.filter(|order| order.status == status)
			.map(OrderSummary::from)
			.collect())
	}

	async fn create(
		&self,
		reseller_id: Uuid,
		customer_id: Uuid,
		items: &[CreateOrderItem],
	) -> Result<Order, StoreError> {
		let _guard = self.write_lock.lock().await;

		let mut lines = Vec::with_capacity(items.len());
		for item in items {
			let product = self.load_product(item.product_id).await?;
			lines.push(OrderItem {
				id: Uuid::new_v4(),
				product_id: product.id,
				product_name: product.name,
				service_id: product.service_id,
				service_name: product.service_name,
				unit_cost: product.unit_cost,
				unit_price: product.unit_price,
				quantity: item.quantity,
			});
		}

		let now = Utc::now();
		let order = Order {
			id: Uuid::new_v4(),
			reseller_id,
			customer_id,
			status: OrderStatus::Created,
			created_at: now,
			updated_at: now,
			version: 1,
			items: lines,
		};

		self.storage
			.store(StorageKey::Orders.as_str(), &order.id.to_string(), &order)
			.await?;
		tracing::debug!(order_id = %order.id, items = order.items.len(), "Stored new order");

		Ok(order)
	}

	async fn update_status(
		&self,
		id: Uuid,
		status: OrderStatus,
		expected_version: u64,
	) -> Result<(), StoreError> {
		let _guard = self.write_lock.lock().await;

		let mut order = self.fetch_by_id(id).await?.ok_or(StoreError::NotFound(id))?;
		if order.version != expected_version {
			return Err(StoreError::Conflict {
				expected: expected_version,
				actual: order.version,
			});
		}

		order.status = status;
		order.version += 1;
		order.updated_at = Utc::now();

		match self
			.storage
			.update(StorageKey::Orders.as_str(), &id.to_string(), &order)
			.await
		{
			Ok(()) => {
				tracing::debug!(order_id = %id, status = %status, version = order.version, "Stored status change");
				Ok(())
			},
			Err(StorageError::NotFound) => Err(StoreError::NotFound(id)),
			Err(e) => Err(e.into()),
		}
	}

	async fn monthly_profit(&self) -> Result<Vec<MonthlyProfit>, StoreError> {
		let orders: Vec<Order> = self
			.storage
			.retrieve_all(StorageKey::Orders.as_str())
			.await?;

		let mut months: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
		for order in &orders {
			let profit: Decimal = order.items.iter().map(OrderItem::profit).sum();
			*months
				.entry((order.created_at.year(), order.created_at.month()))
				.or_default() += profit;
		}

		Ok(months
			.into_iter()
			.map(|((year, month), total_profit)| MonthlyProfit {
				year,
				month,
				total_profit,
			})
			.collect())
	}

	async fn register_product(&self, product: Product) -> Result<(), StoreError> {
		let _guard = self.write_lock.lock().await;
		self.storage
			.store(StorageKey::Products.as_str(), &product.id.to_string(), &product)
			.await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{DateTime, TimeZone};
	use order_storage::implementations::memory::MemoryStorage;

	fn d(value: &str) -> Decimal {
		value.parse().unwrap()
	}

	fn product(name: &str, unit_cost: &str, unit_price: &str) -> Product {
		Product {
			id: Uuid::new_v4(),
			name: name.to_string(),
			service_id: Uuid::new_v4(),
			service_name: "Email".to_string(),
			unit_cost: d(unit_cost),
			unit_price: d(unit_price),
		}
	}

	fn setup() -> (Arc<StorageService>, StorageOrderStore) {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let store = StorageOrderStore::new(storage.clone());
		(storage, store)
	}

	fn order_at(created_at: DateTime<Utc>, items: Vec<OrderItem>) -> Order {
		Order {
			id: Uuid::new_v4(),
			reseller_id: Uuid::new_v4(),
			customer_id: Uuid::new_v4(),
			status: OrderStatus::Created,
			created_at,
			updated_at: created_at,
			version: 1,
			items,
		}
	}

	fn line(unit_cost: &str, unit_price: &str, quantity: u32) -> OrderItem {
		OrderItem {
			id: Uuid::new_v4(),
			product_id: Uuid::new_v4(),
			product_name: "Mailbox".into(),
			service_id: Uuid::new_v4(),
			service_name: "Email".into(),
			unit_cost: d(unit_cost),
			unit_price: d(unit_price),
			quantity,
		}
	}

	#[tokio::test]
	async fn test_create_prices_items_from_catalog() {
		let (_, store) = setup();
		let mailbox = product("100GB Mailbox", "0.8", "0.9");
		store.register_product(mailbox.clone()).await.unwrap();

		let items = [CreateOrderItem {
			product_id: mailbox.id,
			quantity: 3,
		}];
		let order = store
			.create(Uuid::new_v4(), Uuid::new_v4(), &items)
			.await
			.unwrap();

		assert_eq!(order.status, OrderStatus::Created);
		assert_eq!(order.items[0].product_name, "100GB Mailbox");
		assert_eq!(order.items[0].unit_price, d("0.9"));
		assert_eq!(order.total_price(), d("2.7"));

		let loaded = store.fetch_by_id(order.id).await.unwrap().unwrap();
		assert_eq!(loaded, order);
	}

	#[tokio::test]
	async fn test_create_rejects_unknown_product() {
		let (_, store) = setup();
		let missing = Uuid::new_v4();
		let items = [CreateOrderItem {
			product_id: missing,
			quantity: 1,
		}];

		let result = store.create(Uuid::new_v4(), Uuid::new_v4(), &items).await;
		assert!(matches!(result, Err(StoreError::UnknownProduct(id)) if id == missing));
		assert!(store.fetch_all().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_fetch_missing_order_is_none() {
		let (_, store) = setup();
		assert!(store.fetch_by_id(Uuid::new_v4()).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_listing_is_newest_first_and_filterable() {
		let (storage, store) = setup();
		let older = order_at(Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap(), vec![]);
		let mut newer = order_at(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(), vec![]);
		newer.status = OrderStatus::Failed;
		for order in [&older, &newer] {
			storage
				.store("orders", &order.id.to_string(), order)
				.await
				.unwrap();
		}

		let all = store.fetch_all().await.unwrap();
		assert_eq!(
			all.iter().map(|o| o.id).collect::<Vec<_>>(),
			vec![newer.id, older.id]
		);

		let failed = store.fetch_by_status(OrderStatus::Failed).await.unwrap();
		assert_eq!(failed.len(), 1);
		assert_eq!(failed[0].id, newer.id);
		assert!(store
			.fetch_by_status(OrderStatus::Completed)
			.await
			.unwrap()
			.is_empty());
	}

	#[tokio::test]
	async fn test_update_status_checks_version() {
		let (storage, store) = setup();
		let order = order_at(Utc::now(), vec![]);
		storage
			.store("orders", &order.id.to_string(), &order)
			.await
			.unwrap();

		store
			.update_status(order.id, OrderStatus::InProgress, 1)
			.await
			.unwrap();
		let updated = store.fetch_by_id(order.id).await.unwrap().unwrap();
		assert_eq!(updated.status, OrderStatus::InProgress);
		assert_eq!(updated.version, 2);
		assert!(updated.updated_at >= order.updated_at);

		let stale = store.update_status(order.id, OrderStatus::Failed, 1).await;
		assert!(matches!(
			stale,
			Err(StoreError::Conflict {
				expected: 1,
				actual: 2
			})
		));
	}

	#[tokio::test]
	async fn test_update_status_unknown_order() {
		let (_, store) = setup();
		let id = Uuid::new_v4();
		let result = store.update_status(id, OrderStatus::Failed, 1).await;
		assert!(matches!(result, Err(StoreError::NotFound(missing)) if missing == id));
	}

	#[tokio::test]
	async fn test_concurrent_updates_single_winner() {
		let (storage, store) = setup();
		let order = order_at(Utc::now(), vec![]);
		storage
			.store("orders", &order.id.to_string(), &order)
			.await
			.unwrap();
		let store = Arc::new(store);
		let id = order.id;

		let handles: Vec<_> = [OrderStatus::InProgress, OrderStatus::Failed]
			.into_iter()
			.map(|status| {
				let store = store.clone();
				tokio::spawn(async move { store.update_status(id, status, 1).await })
			})
			.collect();

		let mut wins = 0;
		let mut conflicts = 0;
		for handle in handles {
			match handle.await.unwrap() {
				Ok(()) => wins += 1,
				Err(StoreError::Conflict { .. }) => conflicts += 1,
				Err(e) => panic!("unexpected error: {}", e),
			}
		}
		assert_eq!((wins, conflicts), (1, 1));
		assert_eq!(store.fetch_by_id(id).await.unwrap().unwrap().version, 2);
	}

	#[tokio::test]
	async fn test_monthly_profit_groups_by_creation_month() {
		let (storage, store) = setup();
		let orders = [
			order_at(
				Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap(),
				vec![line("0.8", "0.9", 10), line("2", "5", 1)],
			),
			order_at(
				Utc.with_ymd_and_hms(2024, 2, 28, 23, 59, 59).unwrap(),
				vec![line("1", "1.5", 2)],
			),
			order_at(
				Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap(),
				vec![line("10", "12", 1)],
			),
		];
		for order in &orders {
			storage
				.store("orders", &order.id.to_string(), order)
				.await
				.unwrap();
		}

		let profit = store.monthly_profit().await.unwrap();
		assert_eq!(
			profit,
			vec![
				MonthlyProfit {
					year: 2023,
					month: 12,
					total_profit: d("2"),
				},
				MonthlyProfit {
					year: 2024,
					month: 2,
					total_profit: d("5"),
				},
			]
		);
	}

	#[tokio::test]
	async fn test_monthly_profit_empty_store() {
		let (_, store) = setup();
		assert!(store.monthly_profit().await.unwrap().is_empty());
	}
}
