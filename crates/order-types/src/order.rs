//! Order domain types.
//!
//! Defines the persisted order record, its line items, the catalog products
//! items are priced from, and the read models (summaries, details, monthly
//! profit) handed out to callers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle status of an order.
///
/// Serialized using the canonical display names (`"Created"`, `"In Progress"`,
/// `"Failed"`, `"Completed"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
	/// Initial status of every newly created order.
	Created,
	/// Order is being worked on.
	#[serde(rename = "In Progress")]
	InProgress,
	/// Processing failed; the order may be retried.
	Failed,
	/// Order is done. No further transitions are possible.
	Completed,
}

impl OrderStatus {
	/// Returns the canonical name of the status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Created => "Created",
			OrderStatus::InProgress => "In Progress",
			OrderStatus::Failed => "Failed",
			OrderStatus::Completed => "Completed",
		}
	}

	/// Returns an iterator over all statuses.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Created,
			Self::InProgress,
			Self::Failed,
			Self::Completed,
		]
		.into_iter()
	}

	/// Finds the status whose canonical name matches `name`, ignoring ASCII case.
	///
	/// No alias handling is done here; `"in_progress"` does not match.
	pub fn from_name(name: &str) -> Option<Self> {
		Self::all().find(|status| status.as_str().eq_ignore_ascii_case(name))
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A product that can be ordered, together with the service it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
	pub id: Uuid,
	pub name: String,
	pub service_id: Uuid,
	pub service_name: String,
	pub unit_cost: Decimal,
	pub unit_price: Decimal,
}

/// A single line of an order.
///
/// Cost and price are captured from the catalog when the order is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
	pub id: Uuid,
	pub product_id: Uuid,
	pub product_name: String,
	pub service_id: Uuid,
	pub service_name: String,
	pub unit_cost: Decimal,
	pub unit_price: Decimal,
	pub quantity: u32,
}

impl OrderItem {
	pub fn total_cost(&self) -> Decimal {
		self.unit_cost * Decimal::from(self.quantity)
	}

	pub fn total_price(&self) -> Decimal {
		self.unit_price * Decimal::from(self.quantity)
	}

	/// Margin earned on this line.
	pub fn profit(&self) -> Decimal {
		self.total_price() - self.total_cost()
	}
}

/// Persisted order record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// Unique identifier for this order.
	pub id: Uuid,
	pub reseller_id: Uuid,
	pub customer_id: Uuid,
	/// Current status of the order.
	pub status: OrderStatus,
	/// Timestamp when this order was created.
	pub created_at: DateTime<Utc>,
	/// Timestamp of the last status change.
	pub updated_at: DateTime<Utc>,
	/// Optimistic concurrency token, bumped on every status write.
	pub version: u64,
	/// Line items, fixed at creation time.
	pub items: Vec<OrderItem>,
}

impl Order {
	pub fn total_cost(&self) -> Decimal {
		self.items.iter().map(OrderItem::total_cost).sum()
	}

	pub fn total_price(&self) -> Decimal {
		self.items.iter().map(OrderItem::total_price).sum()
	}
}

/// A line item as requested by the caller when creating an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItem {
	pub product_id: Uuid,
	pub quantity: u32,
}

/// Compact view of an order used by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
	pub id: Uuid,
	pub reseller_id: Uuid,
	pub customer_id: Uuid,
	pub status: OrderStatus,
	pub item_count: usize,
	pub total_cost: Decimal,
	pub total_price: Decimal,
	pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderSummary {
	fn from(order: &Order) -> Self {
		Self {
			id: order.id,
			reseller_id: order.reseller_id,
			customer_id: order.customer_id,
			status: order.status,
			item_count: order.items.len(),
			total_cost: order.total_cost(),
			total_price: order.total_price(),
			created_at: order.created_at,
		}
	}
}

/// Line item with its derived totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDetail {
	pub id: Uuid,
	pub product_id: Uuid,
	pub product_name: String,
	pub service_id: Uuid,
	pub service_name: String,
	pub unit_cost: Decimal,
	pub unit_price: Decimal,
	pub quantity: u32,
	pub total_cost: Decimal,
	pub total_price: Decimal,
}

impl From<&OrderItem> for OrderItemDetail {
	fn from(item: &OrderItem) -> Self {
		Self {
			id: item.id,
			product_id: item.product_id,
			product_name: item.product_name.clone(),
			service_id: item.service_id,
			service_name: item.service_name.clone(),
			unit_cost: item.unit_cost,
			unit_price: item.unit_price,
			quantity: item.quantity,
			total_cost: item.total_cost(),
			total_price: item.total_price(),
		}
	}
}

/// Full view of a single order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
	pub id: Uuid,
	pub reseller_id: Uuid,
	pub customer_id: Uuid,
	pub status: OrderStatus,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub total_cost: Decimal,
	pub total_price: Decimal,
	pub items: Vec<OrderItemDetail>,
}

impl From<&Order> for OrderDetail {
	fn from(order: &Order) -> Self {
		Self {
			id: order.id,
			reseller_id: order.reseller_id,
			customer_id: order.customer_id,
			status: order.status,
			created_at: order.created_at,
			updated_at: order.updated_at,
			total_cost: order.total_cost(),
			total_price: order.total_price(),
			items: order.items.iter().map(OrderItemDetail::from).collect(),
		}
	}
}

/// Profit of all orders created within one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyProfit {
	pub year: i32,
	pub month: u32,
	pub total_profit: Decimal,
}
