//! Builder for wiring an [`OrderWorkflow`] from configuration.
//!
//! Storage backends are created through factory functions keyed by
//! implementation name, so the caller decides which backends are available.
//! The configured product catalog is written to storage before the workflow
//! is returned.

use crate::state::{AliasStatusNormalizer, StatusNormalizer};
use crate::store::{OrderStore, StorageOrderStore};
use crate::OrderWorkflow;
use order_config::Config;
use order_storage::{StorageError, StorageInterface, StorageService};
use order_types::Product;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building the order workflow.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
	#[error("Failed to seed product catalog: {0}")]
	Catalog(String),
}

/// Builder for constructing an [`OrderWorkflow`] with a pluggable storage backend.
pub struct OrderServiceBuilder {
	config: Config,
	normalizer: Arc<dyn StatusNormalizer>,
}

impl OrderServiceBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			normalizer: Arc::new(AliasStatusNormalizer::new()),
		}
	}

	/// Replaces the default alias-based status normalizer.
	pub fn with_normalizer(mut self, normalizer: Arc<dyn StatusNormalizer>) -> Self {
		self.normalizer = normalizer;
		self
	}

	/// Creates the primary storage backend, seeds the catalog and returns the workflow.
	pub async fn build<SF>(
		self,
		storage_factories: &HashMap<String, SF>,
	) -> Result<OrderWorkflow, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
	{
		let primary = &self.config.storage.primary;
		let storage_config = self.config.storage.implementations.get(primary).ok_or_else(|| {
			BuilderError::Config(format!(
				"Primary storage '{}' has no configuration",
				primary
			))
		})?;
		let factory = storage_factories.get(primary).ok_or_else(|| {
			BuilderError::MissingComponent(format!("storage implementation '{}'", primary))
		})?;

		let backend = factory(storage_config).map_err(|e| {
			tracing::error!(
				component = "storage",
				implementation = %primary,
				error = %e,
				"Failed to create storage implementation"
			);
			BuilderError::Config(format!(
				"Failed to create storage implementation '{}': {}",
				primary, e
			))
		})?;
		tracing::info!(component = "storage", implementation = %primary, "Loaded");

		let store = StorageOrderStore::new(Arc::new(StorageService::new(backend)));
		for product in &self.config.catalog.products {
			store
				.register_product(Product::from(product))
				.await
				.map_err(|e| BuilderError::Catalog(e.to_string()))?;
		}
		tracing::info!(
			component = "catalog",
			products = self.config.catalog.products.len(),
			"Loaded"
		);

		Ok(OrderWorkflow::new(Arc::new(store), self.normalizer))
	}
}
