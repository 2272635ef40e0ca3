//! Registry of storage backend factories.
//!
//! Backends register themselves through `order_storage::get_all_implementations`;
//! configuration picks one of them by name.

use order_config::Config;
use order_core::{OrderServiceBuilder, OrderWorkflow};
use order_storage::StorageFactory;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Factories for every available implementation, keyed by name.
pub struct FactoryRegistry {
	pub storage: HashMap<String, StorageFactory>,
}

impl FactoryRegistry {
	fn new() -> Self {
		Self {
			storage: HashMap::new(),
		}
	}

	fn register_storage(&mut self, name: impl Into<String>, factory: StorageFactory) {
		self.storage.insert(name.into(), factory);
	}
}

static REGISTRY: OnceLock<FactoryRegistry> = OnceLock::new();

/// Returns the global registry, populating it on first use.
pub fn get_registry() -> &'static FactoryRegistry {
	REGISTRY.get_or_init(|| {
		let mut registry = FactoryRegistry::new();
		for (name, factory) in order_storage::get_all_implementations() {
			tracing::debug!("Registering storage implementation: {}", name);
			registry.register_storage(name, factory);
		}
		registry
	})
}

/// Builds the order workflow for `config` using the registered factories.
///
/// Fails if the configuration names a storage implementation that is not registered.
pub async fn build_workflow_from_config(
	config: Config,
) -> Result<OrderWorkflow, Box<dyn std::error::Error>> {
	let registry = get_registry();

	let mut storage_factories = HashMap::new();
	for name in config.storage.implementations.keys() {
		match registry.storage.get(name) {
			Some(factory) => {
				storage_factories.insert(name.clone(), *factory);
			},
			None => {
				let mut available: Vec<_> = registry.storage.keys().cloned().collect();
				available.sort();
				return Err(format!(
					"Unknown storage implementation '{}'. Available: [{}]",
					name,
					available.join(", ")
				)
				.into());
			},
		}
	}

	Ok(OrderServiceBuilder::new(config)
		.build(&storage_factories)
		.await?)
}
