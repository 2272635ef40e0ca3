//! Configuration module for the order service.
//!
//! This module provides structures and utilities for managing service configuration.
//! It supports loading configuration from TOML files and provides validation to ensure
//! all required configuration values are properly set.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files for better organization:
//! - Use `include = ["storage.toml", "catalog.toml"]` to include other config files
//! - Each top-level section must be unique across all files (no duplicates allowed)

#[cfg(feature = "testing")]
pub mod builders {
	pub mod config;
}
mod loader;

use order_types::Product;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[cfg(feature = "testing")]
pub use builders::config::ConfigBuilder;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message only; the default rendering dumps the whole input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the order service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity of this service instance.
	pub service: ServiceConfig,
	/// Storage backend configuration.
	pub storage: StorageConfig,
	/// HTTP API server configuration.
	#[serde(default)]
	pub api: ApiConfig,
	/// Products that orders can reference.
	#[serde(default)]
	pub catalog: CatalogConfig,
}

/// Configuration specific to the service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this instance, used in logs.
	pub id: String,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Maximum request body size in bytes.
	#[serde(default = "default_max_request_size")]
	pub max_request_size: usize,
	/// CORS configuration. Any origin is allowed when absent.
	pub cors: Option<CorsConfig>,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			host: default_api_host(),
			port: default_api_port(),
			max_request_size: default_max_request_size(),
			cors: None,
		}
	}
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
	/// Allowed origins for CORS.
	pub allowed_origins: Vec<String>,
	/// Allowed methods for CORS.
	#[serde(default)]
	pub allowed_methods: Vec<String>,
}

/// Product catalog seeded into storage at startup.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
	#[serde(default)]
	pub products: Vec<ProductConfig>,
}

/// A single `[[catalog.products]]` entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProductConfig {
	pub id: Uuid,
	pub name: String,
	pub service_id: Uuid,
	pub service_name: String,
	pub unit_cost: Decimal,
	pub unit_price: Decimal,
}

impl From<&ProductConfig> for Product {
	fn from(product: &ProductConfig) -> Self {
		Product {
			id: product.id,
			name: product.name.clone(),
			service_id: product.service_id,
			service_name: product.service_name.clone(),
			unit_cost: product.unit_cost,
			unit_price: product.unit_price,
		}
	}
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

/// 1MB
fn default_max_request_size() -> usize {
	1024 * 1024
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of the environment variable VAR_NAME.
/// Supports default values with `${VAR_NAME:-default_value}`.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut resolved = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};

		let value = match (std::env::var(name.as_str()), cap.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				return Err(ConfigError::Validation(format!(
					"Environment variable '{}' not found",
					name.as_str()
				)))
			},
		};

		resolved.push_str(&input[last_end..whole.start()]);
		resolved.push_str(&value);
		last_end = whole.end();
	}
	resolved.push_str(&input[last_end..]);

	Ok(resolved)
}

impl Config {
	/// Loads configuration from a file, resolving includes and environment variables.
	///
	/// Each top-level section must be unique across all configuration files.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Validates cross-field constraints that serde cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.trim().is_empty() {
			return Err(ConfigError::Validation("Service ID cannot be empty".into()));
		}

		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in storage implementations",
				self.storage.primary
			)));
		}

		if self.api.port == 0 {
			return Err(ConfigError::Validation("API port cannot be 0".into()));
		}
		if self.api.max_request_size == 0 {
			return Err(ConfigError::Validation(
				"API max_request_size must be greater than 0".into(),
			));
		}

		let mut seen = HashSet::new();
		for product in &self.catalog.products {
			if !seen.insert(product.id) {
				return Err(ConfigError::Validation(format!(
					"Duplicate catalog product id {}",
					product.id
				)));
			}
			if product.name.trim().is_empty() {
				return Err(ConfigError::Validation(format!(
					"Catalog product {} has an empty name",
					product.id
				)));
			}
			if product.unit_cost.is_sign_negative() || product.unit_price.is_sign_negative() {
				return Err(ConfigError::Validation(format!(
					"Catalog product '{}' has a negative unit cost or price",
					product.name
				)));
			}
		}

		Ok(())
	}
}

/// Parses a configuration from a TOML string.
///
/// Environment variables are resolved and the result is validated. Includes
/// are not supported here; use [`Config::from_file`] for those.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const BASE: &str = r#"
[service]
id = "orders-test"

[storage]
primary = "memory"
[storage.implementations.memory]
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("ORDERS_TEST_HOST", "localhost");
		std::env::set_var("ORDERS_TEST_PORT", "8080");

		let input = "host = \"${ORDERS_TEST_HOST}:${ORDERS_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:8080\"");

		std::env::remove_var("ORDERS_TEST_HOST");
		std::env::remove_var("ORDERS_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${ORDERS_MISSING_VAR:-fallback}\"";
		assert_eq!(resolve_env_vars(input).unwrap(), "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("value = \"${ORDERS_MISSING_VAR}\"");
		assert!(result.unwrap_err().to_string().contains("ORDERS_MISSING_VAR"));
	}

	#[test]
	fn test_minimal_config_uses_api_defaults() {
		let config: Config = BASE.parse().unwrap();
		assert_eq!(config.service.id, "orders-test");
		assert_eq!(config.api.host, "127.0.0.1");
		assert_eq!(config.api.port, 3000);
		assert_eq!(config.api.max_request_size, 1024 * 1024);
		assert!(config.catalog.products.is_empty());
	}

	#[test]
	fn test_config_with_env_vars() {
		std::env::set_var("ORDERS_TEST_SERVICE_ID", "orders-from-env");

		let config_str = r#"
[service]
id = "${ORDERS_TEST_SERVICE_ID}"

[storage]
primary = "file"
[storage.implementations.file]
storage_path = "${ORDERS_TEST_DATA_DIR:-/tmp/orders}"

[api]
port = 8081
"#;
		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.service.id, "orders-from-env");
		assert_eq!(config.api.port, 8081);
		assert_eq!(
			config.storage.implementations["file"]
				.get("storage_path")
				.and_then(|v| v.as_str()),
			Some("/tmp/orders")
		);

		std::env::remove_var("ORDERS_TEST_SERVICE_ID");
	}

	#[test]
	fn test_catalog_products_parse() {
		let config_str = format!(
			r#"{BASE}
[[catalog.products]]
id = "7b0c2f7e-8d35-4c1e-9a51-0b1f6e7a9d01"
name = "Website Hosting"
service_id = "0f4f3c1a-55d8-4c0b-8f0e-0d5a3b1f2c10"
service_name = "Hosting"
unit_cost = "4.50"
unit_price = "9.99"
"#
		);
		let config: Config = config_str.parse().unwrap();
		let product = Product::from(&config.catalog.products[0]);
		assert_eq!(product.name, "Website Hosting");
		assert_eq!(product.unit_price.to_string(), "9.99");
	}

	#[test]
	fn test_empty_service_id_rejected() {
		let config_str = BASE.replace("orders-test", " ");
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("Service ID cannot be empty"));
	}

	#[test]
	fn test_unknown_primary_storage_rejected() {
		let config_str = BASE.replace("primary = \"memory\"", "primary = \"file\"");
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("Primary storage 'file'"));
	}

	#[test]
	fn test_zero_port_rejected() {
		let config_str = format!("{BASE}\n[api]\nport = 0\n");
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("port"));
	}

	#[test]
	fn test_duplicate_product_rejected() {
		let product = r#"
[[catalog.products]]
id = "7b0c2f7e-8d35-4c1e-9a51-0b1f6e7a9d01"
name = "Website Hosting"
service_id = "0f4f3c1a-55d8-4c0b-8f0e-0d5a3b1f2c10"
service_name = "Hosting"
unit_cost = "4.50"
unit_price = "9.99"
"#;
		let config_str = format!("{BASE}{product}{product}");
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("Duplicate catalog product"));
	}

	#[test]
	fn test_negative_price_rejected() {
		let config_str = format!(
			r#"{BASE}
[[catalog.products]]
id = "7b0c2f7e-8d35-4c1e-9a51-0b1f6e7a9d01"
name = "Website Hosting"
service_id = "0f4f3c1a-55d8-4c0b-8f0e-0d5a3b1f2c10"
service_name = "Hosting"
unit_cost = "4.50"
unit_price = "-1"
"#
		);
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("negative"));
	}

	#[test]
	fn test_parse_error_is_reported() {
		let err = "[service\nid = 1".parse::<Config>().unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)));
	}
}
