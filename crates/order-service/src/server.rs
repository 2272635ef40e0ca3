//! HTTP server for the order API.

use crate::apis::order;
use axum::{
	extract::DefaultBodyLimit,
	http::{HeaderValue, Method},
	response::Json,
	routing::{get, put},
	Router,
};
use order_config::{ApiConfig, CorsConfig};
use order_core::OrderWorkflow;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
	cors::{AllowMethods, AllowOrigin, CorsLayer},
	trace::TraceLayer,
};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub orders: Arc<OrderWorkflow>,
}

/// Builds the application router with all routes and middleware.
pub fn router(api_config: &ApiConfig, orders: Arc<OrderWorkflow>) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/orders", get(order::list_orders).post(order::create_order))
		.route("/orders/profit-by-month", get(order::profit_by_month))
		.route("/orders/{id}", get(order::get_order))
		.route("/orders/{id}/status", put(order::update_order_status))
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(cors_layer(api_config.cors.as_ref()))
				.layer(DefaultBodyLimit::max(api_config.max_request_size)),
		)
		.with_state(AppState { orders })
}

/// Starts the HTTP server and serves until Ctrl-C is received.
pub async fn start_server(
	api_config: ApiConfig,
	orders: Arc<OrderWorkflow>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(&api_config, orders);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Order API server starting on {}", bind_address);

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!("Failed to listen for shutdown signal: {}", e);
		return;
	}
	tracing::info!("Shutdown signal received");
}

/// Permissive unless origins are configured.
fn cors_layer(cors: Option<&CorsConfig>) -> CorsLayer {
	let Some(cors) = cors else {
		return CorsLayer::permissive();
	};

	let origins: Vec<HeaderValue> = cors
		.allowed_origins
		.iter()
		.filter_map(|origin| match origin.parse() {
			Ok(value) => Some(value),
			Err(_) => {
				tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
				None
			},
		})
		.collect();

	let methods: Vec<Method> = if cors.allowed_methods.is_empty() {
		vec![Method::GET, Method::POST, Method::PUT]
	} else {
		cors.allowed_methods
			.iter()
			.filter_map(|method| Method::from_bytes(method.to_uppercase().as_bytes()).ok())
			.collect()
	};

	CorsLayer::new()
		.allow_origin(AllowOrigin::list(origins))
		.allow_methods(AllowMethods::list(methods))
		.allow_headers([axum::http::header::CONTENT_TYPE])
}

async fn health() -> Json<Value> {
	Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{
		body::{to_bytes, Body},
		http::{Request, StatusCode},
	};
	use order_config::{ConfigBuilder, ProductConfig};
	use tower::ServiceExt;
	use uuid::Uuid;

	const PRODUCT_ID: &str = "7b0c2f7e-8d35-4c1e-9a51-0b1f6e7a9d01";

	async fn app() -> Router {
		let config = ConfigBuilder::new()
			.product(ProductConfig {
				id: PRODUCT_ID.parse().unwrap(),
				name: "100GB Mailbox".into(),
				service_id: Uuid::new_v4(),
				service_name: "Email".into(),
				unit_cost: "0.8".parse().unwrap(),
				unit_price: "0.9".parse().unwrap(),
			})
			.build();
		let api = config.api.clone();
		let workflow = crate::factory_registry::build_workflow_from_config(config)
			.await
			.unwrap();
		router(&api, Arc::new(workflow))
	}

	async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
		let mut request = Request::builder().method(method).uri(uri);
		let body = match body {
			Some(json) => {
				request = request.header("content-type", "application/json");
				Body::from(json.to_string())
			},
			None => Body::empty(),
		};

		let response = app
			.clone()
			.oneshot(request.body(body).unwrap())
			.await
			.unwrap();
		let status = response.status();
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		let value = if bytes.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&bytes).unwrap()
		};
		(status, value)
	}

	async fn create(app: &Router, quantity: u32) -> Value {
		let (status, body) = send(
			app,
			"POST",
			"/orders",
			Some(json!({
				"resellerId": Uuid::new_v4(),
				"customerId": Uuid::new_v4(),
				"items": [{ "productId": PRODUCT_ID, "quantity": quantity }],
			})),
		)
		.await;
		assert_eq!(status, StatusCode::CREATED, "{}", body);
		body
	}

	#[tokio::test]
	async fn test_health() {
		let app = app().await;
		let (status, body) = send(&app, "GET", "/health", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["status"], "ok");
	}

	#[tokio::test]
	async fn test_create_get_and_list() {
		let app = app().await;
		let created = create(&app, 10).await;
		assert_eq!(created["status"], "Created");
		assert_eq!(created["items"][0]["productName"], "100GB Mailbox");
		assert!(created.get("version").is_none());

		let id = created["id"].as_str().unwrap();
		let (status, fetched) = send(&app, "GET", &format!("/orders/{}", id), None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(fetched["id"], created["id"]);

		let (status, list) = send(&app, "GET", "/orders", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(list.as_array().unwrap().len(), 1);
		assert_eq!(list[0]["itemCount"], 1);

		let (status, list) = send(&app, "GET", "/orders?status=in%20progress", None).await;
		assert_eq!(status, StatusCode::OK);
		assert!(list.as_array().unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_status_updates_map_to_http_codes() {
		let app = app().await;
		let created = create(&app, 1).await;
		let uri = format!("/orders/{}/status", created["id"].as_str().unwrap());

		let (status, body) = send(&app, "PUT", &uri, Some(json!({ "status": "inprogress" }))).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["status"], "In Progress");

		let (status, body) = send(&app, "PUT", &uri, Some(json!({ "status": "Created" }))).await;
		assert_eq!(status, StatusCode::CONFLICT);
		assert_eq!(body["error"], "INVALID_TRANSITION");
		assert_eq!(
			body["message"],
			"Cannot change status from 'In Progress' to 'Created'."
		);

		let (status, body) = send(&app, "PUT", &uri, Some(json!({ "status": "" }))).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["message"], "Status is required.");

		let (status, body) = send(&app, "PUT", &uri, Some(json!({ "status": "Shipped" }))).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["message"], "Unknown status 'Shipped'.");
	}

	#[tokio::test]
	async fn test_unknown_and_malformed_ids() {
		let app = app().await;
		let missing = Uuid::new_v4();

		let (status, body) = send(&app, "GET", &format!("/orders/{}", missing), None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["message"], format!("Order '{}' not found.", missing));

		let (status, _) = send(
			&app,
			"PUT",
			&format!("/orders/{}/status", missing),
			Some(json!({ "status": "Failed" })),
		)
		.await;
		assert_eq!(status, StatusCode::NOT_FOUND);

		let (status, body) = send(&app, "GET", "/orders/not-a-uuid", None).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "INVALID_ORDER_ID");
	}

	#[tokio::test]
	async fn test_invalid_bodies_are_bad_requests() {
		let app = app().await;

		let request = Request::builder()
			.method("POST")
			.uri("/orders")
			.header("content-type", "application/json")
			.body(Body::from("{not json"))
			.unwrap();
		let response = app.clone().oneshot(request).await.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);

		let (status, body) = send(
			&app,
			"POST",
			"/orders",
			Some(json!({
				"resellerId": Uuid::new_v4(),
				"customerId": Uuid::new_v4(),
				"items": [],
			})),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "INVALID_ARGUMENT");

		let (status, _) = send(
			&app,
			"POST",
			"/orders",
			Some(json!({
				"resellerId": Uuid::new_v4(),
				"customerId": Uuid::new_v4(),
				"items": [{ "productId": Uuid::new_v4(), "quantity": 1 }],
			})),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn test_profit_by_month() {
		let app = app().await;
		create(&app, 10).await;
		create(&app, 5).await;

		let (status, body) = send(&app, "GET", "/orders/profit-by-month", None).await;
		assert_eq!(status, StatusCode::OK);
		let months = body.as_array().unwrap();
		assert_eq!(months.len(), 1);
		let profit: rust_decimal::Decimal = months[0]["totalProfit"].as_str().unwrap().parse().unwrap();
		assert_eq!(profit, "1.5".parse().unwrap());
	}
}
