//! HTTP API server for the storefront cart and checkout.
//!
//! Serves one shopper's cart and checkout session per process, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use cart::{CartDataService, CartLineItem, CartNotification, InMemoryCartDataService, Money};
use checkout::CheckoutSettings;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: CartDataService + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::system::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::system::health::<S>))
        .route("/cart", get(routes::cart::view::<S>))
        .route("/cart/items/{id}/increase", post(routes::cart::increase::<S>))
        .route("/cart/items/{id}/decrease", post(routes::cart::decrease::<S>))
        .route("/cart/items/{id}", delete(routes::cart::remove::<S>))
        .route("/checkout", get(routes::checkout::view::<S>))
        .route("/checkout/initiate", post(routes::checkout::initiate::<S>))
        .route("/checkout/method", post(routes::checkout::choose_method::<S>))
        .route("/checkout/address", post(routes::checkout::submit_address::<S>))
        .route("/checkout/card", post(routes::checkout::submit_card::<S>))
        .route("/checkout/pin", post(routes::checkout::submit_pin::<S>))
        .route("/checkout/cancel", post(routes::checkout::cancel::<S>))
        .route("/checkout/dismiss", post(routes::checkout::dismiss::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over `service`.
///
/// Cart notifications are drained by a background task that logs them.
pub fn create_default_state<S: CartDataService + 'static>(
    service: S,
    settings: CheckoutSettings,
) -> Arc<AppState<S>> {
    let (state, notifications) = AppState::new(service, settings);
    tokio::spawn(log_notifications(notifications));
    Arc::new(state)
}

async fn log_notifications(mut notifications: mpsc::UnboundedReceiver<CartNotification>) {
    while let Some(notification) = notifications.recv().await {
        match notification {
            CartNotification::ItemRemoved { item_id } => {
                tracing::info!(%item_id, "cart item removed, badge count refresh");
            }
        }
    }
}

/// A small cart used when no cart service is configured.
pub fn demo_cart_service() -> InMemoryCartDataService {
    InMemoryCartDataService::with_items(vec![
        CartLineItem::new("cart-1", "prod-101", "boAt Rockerz 450", 1, Money::from_rupees(1499))
            .with_category("headphones"),
        CartLineItem::new("cart-2", "prod-102", "Mi Power Bank 20000mAh", 2, Money::from_rupees(1299))
            .with_category("accessories"),
    ])
}
