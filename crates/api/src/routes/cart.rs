//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use cart::{CartDataService, CartLineItem, CartState};
use common::CartItemId;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

// -- Response types --

#[derive(Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub total_quantity: u32,
    pub total_price: String,
    pub total_price_paise: i64,
}

#[derive(Serialize)]
pub struct CartItemResponse {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub product_image: Option<String>,
    pub category: Option<String>,
    pub quantity: u32,
    pub unit_price: Option<String>,
    pub line_total: String,
}

impl From<&CartLineItem> for CartItemResponse {
    fn from(item: &CartLineItem) -> Self {
        Self {
            id: item.id.to_string(),
            product_id: item.product_ref.to_string(),
            product_name: item.product_name.clone(),
            product_image: item.product_image.clone(),
            category: item.category.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.map(|price| price.to_string()),
            line_total: item.line_total().to_string(),
        }
    }
}

impl From<CartState> for CartResponse {
    fn from(state: CartState) -> Self {
        let totals = state.totals();
        Self {
            items: state.items().iter().map(CartItemResponse::from).collect(),
            total_quantity: totals.total_quantity,
            total_price: totals.total_price.to_string(),
            total_price_paise: totals.total_price.paise(),
        }
    }
}

// -- Handlers --

/// GET /cart: Reload the cart from the cart service.
#[tracing::instrument(skip(state))]
pub async fn view<S: CartDataService + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.cart.load().await?;
    Ok(Json(cart.into()))
}

/// POST /cart/items/{id}/increase
#[tracing::instrument(skip(state))]
pub async fn increase<S: CartDataService + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.cart.increase_quantity(&CartItemId::new(id)).await?;
    Ok(Json(cart.into()))
}

/// POST /cart/items/{id}/decrease: No-op at quantity one.
#[tracing::instrument(skip(state))]
pub async fn decrease<S: CartDataService + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.cart.decrease_quantity(&CartItemId::new(id)).await?;
    Ok(Json(cart.into()))
}

/// DELETE /cart/items/{id}
#[tracing::instrument(skip(state))]
pub async fn remove<S: CartDataService + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.cart.remove(&CartItemId::new(id)).await?;
    Ok(Json(cart.into()))
}
