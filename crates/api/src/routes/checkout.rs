//! Checkout endpoints.
//!
//! Every endpoint answers with the checkout state after the command, so the
//! client can render whichever step is active.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use cart::CartDataService;
use checkout::{AddressForm, CardForm, CheckoutState, OrderConfirmation, PaymentMethod};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct ChooseMethodRequest {
    pub method: PaymentMethod,
}

#[derive(Deserialize)]
pub struct PinRequest {
    pub pin: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub phase: &'static str,
    pub cod_available: Option<bool>,
    pub total: Option<String>,
    pub session: CheckoutState,
    pub confirmation: Option<ConfirmationResponse>,
}

#[derive(Serialize)]
pub struct ConfirmationResponse {
    pub headline: &'static str,
    pub order_id: String,
    pub method: PaymentMethod,
    pub total: String,
    pub delivery_estimate: String,
    pub payment_reference: Option<String>,
}

impl From<&OrderConfirmation> for ConfirmationResponse {
    fn from(confirmation: &OrderConfirmation) -> Self {
        Self {
            headline: confirmation.headline(),
            order_id: confirmation.order_id.to_string(),
            method: confirmation.method,
            total: confirmation.total_label(),
            delivery_estimate: confirmation.delivery_estimate(),
            payment_reference: confirmation.payment_reference.clone(),
        }
    }
}

impl From<CheckoutState> for CheckoutResponse {
    fn from(state: CheckoutState) -> Self {
        Self {
            phase: state.phase().as_str(),
            cod_available: state.is_cod_available(),
            total: state.quote().map(|quote| quote.total.to_string()),
            confirmation: state.confirmation().map(ConfirmationResponse::from),
            session: state,
        }
    }
}

// -- Handlers --

/// GET /checkout
pub async fn view<S: CartDataService + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<CheckoutResponse> {
    Json(state.checkout.state().await.into())
}

/// POST /checkout/initiate: Refresh the cart, then open a checkout for it.
#[tracing::instrument(skip(state))]
pub async fn initiate<S: CartDataService + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let cart = state.cart.load().await?;
    let checkout = state.checkout.initiate(&cart).await?;
    Ok(Json(checkout.into()))
}

/// POST /checkout/method
#[tracing::instrument(skip(state))]
pub async fn choose_method<S: CartDataService + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<ChooseMethodRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let checkout = state.checkout.choose_method(req.method).await?;
    Ok(Json(checkout.into()))
}

/// POST /checkout/address
#[tracing::instrument(skip_all)]
pub async fn submit_address<S: CartDataService + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(form): Json<AddressForm>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let checkout = state.checkout.submit_address(&form).await?;
    Ok(Json(checkout.into()))
}

/// POST /checkout/card
#[tracing::instrument(skip_all)]
pub async fn submit_card<S: CartDataService + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(form): Json<CardForm>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let checkout = state.checkout.submit_card(&form).await?;
    Ok(Json(checkout.into()))
}

/// POST /checkout/pin: Accepted; the payment finishes in the background.
///
/// Poll `GET /checkout` for the confirmation.
#[tracing::instrument(skip_all)]
pub async fn submit_pin<S: CartDataService + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<PinRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    // The payment task is detached; its outcome lands in the checkout state.
    let _payment = state.checkout.submit_pin(&req.pin).await?;
    let checkout = state.checkout.state().await;
    Ok((StatusCode::ACCEPTED, Json(checkout.into())))
}

/// POST /checkout/cancel
#[tracing::instrument(skip(state))]
pub async fn cancel<S: CartDataService + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let checkout = state.checkout.cancel().await?;
    Ok(Json(checkout.into()))
}

/// POST /checkout/dismiss
#[tracing::instrument(skip(state))]
pub async fn dismiss<S: CartDataService + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let checkout = state.checkout.dismiss().await?;
    Ok(Json(checkout.into()))
}
