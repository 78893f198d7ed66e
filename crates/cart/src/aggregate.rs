//! Cart aggregate.

use common::CartItemId;
use tokio::sync::{Mutex, RwLock, mpsc};

use crate::error::CartError;
use crate::item::{CartLineItem, CartState, CartTotals};
use crate::notify::CartNotification;
use crate::service::CartDataService;

/// The shopper's cart as seen by the checkout.
///
/// Owns the last fetched `CartState`. Every mutation goes to the cart
/// service first and is followed by a full reload; nothing is updated
/// optimistically. Loads and mutations are serialized by an in-flight lock,
/// so the quantity sent to the service is always read from the state left
/// behind by the previous mutation, and a slow reload can never overwrite a
/// newer one.
pub struct Cart<S: CartDataService> {
    service: S,
    state: RwLock<CartState>,
    in_flight: Mutex<()>,
    listener: Option<mpsc::UnboundedSender<CartNotification>>,
}

impl<S: CartDataService> Cart<S> {
    /// Creates an empty cart backed by `service`. Call [`Cart::load`] to populate it.
    pub fn new(service: S) -> Self {
        Self {
            service,
            state: RwLock::new(CartState::default()),
            in_flight: Mutex::new(()),
            listener: None,
        }
    }

    /// Registers a listener that is told about removals (e.g. a cart-count badge).
    pub fn with_listener(mut self, listener: mpsc::UnboundedSender<CartNotification>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Returns the underlying cart service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Returns a copy of the current cart state.
    pub async fn snapshot(&self) -> CartState {
        self.state.read().await.clone()
    }

    /// Returns the totals of the current cart state.
    pub async fn totals(&self) -> CartTotals {
        self.state.read().await.totals()
    }

    /// Fetches every line item and replaces the cart state.
    ///
    /// Waits for any in-flight mutation first. On failure the previous state is kept.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self) -> Result<CartState, CartError> {
        let _guard = self.in_flight.lock().await;
        self.reload().await
    }

    /// Replaces the state with a fresh listing. Callers hold `in_flight`.
    async fn reload(&self) -> Result<CartState, CartError> {
        let items = self.fetch_items().await?;
        let mut state = self.state.write().await;
        *state = CartState::new(items);

        tracing::debug!(lines = state.len(), "cart loaded");
        Ok(state.clone())
    }

    /// Increments the quantity of a line item by one, then reloads.
    #[tracing::instrument(skip(self))]
    pub async fn increase_quantity(&self, item_id: &CartItemId) -> Result<CartState, CartError> {
        let _guard = self.in_flight.lock().await;
        let current = self.quantity_of(item_id).await?;

        self.send_quantity(item_id, current.saturating_add(1)).await?;
        metrics::counter!("cart_mutations_total", "operation" => "increase").increment(1);
        self.reload().await
    }

    /// Decrements the quantity of a line item by one, then reloads.
    ///
    /// Quantity never drops below one: at one this is a no-op and no service call is made.
    #[tracing::instrument(skip(self))]
    pub async fn decrease_quantity(&self, item_id: &CartItemId) -> Result<CartState, CartError> {
        let _guard = self.in_flight.lock().await;
        let current = self.quantity_of(item_id).await?;

        if current <= 1 {
            tracing::debug!(%item_id, "quantity already at minimum");
            return Ok(self.snapshot().await);
        }

        self.send_quantity(item_id, current - 1).await?;
        metrics::counter!("cart_mutations_total", "operation" => "decrease").increment(1);
        self.reload().await
    }

    /// Deletes a line item, notifies the listener, then reloads.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, item_id: &CartItemId) -> Result<CartState, CartError> {
        let _guard = self.in_flight.lock().await;

        self.service
            .remove(item_id)
            .await
            .map_err(|e| CartError::fetch("remove", e.to_string()))
            .and_then(|reply| reply.into_result("remove"))
            .inspect_err(|e| record_failure(e))?;

        metrics::counter!("cart_mutations_total", "operation" => "remove").increment(1);
        self.notify(CartNotification::ItemRemoved {
            item_id: item_id.clone(),
        });

        self.reload().await
    }

    async fn fetch_items(&self) -> Result<Vec<CartLineItem>, CartError> {
        self.service
            .list()
            .await
            .map_err(|e| CartError::fetch("list", e.to_string()))
            .and_then(|reply| reply.into_result("list"))
            .inspect_err(|e| record_failure(e))
    }

    async fn send_quantity(&self, item_id: &CartItemId, quantity: u32) -> Result<(), CartError> {
        self.service
            .set_quantity(item_id, quantity)
            .await
            .map_err(|e| CartError::fetch("set_quantity", e.to_string()))
            .and_then(|reply| reply.into_result("set_quantity"))
            .inspect_err(|e| record_failure(e))
    }

    async fn quantity_of(&self, item_id: &CartItemId) -> Result<u32, CartError> {
        self.state
            .read()
            .await
            .get(item_id)
            .map(|item| item.quantity)
            .ok_or_else(|| CartError::ItemNotFound {
                item_id: item_id.clone(),
            })
    }

    fn notify(&self, notification: CartNotification) {
        if let Some(listener) = &self.listener
            && listener.send(notification).is_err()
        {
            tracing::debug!("cart listener dropped, notification discarded");
        }
    }
}

fn record_failure(err: &CartError) {
    metrics::counter!("cart_fetch_failures_total").increment(1);
    tracing::warn!(error = %err, "cart service call failed");
}
