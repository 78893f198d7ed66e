//! In-memory cart service for tests and local runs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use common::CartItemId;

use crate::item::CartLineItem;
use crate::service::{CartDataService, ServiceError, ServiceReply};

#[derive(Debug, Default)]
struct InMemoryCartState {
    items: Vec<CartLineItem>,
    reject_list: bool,
    reject_writes: bool,
    unavailable: bool,
    list_calls: usize,
    write_calls: usize,
}

/// In-memory cart service with failure injection.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartDataService {
    state: Arc<Mutex<InMemoryCartState>>,
}

impl InMemoryCartDataService {
    /// Creates an empty in-memory cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory cart holding `items`.
    pub fn with_items(items: Vec<CartLineItem>) -> Self {
        let service = Self::default();
        service.lock().items = items;
        service
    }

    /// Answers `list` with `success: false`.
    pub fn set_reject_list(&self, reject: bool) {
        self.lock().reject_list = reject;
    }

    /// Answers `set_quantity` and `remove` with `success: false`.
    pub fn set_reject_writes(&self, reject: bool) {
        self.lock().reject_writes = reject;
    }

    /// Fails every call at the transport level.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Returns the stored quantity of a line item.
    pub fn quantity_of(&self, item_id: &CartItemId) -> Option<u32> {
        self.lock()
            .items
            .iter()
            .find(|item| &item.id == item_id)
            .map(|item| item.quantity)
    }

    /// Returns the number of stored line items.
    pub fn item_count(&self) -> usize {
        self.lock().items.len()
    }

    /// Returns how many times `list` was called.
    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    /// Returns how many writes (`set_quantity` / `remove`) were attempted.
    pub fn write_calls(&self) -> usize {
        self.lock().write_calls
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryCartState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CartDataService for InMemoryCartDataService {
    async fn list(&self) -> Result<ServiceReply<Vec<CartLineItem>>, ServiceError> {
        let mut state = self.lock();
        state.list_calls += 1;

        if state.unavailable {
            return Err(ServiceError::Transport("cart service unavailable".to_string()));
        }
        if state.reject_list {
            return Ok(ServiceReply::rejected("Unable to load cart", Vec::new()));
        }

        Ok(ServiceReply::ok(state.items.clone()))
    }

    async fn set_quantity(
        &self,
        item_id: &CartItemId,
        quantity: u32,
    ) -> Result<ServiceReply<()>, ServiceError> {
        let mut state = self.lock();
        state.write_calls += 1;

        if state.unavailable {
            return Err(ServiceError::Transport("cart service unavailable".to_string()));
        }
        if state.reject_writes {
            return Ok(ServiceReply::rejected("Update rejected", ()));
        }

        match state.items.iter_mut().find(|item| &item.id == item_id) {
            Some(item) => {
                item.quantity = quantity;
                Ok(ServiceReply::ok(()))
            }
            None => Ok(ServiceReply::rejected("Cart item not found", ())),
        }
    }

    async fn remove(&self, item_id: &CartItemId) -> Result<ServiceReply<()>, ServiceError> {
        let mut state = self.lock();
        state.write_calls += 1;

        if state.unavailable {
            return Err(ServiceError::Transport("cart service unavailable".to_string()));
        }
        if state.reject_writes {
            return Ok(ServiceReply::rejected("Delete rejected", ()));
        }

        let before = state.items.len();
        state.items.retain(|item| &item.id != item_id);
        if state.items.len() == before {
            return Ok(ServiceReply::rejected("Cart item not found", ()));
        }

        Ok(ServiceReply::ok(()))
    }
}
