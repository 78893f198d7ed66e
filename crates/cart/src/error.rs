//! Cart error types.

use common::CartItemId;
use thiserror::Error;

/// Errors that can occur during cart operations.
///
/// None of these are fatal: the cart keeps its last good state and the
/// caller surfaces the message inline.
#[derive(Debug, Error)]
pub enum CartError {
    /// A cart service call failed or did not signal success.
    #[error("Cart service {operation} failed: {reason}")]
    Fetch {
        operation: &'static str,
        reason: String,
    },

    /// The line item is not in the cart.
    #[error("Item not found in cart: {item_id}")]
    ItemNotFound { item_id: CartItemId },
}

impl CartError {
    pub(crate) fn fetch(operation: &'static str, reason: impl Into<String>) -> Self {
        CartError::Fetch {
            operation,
            reason: reason.into(),
        }
    }

    /// Returns true for service failures (as opposed to caller mistakes).
    pub fn is_fetch(&self) -> bool {
        matches!(self, CartError::Fetch { .. })
    }
}
