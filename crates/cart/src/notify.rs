//! Notifications emitted by the cart for external listeners.

use common::CartItemId;
use serde::Serialize;

/// Fire-and-forget notification sent to a listener registered on the cart.
///
/// The storefront header uses `ItemRemoved` to refresh its cart-count badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum CartNotification {
    /// A line item was deleted from the cart service.
    ItemRemoved { item_id: CartItemId },
}
