//! Cart Data Service contract.

use async_trait::async_trait;
use common::CartItemId;
use thiserror::Error;

use crate::error::CartError;
use crate::item::CartLineItem;

/// Transport-level failure talking to a cart service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request could not be sent or no response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success HTTP status.
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// A reply from the cart service: a success flag, an optional message, and a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReply<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: T,
}

impl<T> ServiceReply<T> {
    /// A successful reply carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    /// A reply where the service declined the request.
    pub fn rejected(message: impl Into<String>, data: T) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data,
        }
    }

    /// Converts the reply into the payload, or a fetch error if the service did not signal success.
    pub fn into_result(self, operation: &'static str) -> Result<T, CartError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(CartError::fetch(
                operation,
                self.message
                    .unwrap_or_else(|| "service did not report success".to_string()),
            ))
        }
    }
}

/// Remote cart storage for the current shopper.
///
/// Session credentials travel with the implementation (e.g. a cookie on the
/// HTTP client); callers never pass them.
#[async_trait]
pub trait CartDataService: Send + Sync {
    /// Lists every line item in the cart.
    async fn list(&self) -> Result<ServiceReply<Vec<CartLineItem>>, ServiceError>;

    /// Sets the quantity of a line item.
    async fn set_quantity(
        &self,
        item_id: &CartItemId,
        quantity: u32,
    ) -> Result<ServiceReply<()>, ServiceError>;

    /// Deletes a line item.
    async fn remove(&self, item_id: &CartItemId) -> Result<ServiceReply<()>, ServiceError>;
}

#[async_trait]
impl<T: CartDataService + ?Sized> CartDataService for std::sync::Arc<T> {
    async fn list(&self) -> Result<ServiceReply<Vec<CartLineItem>>, ServiceError> {
        (**self).list().await
    }

    async fn set_quantity(
        &self,
        item_id: &CartItemId,
        quantity: u32,
    ) -> Result<ServiceReply<()>, ServiceError> {
        (**self).set_quantity(item_id, quantity).await
    }

    async fn remove(&self, item_id: &CartItemId) -> Result<ServiceReply<()>, ServiceError> {
        (**self).remove(item_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_reply_yields_data() {
        let reply = ServiceReply::ok(7);
        assert_eq!(reply.into_result("list").unwrap(), 7);
    }

    #[test]
    fn test_rejected_reply_becomes_fetch_error() {
        let reply = ServiceReply::rejected("token expired", ());
        let err = reply.into_result("set_quantity").unwrap_err();
        assert!(err.is_fetch());
        assert_eq!(err.to_string(), "Cart service set_quantity failed: token expired");
    }

    #[test]
    fn test_rejected_reply_without_message() {
        let reply = ServiceReply {
            success: false,
            message: None,
            data: (),
        };
        let err = reply.into_result("remove").unwrap_err();
        assert!(err.to_string().contains("did not report success"));
    }
}
