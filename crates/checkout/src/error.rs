//! Checkout error types.

use cart::Money;
use thiserror::Error;

use crate::state::CheckoutPhase;
use crate::validation::ValidationError;

/// Errors surfaced by the checkout flow.
///
/// None of them are fatal: a rejected command leaves the checkout state as it was.
#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    /// Checkout was started with nothing payable in the cart.
    #[error("Your cart is empty!")]
    EmptyCart,

    /// Cash on Delivery was chosen for an order above the COD limit.
    #[error(
        "Your order is more than ₹{}, so Cash on Delivery is not available. Please pay online.",
        .limit.rupees()
    )]
    CodUnavailable { total: Money, limit: Money },

    /// Form input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The command is not valid in the current phase.
    #[error("Cannot {action} while checkout is {phase}")]
    InvalidTransition {
        phase: CheckoutPhase,
        action: &'static str,
    },

    /// A checkout attempt is already under way.
    #[error("A checkout is already in progress ({phase})")]
    SessionInProgress { phase: CheckoutPhase },

    /// The background payment task did not finish.
    #[error("Payment task failed: {0}")]
    PaymentTask(String),
}

impl CheckoutError {
    /// Metric label for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CheckoutError::EmptyCart => "empty_cart",
            CheckoutError::CodUnavailable { .. } => "cod_unavailable",
            CheckoutError::Validation(_) => "validation",
            CheckoutError::InvalidTransition { .. } => "invalid_transition",
            CheckoutError::SessionInProgress { .. } => "session_in_progress",
            CheckoutError::PaymentTask(_) => "payment_task",
        }
    }
}
