//! Checkout events.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::address::Address;
use crate::card::CardDetails;
use crate::confirmation::OrderConfirmation;
use crate::method::PaymentMethod;
use crate::payment::PaymentReceipt;
use crate::state::{CheckoutPhase, Quote};

/// Events recorded during a checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum CheckoutEvent {
    /// A checkout attempt opened for the current cart.
    CheckoutStarted { quote: Quote },

    PaymentMethodChosen { method: PaymentMethod },

    /// A valid address was entered for an online payment.
    AddressConfirmed { address: Address },

    CardAccepted { card: CardDetails },

    /// The PIN was accepted and the payment handed to the processor.
    PaymentStarted { started_at: DateTime<Utc> },

    /// The processor approved the payment. The phase changes on `OrderConfirmed`.
    PaymentCompleted { receipt: PaymentReceipt },

    OrderConfirmed { confirmation: OrderConfirmation },

    /// The shopper abandoned the attempt.
    CheckoutCancelled { from: CheckoutPhase },

    /// The confirmation was closed.
    ConfirmationDismissed,
}

impl CheckoutEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            CheckoutEvent::CheckoutStarted { .. } => "CheckoutStarted",
            CheckoutEvent::PaymentMethodChosen { .. } => "PaymentMethodChosen",
            CheckoutEvent::AddressConfirmed { .. } => "AddressConfirmed",
            CheckoutEvent::CardAccepted { .. } => "CardAccepted",
            CheckoutEvent::PaymentStarted { .. } => "PaymentStarted",
            CheckoutEvent::PaymentCompleted { .. } => "PaymentCompleted",
            CheckoutEvent::OrderConfirmed { .. } => "OrderConfirmed",
            CheckoutEvent::CheckoutCancelled { .. } => "CheckoutCancelled",
            CheckoutEvent::ConfirmationDismissed => "ConfirmationDismissed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let event = CheckoutEvent::PaymentMethodChosen {
            method: PaymentMethod::Online,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({ "type": "PaymentMethodChosen", "data": { "method": "online" } })
        );
        assert_eq!(event.event_type(), "PaymentMethodChosen");
    }

    #[test]
    fn test_cancelled_records_origin_phase() {
        let event = CheckoutEvent::CheckoutCancelled {
            from: CheckoutPhase::EnteringCard,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["data"]["from"], "EnteringCard");
    }
}
