//! Integration tests for the checkout machine.
//!
//! These drive complete checkout attempts end to end with a short simulated
//! payment delay and a fixed clock.

use std::time::Duration;

use cart::{CartLineItem, CartState, Money};
use checkout::{
    AddressForm, CardForm, CheckoutError, CheckoutMachine, CheckoutPhase, CheckoutSettings,
    CheckoutState, FixedClock, PaymentMethod, SimulatedPaymentProcessor, ValidationError,
};
use chrono::{NaiveDate, TimeZone, Utc};

fn machine() -> CheckoutMachine<SimulatedPaymentProcessor> {
    let clock = FixedClock(Utc.with_ymd_and_hms(2026, 10, 16, 10, 0, 0).unwrap());
    CheckoutMachine::new(
        SimulatedPaymentProcessor::new(Duration::from_millis(20)),
        CheckoutSettings::default(),
    )
    .with_clock(clock)
}

fn cart_totalling(rupees: i64) -> CartState {
    CartState::new(vec![
        CartLineItem::new("line-1", "prod-1", "Cotton Bedsheet", 1, Money::from_rupees(rupees - 500)),
        CartLineItem::new("line-2", "prod-2", "Steel Bottle", 1, Money::from_rupees(500)),
    ])
}

fn address_form(phone: &str, pincode: &str) -> AddressForm {
    AddressForm {
        name: "Kavya Iyer".to_string(),
        phone: phone.to_string(),
        house_number: "Flat 9, Lake View".to_string(),
        city: "Bangalore".to_string(),
        pincode: pincode.to_string(),
    }
}

fn card_form(expiry: &str) -> CardForm {
    CardForm {
        number: "1234 5678 9012 3456".to_string(),
        expiry: expiry.to_string(),
        cvv: "123".to_string(),
    }
}

mod cash_on_delivery {
    use super::*;

    #[tokio::test]
    async fn limit_is_inclusive() {
        let machine = machine();
        machine.initiate(&cart_totalling(5000)).await.unwrap();
        assert_eq!(machine.is_cod_available().await, Some(true));
        machine
            .choose_method(PaymentMethod::CashOnDelivery)
            .await
            .unwrap();

        let machine = super::machine();
        machine.initiate(&cart_totalling(5001)).await.unwrap();
        assert_eq!(machine.is_cod_available().await, Some(false));
        let result = machine.choose_method(PaymentMethod::CashOnDelivery).await;
        assert!(matches!(result, Err(CheckoutError::CodUnavailable { .. })));
        assert_eq!(machine.phase().await, CheckoutPhase::ChoosingMethod);
    }

    #[tokio::test]
    async fn confirms_directly_after_address() {
        let machine = machine();
        machine.initiate(&cart_totalling(2000)).await.unwrap();
        machine
            .choose_method(PaymentMethod::CashOnDelivery)
            .await
            .unwrap();

        let state = machine
            .submit_address(&address_form("1234567890", "560001"))
            .await
            .unwrap();

        let confirmation = state.confirmation().unwrap();
        assert_eq!(confirmation.headline(), "Order Confirmed (Cash on Delivery)");
        assert_eq!(confirmation.total, Money::from_rupees(2000));
        assert!(confirmation.order_id.as_str().starts_with("ORD"));
        assert_eq!(confirmation.payment_reference, None);
        assert_eq!(machine.payment().processed_count(), 0);

        let events: Vec<_> = machine
            .history()
            .await
            .iter()
            .map(|e| e.event_type())
            .collect();
        assert_eq!(
            events,
            vec!["CheckoutStarted", "PaymentMethodChosen", "OrderConfirmed"]
        );
    }
}

mod online {
    use super::*;

    #[tokio::test]
    async fn full_flow_reaches_confirmed_after_processing() {
        let machine = machine();
        let mut phases = machine.subscribe();

        machine.initiate(&cart_totalling(2000)).await.unwrap();
        machine.choose_method(PaymentMethod::Online).await.unwrap();

        let state = machine
            .submit_address(&address_form("1234567890", "560001"))
            .await
            .unwrap();
        assert_eq!(state.phase(), CheckoutPhase::EnteringCard);

        let state = machine.submit_card(&card_form("12/25")).await.unwrap();
        assert_eq!(state.phase(), CheckoutPhase::EnteringPin);
        assert_eq!(state.card().unwrap().masked(), "**** **** **** 3456");

        let handle = machine.submit_pin("123456").await.unwrap();

        let confirmation = handle.wait().await.unwrap();
        assert_eq!(confirmation.method, PaymentMethod::Online);
        assert_eq!(confirmation.headline(), "Payment Successful");
        assert_eq!(confirmation.total_label(), "₹2,000.00 (Prepaid)");
        assert_eq!(confirmation.payment_reference.as_deref(), Some("PAY-0001"));
        assert_eq!(
            confirmation.delivery_date,
            NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()
        );
        assert_eq!(confirmation.delivery_estimate(), "21 October 2026");

        assert_eq!(machine.phase().await, CheckoutPhase::Confirmed);
        phases
            .wait_for(|phase| *phase == CheckoutPhase::Confirmed)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn wait_for_confirmation_without_the_handle() {
        let machine = machine();
        machine.initiate(&cart_totalling(3000)).await.unwrap();
        machine.choose_method(PaymentMethod::Online).await.unwrap();
        machine
            .submit_address(&address_form("9876543210", "110001"))
            .await
            .unwrap();
        machine.submit_card(&card_form("01/30")).await.unwrap();

        drop(machine.submit_pin("654321").await.unwrap());

        let confirmation = machine.wait_for_confirmation().await.unwrap();
        assert_eq!(confirmation.total, Money::from_rupees(3000));
        assert_eq!(machine.history().await.len(), 7);
    }

    #[tokio::test]
    async fn processing_cannot_be_cancelled_or_restarted() {
        let machine = CheckoutMachine::new(
            SimulatedPaymentProcessor::new(Duration::from_millis(200)),
            CheckoutSettings::default(),
        );
        machine.initiate(&cart_totalling(1500)).await.unwrap();
        machine.choose_method(PaymentMethod::Online).await.unwrap();
        machine
            .submit_address(&address_form("9876543210", "411001"))
            .await
            .unwrap();
        machine.submit_card(&card_form("12/25")).await.unwrap();
        let handle = machine.submit_pin("123456").await.unwrap();

        assert!(matches!(
            machine.cancel().await,
            Err(CheckoutError::InvalidTransition {
                phase: CheckoutPhase::Processing,
                ..
            })
        ));
        assert!(matches!(
            machine.initiate(&cart_totalling(1500)).await,
            Err(CheckoutError::SessionInProgress {
                phase: CheckoutPhase::Processing
            })
        ));

        handle.wait().await.unwrap();
        assert_eq!(machine.phase().await, CheckoutPhase::Confirmed);
    }
}

mod validation {
    use super::*;

    #[tokio::test]
    async fn bad_address_keeps_state_and_reports_phone() {
        let machine = machine();
        machine.initiate(&cart_totalling(2000)).await.unwrap();
        machine.choose_method(PaymentMethod::Online).await.unwrap();

        let err = machine
            .submit_address(&address_form("12345", "123456"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Validation(ValidationError::InvalidPhone)
        ));
        assert_eq!(err.to_string(), "Please enter a valid 10-digit mobile number");
        assert_eq!(machine.phase().await, CheckoutPhase::EnteringAddress);
    }

    #[tokio::test]
    async fn bad_expiry_month_keeps_state() {
        let machine = machine();
        machine.initiate(&cart_totalling(2000)).await.unwrap();
        machine.choose_method(PaymentMethod::Online).await.unwrap();
        machine
            .submit_address(&address_form("1234567890", "560001"))
            .await
            .unwrap();

        let err = machine.submit_card(&card_form("13/25")).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Validation(ValidationError::InvalidExpiryMonth)
        ));
        assert_eq!(machine.phase().await, CheckoutPhase::EnteringCard);
    }

    #[tokio::test]
    async fn bad_pin_does_not_start_payment() {
        let machine = machine();
        machine.initiate(&cart_totalling(2000)).await.unwrap();
        machine.choose_method(PaymentMethod::Online).await.unwrap();
        machine
            .submit_address(&address_form("1234567890", "560001"))
            .await
            .unwrap();
        machine.submit_card(&card_form("12/25")).await.unwrap();

        let result = machine.submit_pin("12 34").await;
        assert!(matches!(
            result,
            Err(CheckoutError::Validation(ValidationError::InvalidPin))
        ));
        assert_eq!(machine.phase().await, CheckoutPhase::EnteringPin);
        assert_eq!(machine.payment().processed_count(), 0);
    }
}

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn empty_cart_cannot_start_checkout() {
        let machine = machine();
        let err = machine.initiate(&CartState::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Your cart is empty!");
        assert_eq!(machine.state().await, CheckoutState::Idle);
    }

    #[tokio::test]
    async fn cancel_from_card_entry_discards_session() {
        let machine = machine();
        machine.initiate(&cart_totalling(2000)).await.unwrap();
        machine.choose_method(PaymentMethod::Online).await.unwrap();
        machine
            .submit_address(&address_form("1234567890", "560001"))
            .await
            .unwrap();

        let state = machine.cancel().await.unwrap();
        assert_eq!(state, CheckoutState::Idle);

        let state = machine.initiate(&cart_totalling(2000)).await.unwrap();
        assert_eq!(state.phase(), CheckoutPhase::ChoosingMethod);
        assert!(state.method().is_none());
        assert!(state.address().is_none());
        assert!(state.card().is_none());
    }

    #[tokio::test]
    async fn second_initiate_is_rejected_while_in_progress() {
        let machine = machine();
        machine.initiate(&cart_totalling(2000)).await.unwrap();
        machine.choose_method(PaymentMethod::Online).await.unwrap();

        let result = machine.initiate(&cart_totalling(2000)).await;
        assert!(matches!(
            result,
            Err(CheckoutError::SessionInProgress {
                phase: CheckoutPhase::EnteringAddress
            })
        ));
    }

    #[tokio::test]
    async fn confirmed_can_be_dismissed_or_restarted() {
        let machine = machine();
        machine.initiate(&cart_totalling(1000)).await.unwrap();
        machine
            .choose_method(PaymentMethod::CashOnDelivery)
            .await
            .unwrap();
        machine
            .submit_address(&address_form("1234567890", "560001"))
            .await
            .unwrap();

        let state = machine.initiate(&cart_totalling(1000)).await.unwrap();
        assert_eq!(state.phase(), CheckoutPhase::ChoosingMethod);

        machine.cancel().await.unwrap();
        assert!(matches!(
            machine.dismiss().await,
            Err(CheckoutError::InvalidTransition { .. })
        ));
    }
}
