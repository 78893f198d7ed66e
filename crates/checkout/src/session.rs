//! Checkout session aggregate.

use cart::CartState;
use chrono::{DateTime, Utc};

use crate::address::AddressForm;
use crate::card::CardForm;
use crate::confirmation::{OrderConfirmation, OrderStamp};
use crate::error::CheckoutError;
use crate::events::CheckoutEvent;
use crate::method::PaymentMethod;
use crate::payment::{PaymentReceipt, PaymentRequest};
use crate::settings::CheckoutSettings;
use crate::state::{CheckoutPhase, CheckoutState, Quote};
use crate::validation::{validate_address, validate_card, validate_pin};

/// A shopper's checkout session.
///
/// Command methods check the current state and return the events to record;
/// they never mutate. [`CheckoutSession::apply`] folds an event into the state.
#[derive(Debug, Clone, Default)]
pub struct CheckoutSession {
    state: CheckoutState,
    settings: CheckoutSettings,
}

impl CheckoutSession {
    pub fn new(settings: CheckoutSettings) -> Self {
        Self {
            state: CheckoutState::Idle,
            settings,
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.state.phase()
    }

    pub fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }

    /// Folds an event into the session state.
    ///
    /// Events that do not fit the current state are ignored.
    pub fn apply(&mut self, event: CheckoutEvent) {
        let current = std::mem::take(&mut self.state);
        self.state = match (current, event) {
            (_, CheckoutEvent::CheckoutStarted { quote }) => {
                CheckoutState::ChoosingMethod { quote }
            }
            (CheckoutState::ChoosingMethod { quote }, CheckoutEvent::PaymentMethodChosen { method }) => {
                CheckoutState::EnteringAddress { quote, method }
            }
            (CheckoutState::EnteringAddress { quote, .. }, CheckoutEvent::AddressConfirmed { address }) => {
                CheckoutState::EnteringCard { quote, address }
            }
            (CheckoutState::EnteringCard { quote, address }, CheckoutEvent::CardAccepted { card }) => {
                CheckoutState::EnteringPin {
                    quote,
                    address,
                    card,
                }
            }
            (
                CheckoutState::EnteringPin {
                    quote,
                    address,
                    card,
                },
                CheckoutEvent::PaymentStarted { started_at },
            ) => CheckoutState::Processing {
                quote,
                address,
                card,
                started_at,
            },
            (state @ CheckoutState::Processing { .. }, CheckoutEvent::PaymentCompleted { .. }) => {
                // Phase changes on OrderConfirmed
                state
            }
            (_, CheckoutEvent::OrderConfirmed { confirmation }) => {
                CheckoutState::Confirmed { confirmation }
            }
            (_, CheckoutEvent::CheckoutCancelled { .. } | CheckoutEvent::ConfirmationDismissed) => {
                CheckoutState::Idle
            }
            (state, event) => {
                tracing::warn!(
                    phase = %state.phase(),
                    event_type = event.event_type(),
                    "event does not fit checkout state, ignored"
                );
                state
            }
        };
    }
}

// Command methods (return events)
impl CheckoutSession {
    /// Opens a checkout attempt for the cart.
    pub fn start(&self, cart: &CartState) -> Result<Vec<CheckoutEvent>, CheckoutError> {
        let phase = self.phase();
        if !phase.can_initiate() {
            return Err(CheckoutError::SessionInProgress { phase });
        }

        let total = cart.total_price();
        if !total.is_positive() {
            return Err(CheckoutError::EmptyCart);
        }

        let quote = Quote::from_cart(cart, self.settings.cod_available(total));
        Ok(vec![CheckoutEvent::CheckoutStarted { quote }])
    }

    /// Picks the payment method.
    pub fn choose_method(
        &self,
        method: PaymentMethod,
    ) -> Result<Vec<CheckoutEvent>, CheckoutError> {
        let CheckoutState::ChoosingMethod { quote } = &self.state else {
            return Err(self.invalid("choose a payment method"));
        };

        if method == PaymentMethod::CashOnDelivery && !quote.cod_available {
            return Err(CheckoutError::CodUnavailable {
                total: quote.total,
                limit: self.settings.cod_limit,
            });
        }

        Ok(vec![CheckoutEvent::PaymentMethodChosen { method }])
    }

    /// Submits the delivery address.
    ///
    /// Cash on Delivery orders are confirmed straight away; online orders
    /// move on to card entry.
    pub fn submit_address(
        &self,
        form: &AddressForm,
        stamp: OrderStamp,
    ) -> Result<Vec<CheckoutEvent>, CheckoutError> {
        let CheckoutState::EnteringAddress { quote, method } = &self.state else {
            return Err(self.invalid("submit an address"));
        };

        let address = validate_address(form)?;

        if method.requires_payment() {
            return Ok(vec![CheckoutEvent::AddressConfirmed { address }]);
        }

        let confirmation = OrderConfirmation::new(
            quote,
            *method,
            address,
            stamp,
            self.settings.delivery_days,
            None,
        );
        Ok(vec![CheckoutEvent::OrderConfirmed { confirmation }])
    }

    /// Submits card details.
    pub fn submit_card(&self, form: &CardForm) -> Result<Vec<CheckoutEvent>, CheckoutError> {
        if !matches!(self.state, CheckoutState::EnteringCard { .. }) {
            return Err(self.invalid("submit card details"));
        }

        let card = validate_card(form)?;
        Ok(vec![CheckoutEvent::CardAccepted { card }])
    }

    /// Submits the payment PIN, handing the order to payment processing.
    pub fn submit_pin(
        &self,
        pin: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<CheckoutEvent>, CheckoutError> {
        if !matches!(self.state, CheckoutState::EnteringPin { .. }) {
            return Err(self.invalid("submit a PIN"));
        }

        validate_pin(pin)?;
        Ok(vec![CheckoutEvent::PaymentStarted { started_at: now }])
    }

    /// Records an approved payment and confirms the order.
    pub fn complete_payment(
        &self,
        receipt: PaymentReceipt,
        stamp: OrderStamp,
    ) -> Result<Vec<CheckoutEvent>, CheckoutError> {
        let CheckoutState::Processing { quote, address, .. } = &self.state else {
            return Err(self.invalid("complete a payment"));
        };

        let confirmation = OrderConfirmation::new(
            quote,
            PaymentMethod::Online,
            address.clone(),
            stamp,
            self.settings.delivery_days,
            Some(receipt.clone()),
        );

        Ok(vec![
            CheckoutEvent::PaymentCompleted { receipt },
            CheckoutEvent::OrderConfirmed { confirmation },
        ])
    }

    /// Abandons the attempt before payment processing.
    pub fn cancel(&self) -> Result<Vec<CheckoutEvent>, CheckoutError> {
        let from = self.phase();
        if !from.can_cancel() {
            return Err(self.invalid("cancel"));
        }

        Ok(vec![CheckoutEvent::CheckoutCancelled { from }])
    }

    /// Closes the confirmation.
    pub fn dismiss(&self) -> Result<Vec<CheckoutEvent>, CheckoutError> {
        if !self.phase().is_terminal() {
            return Err(self.invalid("dismiss the confirmation"));
        }

        Ok(vec![CheckoutEvent::ConfirmationDismissed])
    }

    /// The charge to make for the attempt in processing.
    pub fn payment_request(&self) -> Option<PaymentRequest> {
        match &self.state {
            CheckoutState::Processing { quote, card, .. } => Some(PaymentRequest {
                session_id: quote.session_id,
                amount: quote.total,
                card_last_four: card.last_four().to_string(),
            }),
            _ => None,
        }
    }

    fn invalid(&self, action: &'static str) -> CheckoutError {
        CheckoutError::InvalidTransition {
            phase: self.phase(),
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use cart::{CartLineItem, Money};
    use chrono::TimeZone;

    use super::*;
    use crate::confirmation::OrderId;
    use crate::validation::ValidationError;

    fn cart(rupees: i64) -> CartState {
        CartState::new(vec![CartLineItem::new(
            "l1",
            "p1",
            "Mixer Grinder",
            1,
            Money::from_rupees(rupees),
        )])
    }

    fn address_form() -> AddressForm {
        AddressForm {
            name: "Meera".to_string(),
            phone: "9123456780".to_string(),
            house_number: "B-204".to_string(),
            city: "Hyderabad".to_string(),
            pincode: "500001".to_string(),
        }
    }

    fn card_form() -> CardForm {
        CardForm {
            number: "4111111111111111".to_string(),
            expiry: "08/29".to_string(),
            cvv: "321".to_string(),
        }
    }

    fn stamp() -> OrderStamp {
        OrderStamp {
            order_id: OrderId::generate(),
            confirmed_at: Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap(),
        }
    }

    fn run(
        session: &mut CheckoutSession,
        command: impl FnOnce(&CheckoutSession) -> Result<Vec<CheckoutEvent>, CheckoutError>,
    ) -> Result<(), CheckoutError> {
        for event in command(session)? {
            session.apply(event);
        }
        Ok(())
    }

    #[test]
    fn test_start_requires_positive_total() {
        let session = CheckoutSession::default();
        let result = session.start(&CartState::default());
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut session = CheckoutSession::default();
        run(&mut session, |s| s.start(&cart(2000))).unwrap();

        let result = session.start(&cart(2000));
        assert!(matches!(
            result,
            Err(CheckoutError::SessionInProgress {
                phase: CheckoutPhase::ChoosingMethod
            })
        ));
    }

    #[test]
    fn test_cod_rejected_above_limit_keeps_state() {
        let mut session = CheckoutSession::default();
        run(&mut session, |s| s.start(&cart(5001))).unwrap();
        assert_eq!(session.state().is_cod_available(), Some(false));

        let err = session
            .choose_method(PaymentMethod::CashOnDelivery)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Your order is more than ₹5000, so Cash on Delivery is not available. Please pay online."
        );
        assert_eq!(session.phase(), CheckoutPhase::ChoosingMethod);

        run(&mut session, |s| s.choose_method(PaymentMethod::Online)).unwrap();
        assert_eq!(session.phase(), CheckoutPhase::EnteringAddress);
    }

    #[test]
    fn test_cash_on_delivery_confirms_on_address() {
        let mut session = CheckoutSession::default();
        run(&mut session, |s| s.start(&cart(5000))).unwrap();
        run(&mut session, |s| s.choose_method(PaymentMethod::CashOnDelivery)).unwrap();
        run(&mut session, |s| s.submit_address(&address_form(), stamp())).unwrap();

        let confirmation = session.state().confirmation().unwrap();
        assert_eq!(confirmation.method, PaymentMethod::CashOnDelivery);
        assert_eq!(confirmation.total, Money::from_rupees(5000));
        assert_eq!(confirmation.delivery_estimate(), "21 October 2026");
    }

    #[test]
    fn test_invalid_address_keeps_state() {
        let mut session = CheckoutSession::default();
        run(&mut session, |s| s.start(&cart(900))).unwrap();
        run(&mut session, |s| s.choose_method(PaymentMethod::Online)).unwrap();

        let mut form = address_form();
        form.pincode = "5000".to_string();
        let result = session.submit_address(&form, stamp());

        assert!(matches!(
            result,
            Err(CheckoutError::Validation(ValidationError::InvalidPincode))
        ));
        assert_eq!(session.phase(), CheckoutPhase::EnteringAddress);
    }

    #[test]
    fn test_online_path_to_processing() {
        let mut session = CheckoutSession::default();
        run(&mut session, |s| s.start(&cart(2000))).unwrap();
        run(&mut session, |s| s.choose_method(PaymentMethod::Online)).unwrap();
        run(&mut session, |s| s.submit_address(&address_form(), stamp())).unwrap();
        assert_eq!(session.phase(), CheckoutPhase::EnteringCard);

        run(&mut session, |s| s.submit_card(&card_form())).unwrap();
        assert_eq!(session.phase(), CheckoutPhase::EnteringPin);

        run(&mut session, |s| s.submit_pin("123456", Utc::now())).unwrap();
        assert_eq!(session.phase(), CheckoutPhase::Processing);

        let request = session.payment_request().unwrap();
        assert_eq!(request.amount, Money::from_rupees(2000));
        assert_eq!(request.card_last_four, "1111");
    }

    #[test]
    fn test_processing_cannot_be_cancelled() {
        let mut session = CheckoutSession::default();
        run(&mut session, |s| s.start(&cart(2000))).unwrap();
        run(&mut session, |s| s.choose_method(PaymentMethod::Online)).unwrap();
        run(&mut session, |s| s.submit_address(&address_form(), stamp())).unwrap();
        run(&mut session, |s| s.submit_card(&card_form())).unwrap();
        run(&mut session, |s| s.submit_pin("123456", Utc::now())).unwrap();

        assert!(matches!(
            session.cancel(),
            Err(CheckoutError::InvalidTransition {
                phase: CheckoutPhase::Processing,
                action: "cancel"
            })
        ));
        assert!(matches!(
            session.start(&cart(2000)),
            Err(CheckoutError::SessionInProgress { .. })
        ));
    }

    #[test]
    fn test_cancel_from_idle_is_invalid() {
        let session = CheckoutSession::default();
        assert!(matches!(
            session.cancel(),
            Err(CheckoutError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_cancel_discards_collected_data() {
        let mut session = CheckoutSession::default();
        run(&mut session, |s| s.start(&cart(2000))).unwrap();
        run(&mut session, |s| s.choose_method(PaymentMethod::Online)).unwrap();
        run(&mut session, |s| s.submit_address(&address_form(), stamp())).unwrap();
        run(&mut session, |s| s.cancel()).unwrap();

        assert_eq!(session.state(), &CheckoutState::Idle);

        run(&mut session, |s| s.start(&cart(2000))).unwrap();
        assert!(session.state().address().is_none());
        assert!(session.state().card().is_none());
        assert!(session.state().method().is_none());
    }

    #[test]
    fn test_misplaced_event_is_ignored() {
        let mut session = CheckoutSession::default();
        session.apply(CheckoutEvent::PaymentMethodChosen {
            method: PaymentMethod::Online,
        });
        assert_eq!(session.phase(), CheckoutPhase::Idle);
    }

    #[test]
    fn test_dismiss_only_from_confirmed() {
        let mut session = CheckoutSession::default();
        assert!(session.dismiss().is_err());

        run(&mut session, |s| s.start(&cart(100))).unwrap();
        run(&mut session, |s| s.choose_method(PaymentMethod::CashOnDelivery)).unwrap();
        run(&mut session, |s| s.submit_address(&address_form(), stamp())).unwrap();
        run(&mut session, |s| s.dismiss()).unwrap();
        assert_eq!(session.phase(), CheckoutPhase::Idle);
    }
}
