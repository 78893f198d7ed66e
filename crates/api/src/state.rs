//! Shared application state.

use cart::{Cart, CartDataService, CartNotification};
use checkout::{CheckoutMachine, CheckoutSettings, SimulatedPaymentProcessor};
use tokio::sync::mpsc;

/// State shared by every handler: one shopper's cart and checkout.
pub struct AppState<S: CartDataService> {
    pub cart: Cart<S>,
    pub checkout: CheckoutMachine<SimulatedPaymentProcessor>,
}

impl<S: CartDataService> AppState<S> {
    /// Builds the cart over `service` and a checkout using the simulated
    /// payment processor.
    ///
    /// Returns the receiving end of the cart's notification channel.
    pub fn new(
        service: S,
        settings: CheckoutSettings,
    ) -> (Self, mpsc::UnboundedReceiver<CartNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let cart = Cart::new(service).with_listener(tx);
        let checkout = CheckoutMachine::new(
            SimulatedPaymentProcessor::new(settings.payment_delay),
            settings,
        );

        (Self { cart, checkout }, rx)
    }
}
