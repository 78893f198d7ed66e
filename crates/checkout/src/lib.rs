//! Checkout orchestration for the storefront cart.
//!
//! The checkout walks a shopper through these steps:
//! 1. Choose a payment method (Cash on Delivery only up to the COD limit)
//! 2. Enter a delivery address
//! 3. Online only: enter card details, then the payment PIN
//! 4. Online only: simulated payment processing
//! 5. Order confirmation with a synthetic order id and delivery estimate
//!
//! Cancelling before payment processing discards everything collected and
//! returns the machine to idle. Nothing here writes to the cart service.

pub mod address;
pub mod card;
pub mod confirmation;
pub mod error;
pub mod events;
pub mod machine;
pub mod method;
pub mod payment;
pub mod session;
pub mod settings;
pub mod state;
pub mod validation;

pub use address::{Address, AddressForm, City};
pub use card::{CardDetails, CardForm, Pin};
pub use confirmation::{Clock, FixedClock, OrderConfirmation, OrderId, OrderStamp, SystemClock};
pub use error::CheckoutError;
pub use events::CheckoutEvent;
pub use machine::{CheckoutMachine, PaymentHandle};
pub use method::PaymentMethod;
pub use payment::{PaymentProcessor, PaymentReceipt, PaymentRequest, SimulatedPaymentProcessor};
pub use session::CheckoutSession;
pub use settings::CheckoutSettings;
pub use state::{CheckoutPhase, CheckoutState, Quote, QuoteLine};
pub use validation::{ValidationError, validate_address, validate_card, validate_pin};
