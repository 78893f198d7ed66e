//! Checkout machine: drives a shopper's checkout session.

use std::sync::Arc;
use std::time::Instant;

use cart::CartState;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::address::AddressForm;
use crate::card::CardForm;
use crate::confirmation::{Clock, OrderConfirmation, OrderStamp, SystemClock};
use crate::error::CheckoutError;
use crate::events::CheckoutEvent;
use crate::method::PaymentMethod;
use crate::payment::PaymentProcessor;
use crate::session::CheckoutSession;
use crate::settings::CheckoutSettings;
use crate::state::{CheckoutPhase, CheckoutState};

#[derive(Debug, Default)]
struct SessionCell {
    session: CheckoutSession,
    history: Vec<CheckoutEvent>,
}

impl SessionCell {
    fn record(&mut self, event: CheckoutEvent) {
        match &event {
            CheckoutEvent::CheckoutStarted { quote } => {
                self.history.clear();
                metrics::counter!("checkout_started_total").increment(1);
                tracing::info!(session_id = %quote.session_id, total = %quote.total, "checkout started");
            }
            CheckoutEvent::OrderConfirmed { confirmation } => {
                metrics::counter!("checkout_confirmed_total", "method" => confirmation.method.as_str())
                    .increment(1);
                tracing::info!(
                    order_id = %confirmation.order_id,
                    method = confirmation.method.as_str(),
                    total = %confirmation.total,
                    "order confirmed"
                );
            }
            CheckoutEvent::CheckoutCancelled { from } => {
                metrics::counter!("checkout_cancelled_total", "from" => from.as_str()).increment(1);
                tracing::info!(%from, "checkout cancelled");
            }
            other => tracing::debug!(event_type = other.event_type(), "checkout event"),
        }

        self.session.apply(event.clone());
        self.history.push(event);
    }
}

/// Drives one shopper's checkout session.
///
/// Commands are serialized on an async lock around the session; each one
/// checks the current state, records the resulting events and publishes the
/// new phase to subscribers. Cloning yields another handle to the same session.
pub struct CheckoutMachine<P: PaymentProcessor + 'static> {
    cell: Arc<Mutex<SessionCell>>,
    payment: Arc<P>,
    clock: Arc<dyn Clock>,
    phase_tx: Arc<watch::Sender<CheckoutPhase>>,
}

impl<P: PaymentProcessor + 'static> Clone for CheckoutMachine<P> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
            payment: Arc::clone(&self.payment),
            clock: Arc::clone(&self.clock),
            phase_tx: Arc::clone(&self.phase_tx),
        }
    }
}

impl<P: PaymentProcessor + 'static> CheckoutMachine<P> {
    /// Creates an idle machine using the wall clock.
    pub fn new(payment: P, settings: CheckoutSettings) -> Self {
        let (phase_tx, _) = watch::channel(CheckoutPhase::Idle);
        Self {
            cell: Arc::new(Mutex::new(SessionCell {
                session: CheckoutSession::new(settings),
                history: Vec::new(),
            })),
            payment: Arc::new(payment),
            clock: Arc::new(SystemClock),
            phase_tx: Arc::new(phase_tx),
        }
    }

    /// Replaces the clock used to stamp orders.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn payment(&self) -> &P {
        &self.payment
    }

    /// Returns a copy of the current checkout state.
    pub async fn state(&self) -> CheckoutState {
        self.cell.lock().await.session.state().clone()
    }

    pub async fn phase(&self) -> CheckoutPhase {
        self.cell.lock().await.session.phase()
    }

    /// Subscribes to phase changes.
    pub fn subscribe(&self) -> watch::Receiver<CheckoutPhase> {
        self.phase_tx.subscribe()
    }

    /// Events recorded for the current attempt.
    pub async fn history(&self) -> Vec<CheckoutEvent> {
        self.cell.lock().await.history.clone()
    }

    /// Whether Cash on Delivery may be chosen. `None` unless choosing a method.
    pub async fn is_cod_available(&self) -> Option<bool> {
        self.cell.lock().await.session.state().is_cod_available()
    }

    /// Opens a checkout attempt for the cart.
    #[tracing::instrument(skip(self, cart), fields(total = %cart.total_price()))]
    pub async fn initiate(&self, cart: &CartState) -> Result<CheckoutState, CheckoutError> {
        self.execute("initiate", |session| session.start(cart)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn choose_method(&self, method: PaymentMethod) -> Result<CheckoutState, CheckoutError> {
        self.execute("choose_method", |session| session.choose_method(method))
            .await
    }

    /// Submits the delivery address. Cash on Delivery orders are confirmed here.
    #[tracing::instrument(skip_all)]
    pub async fn submit_address(&self, form: &AddressForm) -> Result<CheckoutState, CheckoutError> {
        let stamp = OrderStamp::new(self.clock.as_ref());
        self.execute("submit_address", |session| {
            session.submit_address(form, stamp)
        })
        .await
    }

    #[tracing::instrument(skip_all)]
    pub async fn submit_card(&self, form: &CardForm) -> Result<CheckoutState, CheckoutError> {
        self.execute("submit_card", |session| session.submit_card(form))
            .await
    }

    /// Submits the payment PIN and starts payment processing in the background.
    ///
    /// Returns once the machine is in `Processing`. The payment runs to
    /// completion whether or not the returned handle is awaited.
    #[tracing::instrument(skip_all)]
    pub async fn submit_pin(&self, pin: &str) -> Result<PaymentHandle, CheckoutError> {
        let now = self.clock.now();
        let request = {
            let mut cell = self.cell.lock().await;
            let events = cell
                .session
                .submit_pin(pin, now)
                .inspect_err(|e| record_rejection("submit_pin", e))?;
            for event in events {
                cell.record(event);
            }
            self.publish(&cell);

            cell.session
                .payment_request()
                .ok_or(CheckoutError::InvalidTransition {
                    phase: cell.session.phase(),
                    action: "start a payment",
                })?
        };

        let machine = self.clone();
        let task = tokio::spawn(async move {
            let started = Instant::now();
            let receipt = machine.payment.process(request).await;
            metrics::histogram!("payment_duration_seconds")
                .record(started.elapsed().as_secs_f64());

            let stamp = OrderStamp::new(machine.clock.as_ref());
            let state = machine
                .execute("complete_payment", |session| {
                    session.complete_payment(receipt, stamp)
                })
                .await?;

            state
                .confirmation()
                .cloned()
                .ok_or(CheckoutError::InvalidTransition {
                    phase: state.phase(),
                    action: "confirm the order",
                })
        });

        Ok(PaymentHandle { task })
    }

    /// Abandons the attempt. Only allowed before payment processing.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self) -> Result<CheckoutState, CheckoutError> {
        self.execute("cancel", |session| session.cancel()).await
    }

    /// Closes the confirmation, returning to idle.
    #[tracing::instrument(skip(self))]
    pub async fn dismiss(&self) -> Result<CheckoutState, CheckoutError> {
        self.execute("dismiss", |session| session.dismiss()).await
    }

    /// Waits until payment processing is over and returns the confirmation.
    ///
    /// Returns immediately if the order is already confirmed.
    pub async fn wait_for_confirmation(&self) -> Result<OrderConfirmation, CheckoutError> {
        let mut rx = self.subscribe();
        rx.wait_for(|phase| !phase.is_committed())
            .await
            .map_err(|e| CheckoutError::PaymentTask(e.to_string()))?;

        match self.state().await {
            CheckoutState::Confirmed { confirmation } => Ok(confirmation),
            other => Err(CheckoutError::InvalidTransition {
                phase: other.phase(),
                action: "await a confirmation",
            }),
        }
    }

    async fn execute<F>(&self, action: &'static str, command: F) -> Result<CheckoutState, CheckoutError>
    where
        F: FnOnce(&CheckoutSession) -> Result<Vec<CheckoutEvent>, CheckoutError>,
    {
        let mut cell = self.cell.lock().await;
        let events = command(&cell.session).inspect_err(|e| record_rejection(action, e))?;

        for event in events {
            cell.record(event);
        }
        self.publish(&cell);

        Ok(cell.session.state().clone())
    }

    fn publish(&self, cell: &SessionCell) {
        self.phase_tx.send_replace(cell.session.phase());
    }
}

fn record_rejection(action: &'static str, err: &CheckoutError) {
    if let CheckoutError::Validation(validation) = err {
        metrics::counter!(
            "checkout_validation_failures_total",
            "field" => validation.field().unwrap_or("form")
        )
        .increment(1);
    }
    tracing::info!(action, kind = err.kind(), error = %err, "checkout command rejected");
}

/// Handle to a payment running in the background.
#[derive(Debug)]
pub struct PaymentHandle {
    task: JoinHandle<Result<OrderConfirmation, CheckoutError>>,
}

impl PaymentHandle {
    /// Waits for the payment to finish and the order to be confirmed.
    pub async fn wait(self) -> Result<OrderConfirmation, CheckoutError> {
        self.task
            .await
            .map_err(|e| CheckoutError::PaymentTask(e.to_string()))?
    }
}
