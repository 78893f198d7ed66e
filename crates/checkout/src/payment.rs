//! Payment processor trait and the simulated gateway.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cart::Money;
use chrono::{DateTime, Utc};
use common::SessionId;
use serde::Serialize;

use crate::settings::DEFAULT_PAYMENT_DELAY;

/// A charge to be made for an online order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub session_id: SessionId,
    pub amount: Money,
    pub card_last_four: String,
}

/// Proof that a payment went through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentReceipt {
    /// The reference assigned by the processor.
    pub reference: String,
    pub amount: Money,
    pub processed_at: DateTime<Utc>,
}

/// Trait for payment processing.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Charges the card for an order.
    async fn process(&self, request: PaymentRequest) -> PaymentReceipt;
}

/// Stand-in for a payment gateway: waits a fixed delay, then succeeds.
#[derive(Debug, Clone)]
pub struct SimulatedPaymentProcessor {
    delay: Duration,
    processed: Arc<AtomicU32>,
}

impl Default for SimulatedPaymentProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_PAYMENT_DELAY)
    }
}

impl SimulatedPaymentProcessor {
    /// Creates a processor that takes `delay` per payment.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            processed: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns how many payments have been processed.
    pub fn processed_count(&self) -> u32 {
        self.processed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentProcessor for SimulatedPaymentProcessor {
    #[tracing::instrument(skip(self), fields(delay_ms = self.delay.as_millis() as u64))]
    async fn process(&self, request: PaymentRequest) -> PaymentReceipt {
        tokio::time::sleep(self.delay).await;

        let next = self.processed.fetch_add(1, Ordering::SeqCst) + 1;
        let reference = format!("PAY-{next:04}");
        tracing::debug!(%reference, amount = %request.amount, "simulated payment approved");

        PaymentReceipt {
            reference,
            amount: request.amount,
            processed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(rupees: i64) -> PaymentRequest {
        PaymentRequest {
            session_id: SessionId::new(),
            amount: Money::from_rupees(rupees),
            card_last_four: "3456".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sequential_references() {
        let processor = SimulatedPaymentProcessor::new(Duration::ZERO);

        let r1 = processor.process(request(100)).await;
        let r2 = processor.process(request(250)).await;

        assert_eq!(r1.reference, "PAY-0001");
        assert_eq!(r2.reference, "PAY-0002");
        assert_eq!(r2.amount, Money::from_rupees(250));
        assert_eq!(processor.processed_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_the_configured_delay() {
        let processor = SimulatedPaymentProcessor::default();
        let started = tokio::time::Instant::now();

        processor.process(request(2000)).await;

        assert!(started.elapsed() >= Duration::from_millis(2000));
    }
}
