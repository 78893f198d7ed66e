//! Order confirmation, order ids and the clock used to stamp them.

use cart::{Money, format_long_date};
use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use common::SessionId;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::method::PaymentMethod;
use crate::payment::PaymentReceipt;
use crate::settings::STOREFRONT_UTC_OFFSET_SECS;
use crate::state::{Quote, QuoteLine};

/// Source of the current time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Display identifier for a placed order, e.g. `ORD482913`.
///
/// Drawn at random below one million. It is not unique and must not be used
/// to deduplicate orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    /// Draws a new random order id.
    pub fn generate() -> Self {
        let number: u32 = rand::rng().random_range(0..1_000_000);
        Self(format!("ORD{number}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order id and confirmation time drawn when an order is placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStamp {
    pub order_id: OrderId,
    pub confirmed_at: DateTime<Utc>,
}

impl OrderStamp {
    pub fn new(clock: &dyn Clock) -> Self {
        Self {
            order_id: OrderId::generate(),
            confirmed_at: clock.now(),
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub session_id: SessionId,
    pub method: PaymentMethod,
    pub total: Money,
    pub lines: Vec<QuoteLine>,
    pub address: Address,
    pub confirmed_at: DateTime<Utc>,
    pub delivery_date: NaiveDate,
    /// Gateway reference, online payments only.
    pub payment_reference: Option<String>,
}

impl OrderConfirmation {
    pub(crate) fn new(
        quote: &Quote,
        method: PaymentMethod,
        address: Address,
        stamp: OrderStamp,
        delivery_days: u32,
        receipt: Option<PaymentReceipt>,
    ) -> Self {
        let delivery_date = storefront_date(stamp.confirmed_at)
            .checked_add_days(Days::new(u64::from(delivery_days)))
            .unwrap_or(NaiveDate::MAX);

        Self {
            order_id: stamp.order_id,
            session_id: quote.session_id,
            method,
            total: quote.total,
            lines: quote.lines.clone(),
            address,
            confirmed_at: stamp.confirmed_at,
            delivery_date,
            payment_reference: receipt.map(|r| r.reference),
        }
    }

    /// Title of the confirmation dialog.
    pub fn headline(&self) -> &'static str {
        match self.method {
            PaymentMethod::CashOnDelivery => "Order Confirmed (Cash on Delivery)",
            PaymentMethod::Online => "Payment Successful",
        }
    }

    /// Total as shown on the confirmation, with a `(Prepaid)` tag for online payments.
    pub fn total_label(&self) -> String {
        match self.method {
            PaymentMethod::CashOnDelivery => self.total.to_string(),
            PaymentMethod::Online => format!("{} (Prepaid)", self.total),
        }
    }

    /// Estimated delivery date, e.g. `21 October 2026`.
    pub fn delivery_estimate(&self) -> String {
        format_long_date(self.delivery_date)
    }
}

/// Calendar date of `at` as the shopper sees it.
fn storefront_date(at: DateTime<Utc>) -> NaiveDate {
    FixedOffset::east_opt(STOREFRONT_UTC_OFFSET_SECS)
        .map_or_else(|| at.date_naive(), |offset| at.with_timezone(&offset).date_naive())
}
