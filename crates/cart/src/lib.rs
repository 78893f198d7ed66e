//! Cart layer for the storefront checkout.
//!
//! This crate provides:
//! - `Money` in paise with Indian-rupee display formatting
//! - `CartLineItem` / `CartState` with totals derived from the items
//! - The `CartDataService` contract plus in-memory and HTTP implementations
//! - The `Cart` aggregate, which serializes mutations and refreshes after each one

pub mod aggregate;
pub mod error;
pub mod format;
pub mod http;
pub mod item;
pub mod memory;
pub mod money;
pub mod notify;
pub mod service;

pub use aggregate::Cart;
pub use error::CartError;
pub use format::{format_inr, format_long_date};
pub use http::HttpCartDataService;
pub use item::{CartLineItem, CartState, CartTotals, totals};
pub use memory::InMemoryCartDataService;
pub use money::Money;
pub use notify::CartNotification;
pub use service::{CartDataService, ServiceError, ServiceReply};
