//! Identifiers shared by the cart, checkout and API crates.

mod types;

pub use types::{CartItemId, ProductRef, SessionId};
