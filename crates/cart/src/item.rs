//! Cart line items and the derived cart totals.

use common::{CartItemId, ProductRef};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// One product+quantity entry in a shopper's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Line item id assigned by the cart service.
    pub id: CartItemId,

    /// The catalog product this line refers to.
    pub product_ref: ProductRef,

    /// Human-readable product name.
    pub product_name: String,

    /// First product image, if the catalog has one.
    pub product_image: Option<String>,

    /// Catalog category, if known.
    pub category: Option<String>,

    /// Quantity in the cart (at least 1).
    pub quantity: u32,

    /// Price per unit. `None` when the product no longer carries a price.
    pub unit_price: Option<Money>,
}

impl CartLineItem {
    /// Creates a new line item with a known unit price.
    pub fn new(
        id: impl Into<CartItemId>,
        product_ref: impl Into<ProductRef>,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            id: id.into(),
            product_ref: product_ref.into(),
            product_name: product_name.into(),
            product_image: None,
            category: None,
            quantity,
            unit_price: Some(unit_price),
        }
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.product_image = Some(url.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Returns the price for this line (quantity * unit_price).
    ///
    /// A missing unit price contributes zero.
    pub fn line_total(&self) -> Money {
        self.unit_price.unwrap_or_default().multiply(self.quantity)
    }
}

/// Totals derived from a list of line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartTotals {
    pub total_quantity: u32,
    pub total_price: Money,
}

/// Folds line items into their totals.
pub fn totals(items: &[CartLineItem]) -> CartTotals {
    items.iter().fold(CartTotals::default(), |acc, item| CartTotals {
        total_quantity: acc.total_quantity.saturating_add(item.quantity),
        total_price: acc.total_price + item.line_total(),
    })
}

/// The cart as last fetched from the cart service.
///
/// Totals are always recomputed from `items`; there is no stored total
/// that could drift from the line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    items: Vec<CartLineItem>,
}

impl CartState {
    pub fn new(items: Vec<CartLineItem>) -> Self {
        Self { items }
    }

    /// Returns the line items in service order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Returns a line item by id.
    pub fn get(&self, item_id: &CartItemId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.id == item_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of line items (not the quantity).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn total_quantity(&self) -> u32 {
        self.totals().total_quantity
    }

    pub fn total_price(&self) -> Money {
        self.totals().total_price
    }

    pub fn totals(&self) -> CartTotals {
        totals(&self.items)
    }
}
