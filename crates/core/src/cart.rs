//! Session cart state.
//!
//! [`Cart`] is a plain value: the storefront loads it from the visitor's
//! session, applies one operation and writes it back. Nothing here performs
//! I/O, and every total is recomputed from the current lines on each read.
//!
//! # Invariants
//!
//! - At most one line per (product, size code, color) key.
//! - Every line has `quantity >= 1`; dropping to zero removes the line.
//! - `total_price()` is the exact decimal sum of `unit price * quantity`.

use serde::{Deserialize, Serialize};

use crate::types::{CartLineId, CurrencyCode, Price, Product, ProductColor, ProductSize};

/// One product/size/color combination in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: CartLineId,
    /// Snapshot of the product at the time it was added.
    pub product: Product,
    pub size: ProductSize,
    pub color: ProductColor,
    pub quantity: u32,
}

impl CartLine {
    /// Build the composite line key for a product, size and color.
    #[must_use]
    pub fn key_for(product: &Product, size: &ProductSize, color: &ProductColor) -> CartLineId {
        CartLineId::new(format!("{}-{}-{}", product.id, size.code, color.id))
    }

    /// Provider variant code, `{productId}-{sizeCode}-{colorId}`.
    #[must_use]
    pub fn variant_code(&self) -> String {
        format!("{}-{}-{}", self.product.id, self.size.code, self.color.id)
    }

    /// Unit price of the line's product.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        self.product.unit_price()
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price().times(self.quantity)
    }
}

/// A visitor's shopping cart plus the visibility of the cart panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    lines: Vec<CartLine>,
    #[serde(default)]
    is_open: bool,
}

impl Cart {
    /// An empty, closed cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of a product variant.
    ///
    /// Increments the existing line for the same (product, size, color) key,
    /// or appends a new line. Adding zero units changes nothing.
    pub fn add_item(
        &mut self,
        product: &Product,
        size: &ProductSize,
        color: &ProductColor,
        quantity: u32,
    ) -> CartLineId {
        let id = CartLine::key_for(product, size, color);
        if quantity == 0 {
            return id;
        }

        if let Some(line) = self.lines.iter_mut().find(|line| line.id == id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine {
                id: id.clone(),
                product: product.clone(),
                size: size.clone(),
                color: color.clone(),
                quantity,
            });
        }

        id
    }

    /// Set a line's quantity; zero or negative removes the line.
    ///
    /// Unknown line ids are ignored.
    pub fn update_quantity(&mut self, id: &CartLineId, new_quantity: i64) {
        if new_quantity <= 0 {
            self.remove_item(id);
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|line| &line.id == id) {
            line.quantity = u32::try_from(new_quantity).unwrap_or(u32::MAX);
        }
    }

    /// Remove a line. Removing a line that isn't there is a no-op.
    pub fn remove_item(&mut self, id: &CartLineId) {
        self.lines.retain(|line| &line.id != id);
    }

    /// Remove every line. Visibility is left as is.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up a line by id.
    #[must_use]
    pub fn line(&self, id: &CartLineId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Sum of line totals, in the currency of the first line.
    ///
    /// An empty cart totals zero in the store's default currency.
    #[must_use]
    pub fn total_price(&self) -> Price {
        let currency = self
            .lines
            .first()
            .map_or_else(CurrencyCode::default, |line| line.product.currency);

        self.lines
            .iter()
            .fold(Price::zero(currency), |total, line| {
                Price::new(total.amount + line.line_total().amount, currency)
            })
    }

    // Panel visibility

    pub const fn open(&mut self) {
        self.is_open = true;
    }

    pub const fn close(&mut self) {
        self.is_open = false;
    }

    pub const fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }
}
