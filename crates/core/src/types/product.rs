//! Catalog product types.
//!
//! Products are immutable reference data. The storefront owns the catalog and
//! hands out clones; the cart keeps a snapshot of the product it was added
//! with so a line can always be priced and described on its own.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ColorId, ProductId, SizeId};
use super::price::{CurrencyCode, Price};

/// A garment size offered for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSize {
    pub id: SizeId,
    /// Display name (e.g. "Medium").
    pub name: String,
    /// Short code printed on labels and sent to the provider (e.g. "M").
    pub code: String,
    pub in_stock: bool,
}

/// A garment color offered for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductColor {
    pub id: ColorId,
    pub name: String,
    /// CSS hex value for the swatch.
    pub hex: String,
    pub in_stock: bool,
}

/// A product in the storefront catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Unit price in `currency`.
    pub price: Decimal,
    pub currency: CurrencyCode,
    /// Image paths, site-relative (`/teefront.jpeg`) or absolute URLs.
    pub images: Vec<String>,
    pub sizes: Vec<ProductSize>,
    pub colors: Vec<ProductColor>,
    pub category: String,
    /// Product identifier on the fulfillment provider, when mapped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gelato_product_id: Option<String>,
    pub in_stock: bool,
    pub featured: bool,
}

impl Product {
    /// Unit price with currency attached.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::new(self.price, self.currency)
    }

    /// The primary image, if the product has any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Look up a size by its id or its code (case-insensitive on the code).
    #[must_use]
    pub fn size(&self, id_or_code: &str) -> Option<&ProductSize> {
        self.sizes.iter().find(|size| {
            size.id.as_str() == id_or_code || size.code.eq_ignore_ascii_case(id_or_code)
        })
    }

    /// Look up a color by its id.
    #[must_use]
    pub fn color(&self, id: &str) -> Option<&ProductColor> {
        self.colors.iter().find(|color| color.id.as_str() == id)
    }

    /// Provider product identifier, falling back to our own id.
    #[must_use]
    pub fn provider_product_id(&self) -> &str {
        self.gelato_product_id
            .as_deref()
            .unwrap_or_else(|| self.id.as_str())
    }
}
