//! Static product catalog.
//!
//! The shop sells a handful of printed garments whose details change rarely,
//! so they live in code rather than a database. Images are site-relative and
//! get resolved against the public base URL when sent to the provider.

use clueless_fitness_core::{
    ColorId, CurrencyCode, Product, ProductColor, ProductId, ProductSize, SizeId,
};
use rust_decimal::Decimal;

/// The products on sale.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from an explicit product list.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The storefront's built-in product list.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![no_days_off()])
    }

    #[must_use]
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id.as_str() == id)
    }
}

fn size(id: &str, name: &str, code: &str) -> ProductSize {
    ProductSize {
        id: SizeId::new(id),
        name: name.to_string(),
        code: code.to_string(),
        in_stock: true,
    }
}

fn color(id: &str, name: &str, hex: &str) -> ProductColor {
    ProductColor {
        id: ColorId::new(id),
        name: name.to_string(),
        hex: hex.to_string(),
        in_stock: true,
    }
}

fn no_days_off() -> Product {
    Product {
        id: ProductId::new("no-days-off"),
        name: "NO DAYS OFF".to_string(),
        description: "The ultimate motivational statement for those who never quit. \
            A premium tee for people who keep showing up: when everyone else rests, you grind."
            .to_string(),
        price: Decimal::new(2499, 2),
        currency: CurrencyCode::GBP,
        images: vec![
            "/teefront2.jpeg".to_string(),
            "/teefront.jpeg".to_string(),
            "/teefront3.jpeg".to_string(),
        ],
        sizes: vec![
            size("xs", "Extra Small", "XS"),
            size("s", "Small", "S"),
            size("m", "Medium", "M"),
            size("l", "Large", "L"),
            size("xl", "Extra Large", "XL"),
        ],
        colors: vec![
            color("black", "Black", "#000000"),
            color("white", "White", "#FFFFFF"),
            color("navy", "Navy", "#1e3a8a"),
        ],
        category: "T-Shirts".to_string(),
        gelato_product_id: Some("tshirt-basic".to_string()),
        in_stock: true,
        featured: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_has_no_days_off() {
        let catalog = Catalog::builtin();
        let product = catalog.get("no-days-off");

        assert!(product.is_some_and(|p| p.price == Decimal::new(2499, 2)));
        assert!(product.is_some_and(|p| p.size("M").is_some() && p.color("navy").is_some()));
        assert!(product.is_some_and(|p| p.featured));
    }

    #[test]
    fn test_unknown_product_is_none() {
        assert!(Catalog::builtin().get("rest-days").is_none());
    }
}
