//! # Cart Types
//!
//! Cart lines handed to the pricing engine, and the cart that builds them
//! from catalog products.
//!
//! Amounts on a [`CartLine`] are unsigned. Untrusted numbers are coerced at
//! construction: negative, non-finite or non-numeric values become zero and
//! fractions are truncated.

use crate::catalog::{Product, ProductCatalog};
use crate::error::{ShopError, ShopResult};
use crate::money::Currency;
use serde::de::{IgnoredAny, MapAccess, SeqAccess};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::debug;

/// One distinct product/size configuration awaiting checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Line identifier (`product_id` or `product_id:size`)
    pub id: String,

    /// Display name
    pub name: String,

    /// Unit price in minor currency units
    #[serde(default, deserialize_with = "lenient_amount")]
    pub unit_price: u64,

    #[serde(default, deserialize_with = "lenient_amount")]
    pub quantity: u64,

    /// Optional image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CartLine {
    /// Create a line, clamping negative amounts to zero
    pub fn new(id: impl Into<String>, name: impl Into<String>, unit_price: i64, quantity: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price: clamp_signed(unit_price),
            quantity: clamp_signed(quantity),
            image_url: None,
        }
    }

    /// Create a line from floating-point amounts (e.g. parsed form input)
    pub fn from_lossy(
        id: impl Into<String>,
        name: impl Into<String>,
        unit_price: f64,
        quantity: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price: clamp_float(unit_price),
            quantity: clamp_float(quantity),
            image_url: None,
        }
    }

    /// Builder: set image URL
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Price of the whole line before any promotion
    pub fn line_total(&self) -> u64 {
        self.unit_price.saturating_mul(self.quantity)
    }
}

fn clamp_signed(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn clamp_float(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        // `as` saturates at u64::MAX
        value.trunc() as u64
    } else {
        0
    }
}

/// Deserialize an amount from any numeric-looking value.
///
/// Integers, floats and numeric strings are coerced with the same rules as
/// [`CartLine::from_lossy`]. Every other shape (`null`, booleans,
/// non-numeric strings, arrays, objects) becomes zero.
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    struct AmountVisitor;

    impl<'de> serde::de::Visitor<'de> for AmountVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an amount")
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<u64, E> {
            Ok(clamp_signed(v))
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<u64, E> {
            Ok(clamp_float(v))
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<u64, E> {
            Ok(v.trim().parse::<f64>().map(clamp_float).unwrap_or(0))
        }

        fn visit_bool<E: serde::de::Error>(self, _: bool) -> Result<u64, E> {
            Ok(0)
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<u64, E> {
            Ok(0)
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<u64, E> {
            Ok(0)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<u64, D2::Error> {
            d.deserialize_any(AmountVisitor)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<u64, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(0)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<u64, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(0)
        }
    }

    deserializer.deserialize_any(AmountVisitor)
}

/// Item in a cart request, resolved against the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemRequest {
    /// Product ID
    pub product_id: String,
    /// Size, required when the product offers sizes
    #[serde(default)]
    pub size: Option<String>,
    /// Quantity
    #[serde(default = "default_quantity", deserialize_with = "lenient_amount")]
    pub quantity: u64,
}

fn default_quantity() -> u64 {
    1
}

/// A shopping cart awaiting checkout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    /// Currency (must be same for all items)
    pub currency: Currency,
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            lines: Vec::new(),
        }
    }

    /// Build a cart from request items, resolving each against the catalog
    pub fn from_request(
        catalog: &ProductCatalog,
        items: &[CartItemRequest],
        currency: Currency,
    ) -> ShopResult<Self> {
        if items.is_empty() {
            return Err(ShopError::InvalidRequest("Cart has no items".to_string()));
        }

        let mut cart = Cart::new(currency);
        for item in items {
            let product = catalog
                .get(&item.product_id)
                .ok_or_else(|| ShopError::ProductNotFound {
                    product_id: item.product_id.clone(),
                })?;
            cart.add_product(product, item.size.as_deref(), item.quantity)?;
        }
        Ok(cart)
    }

    /// Add a product configuration.
    ///
    /// Adding a configuration already in the cart merges the quantities.
    pub fn add_product(
        &mut self,
        product: &Product,
        size: Option<&str>,
        quantity: u64,
    ) -> ShopResult<()> {
        if !product.active {
            return Err(ShopError::ProductUnavailable {
                product_id: product.id.clone(),
            });
        }
        if product.price.currency != self.currency {
            return Err(ShopError::InvalidRequest(format!(
                "Product {} is priced in {}, cart is in {}",
                product.id, product.price.currency, self.currency
            )));
        }

        let size = size.map(str::trim).filter(|s| !s.is_empty());
        let (id, name) = match size {
            None if product.is_one_size() => (product.id.clone(), product.name.clone()),
            None => {
                return Err(ShopError::InvalidRequest(format!(
                    "Product {} requires a size ({})",
                    product.id,
                    product.sizes.join(", ")
                )))
            }
            Some(size) => {
                let offered = product
                    .sizes
                    .iter()
                    .find(|s| s.eq_ignore_ascii_case(size))
                    .ok_or_else(|| ShopError::UnknownSize {
                        product_id: product.id.clone(),
                        size: size.to_string(),
                    })?;
                (
                    format!("{}:{}", product.id, offered),
                    format!("{} ({})", product.name, offered),
                )
            }
        };

        if let Some(line) = self.lines.iter_mut().find(|l| l.id == id) {
            line.quantity = line.quantity.saturating_add(quantity);
            debug!(line = %line.id, quantity = line.quantity, "merged cart line");
            return Ok(());
        }

        let mut line = CartLine::new(id, name, product.price.amount, 0);
        line.quantity = quantity;
        line.image_url = product.image_url.clone();
        self.lines.push(line);
        Ok(())
    }

    /// Cart lines in insertion order
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Total number of units
    pub fn item_count(&self) -> u64 {
        self.lines
            .iter()
            .fold(0u64, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Check if cart is empty
    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }
}
