//! # Product Catalog
//!
//! Product and catalog types for the kitshop storefront.
//! Products are loaded from `config/products.toml`.

use crate::error::ShopResult;
use crate::money::Price;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Product category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Match or replica jersey
    Jersey,
    /// Shorts and training wear
    Shorts,
    /// Scarves, caps, badges
    Accessory,
}

impl Default for Category {
    fn default() -> Self {
        Category::Jersey
    }
}

/// A product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier (e.g., "boca-home-2024")
    pub id: String,

    /// Display name
    pub name: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Club or national team
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,

    #[serde(default)]
    pub category: Category,

    /// Unit price
    pub price: Price,

    /// Sizes on offer; empty means one-size
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<String>,

    /// Whether this product is active and available for purchase
    #[serde(default = "default_true")]
    pub active: bool,

    /// Optional image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Optional metadata (season, sponsor, etc.)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Create a new product
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        price: Price,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            team: None,
            category,
            price,
            sizes: Vec::new(),
            active: true,
            image_url: None,
            metadata: HashMap::new(),
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder: set team
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    /// Builder: set offered sizes
    pub fn with_sizes<I, S>(mut self, sizes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sizes = sizes.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set image URL
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Builder: mark as not for sale
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Builder: add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether the product is sold in a single size
    pub fn is_one_size(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Whether `size` is on offer (case-insensitive)
    pub fn offers_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s.eq_ignore_ascii_case(size))
    }

    fn matches_text(&self, terms: &[String]) -> bool {
        let haystack = format!(
            "{} {} {}",
            self.name,
            self.description,
            self.team.as_deref().unwrap_or_default()
        )
        .to_lowercase();
        terms.iter().all(|term| haystack.contains(term.as_str()))
    }
}

/// Filters for catalog search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    /// Free text; every whitespace-separated term must match
    #[serde(default, alias = "q")]
    pub text: Option<String>,

    #[serde(default)]
    pub category: Option<Category>,

    #[serde(default)]
    pub team: Option<String>,

    #[serde(default)]
    pub size: Option<String>,
}

impl CatalogQuery {
    /// Query matching every active product
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set free text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder: restrict to a category
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Builder: restrict to a team
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    /// Builder: restrict to products offering a size
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    fn terms(&self) -> Vec<String> {
        self.text
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_lowercase)
            .collect()
    }

    fn matches(&self, product: &Product, terms: &[String]) -> bool {
        if !product.active {
            return false;
        }
        if let Some(category) = self.category {
            if product.category != category {
                return false;
            }
        }
        if let Some(team) = self.team.as_deref().filter(|t| !t.trim().is_empty()) {
            let same_team = product
                .team
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case(team.trim()));
            if !same_team {
                return false;
            }
        }
        if let Some(size) = self.size.as_deref().filter(|s| !s.trim().is_empty()) {
            if !product.offers_size(size.trim()) {
                return false;
            }
        }
        product.matches_text(terms)
    }
}

/// Product catalog (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    #[serde(default)]
    pub products: Vec<Product>,
}

impl ProductCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// Add a product to the catalog
    pub fn add(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Builder: add a product
    pub fn with_product(mut self, product: Product) -> Self {
        self.add(product);
        self
    }

    /// Find a product by ID
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Get all active products
    pub fn active_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.active)
    }

    /// Active products matching `query`, in catalog order
    pub fn search(&self, query: &CatalogQuery) -> Vec<&Product> {
        let terms = query.terms();
        self.products
            .iter()
            .filter(|p| query.matches(p, &terms))
            .collect()
    }

    /// Distinct teams across active products, sorted
    pub fn teams(&self) -> Vec<&str> {
        let mut teams: Vec<&str> = self
            .active_products()
            .filter_map(|p| p.team.as_deref())
            .collect();
        teams.sort_unstable();
        teams.dedup();
        teams
    }

    /// Number of products
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if catalog is empty
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> ShopResult<Self> {
        Ok(toml::from_str(toml_str)?)
    }
}
