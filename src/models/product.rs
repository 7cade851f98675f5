//! Product model
//!
//! A sellable item from the product catalog. Products are keyed by a string
//! id so that base datasets authored by hand (e.g. `"masala-tea-250g"`) and
//! locally created products (UUIDs) share one key space.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::money::Money;

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique, stable identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Unit price
    #[serde(default)]
    pub price: Money,

    /// Optional grouping, e.g. "Tea"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Optional variant label, e.g. "250g"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl Product {
    /// Create a product with a freshly generated id
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), name, price)
    }

    /// Create a product with an explicit id
    pub fn with_id(id: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            category: None,
            variant: None,
        }
    }

    /// Set the category (builder style)
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the variant (builder style)
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Validate the product
    pub fn validate(&self) -> Result<(), ProductValidationError> {
        if self.id.trim().is_empty() {
            return Err(ProductValidationError::EmptyId);
        }

        if self.name.trim().is_empty() {
            return Err(ProductValidationError::EmptyName);
        }

        if self.price.is_negative() {
            return Err(ProductValidationError::NegativePrice(self.price));
        }

        Ok(())
    }

    /// Case-insensitive match against name, category and variant
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        let haystack = [
            Some(self.name.as_str()),
            self.category.as_deref(),
            self.variant.as_deref(),
        ]
        .iter()
        .flatten()
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

        haystack.contains(&query)
    }

    /// Build a product from a loosely-typed base record
    ///
    /// Accepts numeric or numeric-string prices and numeric ids. Returns
    /// `None` when the record has no usable id.
    pub fn from_raw(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;

        let id = match obj.get("id")? {
            Value::String(s) if !s.trim().is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };

        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let price = match obj.get("price") {
            Some(Value::Number(n)) => n.as_f64().map(Money::from_rupees).unwrap_or_default(),
            Some(Value::String(s)) => Money::parse(s).unwrap_or_default(),
            _ => Money::zero(),
        };

        let text = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Some(Self {
            id,
            name,
            price,
            category: text("category"),
            variant: text("variant"),
        })
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            Some(variant) => write!(f, "{} ({})", self.name, variant),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Validation errors for products
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductValidationError {
    EmptyId,
    EmptyName,
    NegativePrice(Money),
}

impl fmt::Display for ProductValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "Product id cannot be empty"),
            Self::EmptyName => write!(f, "Product name cannot be empty"),
            Self::NegativePrice(price) => write!(f, "Product price cannot be negative: {}", price),
        }
    }
}

impl std::error::Error for ProductValidationError {}
