//! Catalog service
//!
//! Product search and the create/update/delete contract over the product,
//! bank and company repositories. All edits land in the local overlay;
//! the base datasets are never written.

use crate::error::{GstBillError, GstBillResult};
use crate::models::{BankDetails, CompanyDetails, Money, Product};
use crate::storage::Storage;

/// Fields for a product update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Money>,
    /// `Some(None)` clears the category
    pub category: Option<Option<String>>,
    /// `Some(None)` clears the variant
    pub variant: Option<Option<String>>,
}

/// Service for catalog management
pub struct CatalogService<'a> {
    storage: &'a Storage,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// All products in the effective catalog
    pub fn list_products(&self) -> GstBillResult<Vec<Product>> {
        self.storage.products.list()
    }

    /// Products whose name, category or variant contains `query`
    pub fn search_products(&self, query: &str, limit: usize) -> GstBillResult<Vec<Product>> {
        Ok(self
            .storage
            .products
            .list()?
            .into_iter()
            .filter(|p| p.matches_query(query))
            .take(limit)
            .collect())
    }

    /// Get a product by id
    pub fn get_product(&self, id: &str) -> GstBillResult<Option<Product>> {
        self.storage.products.get(id)
    }

    /// Find a product by id, or failing that by exact name (case-insensitive)
    pub fn find_product(&self, identifier: &str) -> GstBillResult<Option<Product>> {
        let products = self.storage.products.list()?;
        if let Some(product) = products.iter().find(|p| p.id == identifier) {
            return Ok(Some(product.clone()));
        }

        let needle = identifier.trim().to_lowercase();
        Ok(products
            .into_iter()
            .find(|p| p.name.trim().to_lowercase() == needle))
    }

    /// Create a product
    ///
    /// A fresh id is generated unless one is supplied. Creating over an
    /// existing id is rejected; use [`CatalogService::update_product`].
    pub fn create_product(
        &self,
        id: Option<&str>,
        name: &str,
        price: Money,
        category: Option<String>,
        variant: Option<String>,
    ) -> GstBillResult<Product> {
        let mut product = match id {
            Some(id) => Product::with_id(id.trim(), name.trim(), price),
            None => Product::new(name.trim(), price),
        };
        product.category = category.filter(|c| !c.trim().is_empty());
        product.variant = variant.filter(|v| !v.trim().is_empty());

        product
            .validate()
            .map_err(|e| GstBillError::Validation(e.to_string()))?;

        if self.storage.products.get(&product.id)?.is_some() {
            return Err(GstBillError::Validation(format!(
                "Product '{}' already exists",
                product.id
            )));
        }

        self.storage.products.upsert(product.clone())?;
        tracing::info!(id = %product.id, name = %product.name, "created product");
        Ok(product)
    }

    /// Update an existing product
    pub fn update_product(&self, id: &str, update: ProductUpdate) -> GstBillResult<Product> {
        let mut product = self
            .storage
            .products
            .get(id)?
            .ok_or_else(|| GstBillError::product_not_found(id))?;

        if let Some(name) = update.name {
            product.name = name.trim().to_string();
        }
        if let Some(price) = update.price {
            product.price = price;
        }
        if let Some(category) = update.category {
            product.category = category.filter(|c| !c.trim().is_empty());
        }
        if let Some(variant) = update.variant {
            product.variant = variant.filter(|v| !v.trim().is_empty());
        }

        product
            .validate()
            .map_err(|e| GstBillError::Validation(e.to_string()))?;

        self.storage.products.upsert(product.clone())?;
        tracing::info!(id = %product.id, "updated product");
        Ok(product)
    }

    /// Remove a product from the effective catalog
    pub fn delete_product(&self, id: &str) -> GstBillResult<Product> {
        let product = self
            .storage
            .products
            .get(id)?
            .ok_or_else(|| GstBillError::product_not_found(id))?;

        self.storage.products.delete(id)?;
        tracing::info!(id, "deleted product");
        Ok(product)
    }

    /// Discard every local product edit
    pub fn reset_products(&self) -> GstBillResult<()> {
        self.storage.products.clear_overrides()?;
        tracing::info!("cleared product overrides");
        Ok(())
    }

    /// Effective bank details
    pub fn bank(&self) -> GstBillResult<BankDetails> {
        self.storage.bank.get()
    }

    /// Replace the bank details with a local override
    pub fn save_bank(&self, details: BankDetails) -> GstBillResult<()> {
        self.storage.bank.save(details)
    }

    /// Drop the bank override
    pub fn reset_bank(&self) -> GstBillResult<()> {
        self.storage.bank.delete()
    }

    /// Effective company details
    pub fn company(&self) -> GstBillResult<CompanyDetails> {
        self.storage.company.get()
    }

    /// Replace the company details with a local override
    pub fn save_company(&self, details: CompanyDetails) -> GstBillResult<()> {
        self.storage.company.save(details)
    }

    /// Drop the company override
    pub fn reset_company(&self) -> GstBillResult<()> {
        self.storage.company.delete()
    }
}
