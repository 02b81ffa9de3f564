use serde::{Deserialize, Serialize};

use saledash_core::{DomainError, DomainResult, RecordId};

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub RecordId);

impl ProductId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    category: String,
    /// Cost in smallest currency unit (e.g., cents).
    standard_price: u64,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        category: impl Into<String>,
        standard_price: u64,
    ) -> DomainResult<Self> {
        let name = name.into();
        let category = category.into();

        if name.trim().is_empty() {
            return Err(DomainError::validation("product name must not be empty"));
        }
        if category.trim().is_empty() {
            return Err(DomainError::validation("product category must not be empty"));
        }

        Ok(Self {
            id,
            name: name.trim().to_string(),
            category: category.trim().to_string(),
            standard_price,
        })
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn standard_price(&self) -> u64 {
        self.standard_price
    }
}
