use serde::{Deserialize, Serialize};

use crate::filter::ProductFilter;
use crate::product::Product;

/// Free-text query plus optional filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default)]
    pub filters: Option<ProductFilter>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filters: None,
        }
    }

    pub fn with_filters(mut self, filters: ProductFilter) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Keep the products that pass the filters and contain the query text,
    /// preserving their input order.
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        let needle = self.query.to_lowercase();
        products
            .into_iter()
            .filter(|p| self.passes_filters(p) && text_matches(p, &needle))
            .collect()
    }

    fn passes_filters(&self, product: &Product) -> bool {
        self.filters.as_ref().is_none_or(|f| f.matches(product))
    }
}

// `needle` must already be lowercased. Empty needles match everything.
fn text_matches(product: &Product, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [product.name(), product.description(), product.category()]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}
