use serde::{Deserialize, Serialize};

use marketplace_core::{DomainError, DomainResult, SellerId};

use crate::product::Product;

/// Optional predicates over a product's attributes.
///
/// A product matches when every predicate that is set holds; unset
/// predicates are ignored. An inverted price range (`min_price > max_price`)
/// simply matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductFilter {
    pub category: Option<String>,
    #[serde(alias = "seller_info")]
    pub seller_id: Option<SellerId>,
    pub condition: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_availability: Option<u32>,
    pub is_archived: Option<bool>,
    pub is_sold: Option<bool>,
}

impl ProductFilter {
    pub fn by_seller(seller_id: SellerId) -> Self {
        Self {
            seller_id: Some(seller_id),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Price bounds must be non-negative numbers. Counts are unsigned, so
    /// `min_availability` needs no check here.
    pub fn validate(&self) -> DomainResult<()> {
        let bounds = [("min_price", self.min_price), ("max_price", self.max_price)];
        for (field, bound) in bounds {
            if bound.is_some_and(|v| !v.is_finite() || v < 0.0) {
                return Err(DomainError::validation(format!(
                    "{field} must be a non-negative number"
                )));
            }
        }
        Ok(())
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.category.as_deref().is_none_or(|c| product.category() == c)
            && self.seller_id.is_none_or(|s| product.seller_id() == s)
            && self.condition.as_deref().is_none_or(|c| product.condition() == c)
            && self.min_price.is_none_or(|min| product.price() >= min)
            && self.max_price.is_none_or(|max| product.price() <= max)
            && self
                .min_availability
                .is_none_or(|min| product.availability() >= min)
            && self.is_archived.is_none_or(|a| product.is_archived() == a)
            && self.is_sold.is_none_or(|s| product.is_sold() == s)
    }
}
