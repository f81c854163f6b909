use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marketplace_core::{DomainError, DomainResult, Entity, ProductId, SellerId};

/// A product listing as held by the catalog.
///
/// Records are only ever built through [`Product::create`] and only ever
/// mutated by the store, so the field constraints checked there hold for
/// every record a caller can observe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub(crate) id: ProductId,
    pub(crate) name: String,
    pub(crate) category: String,
    pub(crate) seller_id: SellerId,
    pub(crate) description: String,
    pub(crate) availability: u32,
    pub(crate) price: f64,
    pub(crate) condition: String,
    pub(crate) quantity: u32,
    pub(crate) is_archived: bool,
    pub(crate) is_sold: bool,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a fresh record from a validated create request.
    ///
    /// Assigns a new identifier when the request does not carry one. Both
    /// lifecycle flags start out `false`.
    pub fn create(input: NewProduct, now: DateTime<Utc>) -> DomainResult<Self> {
        require_text("name", &input.name)?;
        require_text("category", &input.category)?;
        require_text("description", &input.description)?;
        require_text("condition", &input.condition)?;
        let availability = require_count("availability", input.availability)?;
        let quantity = require_count("quantity", input.quantity)?;
        require_price(input.price)?;

        Ok(Self {
            id: input.id.unwrap_or_default(),
            name: input.name,
            category: input.category,
            seller_id: input.seller_id,
            description: input.description,
            availability,
            price: input.price,
            condition: input.condition,
            quantity,
            is_archived: false,
            is_sold: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn seller_id(&self) -> SellerId {
        self.seller_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn availability(&self) -> u32 {
        self.availability
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn is_archived(&self) -> bool {
        self.is_archived
    }

    pub fn is_sold(&self) -> bool {
        self.is_sold
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

/// Create request.
///
/// Counts are signed so that a negative value from the wire surfaces as a
/// validation error instead of a deserialization failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    #[serde(default, alias = "prod_id")]
    pub id: Option<ProductId>,
    #[serde(alias = "prod_name")]
    pub name: String,
    pub category: String,
    #[serde(alias = "seller_info")]
    pub seller_id: SellerId,
    pub description: String,
    pub availability: i64,
    pub price: f64,
    pub condition: String,
    pub quantity: i64,
}

/// Partial update. `None` means "leave the field as it is".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPatch {
    #[serde(alias = "prod_name")]
    pub name: Option<String>,
    pub category: Option<String>,
    #[serde(alias = "seller_info")]
    pub seller_id: Option<SellerId>,
    pub description: Option<String>,
    pub availability: Option<i64>,
    pub price: Option<f64>,
    pub condition: Option<String>,
    pub quantity: Option<i64>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Check every present field against the same constraints `create` uses.
    pub fn validate(&self) -> DomainResult<()> {
        let texts = [
            ("name", &self.name),
            ("category", &self.category),
            ("description", &self.description),
            ("condition", &self.condition),
        ];
        for (field, value) in texts {
            if let Some(value) = value {
                require_text(field, value)?;
            }
        }
        if let Some(n) = self.availability {
            require_count("availability", n)?;
        }
        if let Some(n) = self.quantity {
            require_count("quantity", n)?;
        }
        if let Some(price) = self.price {
            require_price(price)?;
        }
        Ok(())
    }

    /// Merge the present fields into `product`.
    ///
    /// Validates before touching anything, so on error `product` is unchanged.
    pub fn apply_to(&self, product: &mut Product) -> DomainResult<()> {
        self.validate()?;

        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(seller_id) = self.seller_id {
            product.seller_id = seller_id;
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(n) = self.availability {
            product.availability = require_count("availability", n)?;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(condition) = &self.condition {
            product.condition = condition.clone();
        }
        if let Some(n) = self.quantity {
            product.quantity = require_count("quantity", n)?;
        }
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_count(field: &str, value: i64) -> DomainResult<u32> {
    if value < 0 {
        return Err(DomainError::validation(format!("{field} cannot be negative")));
    }
    u32::try_from(value)
        .map_err(|_| DomainError::validation(format!("{field} is too large")))
}

fn require_price(price: f64) -> DomainResult<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(DomainError::validation("price must be greater than zero"));
    }
    Ok(())
}

/// Convert a requested availability into a stored count.
///
/// Unlike the create/update fields, a bad availability here is an argument
/// error: the caller asked for an impossible stock level.
pub(crate) fn availability_arg(value: i64) -> DomainResult<u32> {
    if value < 0 {
        return Err(DomainError::invalid_argument("availability cannot be negative"));
    }
    u32::try_from(value)
        .map_err(|_| DomainError::invalid_argument("availability is too large"))
}
