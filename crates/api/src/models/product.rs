//! Product catalog row types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use bluefin_core::{CategoryId, ProductId};

/// A product category.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// A catalog product, joined with its category for display.
///
/// `category_name` / `category_slug` come from a LEFT JOIN and are `None`
/// for uncategorized products.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    pub title: String,
    /// URL slug, unique, derived from the title when not supplied.
    pub slug: String,
    pub price: Decimal,
    /// Units on hand; clamped at zero by settlement.
    pub stock: i32,
    pub description: String,
    pub category_id: Option<CategoryId>,
    /// Relative media path (e.g. `products/abc123.jpg`) or a full URL for
    /// externally hosted images.
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
}
