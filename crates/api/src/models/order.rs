//! Order row types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use bluefin_core::{OrderId, OrderStatus, ProductId, UserId};

/// An order header.
///
/// `user_id` is `None` for guest checkouts. The two settlement markers
/// record that the stock decrement / point credit already ran, so repeated
/// status updates cannot apply either twice.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    /// Sum of line totals at purchase-time prices.
    pub items_total: Decimal,
    pub shipping_cost: Decimal,
    /// Points redeemed against this order (debited at creation).
    pub loyalty_points_used: i32,
    /// Monetary value of the redeemed points (1 point = 1 currency unit).
    pub loyalty_discount: Decimal,
    /// What the customer pays: items + shipping - discount, floored at 0.
    pub final_total: Decimal,
    /// Points pending until settlement (5% of the items total).
    pub points_to_earn: i32,
    pub status: OrderStatus,
    pub stock_decremented_at: Option<DateTime<Utc>>,
    pub points_credited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// An order line, joined with the product image for display.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: OrderId,
    /// `None` once the product has been deleted from the catalog.
    pub product_id: Option<ProductId>,
    /// Title snapshot taken at purchase time.
    pub product_title: String,
    pub quantity: i32,
    /// Unit price snapshot taken at purchase time.
    pub price_at_purchase: Decimal,
    /// Current product image, if the product still exists.
    pub image: Option<String>,
}

impl OrderItem {
    /// Line total at the snapshotted unit price.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price_at_purchase * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_line_total() {
        let item = OrderItem {
            id: 1,
            order_id: OrderId::new(1),
            product_id: Some(ProductId::new(2)),
            product_title: "Braided line 150m".to_string(),
            quantity: 3,
            price_at_purchase: Decimal::from_str("12.50").unwrap(),
            image: None,
        };
        assert_eq!(item.line_total(), Decimal::from_str("37.50").unwrap());
    }
}
