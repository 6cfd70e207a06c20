//! Order repository: checkout inserts, listings, and settlement.

use rust_decimal::Decimal;
use sqlx::PgPool;

use bluefin_core::{OrderId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem};

/// All order columns, kept in sync with [`Order`].
const ORDER_COLUMNS: &str = "id, user_id, full_name, email, phone, address, city, items_total, \
     shipping_cost, loyalty_points_used, loyalty_discount, final_total, \
     points_to_earn, status, stock_decremented_at, points_credited_at, created_at";

/// A line of a new order, priced at checkout time.
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub product_title: String,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
}

/// Parameters for creating an order.
pub struct NewOrder {
    pub user_id: Option<UserId>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub lines: Vec<NewOrderLine>,
    pub items_total: Decimal,
    pub shipping_cost: Decimal,
    pub loyalty_points_used: i32,
    pub loyalty_discount: Decimal,
    pub final_total: Decimal,
    pub points_to_earn: i32,
}

/// Counters for the admin dashboard.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DashboardStats {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub total_users: i64,
    pub total_products: i64,
    pub revenue: Decimal,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order with its lines and debit redeemed points.
    ///
    /// Runs in one transaction: the order header, every line, the balance
    /// debit, and its history entry land together or not at all.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (user_id, full_name, email, phone, address, city,
                                 items_total, shipping_cost, loyalty_points_used,
                                 loyalty_discount, final_total, points_to_earn)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.user_id)
        .bind(&order.full_name)
        .bind(&order.email)
        .bind(&order.phone)
        .bind(&order.address)
        .bind(&order.city)
        .bind(order.items_total)
        .bind(order.shipping_cost)
        .bind(order.loyalty_points_used)
        .bind(order.loyalty_discount)
        .bind(order.final_total)
        .bind(order.points_to_earn)
        .fetch_one(&mut *tx)
        .await?;

        for line in &order.lines {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, product_title, quantity, price_at_purchase)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(created.id)
            .bind(line.product_id)
            .bind(&line.product_title)
            .bind(line.quantity)
            .bind(line.price_at_purchase)
            .execute(&mut *tx)
            .await?;
        }

        // Redeemed points leave the balance immediately, not at settlement.
        if order.loyalty_points_used > 0
            && let Some(user_id) = order.user_id
        {
            sqlx::query("UPDATE users SET points = GREATEST(points - $2, 0) WHERE id = $1")
                .bind(user_id)
                .bind(order.loyalty_points_used)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                "INSERT INTO points_history (user_id, action, amount, reason)
                 VALUES ($1, 'order_redeem', $2, $3)",
            )
            .bind(user_id)
            .bind(-order.loyalty_points_used)
            .bind(format!("Order #{}", created.id))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(created)
    }

    /// Lines of an order, joined with the current product image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT i.id, i.order_id, i.product_id, i.product_title, i.quantity,
                    i.price_at_purchase, p.image
             FROM order_items i
             LEFT JOIN products p ON p.id = i.product_id
             WHERE i.order_id = $1
             ORDER BY i.id",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Orders of one customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Every order, newest first (admin listing).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Delete an order (lines cascade).
    ///
    /// # Returns
    ///
    /// Returns `true` if the order was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Transition an order to a new status, settling it when appropriate.
    ///
    /// The whole transition runs in one transaction with the order row
    /// locked (`FOR UPDATE`), so concurrent or repeated calls serialize:
    ///
    /// - Entering `VALIDATED` decrements each line's product stock (clamped
    ///   at zero), once per order, guarded by `stock_decremented_at`.
    /// - Entering `VALIDATED` or `DELIVERED` credits the pending loyalty
    ///   points to the customer, once per order, guarded by
    ///   `points_credited_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(
        &self,
        id: OrderId,
        new_status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if new_status == OrderStatus::Validated && order.stock_decremented_at.is_none() {
            sqlx::query(
                "UPDATE products p
                 SET stock = GREATEST(p.stock - i.quantity, 0)
                 FROM order_items i
                 WHERE i.order_id = $1 AND i.product_id = p.id",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;

            sqlx::query("UPDATE orders SET stock_decremented_at = now() WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            tracing::info!(order_id = %id, "stock decremented");
        }

        if new_status.credits_points()
            && order.points_credited_at.is_none()
            && order.points_to_earn > 0
            && let Some(user_id) = order.user_id
        {
            sqlx::query("UPDATE users SET points = points + $2 WHERE id = $1")
                .bind(user_id)
                .bind(order.points_to_earn)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                "INSERT INTO points_history (user_id, action, amount, reason)
                 VALUES ($1, 'order_credit', $2, $3)",
            )
            .bind(user_id)
            .bind(order.points_to_earn)
            .bind(format!("Order #{id}"))
            .execute(&mut *tx)
            .await?;

            sqlx::query("UPDATE orders SET points_credited_at = now() WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            tracing::info!(
                order_id = %id,
                user_id = %user_id,
                points = order.points_to_earn,
                "loyalty points credited"
            );
        }

        let updated = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(new_status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Dashboard counters. User and product counts are passed in by the
    /// caller so each repository only queries its own tables.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn stats(
        &self,
        total_users: i64,
        total_products: i64,
    ) -> Result<DashboardStats, RepositoryError> {
        let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;

        let pending_orders: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = 'PENDING'")
                .fetch_one(self.pool)
                .await?;

        let revenue: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(final_total), 0)
             FROM orders
             WHERE status IN ('VALIDATED', 'SHIPPED', 'DELIVERED')",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(DashboardStats {
            total_orders,
            pending_orders,
            total_users,
            total_products,
            revenue,
        })
    }
}
