//! Loyalty points history row type.

use chrono::{DateTime, Utc};

use bluefin_core::UserId;

/// One loyalty balance movement.
///
/// `admin_id` is set for manual corrections and `None` for movements
/// produced by checkout or settlement.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct PointsEntry {
    pub id: i32,
    pub user_id: UserId,
    pub admin_id: Option<UserId>,
    /// Movement kind, e.g. `order_redeem`, `order_credit`, `admin_adjust`.
    pub action: String,
    /// Signed point delta.
    pub amount: i32,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
