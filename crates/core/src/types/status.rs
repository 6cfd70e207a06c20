//! Order lifecycle status.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// Orders start `Pending`. An admin moves them forward; entering
/// `Validated` triggers stock decrement, and entering `Validated` or
/// `Delivered` triggers the loyalty point credit (each at most once per
/// order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "UPPERCASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Validated,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether orders in this status count toward dashboard revenue.
    #[must_use]
    pub const fn counts_toward_revenue(self) -> bool {
        matches!(self, Self::Validated | Self::Shipped | Self::Delivered)
    }

    /// Whether entering this status credits pending loyalty points.
    #[must_use]
    pub const fn credits_points(self) -> bool {
        matches!(self, Self::Validated | Self::Delivered)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Validated => "VALIDATED",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "VALIDATED" => Ok(Self::Validated),
            "SHIPPED" => Ok(Self::Shipped),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_display_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Validated,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::from_str(&status.to_string()).unwrap(), status);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!(OrderStatus::from_str("REFUNDED").is_err());
        assert!(OrderStatus::from_str("pending").is_err());
    }

    #[test]
    fn test_revenue_statuses() {
        assert!(OrderStatus::Validated.counts_toward_revenue());
        assert!(OrderStatus::Shipped.counts_toward_revenue());
        assert!(OrderStatus::Delivered.counts_toward_revenue());
        assert!(!OrderStatus::Pending.counts_toward_revenue());
        assert!(!OrderStatus::Cancelled.counts_toward_revenue());
    }

    #[test]
    fn test_credit_statuses() {
        assert!(OrderStatus::Validated.credits_points());
        assert!(OrderStatus::Delivered.credits_points());
        assert!(!OrderStatus::Shipped.credits_points());
    }

    #[test]
    fn test_serde_uppercase() {
        let json = serde_json::to_string(&OrderStatus::Validated).unwrap();
        assert_eq!(json, "\"VALIDATED\"");
        let parsed: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }
}
