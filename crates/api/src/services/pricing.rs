//! Order totals and loyalty math.
//!
//! Pure functions so the checkout arithmetic is testable without a
//! database. All monetary values are [`Decimal`]; loyalty points are whole
//! integers redeemed 1:1 against the order total.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Flat shipping fee applied to every order.
#[must_use]
pub fn shipping_cost() -> Decimal {
    Decimal::new(700, 2) // 7.00
}

/// Share of the items total earned as loyalty points.
#[must_use]
pub fn earn_rate() -> Decimal {
    Decimal::new(5, 2) // 0.05
}

/// Loyalty context of the customer placing the order.
#[derive(Debug, Clone, Copy)]
pub struct LoyaltyContext {
    /// Current point balance.
    pub balance: i32,
    /// Whether the customer asked to redeem points on this order.
    pub redeem: bool,
}

/// The priced-out order: discounts applied, points computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuote {
    pub items_total: Decimal,
    pub shipping_cost: Decimal,
    /// Points redeemed on this order (0 for guests).
    pub points_used: i32,
    /// Monetary value of the redeemed points.
    pub discount: Decimal,
    /// What the customer pays.
    pub final_total: Decimal,
    /// Points pending until settlement (0 for guests).
    pub points_to_earn: i32,
}

/// Price an order.
///
/// Guests (`customer` = `None`) neither earn nor redeem points. Logged-in
/// customers earn 5% of the items total, rounded down to whole points.
/// When redeeming, at most `min(balance, floor(items_total))` points are
/// spent, each worth one currency unit. The final total never goes below
/// zero.
#[must_use]
pub fn quote(items_total: Decimal, customer: Option<LoyaltyContext>) -> OrderQuote {
    let points_to_earn = customer
        .map(|_| whole_points(items_total * earn_rate()))
        .unwrap_or_default();

    let points_used = match customer {
        Some(ctx) if ctx.redeem && ctx.balance > 0 => {
            ctx.balance.min(whole_points(items_total))
        }
        _ => 0,
    };
    let discount = Decimal::from(points_used);

    let mut final_total = items_total + shipping_cost() - discount;
    if final_total < Decimal::ZERO {
        final_total = Decimal::ZERO;
    }

    OrderQuote {
        items_total,
        shipping_cost: shipping_cost(),
        points_used,
        discount,
        final_total,
        points_to_earn,
    }
}

/// Round a monetary amount down to whole points.
fn whole_points(amount: Decimal) -> i32 {
    amount.floor().to_i32().unwrap_or(0).max(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_guest_pays_items_plus_shipping() {
        let q = quote(dec("42.00"), None);
        assert_eq!(q.final_total, dec("49.00"));
        assert_eq!(q.points_to_earn, 0);
        assert_eq!(q.points_used, 0);
        assert_eq!(q.discount, Decimal::ZERO);
    }

    #[test]
    fn test_customer_earns_five_percent_floored() {
        let q = quote(
            dec("100.00"),
            Some(LoyaltyContext {
                balance: 0,
                redeem: false,
            }),
        );
        assert_eq!(q.points_to_earn, 5);

        // 5% of 59.90 is 2.995, floored to 2 whole points
        let q = quote(
            dec("59.90"),
            Some(LoyaltyContext {
                balance: 0,
                redeem: false,
            }),
        );
        assert_eq!(q.points_to_earn, 2);
    }

    #[test]
    fn test_redeem_capped_by_balance() {
        let q = quote(
            dec("100.00"),
            Some(LoyaltyContext {
                balance: 30,
                redeem: true,
            }),
        );
        assert_eq!(q.points_used, 30);
        assert_eq!(q.discount, dec("30"));
        assert_eq!(q.final_total, dec("77.00"));
    }

    #[test]
    fn test_redeem_capped_by_items_total() {
        let q = quote(
            dec("25.40"),
            Some(LoyaltyContext {
                balance: 500,
                redeem: true,
            }),
        );
        // floor(25.40) = 25 points max, so shipping is still paid in full
        assert_eq!(q.points_used, 25);
        assert_eq!(q.final_total, dec("7.40"));
    }

    #[test]
    fn test_no_redeem_without_flag() {
        let q = quote(
            dec("80.00"),
            Some(LoyaltyContext {
                balance: 200,
                redeem: false,
            }),
        );
        assert_eq!(q.points_used, 0);
        assert_eq!(q.final_total, dec("87.00"));
    }

    #[test]
    fn test_redeeming_still_earns_on_full_items_total() {
        let q = quote(
            dec("100.00"),
            Some(LoyaltyContext {
                balance: 40,
                redeem: true,
            }),
        );
        // Accrual is computed on the items total, not the discounted total
        assert_eq!(q.points_to_earn, 5);
        assert_eq!(q.points_used, 40);
    }
}
