//! Checkout and order history route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use bluefin_core::{OrderStatus, ProductId};

use crate::db::{OrderRepository, ProductRepository};
use crate::db::orders::{NewOrder, NewOrderLine};
use crate::error::{AppError, Result};
use crate::middleware::{OptionalUser, RequireUser};
use crate::models::Order;
use crate::services::pricing::{self, LoyaltyContext};
use crate::services::uploads;
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// One cart line as sent by the frontend.
#[derive(Debug, Deserialize)]
pub struct OrderItemInput {
    pub product_id: i32,
    pub quantity: i32,
}

/// Checkout payload. Guests must fill the contact fields; logged-in
/// customers may additionally redeem their loyalty balance.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub use_loyalty: bool,
}

/// One order line as serialized to clients.
#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub title: String,
    pub quantity: i32,
    /// Unit price snapshot taken at purchase time.
    pub price: Decimal,
    /// Line total.
    pub total: Decimal,
    pub image: Option<String>,
}

/// An order as serialized to clients (customer history and admin listing).
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: i32,
    pub client_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub status: OrderStatus,
    pub items_total: Decimal,
    pub shipping_cost: Decimal,
    pub loyalty_points_used: i32,
    pub loyalty_discount: Decimal,
    pub total_amount: Decimal,
    pub points_to_earn: i32,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

/// Build the client view of an order, fetching its lines.
pub(crate) async fn order_response(
    repo: &OrderRepository<'_>,
    order: &Order,
    base_url: &str,
) -> Result<OrderResponse> {
    let items = repo
        .items(order.id)
        .await?
        .into_iter()
        .map(|item| OrderItemResponse {
            title: item.product_title.clone(),
            quantity: item.quantity,
            price: item.price_at_purchase,
            total: item.line_total(),
            image: uploads::public_image_url(base_url, item.image.as_deref()),
        })
        .collect();

    Ok(OrderResponse {
        id: order.id.as_i32(),
        client_name: order.full_name.clone(),
        email: order.email.clone(),
        phone: order.phone.clone(),
        address: order.address.clone(),
        city: order.city.clone(),
        status: order.status,
        items_total: order.items_total,
        shipping_cost: order.shipping_cost,
        loyalty_points_used: order.loyalty_points_used,
        loyalty_discount: order.loyalty_discount,
        total_amount: order.final_total,
        points_to_earn: order.points_to_earn,
        created_at: order.created_at,
        items,
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// Create an order from the cart. Guests are allowed; logged-in customers
/// accrue loyalty points and may redeem their balance.
pub async fn create(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse> {
    for (value, field) in [
        (&req.full_name, "full_name"),
        (&req.email, "email"),
        (&req.phone, "phone"),
        (&req.address, "address"),
        (&req.city, "city"),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!(
                "The {field} field is required"
            )));
        }
    }

    if req.items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_owned()));
    }
    if req.items.iter().any(|item| item.quantity < 1) {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_owned(),
        ));
    }

    // Resolve cart lines against the catalog, snapshotting title and price.
    // Unknown product ids are skipped, as long as something remains.
    let products = ProductRepository::new(state.pool());
    let mut lines = Vec::with_capacity(req.items.len());
    let mut items_total = Decimal::ZERO;

    for item in &req.items {
        let Some(product) = products.get_by_id(ProductId::new(item.product_id)).await? else {
            tracing::warn!(product_id = item.product_id, "cart references unknown product");
            continue;
        };

        items_total += product.price * Decimal::from(item.quantity);
        lines.push(NewOrderLine {
            product_id: product.id,
            product_title: product.title.clone(),
            quantity: item.quantity,
            price_at_purchase: product.price,
        });
    }

    if lines.is_empty() {
        return Err(AppError::BadRequest("Products not found".to_owned()));
    }

    let loyalty = user.as_ref().map(|u| LoyaltyContext {
        balance: u.points,
        redeem: req.use_loyalty,
    });
    let quote = pricing::quote(items_total, loyalty);

    let orders = OrderRepository::new(state.pool());
    let order = orders
        .create(NewOrder {
            user_id: user.map(|u| u.id),
            full_name: req.full_name.trim().to_owned(),
            email: req.email.trim().to_owned(),
            phone: req.phone.trim().to_owned(),
            address: req.address.trim().to_owned(),
            city: req.city.trim().to_owned(),
            lines,
            items_total: quote.items_total,
            shipping_cost: quote.shipping_cost,
            loyalty_points_used: quote.points_used,
            loyalty_discount: quote.discount,
            final_total: quote.final_total,
            points_to_earn: quote.points_to_earn,
        })
        .await?;

    tracing::info!(order_id = %order.id, total = %order.final_total, "order created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Order created",
            "order_id": order.id,
            "total": order.final_total,
            "points_earned_pending": order.points_to_earn,
        })),
    ))
}

/// Order history of the logged-in customer, newest first.
pub async fn my_orders(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<OrderResponse>>> {
    let repo = OrderRepository::new(state.pool());
    let orders = repo.list_for_user(user.id).await?;

    let base_url = &state.config().base_url;
    let mut responses = Vec::with_capacity(orders.len());
    for order in &orders {
        responses.push(order_response(&repo, order, base_url).await?);
    }

    Ok(Json(responses))
}
