//! Admin dashboard route handlers: stats, order management (including
//! settlement), user listing, and manual loyalty corrections.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;

use bluefin_core::{OrderId, OrderStatus, UserId};

use crate::db::orders::DashboardStats;
use crate::db::{OrderRepository, ProductRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{PointsEntry, User};
use crate::routes::orders::{OrderResponse, order_response};
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Status transition payload.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Manual loyalty correction payload.
#[derive(Debug, Deserialize)]
pub struct AdjustPointsRequest {
    /// Signed point delta; the balance is clamped at zero.
    pub amount: i32,
    pub reason: Option<String>,
}

/// A user row in the admin listing.
#[derive(Debug, Serialize)]
pub struct AdminUserResponse {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub points: i32,
    pub is_admin: bool,
    pub is_active: bool,
    pub auth_provider: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl AdminUserResponse {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id.as_i32(),
            email: user.email.to_string(),
            name: user.full_name(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            points: user.points,
            is_admin: user.is_admin,
            is_active: user.is_active,
            auth_provider: user.auth_provider.clone(),
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Dashboard counters.
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<DashboardStats>> {
    let total_users = UserRepository::new(state.pool()).count().await?;
    let total_products = ProductRepository::new(state.pool()).count().await?;

    let stats = OrderRepository::new(state.pool())
        .stats(total_users, total_products)
        .await?;

    Ok(Json(stats))
}

/// Every order, newest first.
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<OrderResponse>>> {
    let repo = OrderRepository::new(state.pool());
    let orders = repo.list_all().await?;

    let base_url = &state.config().base_url;
    let mut responses = Vec::with_capacity(orders.len());
    for order in &orders {
        responses.push(order_response(&repo, order, base_url).await?);
    }

    Ok(Json(responses))
}

/// Transition an order to a new status, settling it when appropriate.
///
/// Entering `VALIDATED` decrements stock; entering `VALIDATED` or
/// `DELIVERED` credits the customer's pending points. Both happen at most
/// once per order, however often this endpoint is called.
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(order_id): Path<i32>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>> {
    let new_status = OrderStatus::from_str(&req.status)
        .map_err(|_| AppError::BadRequest(format!("Unknown status: {}", req.status)))?;

    let repo = OrderRepository::new(state.pool());
    let order = repo
        .update_status(OrderId::new(order_id), new_status)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Order not found".to_owned())
            }
            other => AppError::Database(other),
        })?;

    tracing::info!(order_id = %order.id, admin_id = %admin.id, status = %new_status, "order status updated");

    let response = order_response(&repo, &order, &state.config().base_url).await?;

    Ok(Json(json!({
        "message": format!("Status updated: {new_status}"),
        "order": response,
    })))
}

/// Delete an order (its lines cascade).
pub async fn delete_order(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(order_id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    let repo = OrderRepository::new(state.pool());

    if !repo.delete(OrderId::new(order_id)).await? {
        return Err(AppError::NotFound("Order not found".to_owned()));
    }

    tracing::info!(order_id, admin_id = %admin.id, "order deleted");

    Ok(Json(json!({ "message": "Order deleted" })))
}

/// Every user account, newest first.
pub async fn users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<AdminUserResponse>>> {
    let repo = UserRepository::new(state.pool());
    let users = repo.list_all().await?;

    Ok(Json(
        users.iter().map(AdminUserResponse::from_user).collect(),
    ))
}

/// Manually adjust a user's loyalty balance.
pub async fn adjust_points(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<i32>,
    Json(req): Json<AdjustPointsRequest>,
) -> Result<Json<serde_json::Value>> {
    if req.amount == 0 {
        return Err(AppError::BadRequest("Amount must be non-zero".to_owned()));
    }

    let repo = UserRepository::new(state.pool());
    let new_balance = repo
        .adjust_points(
            UserId::new(user_id),
            req.amount,
            "admin_adjust",
            Some(admin.id),
            req.reason.as_deref(),
        )
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => AppError::NotFound("User not found".to_owned()),
            other => AppError::Database(other),
        })?;

    tracing::info!(user_id, admin_id = %admin.id, amount = req.amount, "loyalty balance adjusted");

    Ok(Json(json!({ "points": new_balance })))
}

/// Loyalty history of one user, newest first.
pub async fn points_history(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<PointsEntry>>> {
    let repo = UserRepository::new(state.pool());
    Ok(Json(repo.points_history(UserId::new(user_id)).await?))
}
