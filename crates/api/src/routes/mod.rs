//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (DB connectivity)
//!
//! # Users (/api/users)
//! POST /register                        - Create account, returns tokens
//! POST /login                           - Password login, returns tokens
//! POST /google                          - Google ID token sign-in
//! POST /token/refresh                   - Exchange refresh token
//! POST /forgot-password                 - Send a 6-digit reset code
//! POST /verify-code                     - Check a reset code
//! POST /reset-password                  - Set a new password with a code
//! GET  /profile                         - Current profile (auth)
//! PUT  /profile/update                  - Partial profile update (auth)
//!
//! # Catalog (/api/products)
//! GET  /                                - Active products (category/search filters)
//! GET  /categories                      - All categories
//! POST /categories                      - Create category (admin)
//! GET  /{slug}                          - Active product by slug
//! POST /create                          - Create product, multipart (admin)
//! GET  /admin/all                       - All products incl. inactive (admin)
//! PUT  /admin/{id}                      - Update product, multipart (admin)
//! DELETE /admin/{id}                    - Delete product (admin)
//!
//! # Orders (/api/orders)
//! POST /create                          - Checkout (guest or auth)
//! GET  /my-orders                       - Own order history (auth)
//!
//! # Admin (/api/admin)
//! GET  /stats                           - Dashboard counters
//! GET  /orders                          - All orders
//! PATCH /orders/{id}/status             - Status transition / settlement
//! DELETE /orders/{id}                   - Delete order
//! GET  /users                           - All users
//! POST /users/{id}/points               - Manual loyalty correction
//! GET  /users/{id}/points               - Loyalty history
//! ```

pub mod admin;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::middleware;
use crate::state::AppState;

/// Create the user/auth routes router.
///
/// The credential-bearing endpoints sit behind the strict auth rate
/// limiter; profile reads/writes do not.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/google", post(users::google_login))
        .route("/token/refresh", post(users::refresh_token))
        .route("/forgot-password", post(users::forgot_password))
        .route("/verify-code", post(users::verify_code))
        .route("/reset-password", post(users::reset_password))
        .layer(middleware::auth_rate_limiter())
        .route("/profile", get(users::profile))
        .route("/profile/update", put(users::update_profile))
}

/// Create the catalog routes router (public + admin).
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list))
        .route(
            "/categories",
            get(products::categories).post(products::create_category),
        )
        .route("/create", post(products::create))
        .route("/admin/all", get(products::admin_list))
        .route(
            "/admin/{id}",
            put(products::update).delete(products::delete),
        )
        .route("/{slug}", get(products::show))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(orders::create))
        .route("/my-orders", get(orders::my_orders))
}

/// Create the admin dashboard routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(admin::stats))
        .route("/orders", get(admin::orders))
        .route("/orders/{id}/status", patch(admin::update_order_status))
        .route("/orders/{id}", delete(admin::delete_order))
        .route("/users", get(admin::users))
        .route(
            "/users/{id}/points",
            get(admin::points_history).post(admin::adjust_points),
        )
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/users", user_routes())
        .nest("/api/products", product_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/admin", admin_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, SentryConfig};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use std::path::PathBuf;

    fn test_state() -> AppState {
        let config = ApiConfig {
            database_url: SecretString::from("postgres://localhost/bluefin_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            base_url: "http://localhost:8000".to_string(),
            jwt_secret: SecretString::from("0Zp7mKq2Xv9Rt4Ws6Yb8Nd1Fg3Hj5Lc7"),
            media_root: PathBuf::from("media"),
            google_client_id: None,
            smtp: None,
            sentry: SentryConfig::default(),
        };

        // Lazy pool: nothing connects until a query runs
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/bluefin_test")
            .unwrap();

        AppState::new(config, pool).unwrap()
    }

    #[tokio::test]
    async fn test_router_builds_with_all_routes() {
        // Catches handler signature mismatches without a database
        let _router: axum::Router = routes().with_state(test_state());
    }
}
