//! Catalog route handlers.
//!
//! Public listing/detail plus the admin CRUD. Admin create/update accept
//! multipart forms so the dashboard can upload a product image alongside
//! the fields.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use bluefin_core::{CategoryId, ProductId};

use crate::db::ProductRepository;
use crate::db::products::{CreateProduct, UpdateProduct};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Category, Product};
use crate::services::uploads;
use crate::state::AppState;

// =============================================================================
// Query / Request Types
// =============================================================================

/// Public listing filters.
#[derive(Debug, Deserialize, Default)]
pub struct ProductListQuery {
    /// Category slug filter.
    pub category: Option<String>,
    /// Case-insensitive title search.
    pub search: Option<String>,
}

/// Category creation payload.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

// =============================================================================
// Response Types
// =============================================================================

/// Category as embedded in a product response.
#[derive(Debug, Serialize)]
pub struct CategoryRef {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

/// Product as serialized to clients.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub price: Decimal,
    pub stock: i32,
    pub description: String,
    pub category: Option<CategoryRef>,
    /// Absolute image URL, or `None` when the product has no image.
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ProductResponse {
    /// Build the client view, resolving the image to an absolute URL.
    pub(crate) fn from_product(product: &Product, base_url: &str) -> Self {
        let category = match (&product.category_id, &product.category_name) {
            (Some(id), Some(name)) => Some(CategoryRef {
                id: id.as_i32(),
                name: name.clone(),
                slug: product.category_slug.clone().unwrap_or_default(),
            }),
            _ => None,
        };

        Self {
            id: product.id.as_i32(),
            title: product.title.clone(),
            slug: product.slug.clone(),
            price: product.price,
            stock: product.stock,
            description: product.description.clone(),
            category,
            image: uploads::public_image_url(base_url, product.image.as_deref()),
            is_active: product.is_active,
            created_at: product.created_at,
        }
    }
}

// =============================================================================
// Public Handlers
// =============================================================================

/// Public product listing (active products only).
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Vec<ProductResponse>>> {
    let repo = ProductRepository::new(state.pool());
    let products = repo
        .list_public(query.category.as_deref(), query.search.as_deref())
        .await?;

    let base_url = &state.config().base_url;
    Ok(Json(
        products
            .iter()
            .map(|p| ProductResponse::from_product(p, base_url))
            .collect(),
    ))
}

/// Category listing for the navigation menu.
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let repo = ProductRepository::new(state.pool());
    Ok(Json(repo.list_categories().await?))
}

/// Public product detail by slug.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductResponse>> {
    let repo = ProductRepository::new(state.pool());
    let product = repo
        .get_active_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    Ok(Json(ProductResponse::from_product(
        &product,
        &state.config().base_url,
    )))
}

// =============================================================================
// Admin Handlers
// =============================================================================

/// Admin listing of every product, including inactive ones.
pub async fn admin_list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<ProductResponse>>> {
    let repo = ProductRepository::new(state.pool());
    let products = repo.list_all().await?;

    let base_url = &state.config().base_url;
    Ok(Json(
        products
            .iter()
            .map(|p| ProductResponse::from_product(p, base_url))
            .collect(),
    ))
}

/// Create a product from a multipart form.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let form = ProductForm::from_multipart(multipart).await?;

    let title = form
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Title is required".to_owned()))?;
    let price = form
        .price
        .ok_or_else(|| AppError::BadRequest("Price is required".to_owned()))?;
    let category_id = form
        .category_id
        .ok_or_else(|| AppError::BadRequest("Category is required".to_owned()))?;

    let repo = ProductRepository::new(state.pool());
    if repo.get_category(category_id).await?.is_none() {
        return Err(AppError::BadRequest("Invalid category".to_owned()));
    }

    let image = match &form.image {
        Some(upload) => Some(save_image(&state, upload).await?),
        None => None,
    };

    let product = repo
        .create(CreateProduct {
            title,
            description: form.description.as_deref().unwrap_or(""),
            price,
            stock: form.stock.unwrap_or(0),
            category_id,
            image: image.as_deref(),
            is_active: form.is_active.unwrap_or(true),
        })
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::Conflict(msg) => AppError::BadRequest(msg),
            other => AppError::Database(other),
        })?;

    tracing::info!(product_id = %product.id, "product created");

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse::from_product(
            &product,
            &state.config().base_url,
        )),
    ))
}

/// Update a product from a multipart form; absent fields are unchanged.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<ProductResponse>> {
    let form = ProductForm::from_multipart(multipart).await?;
    let repo = ProductRepository::new(state.pool());

    // An unknown category id is ignored rather than failing the update
    let category_id = match form.category_id {
        Some(id) => repo.get_category(id).await?.map(|c| c.id),
        None => None,
    };

    let image = match &form.image {
        Some(upload) => Some(save_image(&state, upload).await?),
        None => None,
    };

    let product = repo
        .update(
            ProductId::new(id),
            &UpdateProduct {
                title: form.title,
                description: form.description,
                price: form.price,
                stock: form.stock,
                category_id,
                image,
                is_active: form.is_active,
            },
        )
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Product not found".to_owned())
            }
            other => AppError::Database(other),
        })?;

    Ok(Json(ProductResponse::from_product(
        &product,
        &state.config().base_url,
    )))
}

/// Delete a product.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    let repo = ProductRepository::new(state.pool());

    if !repo.delete(ProductId::new(id)).await? {
        return Err(AppError::NotFound("Product not found".to_owned()));
    }

    Ok(Json(json!({ "message": "Product deleted" })))
}

/// Create a category.
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_owned()));
    }

    let repo = ProductRepository::new(state.pool());
    let category = repo.create_category(name).await.map_err(|e| match e {
        crate::db::RepositoryError::Conflict(msg) => AppError::BadRequest(msg),
        other => AppError::Database(other),
    })?;

    Ok((StatusCode::CREATED, Json(category)))
}

// =============================================================================
// Multipart Form Parsing
// =============================================================================

/// An uploaded image: original filename plus raw bytes.
struct ImageUpload {
    filename: Option<String>,
    bytes: Vec<u8>,
}

/// Fields of the admin product form. Everything is optional at parse time;
/// create/update decide what is required.
#[derive(Default)]
struct ProductForm {
    title: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    stock: Option<i32>,
    category_id: Option<CategoryId>,
    is_active: Option<bool>,
    image: Option<ImageUpload>,
}

impl ProductForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match name.as_str() {
                "image" => {
                    let filename = field.file_name().map(str::to_owned);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("invalid image upload: {e}")))?;
                    if !bytes.is_empty() {
                        form.image = Some(ImageUpload {
                            filename,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                _ => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("invalid field {name}: {e}")))?;
                    form.set_text_field(&name, &text)?;
                }
            }
        }

        Ok(form)
    }

    fn set_text_field(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "title" => self.title = Some(value.to_owned()),
            "description" => self.description = Some(value.to_owned()),
            "price" => {
                let price = Decimal::from_str(value)
                    .map_err(|_| AppError::BadRequest("Invalid price".to_owned()))?;
                self.price = Some(price);
            }
            "stock" => {
                let stock = value
                    .parse::<i32>()
                    .map_err(|_| AppError::BadRequest("Invalid stock".to_owned()))?;
                self.stock = Some(stock);
            }
            "category" => {
                let id = value
                    .parse::<i32>()
                    .map_err(|_| AppError::BadRequest("Invalid category".to_owned()))?;
                self.category_id = Some(CategoryId::new(id));
            }
            "is_active" => {
                self.is_active = Some(matches!(value, "true" | "True" | "1"));
            }
            // Unknown fields are ignored so the dashboard can evolve freely
            _ => {}
        }

        Ok(())
    }
}

/// Store an uploaded image and return its relative media path.
async fn save_image(state: &AppState, upload: &ImageUpload) -> Result<String> {
    uploads::save_product_image(
        &state.config().media_root,
        upload.filename.as_deref(),
        &upload.bytes,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "failed to store product image");
        AppError::Internal("failed to store image".to_owned())
    })
}
