//! Product and category repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use bluefin_core::{CategoryId, ProductId, slugify};

use super::RepositoryError;
use crate::models::{Category, Product};

/// Product columns joined with the category, kept in sync with [`Product`].
const PRODUCT_COLUMNS: &str = "p.id, p.title, p.slug, p.price, p.stock, p.description, \
     p.category_id, p.image, p.is_active, p.created_at, \
     c.name AS category_name, c.slug AS category_slug";

/// Parameters for creating a product.
pub struct CreateProduct<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: CategoryId,
    pub image: Option<&'a str>,
    pub is_active: bool,
}

/// Partial product update; `None` fields are left unchanged.
#[derive(Debug, Default)]
pub struct UpdateProduct {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub category_id: Option<CategoryId>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products for the public catalog.
    ///
    /// `category_slug` restricts to one category; an unknown slug simply
    /// matches nothing. `search` is a case-insensitive title substring.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_public(
        &self,
        category_slug: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM products p
             LEFT JOIN categories c ON c.id = p.category_id
             WHERE p.is_active
               AND ($1::text IS NULL OR c.slug = $1)
               AND ($2::text IS NULL OR p.title ILIKE '%' || $2 || '%')
             ORDER BY p.created_at DESC"
        ))
        .bind(category_slug)
        .bind(search)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Get an active product by its slug (public detail page).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM products p
             LEFT JOIN categories c ON c.id = p.category_id
             WHERE p.slug = $1 AND p.is_active"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Get a product by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM products p
             LEFT JOIN categories c ON c.id = p.category_id
             WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// List every product, including inactive ones (admin listing).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM products p
             LEFT JOIN categories c ON c.id = p.category_id
             ORDER BY p.created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Create a product; the slug is derived from the title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a product with the same slug exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, params: CreateProduct<'_>) -> Result<Product, RepositoryError> {
        let slug = slugify(params.title);

        let id: ProductId = sqlx::query_scalar(
            "INSERT INTO products (title, slug, price, stock, description, category_id, image, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id",
        )
        .bind(params.title)
        .bind(&slug)
        .bind(params.price)
        .bind(params.stock)
        .bind(params.description)
        .bind(params.category_id)
        .bind(params.image)
        .bind(params.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!(
                    "a product with slug '{slug}' already exists"
                ));
            }
            RepositoryError::Database(e)
        })?;

        self.get_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Apply a partial product update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        update: &UpdateProduct,
    ) -> Result<Product, RepositoryError> {
        let updated: Option<ProductId> = sqlx::query_scalar(
            "UPDATE products
             SET title       = COALESCE($2, title),
                 description = COALESCE($3, description),
                 price       = COALESCE($4, price),
                 stock       = COALESCE($5, stock),
                 category_id = COALESCE($6, category_id),
                 image       = COALESCE($7, image),
                 is_active   = COALESCE($8, is_active)
             WHERE id = $1
             RETURNING id",
        )
        .bind(id)
        .bind(update.title.as_deref())
        .bind(update.description.as_deref())
        .bind(update.price)
        .bind(update.stock)
        .bind(update.category_id)
        .bind(update.image.as_deref())
        .bind(update.is_active)
        .fetch_optional(self.pool)
        .await?;

        let Some(id) = updated else {
            return Err(RepositoryError::NotFound);
        };

        self.get_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Total number of products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List all categories for the navigation menu.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name, slug FROM categories ORDER BY name")
                .fetch_all(self.pool)
                .await?;

        Ok(categories)
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let category =
            sqlx::query_as::<_, Category>("SELECT id, name, slug FROM categories WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(category)
    }

    /// Create a category; the slug is derived from the name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name or slug already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_category(&self, name: &str) -> Result<Category, RepositoryError> {
        let slug = slugify(name);

        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING id, name, slug",
        )
        .bind(name)
        .bind(&slug)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("category already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(category)
    }
}
