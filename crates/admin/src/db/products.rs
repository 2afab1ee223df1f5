//! Product repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use sareine_core::{Amount, ProductId};

use super::{RepositoryError, decode_json, encode_json};
use crate::models::{Product, ProductPatch};

const PRODUCT_COLUMNS: &str = "id, name, price, slug, category, in_stock, description, how_to_use, \
                               packaging, weight, image, tagline, ingredients, features, benefits, \
                               created_at, updated_at";

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    price: Decimal,
    slug: String,
    category: String,
    in_stock: bool,
    description: String,
    how_to_use: String,
    packaging: String,
    weight: String,
    image: String,
    tagline: String,
    ingredients: JsonValue,
    features: JsonValue,
    benefits: JsonValue,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            price: Amount::new(row.price),
            slug: row.slug,
            category: row.category,
            in_stock: row.in_stock,
            description: row.description,
            how_to_use: row.how_to_use,
            packaging: row.packaging,
            weight: row.weight,
            image: row.image,
            tagline: row.tagline,
            ingredients: decode_json(row.ingredients, "ingredients")?,
            features: decode_json(row.features, "features")?,
            benefits: decode_json(row.benefits, "benefits")?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products ORDER BY name ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Apply a partial update inside a transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let mut product: Product = row.ok_or(RepositoryError::NotFound)?.try_into()?;
        patch.apply(&mut product, at);
        Self::write(&mut *tx, &product).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.products WHERE id = $1")
            .bind(id.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Insert a product or replace the stored copy.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::write(&mut *conn, product).await
    }

    async fn write(
        conn: &mut sqlx::PgConnection,
        product: &Product,
    ) -> Result<(), RepositoryError> {
        let ingredients = encode_json(&product.ingredients, "ingredients")?;
        let features = encode_json(&product.features, "features")?;
        let benefits = encode_json(&product.benefits, "benefits")?;

        sqlx::query(
            r"
            INSERT INTO shop.products (id, name, price, slug, category, in_stock, description,
                                       how_to_use, packaging, weight, image, tagline,
                                       ingredients, features, benefits, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                price = EXCLUDED.price,
                slug = EXCLUDED.slug,
                category = EXCLUDED.category,
                in_stock = EXCLUDED.in_stock,
                description = EXCLUDED.description,
                how_to_use = EXCLUDED.how_to_use,
                packaging = EXCLUDED.packaging,
                weight = EXCLUDED.weight,
                image = EXCLUDED.image,
                tagline = EXCLUDED.tagline,
                ingredients = EXCLUDED.ingredients,
                features = EXCLUDED.features,
                benefits = EXCLUDED.benefits,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(product.price.value())
        .bind(&product.slug)
        .bind(&product.category)
        .bind(product.in_stock)
        .bind(&product.description)
        .bind(&product.how_to_use)
        .bind(&product.packaging)
        .bind(&product.weight)
        .bind(&product.image)
        .bind(&product.tagline)
        .bind(ingredients)
        .bind(features)
        .bind(benefits)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }
}
