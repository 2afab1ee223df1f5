//! Product catalogue types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sareine_core::{Amount, ProductId};

/// Category applied when a new product does not name one.
pub const DEFAULT_CATEGORY: &str = "lip-care";

/// A catalogue product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Amount,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub how_to_use: String,
    #[serde(default)]
    pub packaging: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default, with = "sareine_core::timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "sareine_core::timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

const fn default_true() -> bool {
    true
}

/// Returned when a create request lacks name, slug or price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Missing required fields: name, slug, price")]
pub struct MissingProductFields;

/// Body of a product create request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewProduct {
    pub name: Option<String>,
    pub price: Option<Amount>,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub in_stock: Option<bool>,
    pub description: Option<String>,
    pub how_to_use: Option<String>,
    pub packaging: Option<String>,
    pub weight: Option<String>,
    pub image: Option<String>,
    pub tagline: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
}

impl NewProduct {
    /// Build the stored product, applying defaults for everything optional.
    ///
    /// # Errors
    ///
    /// Returns [`MissingProductFields`] when name or slug is empty or price
    /// is absent.
    pub fn into_product(
        self,
        id: ProductId,
        now: DateTime<Utc>,
    ) -> Result<Product, MissingProductFields> {
        let name = self.name.filter(|s| !s.trim().is_empty());
        let slug = self.slug.filter(|s| !s.trim().is_empty());
        let (Some(name), Some(slug), Some(price)) = (name, slug, self.price) else {
            return Err(MissingProductFields);
        };

        Ok(Product {
            id,
            name,
            price,
            slug,
            category: self
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            in_stock: self.in_stock != Some(false),
            description: self.description.unwrap_or_default(),
            how_to_use: self.how_to_use.unwrap_or_default(),
            packaging: self.packaging.unwrap_or_default(),
            weight: self.weight.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
            tagline: self.tagline.unwrap_or_default(),
            ingredients: self.ingredients.unwrap_or_default(),
            features: self.features.unwrap_or_default(),
            benefits: self.benefits.unwrap_or_default(),
            created_at: Some(now),
            updated_at: Some(now),
        })
    }
}

/// Partial update; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Amount>,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub in_stock: Option<bool>,
    pub description: Option<String>,
    pub how_to_use: Option<String>,
    pub packaging: Option<String>,
    pub weight: Option<String>,
    pub image: Option<String>,
    pub tagline: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
}

impl ProductPatch {
    /// Apply the supplied fields to `product` and stamp `updated_at`.
    pub fn apply(&self, product: &mut Product, now: DateTime<Utc>) {
        fn set<T: Clone>(slot: &mut T, value: Option<&T>) {
            if let Some(v) = value {
                slot.clone_from(v);
            }
        }

        set(&mut product.name, self.name.as_ref());
        set(&mut product.price, self.price.as_ref());
        set(&mut product.slug, self.slug.as_ref());
        set(&mut product.category, self.category.as_ref());
        set(&mut product.in_stock, self.in_stock.as_ref());
        set(&mut product.description, self.description.as_ref());
        set(&mut product.how_to_use, self.how_to_use.as_ref());
        set(&mut product.packaging, self.packaging.as_ref());
        set(&mut product.weight, self.weight.as_ref());
        set(&mut product.image, self.image.as_ref());
        set(&mut product.tagline, self.tagline.as_ref());
        set(&mut product.ingredients, self.ingredients.as_ref());
        set(&mut product.features, self.features.as_ref());
        set(&mut product.benefits, self.benefits.as_ref());
        product.updated_at = Some(now);
    }
}
