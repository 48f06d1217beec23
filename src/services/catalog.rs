use crate::models::{BudgetTier, Concern, Product, ProductCategory, SkinType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading or editing the product catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Catalog parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Duplicate product id: {0}")]
    DuplicateId(String),

    #[error("Product not found: {0}")]
    NotFound(String),
}

/// On-disk layout: `{"products": [...]}`
#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    products: Vec<Product>,
}

/// In-memory product catalog
///
/// Read-only while requests are being served; shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        catalog.extend(products)?;
        Ok(catalog)
    }

    /// Load a JSON catalog file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let raw = tokio::fs::read(path.as_ref()).await?;
        let file: CatalogFile = serde_json::from_slice(&raw)?;
        Self::new(file.products)
    }

    /// Load the catalog at `path`, falling back to the built-in samples
    pub async fn load_or_sample(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::info!("No catalog path configured, using sample products");
            return Self::sample();
        };

        match Self::load(path).await {
            Ok(catalog) => {
                tracing::info!("Loaded {} products from {}", catalog.len(), path.display());
                catalog
            }
            Err(e) => {
                tracing::warn!("Failed to load catalog from {} ({}), using sample products", path.display(), e);
                Self::sample()
            }
        }
    }

    /// Persist the catalog as pretty-printed JSON
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CatalogError> {
        let file = CatalogFile {
            products: self.products.clone(),
        };
        let json = serde_json::to_vec_pretty(&file)?;
        tokio::fs::write(path.as_ref(), json).await?;
        Ok(())
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get_product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    /// Append products; the batch is rejected whole if any id is already taken
    pub fn extend(&mut self, products: Vec<Product>) -> Result<usize, CatalogError> {
        let mut ids: BTreeSet<&str> = self.products.iter().map(|p| p.id.as_str()).collect();
        for product in &products {
            if !ids.insert(product.id.as_str()) {
                return Err(CatalogError::DuplicateId(product.id.clone()));
            }
        }

        let added = products.len();
        self.products.extend(products);
        Ok(added)
    }

    /// Available products of one category, best rated first
    pub fn in_category(&self, category: ProductCategory, limit: usize) -> Vec<&Product> {
        let mut found: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| p.available && p.category == category)
            .collect();

        sort_by_rating(&mut found);
        found.truncate(limit);
        found
    }

    /// Best rated available products across the whole catalog
    pub fn trending(&self, limit: usize) -> Vec<&Product> {
        let mut found: Vec<&Product> = self.products.iter().filter(|p| p.available).collect();

        sort_by_rating(&mut found);
        found.truncate(limit);
        found
    }

    /// Case-insensitive name or brand search, best rated first
    pub fn search(&self, term: &str, limit: usize) -> Vec<&Product> {
        let term = term.trim().to_lowercase();
        let mut found: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| p.available)
            .filter(|p| p.name.to_lowercase().contains(&term) || p.brand.to_lowercase().contains(&term))
            .collect();

        sort_by_rating(&mut found);
        found.truncate(limit);
        found
    }

    /// Same-category products in the target budget tier, best rated first
    pub fn alternatives(
        &self,
        product_id: &str,
        target_budget: BudgetTier,
        limit: usize,
    ) -> Result<Vec<&Product>, CatalogError> {
        let original = self
            .get_product(product_id)
            .ok_or_else(|| CatalogError::NotFound(product_id.to_string()))?;

        let mut alternatives: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| p.id != original.id)
            .filter(|p| p.available)
            .filter(|p| p.category == original.category && p.budget_tier == target_budget)
            .collect();

        sort_by_rating(&mut alternatives);
        alternatives.truncate(limit);
        Ok(alternatives)
    }

    /// Built-in sample catalog
    pub fn sample() -> Self {
        Self {
            products: sample_products(),
        }
    }
}

fn sort_by_rating(products: &mut [&Product]) {
    products.sort_by(|a, b| {
        b.rating
            .partial_cmp(&a.rating)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[allow(clippy::too_many_arguments)]
fn sample(
    id: &str,
    name: &str,
    brand: &str,
    category: ProductCategory,
    ingredients: &[&str],
    price: f64,
    rating: f64,
    budget_tier: BudgetTier,
    skin_types: &[SkinType],
    concerns: &[Concern],
    flags: (bool, bool, bool),
    usage: &str,
    description: &str,
) -> Product {
    let (fragrance_free, cruelty_free, vegan) = flags;
    Product {
        id: id.to_string(),
        name: name.to_string(),
        brand: brand.to_string(),
        category,
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        price,
        rating,
        budget_tier,
        skin_types: skin_types.to_vec(),
        concerns: concerns.to_vec(),
        fragrance_free,
        cruelty_free,
        vegan,
        usage: usage.to_string(),
        available: true,
        description: Some(description.to_string()),
    }
}

fn sample_products() -> Vec<Product> {
    use BudgetTier::*;
    use Concern::*;
    use ProductCategory::*;
    use SkinType::*;

    vec![
        sample(
            "prod_001",
            "The Ordinary Niacinamide 10% + Zinc 1%",
            "The Ordinary",
            Serum,
            &["niacinamide", "zinc"],
            15.99,
            4.5,
            Low,
            &[Oily, Combination, Normal],
            &[Acne, Pores, Hyperpigmentation],
            (true, true, true),
            "morning and evening",
            "High-strength vitamin and mineral formula for blemish and congestion-prone skin",
        ),
        sample(
            "prod_002",
            "Paula's Choice 2% BHA Liquid Exfoliant",
            "Paula's Choice",
            Toner,
            &["salicylic acid", "betaine salicylate"],
            32.00,
            4.7,
            Medium,
            &[Oily, Combination, Normal],
            &[Acne, Pores, Dullness],
            (true, true, true),
            "evening",
            "Gentle leave-on exfoliant that unclogs pores and smooths fine lines",
        ),
        sample(
            "prod_003",
            "CeraVe Moisturizing Cream",
            "CeraVe",
            Moisturizer,
            &["ceramides", "hyaluronic acid", "glycerin"],
            19.99,
            4.6,
            Low,
            &[Dry, Normal, Sensitive],
            &[Dryness, Redness],
            (true, false, false),
            "morning and evening",
            "Rich, non-greasy moisturizer with essential ceramides",
        ),
        sample(
            "prod_004",
            "Skinceuticals C E Ferulic",
            "Skinceuticals",
            Serum,
            &["vitamin c", "vitamin e", "ferulic acid"],
            169.00,
            4.8,
            High,
            &[Normal, Combination, Dry],
            &[Hyperpigmentation, Wrinkles, Dullness],
            (true, false, false),
            "morning",
            "Antioxidant serum for environmental protection and anti-aging",
        ),
        sample(
            "prod_005",
            "La Roche-Posay Effaclar Duo",
            "La Roche-Posay",
            Treatment,
            &["niacinamide", "salicylic acid", "zinc"],
            28.99,
            4.4,
            Medium,
            &[Oily, Combination],
            &[Acne, Pores],
            (true, false, false),
            "morning and evening",
            "Dual-action acne treatment with niacinamide and salicylic acid",
        ),
        sample(
            "prod_006",
            "The Inkey List Retinol Serum",
            "The Inkey List",
            Serum,
            &["retinol", "squalane", "peptides"],
            12.99,
            4.2,
            Low,
            &[Normal, Combination, Oily],
            &[Wrinkles, Pores],
            (true, true, true),
            "evening",
            "Entry-level retinol serum for fine lines and texture",
        ),
        sample(
            "prod_007",
            "Simple Kind to Skin Hydrating Cleanser",
            "Simple",
            Cleanser,
            &["glycerin", "panthenol", "vitamin e"],
            8.49,
            4.1,
            Low,
            &[Sensitive, Dry, Normal],
            &[Dryness, Redness, SensitiveSkin],
            (true, true, false),
            "morning and evening",
            "Soap-free cleanser for sensitive skin",
        ),
        sample(
            "prod_008",
            "La Roche-Posay Anthelios Mineral SPF 50",
            "La Roche-Posay",
            Sunscreen,
            &["zinc oxide", "titanium dioxide", "niacinamide"],
            36.99,
            4.5,
            Medium,
            &[Normal, Sensitive, Dry, Combination, Oily],
            &[Hyperpigmentation, Redness, UnevenTone],
            (true, false, false),
            "morning, last step",
            "Broad-spectrum mineral sunscreen",
        ),
    ]
}
