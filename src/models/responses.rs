use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{CompatibilityReport, ImageAnalysis};
use crate::models::domain::{BudgetTier, Product, ProductCategory, Recommendation, SkinProfile};

/// Response for the recommendation endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub profile: SkinProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ImageAnalysis>,
    pub recommendation: Recommendation,
}

impl RecommendResponse {
    pub fn new(profile: SkinProfile, analysis: Option<ImageAnalysis>, recommendation: Recommendation) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            profile,
            analysis,
            recommendation,
        }
    }
}

/// Response for the analysis endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub analysis: ImageAnalysis,
}

/// Budget alternatives for one product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativesResponse {
    pub product_id: String,
    pub budget: BudgetTier,
    pub alternatives: Vec<Product>,
}

/// Product listing results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ProductCategory>,
    pub products: Vec<Product>,
    pub total_results: usize,
}

/// Response for the compatibility endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityResponse {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub report: CompatibilityReport,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub catalog_size: usize,
    pub timestamp: DateTime<Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
