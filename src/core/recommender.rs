use crate::core::composer::compose;
use crate::core::error::EngineResult;
use crate::core::filters::matches_profile_constraints;
use crate::core::ingredients::{select_ingredients, IngredientRecommendation};
use crate::core::knowledge::KnowledgeBase;
use crate::core::profile::{build_profile, build_profile_from_image, ImageAnalysis, ImageAttributes, ImagePredictor, QuizAnswers};
use crate::core::scoring::calculate_product_score;
use crate::models::{Product, Recommendation, ScoredProduct, ScoringWeights, SkinProfile};

/// Number of products returned when the caller does not ask for more
pub const DEFAULT_MAX_PRODUCTS: usize = 5;

/// Result of a recommendation run started from an image
#[derive(Debug)]
pub struct ImageRecommendation {
    pub profile: SkinProfile,
    pub analysis: ImageAnalysis,
    pub recommendation: Recommendation,
}

/// Recommendation orchestrator - runs the profile to routine pipeline
///
/// # Pipeline Stages
/// 1. Profile construction (quiz merged with image attributes)
/// 2. Ingredient selection from the knowledge base
/// 3. Hard filters (availability, allergens, price ceiling)
/// 4. Scoring and ranking
/// 5. Advice, routine and tips composition
#[derive(Debug, Clone)]
pub struct Recommender {
    weights: ScoringWeights,
}

impl Recommender {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score every eligible product and keep the best `max_products`
    ///
    /// Ordering is score descending, then rating descending, then product id,
    /// so equal inputs always produce the same list.
    pub fn score_and_rank(
        &self,
        products: &[Product],
        profile: &SkinProfile,
        recommendation: &IngredientRecommendation,
        max_products: usize,
    ) -> Vec<ScoredProduct> {
        let mut scored: Vec<ScoredProduct> = products
            .iter()
            .filter(|product| matches_profile_constraints(product, profile))
            .map(|product| {
                let (score, breakdown, matched_ingredients) =
                    calculate_product_score(product, profile, recommendation, &self.weights);

                ScoredProduct {
                    product: product.clone(),
                    score,
                    breakdown,
                    matched_ingredients,
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    b.product
                        .rating
                        .partial_cmp(&a.product.rating)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.product.id.cmp(&b.product.id))
        });

        scored.truncate(max_products);
        scored
    }

    /// Run ingredient selection, ranking and composition for a built profile
    pub fn recommend_for_profile(
        &self,
        profile: &SkinProfile,
        catalog: &[Product],
        knowledge_base: &KnowledgeBase,
        max_products: usize,
    ) -> Recommendation {
        let recommendation = select_ingredients(profile, knowledge_base);
        tracing::debug!(
            "Selected {} ingredients for {} concerns",
            recommendation.ingredients.len(),
            recommendation.concerns.len()
        );

        if catalog.is_empty() {
            tracing::warn!("Product catalog is empty, returning ingredient advice only");
        }

        let products = self.score_and_rank(catalog, profile, &recommendation, max_products);
        tracing::info!(
            "Ranked {} of {} catalog products",
            products.len(),
            catalog.len()
        );

        compose(profile, &recommendation, products, knowledge_base)
    }

    /// Full pipeline from image attributes and quiz answers
    pub fn recommend(
        &self,
        attributes: &ImageAttributes,
        quiz: &QuizAnswers,
        catalog: &[Product],
        knowledge_base: &KnowledgeBase,
        max_products: usize,
    ) -> EngineResult<Recommendation> {
        let profile = build_profile(attributes, quiz);
        Ok(self.recommend_for_profile(&profile, catalog, knowledge_base, max_products))
    }

    /// Full pipeline starting from raw image bytes
    ///
    /// The predictor is invoked exactly once; its errors are returned as-is.
    pub fn recommend_from_image<P>(
        &self,
        predictor: &P,
        image: &[u8],
        quiz: &QuizAnswers,
        catalog: &[Product],
        knowledge_base: &KnowledgeBase,
        max_products: usize,
    ) -> EngineResult<ImageRecommendation>
    where
        P: ImagePredictor + ?Sized,
    {
        let (profile, analysis) = build_profile_from_image(predictor, image, quiz)?;
        let recommendation = self.recommend_for_profile(&profile, catalog, knowledge_base, max_products);

        Ok(ImageRecommendation {
            profile,
            analysis,
            recommendation,
        })
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
