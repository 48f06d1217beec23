// Core algorithm exports
pub mod composer;
pub mod error;
pub mod filters;
pub mod ingredients;
pub mod knowledge;
pub mod profile;
pub mod recommender;
pub mod scoring;
pub mod severity;

pub use composer::{check_compatibility, compose, general_care, CompatibilityReport};
pub use error::{EngineError, EngineResult, ImageError};
pub use filters::{contains_allergen, matches_profile_constraints, within_price_ceiling};
pub use ingredients::{select_ingredients, IngredientRecommendation};
pub use knowledge::KnowledgeBase;
pub use profile::{
    analyze_predictions, build_profile, build_profile_from_image, ImageAnalysis, ImageAttributes,
    ImagePredictor, QuizAnswers,
};
pub use recommender::{ImageRecommendation, Recommender, DEFAULT_MAX_PRODUCTS};
pub use scoring::calculate_product_score;
pub use severity::{map_severity, map_skin_tone, Predictions, SeverityReport};
