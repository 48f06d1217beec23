//! DermaScan Algo - skincare recommendation engine and service
//!
//! This library turns an image-derived skin analysis and questionnaire answers
//! into ingredient advice, ranked catalog products and a morning/evening routine.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    analyze_predictions, build_profile, select_ingredients, EngineError, ImagePredictor, KnowledgeBase,
    QuizAnswers, Recommender,
};
pub use models::{Product, Recommendation, ScoringWeights, SkinProfile};
pub use services::{Catalog, HttpImagePredictor};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let profile = build_profile(&Default::default(), &QuizAnswers::default());
        let recommendation = Recommender::default().recommend_for_profile(
            &profile,
            Catalog::sample().products(),
            &KnowledgeBase::builtin(),
            3,
        );
        assert_eq!(recommendation.products.len(), 3);
    }
}
