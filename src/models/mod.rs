// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BudgetCeilings, BudgetGuidance, BudgetTier, CareStep, Concern, GeneralCare, IngredientConflict,
    Lifestyle, OverallSeverity, Preferences, Product, ProductCategory, Recommendation, Routine,
    RoutineStep, ScoreBreakdown, ScoredProduct, ScoringWeights, Sensitivity, Severity, SkinProfile,
    SkinTone, SkinType, StrengthAdvice, StrengthLevel, SunProtection,
};
pub use requests::{
    AlternativesQuery, AnalyzeRequest, BudgetInput, CompatibilityRequest, ProductQuery, QuizRequest,
    RecommendRequest, ScanQuery,
};
pub use responses::{
    AlternativesResponse, AnalysisResponse, CompatibilityResponse, ErrorResponse, HealthResponse,
    ProductListResponse, RecommendResponse,
};
