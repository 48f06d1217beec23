// Route exports
pub mod products;
pub mod recommendations;

use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::core::{EngineError, ImageError, ImagePredictor, KnowledgeBase, Recommender};
use crate::models::{BudgetCeilings, ErrorResponse};
use crate::services::Catalog;

/// Application state shared across all handlers
///
/// Everything here is read-only once the server starts.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Recommender,
    pub catalog: Arc<Catalog>,
    pub knowledge_base: Arc<KnowledgeBase>,
    pub predictor: Arc<dyn ImagePredictor>,
    pub budget_ceilings: BudgetCeilings,
    pub default_max_products: usize,
    pub max_products_limit: usize,
}

impl AppState {
    /// Requested product count, defaulted and capped
    pub fn max_products(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_max_products)
            .min(self.max_products_limit)
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(recommendations::configure)
            .configure(products::configure),
    );
}

pub(crate) fn error_response(status: actix_web::http::StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

/// Map engine failures onto HTTP responses
///
/// Caller mistakes are 400, images the predictor cannot use are 422 and a
/// failing predictor service is 502.
pub(crate) fn engine_error_response(err: &EngineError) -> HttpResponse {
    use actix_web::http::StatusCode;

    match err {
        EngineError::Validation(_) => error_response(StatusCode::BAD_REQUEST, "Validation failed", err.to_string()),
        EngineError::Configuration(_) => error_response(StatusCode::BAD_REQUEST, "Invalid input", err.to_string()),
        EngineError::Image(ImageError::Empty) | EngineError::Image(ImageError::Unsupported(_)) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, "Invalid image", err.to_string())
        }
        EngineError::Image(_) => {
            tracing::error!("Prediction service failure: {}", err);
            error_response(StatusCode::BAD_GATEWAY, "Prediction service error", err.to_string())
        }
    }
}
