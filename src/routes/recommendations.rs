use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::{analyze_predictions, build_profile, check_compatibility, EngineResult, ImageAttributes};
use crate::models::{
    AnalysisResponse, AnalyzeRequest, CompatibilityRequest, CompatibilityResponse, HealthResponse, RecommendRequest,
    RecommendResponse, ScanQuery,
};
use crate::routes::{engine_error_response, error_response, AppState};

/// Configure recommendation and analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/analyze", web::post().to(analyze))
        .route("/recommendations", web::post().to(recommend))
        .route("/scan", web::post().to(scan))
        .route("/compatibility", web::post().to(compatibility));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        catalog_size: state.catalog.len(),
        timestamp: chrono::Utc::now(),
    })
}

fn blocking_failure(err: actix_web::error::BlockingError) -> HttpResponse {
    tracing::error!("Recommendation worker failed: {}", err);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error", err.to_string())
}

/// Severity analysis of a prediction record
///
/// POST /api/v1/analyze
///
/// Request body:
/// ```json
/// { "predictions": { "acne": 0.72, "pores": 0.31, "pigmentation": 0.12, "skin_tone": 0.4 } }
/// ```
async fn analyze(req: web::Json<AnalyzeRequest>) -> impl Responder {
    match analyze_predictions(&req.predictions) {
        Ok(analysis) => HttpResponse::Ok().json(AnalysisResponse {
            id: uuid::Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            analysis,
        }),
        Err(e) => {
            tracing::info!("Rejected prediction record: {}", e);
            engine_error_response(&e)
        }
    }
}

/// Recommendation from precomputed predictions and quiz answers
///
/// POST /api/v1/recommendations
///
/// Request body:
/// ```json
/// {
///   "predictions": { "acne": 0.72, "pores": 0.31, "pigmentation": 0.12, "skin_tone": 0.4 },
///   "quiz": {
///     "skinType": "oily",
///     "sensitivity": "medium",
///     "budget": "low",
///     "preferences": ["fragrance-free"],
///     "productTypes": ["serum"],
///     "concerns": ["dryness"],
///     "allergies": ["lanolin"],
///     "maxPrice": 40
///   },
///   "maxProducts": 5
/// }
/// ```
async fn recommend(state: web::Data<AppState>, req: web::Json<RecommendRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommendation request: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let req = req.into_inner();
    let max_products = state.max_products(req.max_products);
    let quiz = match req.quiz.into_answers(&state.budget_ceilings) {
        Ok(quiz) => quiz,
        Err(e) => return engine_error_response(&e),
    };
    let predictions = req.predictions;

    let result = web::block(move || -> EngineResult<RecommendResponse> {
        let analysis = predictions.as_ref().map(analyze_predictions).transpose()?;
        let attributes = analysis
            .as_ref()
            .map(|a| a.attributes.clone())
            .unwrap_or_else(ImageAttributes::default);

        let profile = build_profile(&attributes, &quiz);
        let recommendation = state.recommender.recommend_for_profile(
            &profile,
            state.catalog.products(),
            &state.knowledge_base,
            max_products,
        );

        Ok(RecommendResponse::new(profile, analysis, recommendation))
    })
    .await;

    match result {
        Ok(Ok(response)) => {
            tracing::info!(
                "Returning {} products for recommendation {}",
                response.recommendation.products.len(),
                response.id
            );
            HttpResponse::Ok().json(response)
        }
        Ok(Err(e)) => engine_error_response(&e),
        Err(e) => blocking_failure(e),
    }
}

/// Recommendation from a raw image upload
///
/// POST /api/v1/scan?skinType=oily&sensitivity=low&budget=30&concerns=dryness
///
/// The request body is the JPEG, PNG or WebP image itself.
async fn scan(
    state: web::Data<AppState>,
    query: web::Query<ScanQuery>,
    body: web::Bytes,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let max_products = state.max_products(query.max_products);
    let quiz = match query.to_answers(&state.budget_ceilings) {
        Ok(quiz) => quiz,
        Err(e) => return engine_error_response(&e),
    };

    tracing::info!("Scanning {} byte image", body.len());

    let result = web::block(move || {
        state.recommender.recommend_from_image(
            state.predictor.as_ref(),
            &body,
            &quiz,
            state.catalog.products(),
            &state.knowledge_base,
            max_products,
        )
    })
    .await;

    match result {
        Ok(Ok(run)) => HttpResponse::Ok().json(RecommendResponse::new(
            run.profile,
            Some(run.analysis),
            run.recommendation,
        )),
        Ok(Err(e)) => engine_error_response(&e),
        Err(e) => blocking_failure(e),
    }
}

/// Check an ingredient list for pairs that should not be layered
///
/// POST /api/v1/compatibility
///
/// Request body:
/// ```json
/// { "ingredients": ["vitamin c", "retinol", "hyaluronic acid"] }
/// ```
async fn compatibility(state: web::Data<AppState>, req: web::Json<CompatibilityRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let report = check_compatibility(&req.ingredients, &state.knowledge_base);
    tracing::debug!(
        "Compatibility check of {} ingredients found {} conflicts",
        report.ingredients.len(),
        report.conflicts.len()
    );

    HttpResponse::Ok().json(CompatibilityResponse {
        id: uuid::Uuid::new_v4(),
        timestamp: chrono::Utc::now(),
        report,
    })
}
