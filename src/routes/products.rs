use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{AlternativesQuery, AlternativesResponse, BudgetInput, ProductListResponse, ProductQuery};
use crate::routes::{engine_error_response, error_response, AppState};

const DEFAULT_LIMIT: usize = 5;

/// Configure catalog routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/products", web::get().to(list_products))
        .route("/products/{id}", web::get().to(get_product))
        .route("/products/{id}/alternatives", web::get().to(get_alternatives));
}

/// Search, category listing or trending products
///
/// GET /api/v1/products?q={term}&category={category}&limit={n}
async fn list_products(state: web::Data<AppState>, query: web::Query<ProductQuery>) -> impl Responder {
    if let Err(errors) = query.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let products: Vec<_> = match (&query.q, query.category) {
        (Some(term), Some(category)) => state
            .catalog
            .search(term, state.catalog.len())
            .into_iter()
            .filter(|p| p.category == category)
            .take(limit)
            .cloned()
            .collect(),
        (Some(term), None) => state.catalog.search(term, limit).into_iter().cloned().collect(),
        (None, Some(category)) => state.catalog.in_category(category, limit).into_iter().cloned().collect(),
        (None, None) => state.catalog.trending(limit).into_iter().cloned().collect(),
    };

    tracing::debug!("Listing {} products", products.len());

    let query = query.into_inner();
    HttpResponse::Ok().json(ProductListResponse {
        query: query.q,
        category: query.category,
        total_results: products.len(),
        products,
    })
}

/// GET /api/v1/products/{id}
async fn get_product(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let product_id = path.into_inner();

    match state.catalog.get_product(&product_id) {
        Some(product) => HttpResponse::Ok().json(product),
        None => error_response(
            StatusCode::NOT_FOUND,
            "Product not found",
            format!("No product with id {}", product_id),
        ),
    }
}

/// Same-category products in another budget tier
///
/// GET /api/v1/products/{id}/alternatives?budget={tier|amount}&limit={n}
async fn get_alternatives(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<AlternativesQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let product_id = path.into_inner();
    let budget = match BudgetInput::parse(&query.budget).to_tier(&state.budget_ceilings) {
        Ok(tier) => tier,
        Err(e) => return engine_error_response(&e),
    };

    match state
        .catalog
        .alternatives(&product_id, budget, query.limit.unwrap_or(DEFAULT_LIMIT))
    {
        Ok(alternatives) => {
            tracing::debug!("Found {} {} alternatives for {}", alternatives.len(), budget, product_id);
            HttpResponse::Ok().json(AlternativesResponse {
                product_id,
                budget,
                alternatives: alternatives.into_iter().cloned().collect(),
            })
        }
        Err(e) => error_response(StatusCode::NOT_FOUND, "Product not found", e.to_string()),
    }
}
