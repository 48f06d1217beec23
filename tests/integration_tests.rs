// Integration tests for DermaScan Algo

use actix_web::{http::StatusCode, test, web, App};
use dermascan_algo::core::{
    severity::Predictions, ImageAttributes, ImageError, ImagePredictor, KnowledgeBase, QuizAnswers, Recommender,
};
use dermascan_algo::models::{BudgetCeilings, BudgetTier, Concern, Sensitivity, SkinType};
use dermascan_algo::routes::{configure_routes, AppState};
use dermascan_algo::services::Catalog;
use serde_json::{json, Value};
use std::sync::Arc;

const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

/// Predictor returning a canned record for any JPEG
struct CannedPredictor;

impl ImagePredictor for CannedPredictor {
    fn predict(&self, image: &[u8]) -> Result<Predictions, ImageError> {
        if image.is_empty() {
            return Err(ImageError::Empty);
        }
        Ok([("acne", 0.82), ("pores", 0.4), ("pigmentation", 0.1), ("skin_tone", 0.5)]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect())
    }
}

fn app_state() -> AppState {
    AppState {
        recommender: Recommender::with_default_weights(),
        catalog: Arc::new(Catalog::sample()),
        knowledge_base: Arc::new(KnowledgeBase::builtin()),
        predictor: Arc::new(CannedPredictor),
        budget_ceilings: BudgetCeilings::default(),
        default_max_products: 5,
        max_products_limit: 50,
    }
}

fn acne_quiz() -> QuizAnswers {
    QuizAnswers {
        skin_type: SkinType::Oily,
        sensitivity: Sensitivity::Low,
        budget: BudgetTier::Low,
        concerns: [Concern::Acne].into_iter().collect(),
        ..QuizAnswers::default()
    }
}

#[::core::prelude::v1::test]
fn test_integration_end_to_end_acne_profile() {
    let catalog = Catalog::sample();
    let kb = KnowledgeBase::builtin();

    let result = Recommender::default()
        .recommend(&ImageAttributes::default(), &acne_quiz(), catalog.products(), &kb, 5)
        .unwrap();

    assert!(result.ingredient_advice.contains("salicylic acid"));
    assert!(result.ingredient_advice.contains("niacinamide"));

    let ids: Vec<_> = result.products.iter().map(|p| p.product.id.as_str()).collect();
    assert!(ids.len() <= 5);
    assert!(ids.contains(&"prod_001"));

    // Rank the whole catalog so the vitamin C serum is scored rather than cut
    let everything = Recommender::default()
        .recommend(&ImageAttributes::default(), &acne_quiz(), catalog.products(), &kb, 100)
        .unwrap();
    let score = |id: &str| {
        everything
            .products
            .iter()
            .find(|p| p.product.id == id)
            .map(|p| p.score)
            .unwrap()
    };
    assert!(score("prod_001") > score("prod_004"));

    let ranked: Vec<_> = everything.products.iter().map(|p| p.product.id.as_str()).collect();
    let position = |id: &str| ranked.iter().position(|p| *p == id).unwrap();
    assert!(position("prod_001") < position("prod_004"));
}

#[::core::prelude::v1::test]
fn test_integration_score_and_rank_idempotent() {
    let catalog = Catalog::sample();
    let kb = KnowledgeBase::builtin();
    let recommender = Recommender::default();
    let profile = dermascan_algo::build_profile(&ImageAttributes::default(), &acne_quiz());
    let recs = dermascan_algo::select_ingredients(&profile, &kb);

    let first = recommender.score_and_rank(catalog.products(), &profile, &recs, 8);
    for _ in 0..10 {
        assert_eq!(recommender.score_and_rank(catalog.products(), &profile, &recs, 8), first);
    }
}

#[::core::prelude::v1::test]
fn test_integration_price_ceiling_and_allergy() {
    let mut quiz = acne_quiz();
    quiz.max_price = Some(20.0);
    quiz.allergies = vec!["Zinc".to_string()];

    let result = Recommender::default()
        .recommend(
            &ImageAttributes::default(),
            &quiz,
            Catalog::sample().products(),
            &KnowledgeBase::builtin(),
            10,
        )
        .unwrap();

    assert!(!result.products.is_empty());
    for scored in &result.products {
        assert!(scored.product.price <= 20.0);
        assert!(!scored.product.ingredients.iter().any(|i| i.contains("zinc")));
    }
}

#[actix_web::test]
async fn test_health_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["catalog_size"], 8);
}

#[actix_web::test]
async fn test_recommendations_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/recommendations")
        .set_json(json!({
            "predictions": {"acne": 0.9, "pores": 0.1, "pigmentation": 0.1, "skin_tone": 0.5},
            "quiz": {"skinType": "oily", "sensitivity": "low", "budget": 20},
            "maxProducts": 3
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["id"].is_string());
    assert_eq!(body["profile"]["budget"], "low");
    assert_eq!(body["profile"]["skin_tone"], "medium");
    assert_eq!(body["analysis"]["report"]["concerns"]["acne"]["severity"], "severe");
    assert_eq!(body["recommendation"]["products"].as_array().unwrap().len(), 3);
    assert!(body["recommendation"]["ingredientAdvice"]
        .as_str()
        .unwrap()
        .contains("salicylic acid"));

    let care = &body["recommendation"]["generalCare"];
    assert_eq!(care["skinType"], "oily");
    assert_eq!(care["sunProtection"]["texture"], "oil-free gel");
    assert_eq!(care["cleansing"]["frequency"], "twice daily");
    assert_eq!(care["budget"]["range"], "$5-$25");
}

#[actix_web::test]
async fn test_recommendations_rejects_bad_input() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(configure_routes),
    )
    .await;

    let out_of_range = test::TestRequest::post()
        .uri("/api/v1/recommendations")
        .set_json(json!({
            "predictions": {"acne": 1.4, "pores": 0.1, "pigmentation": 0.1, "skin_tone": 0.5},
            "quiz": {}
        }))
        .to_request();
    assert_eq!(test::call_service(&app, out_of_range).await.status(), StatusCode::BAD_REQUEST);

    let unknown_tier = test::TestRequest::post()
        .uri("/api/v1/recommendations")
        .set_json(json!({"quiz": {"budget": "platinum"}}))
        .to_request();
    assert_eq!(test::call_service(&app, unknown_tier).await.status(), StatusCode::BAD_REQUEST);

    let too_many = test::TestRequest::post()
        .uri("/api/v1/recommendations")
        .set_json(json!({"quiz": {}, "maxProducts": 500}))
        .to_request();
    assert_eq!(test::call_service(&app, too_many).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_analyze_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/analyze")
        .set_json(json!({
            "predictions": {"acne": 0.45, "pores": 0.6, "pigmentation": 0.05, "skin_tone": 0.9}
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["analysis"]["report"]["concerns"]["acne"]["severity"], "moderate");
    assert_eq!(body["analysis"]["report"]["concerns"]["pores"]["severity"], "severe");
    assert_eq!(body["analysis"]["report"]["skinTone"]["classification"], "very-dark");
}

#[actix_web::test]
async fn test_scan_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/scan?skinType=oily&budget=low&concerns=dryness&maxProducts=2")
        .set_payload(JPEG)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let concerns = body["profile"]["concerns"].as_array().unwrap();
    assert!(concerns.contains(&json!("acne")));
    assert!(concerns.contains(&json!("dryness")));
    assert_eq!(body["recommendation"]["products"].as_array().unwrap().len(), 2);

    let empty = test::TestRequest::post().uri("/api/v1/scan").to_request();
    assert_eq!(
        test::call_service(&app, empty).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[actix_web::test]
async fn test_product_endpoints() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/products/prod_003").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["brand"], "CeraVe");

    let missing = test::TestRequest::get().uri("/api/v1/products/nope").to_request();
    assert_eq!(test::call_service(&app, missing).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/v1/products/prod_004/alternatives?budget=20")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["budget"], "low");
    assert_eq!(body["alternatives"][0]["id"], "prod_001");

    let req = test::TestRequest::get().uri("/api/v1/products?q=cerave").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_results"], 1);

    let req = test::TestRequest::get().uri("/api/v1/products?category=serum&limit=10").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["category"], "serum");
    assert_eq!(body["total_results"], 3);

    let req = test::TestRequest::get().uri("/api/v1/products?q=la%20roche&category=sunscreen").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["products"][0]["id"], "prod_008");
    assert_eq!(body["total_results"], 1);

    let req = test::TestRequest::get().uri("/api/v1/products?limit=2").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_results"], 2);
    assert!(body["products"][0]["rating"].as_f64() >= body["products"][1]["rating"].as_f64());

    let bad_category = test::TestRequest::get().uri("/api/v1/products?category=perfume").to_request();
    assert_eq!(test::call_service(&app, bad_category).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_compatibility_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/compatibility")
        .set_json(json!({"ingredients": ["Vitamin C", "retinol", "hyaluronic acid"]}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["compatible"], false);
    assert_eq!(body["conflicts"][0]["first"], "vitamin c");
    assert_eq!(body["conflicts"][0]["second"], "retinol");
    assert_eq!(body["advice"][0], "Use vitamin c in the morning and retinol in the evening");

    let req = test::TestRequest::post()
        .uri("/api/v1/compatibility")
        .set_json(json!({"ingredients": ["squalane", "glycerin"]}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["compatible"], true);

    let too_few = test::TestRequest::post()
        .uri("/api/v1/compatibility")
        .set_json(json!({"ingredients": ["retinol"]}))
        .to_request();
    assert_eq!(test::call_service(&app, too_few).await.status(), StatusCode::BAD_REQUEST);
}
