use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use dermascan_algo::config::Settings;
use dermascan_algo::core::{KnowledgeBase, Recommender};
use dermascan_algo::routes::{self, AppState};
use dermascan_algo::services::{Catalog, HttpImagePredictor};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, error};

const DEFAULT_MAX_PAYLOAD_BYTES: usize = 10 * 1024 * 1024;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Query error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn to_io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Configuration comes first so the file can set the log defaults
    let settings = Settings::load().map_err(|e| to_io_error("Configuration error", e))?;

    // Initialize logging; LOG_LEVEL / LOG_FORMAT override the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(log_level))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting DermaScan recommendation service...");
    info!("Configuration loaded successfully");

    let knowledge_base = match &settings.engine.knowledge_base_path {
        Some(path) => KnowledgeBase::from_file(path).map_err(|e| {
            error!("Failed to load knowledge base from {}: {}", path, e);
            to_io_error("Knowledge base error", e)
        })?,
        None => KnowledgeBase::builtin(),
    };

    info!("Knowledge base ready ({} concerns)", knowledge_base.concerns.len());

    let catalog = Catalog::load_or_sample(settings.engine.catalog_path.as_deref().map(Path::new)).await;
    if catalog.is_empty() {
        tracing::warn!("Product catalog is empty; recommendations will contain ingredient advice only");
    }

    let predictor = HttpImagePredictor::new(settings.predictor.endpoint.clone(), settings.predictor.timeout_secs);
    info!("Image predictor at {}", predictor.predict_url());

    let weights = settings.scoring_weights();
    let recommender = Recommender::new(weights);

    info!("Recommender initialized with weights: {:?}", weights);

    // Build application state
    let app_state = AppState {
        recommender,
        catalog: Arc::new(catalog),
        knowledge_base: Arc::new(knowledge_base),
        predictor: Arc::new(predictor),
        budget_ceilings: settings.budget_ceilings(),
        default_max_products: settings.engine.max_products,
        max_products_limit: settings.engine.max_products_limit,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);
    let max_payload = settings.server.max_payload_bytes.unwrap_or(DEFAULT_MAX_PAYLOAD_BYTES);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::PayloadConfig::new(max_payload))
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
