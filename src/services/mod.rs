// Service exports
pub mod catalog;
pub mod predictor;

pub use catalog::{Catalog, CatalogError};
pub use predictor::{detect_content_type, parse_predictions, HttpImagePredictor};
