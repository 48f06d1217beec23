use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::{BudgetCeilings, ScoringWeights};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub predictor: PredictorSettings,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub budget: BudgetSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Upper bound on uploaded image size
    pub max_payload_bytes: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictorSettings {
    #[serde(default = "default_predictor_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_predictor_timeout")]
    pub timeout_secs: u64,
}

impl Default for PredictorSettings {
    fn default() -> Self {
        Self {
            endpoint: default_predictor_endpoint(),
            timeout_secs: default_predictor_timeout(),
        }
    }
}

fn default_predictor_endpoint() -> String { "http://localhost:8000".to_string() }
fn default_predictor_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    #[serde(default = "default_max_products")]
    pub max_products: usize,
    #[serde(default = "default_max_products_limit")]
    pub max_products_limit: usize,
    /// JSON product catalog; the built-in sample catalog is used when unset or unreadable
    pub catalog_path: Option<String>,
    /// TOML knowledge base override
    pub knowledge_base_path: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_products: default_max_products(),
            max_products_limit: default_max_products_limit(),
            catalog_path: None,
            knowledge_base_path: None,
        }
    }
}

fn default_max_products() -> usize { 5 }
fn default_max_products_limit() -> usize { 50 }

/// Inclusive upper price bounds used to turn a numeric budget into a tier
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetSettings {
    #[serde(default = "default_low_ceiling")]
    pub low: f64,
    #[serde(default = "default_medium_ceiling")]
    pub medium: f64,
    #[serde(default = "default_high_ceiling")]
    pub high: f64,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        Self {
            low: default_low_ceiling(),
            medium: default_medium_ceiling(),
            high: default_high_ceiling(),
        }
    }
}

impl From<&BudgetSettings> for BudgetCeilings {
    fn from(settings: &BudgetSettings) -> Self {
        BudgetCeilings {
            low: settings.low,
            medium: settings.medium,
            high: settings.high,
        }
    }
}

fn default_low_ceiling() -> f64 { 25.0 }
fn default_medium_ceiling() -> f64 { 75.0 }
fn default_high_ceiling() -> f64 { 200.0 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_ingredients_weight")]
    pub ingredients: f64,
    #[serde(default = "default_skin_type_weight")]
    pub skin_type: f64,
    #[serde(default = "default_concerns_weight")]
    pub concerns: f64,
    #[serde(default = "default_budget_weight")]
    pub budget: f64,
    #[serde(default = "default_preferences_weight")]
    pub preferences: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            ingredients: default_ingredients_weight(),
            skin_type: default_skin_type_weight(),
            concerns: default_concerns_weight(),
            budget: default_budget_weight(),
            preferences: default_preferences_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        ScoringWeights {
            ingredients: config.ingredients,
            skin_type: config.skin_type,
            concerns: config.concerns,
            budget: config.budget,
            preferences: config.preferences,
        }
    }
}

fn default_ingredients_weight() -> f64 { 0.4 }
fn default_skin_type_weight() -> f64 { 0.2 }
fn default_concerns_weight() -> f64 { 0.2 }
fn default_budget_weight() -> f64 { 0.1 }
fn default_preferences_weight() -> f64 { 0.1 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with DERMA__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., DERMA__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    pub fn budget_ceilings(&self) -> BudgetCeilings {
        BudgetCeilings::from(&self.budget)
    }

    pub fn scoring_weights(&self) -> ScoringWeights {
        ScoringWeights::from(&self.scoring.weights)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("DERMA")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.ingredients, 0.4);
        assert_eq!(weights.skin_type, 0.2);
        assert_eq!(weights.concerns, 0.2);
        assert_eq!(weights.budget, 0.1);
        assert_eq!(weights.preferences, 0.1);
        assert_eq!(ScoringWeights::from(&weights), ScoringWeights::default());
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(
                r#"
                [server]
                host = "0.0.0.0"
                port = 9090

                [budget]
                low = 30.0

                [scoring.weights]
                ingredients = 0.5
                "#,
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.engine.max_products, 5);
        assert_eq!(settings.predictor.timeout_secs, 30);

        let ceilings = settings.budget_ceilings();
        assert_eq!(ceilings.low, 30.0);
        assert_eq!(ceilings.medium, 75.0);

        let weights = settings.scoring_weights();
        assert_eq!(weights.ingredients, 0.5);
        assert_eq!(weights.budget, 0.1);
    }
}
