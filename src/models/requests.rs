use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use validator::Validate;

use crate::core::{EngineError, EngineResult, Predictions, QuizAnswers};
use crate::models::domain::{BudgetCeilings, BudgetTier, Concern, ProductCategory, Sensitivity, SkinType};

/// Budget as sent by clients: a tier name or an amount of money
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BudgetInput {
    Amount(f64),
    Tier(String),
}

impl BudgetInput {
    /// Interpret a query-string value: numbers are amounts, anything else a tier name
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(amount) => BudgetInput::Amount(amount),
            Err(_) => BudgetInput::Tier(raw.to_string()),
        }
    }

    /// Resolve to a tier; amounts go through the configured ceilings
    pub fn to_tier(&self, ceilings: &BudgetCeilings) -> EngineResult<BudgetTier> {
        match self {
            BudgetInput::Amount(amount) if amount.is_finite() && *amount >= 0.0 => {
                Ok(BudgetTier::from_amount(*amount, ceilings))
            }
            BudgetInput::Amount(amount) => Err(EngineError::Configuration(format!(
                "Budget amount must be a non-negative number, got {}",
                amount
            ))),
            BudgetInput::Tier(name) => name.parse(),
        }
    }
}

impl Default for BudgetInput {
    fn default() -> Self {
        BudgetInput::Tier(BudgetTier::default().as_str().to_string())
    }
}

/// Questionnaire answers as sent by clients
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    #[serde(default)]
    pub skin_type: SkinType,
    #[serde(default)]
    pub sensitivity: Sensitivity,
    #[serde(default)]
    pub budget: BudgetInput,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub product_types: Vec<ProductCategory>,
    #[serde(default)]
    pub concerns: BTreeSet<Concern>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub allergies: Vec<String>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub max_price: Option<f64>,
}

impl QuizRequest {
    pub fn into_answers(self, ceilings: &BudgetCeilings) -> EngineResult<QuizAnswers> {
        Ok(QuizAnswers {
            skin_type: self.skin_type,
            sensitivity: self.sensitivity,
            budget: self.budget.to_tier(ceilings)?,
            preferences: self.preferences,
            product_types: self.product_types,
            concerns: self.concerns,
            allergies: self.allergies,
            max_price: self.max_price,
        })
    }
}

/// Request to build a recommendation from precomputed predictions
///
/// Without predictions the profile is built from the quiz alone.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    #[serde(default)]
    pub predictions: Option<Predictions>,
    #[serde(default)]
    #[validate(nested)]
    pub quiz: QuizRequest,
    #[validate(range(min = 1, max = 50))]
    pub max_products: Option<usize>,
}

/// Request to analyze precomputed predictions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub predictions: Predictions,
}

/// Query string accompanying a raw image upload
///
/// List fields are comma separated, e.g. `concerns=acne,pores`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScanQuery {
    #[serde(default)]
    pub skin_type: SkinType,
    #[serde(default)]
    pub sensitivity: Sensitivity,
    pub budget: Option<String>,
    pub preferences: Option<String>,
    pub product_types: Option<String>,
    pub concerns: Option<String>,
    pub allergies: Option<String>,
    #[validate(range(min = 0.0))]
    pub max_price: Option<f64>,
    #[validate(range(min = 1, max = 50))]
    pub max_products: Option<usize>,
}

fn split_list(value: &Option<String>) -> Vec<String> {
    value
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_list<T>(value: &Option<String>, what: &str) -> EngineResult<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
{
    split_list(value)
        .into_iter()
        .map(|item| {
            serde_json::from_value(serde_json::Value::String(item.to_lowercase()))
                .map_err(|_| EngineError::Configuration(format!("Unknown {}: {}", what, item)))
        })
        .collect()
}

impl ScanQuery {
    pub fn to_answers(&self, ceilings: &BudgetCeilings) -> EngineResult<QuizAnswers> {
        let budget = self
            .budget
            .as_deref()
            .map(BudgetInput::parse)
            .unwrap_or_default();

        Ok(QuizAnswers {
            skin_type: self.skin_type,
            sensitivity: self.sensitivity,
            budget: budget.to_tier(ceilings)?,
            preferences: split_list(&self.preferences),
            product_types: parse_list(&self.product_types, "product type")?,
            concerns: split_list(&self.concerns)
                .iter()
                .map(|c| c.parse::<Concern>())
                .collect::<EngineResult<_>>()?,
            allergies: split_list(&self.allergies),
            max_price: self.max_price,
        })
    }
}

/// Query for budget alternatives
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AlternativesQuery {
    #[validate(length(min = 1))]
    pub budget: String,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

/// Product listing query.
///
/// `q` searches names and brands, `category` narrows to one category; with
/// neither the best rated products are listed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProductQuery {
    #[validate(length(min = 1, max = 100))]
    pub q: Option<String>,
    pub category: Option<ProductCategory>,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

/// Ingredient list to check against the compatibility matrix
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompatibilityRequest {
    #[validate(length(min = 2, max = 30))]
    pub ingredients: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_input_forms() {
        let ceilings = BudgetCeilings::default();

        let tier: BudgetInput = serde_json::from_str(r#""high""#).unwrap();
        assert_eq!(tier.to_tier(&ceilings).unwrap(), BudgetTier::High);

        let amount: BudgetInput = serde_json::from_str("60").unwrap();
        assert_eq!(amount.to_tier(&ceilings).unwrap(), BudgetTier::Medium);

        assert!(BudgetInput::Tier("cheap".into()).to_tier(&ceilings).is_err());
        assert!(BudgetInput::Amount(-5.0).to_tier(&ceilings).is_err());
    }

    #[test]
    fn test_recommend_request_camel_case() {
        let request: RecommendRequest = serde_json::from_str(
            r#"{
                "predictions": {"acne": 0.8, "pores": 0.2, "pigmentation": 0.1, "skin_tone": 0.5},
                "quiz": {"skinType": "oily", "sensitivity": "high", "budget": 20,
                         "productTypes": ["serum"], "maxPrice": 30},
                "maxProducts": 3
            }"#,
        )
        .unwrap();

        assert!(request.validate().is_ok());
        let answers = request.quiz.into_answers(&BudgetCeilings::default()).unwrap();
        assert_eq!(answers.skin_type, SkinType::Oily);
        assert_eq!(answers.budget, BudgetTier::Low);
        assert_eq!(answers.product_types, vec![ProductCategory::Serum]);
        assert_eq!(answers.max_price, Some(30.0));
    }

    #[test]
    fn test_recommend_request_limits_validated() {
        let request: RecommendRequest =
            serde_json::from_str(r#"{"quiz": {"maxPrice": -1}, "maxProducts": 0}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.errors().len(), 2);
    }

    #[test]
    fn test_scan_query_lists() {
        let query = ScanQuery {
            skin_type: SkinType::Dry,
            budget: Some("80".into()),
            preferences: Some("vegan, fragrance-free".into()),
            product_types: Some("Serum,moisturizer".into()),
            concerns: Some("dryness,redness,".into()),
            allergies: Some("lanolin".into()),
            ..ScanQuery::default()
        };

        let answers = query.to_answers(&BudgetCeilings::default()).unwrap();
        assert_eq!(answers.budget, BudgetTier::High);
        assert_eq!(answers.preferences, vec!["vegan", "fragrance-free"]);
        assert_eq!(answers.product_types, vec![ProductCategory::Serum, ProductCategory::Moisturizer]);
        assert_eq!(answers.concerns.len(), 2);
        assert_eq!(answers.allergies, vec!["lanolin"]);
    }

    #[test]
    fn test_scan_query_unknown_values_rejected() {
        let query = ScanQuery {
            concerns: Some("acne,freckles".into()),
            ..ScanQuery::default()
        };
        assert!(matches!(
            query.to_answers(&BudgetCeilings::default()),
            Err(EngineError::Configuration(_))
        ));

        let query = ScanQuery {
            product_types: Some("lipstick".into()),
            ..ScanQuery::default()
        };
        assert!(query.to_answers(&BudgetCeilings::default()).is_err());
    }

    #[test]
    fn test_product_query_and_compatibility_limits() {
        let query: ProductQuery = serde_json::from_str(r#"{"category": "serum", "limit": 3}"#).unwrap();
        assert_eq!(query.category, Some(ProductCategory::Serum));
        assert!(query.q.is_none());
        assert!(query.validate().is_ok());

        let empty_term = ProductQuery {
            q: Some(String::new()),
            ..ProductQuery::default()
        };
        assert!(empty_term.validate().is_err());

        let single = CompatibilityRequest {
            ingredients: vec!["retinol".to_string()],
        };
        assert!(single.validate().is_err());
    }
}
