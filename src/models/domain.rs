use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::core::error::EngineError;

/// Named skin condition used as a key into the knowledge base.
///
/// Declaration order is the fixed concern ordering used wherever the engine
/// needs a deterministic walk over concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concern {
    Acne,
    Wrinkles,
    Hyperpigmentation,
    Dryness,
    Redness,
    Oiliness,
    Pores,
    Dullness,
    SensitiveSkin,
    UnevenTone,
}

impl Concern {
    pub const ALL: [Concern; 10] = [
        Concern::Acne,
        Concern::Wrinkles,
        Concern::Hyperpigmentation,
        Concern::Dryness,
        Concern::Redness,
        Concern::Oiliness,
        Concern::Pores,
        Concern::Dullness,
        Concern::SensitiveSkin,
        Concern::UnevenTone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Concern::Acne => "acne",
            Concern::Wrinkles => "wrinkles",
            Concern::Hyperpigmentation => "hyperpigmentation",
            Concern::Dryness => "dryness",
            Concern::Redness => "redness",
            Concern::Oiliness => "oiliness",
            Concern::Pores => "pores",
            Concern::Dullness => "dullness",
            Concern::SensitiveSkin => "sensitive_skin",
            Concern::UnevenTone => "uneven_tone",
        }
    }
}

impl fmt::Display for Concern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Concern {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        Concern::ALL
            .into_iter()
            .find(|c| c.as_str() == key)
            .ok_or_else(|| EngineError::Configuration(format!("unknown concern: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinType {
    Oily,
    Dry,
    Combination,
    Sensitive,
    Normal,
}

impl Default for SkinType {
    fn default() -> Self {
        SkinType::Normal
    }
}

/// Ordered sensitivity level; `Medium` and above trigger caution tips,
/// `High` triggers the avoid-list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    Mild,
    Medium,
    High,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Sensitivity::Low
    }
}

/// Ordered budget scale: low < medium < high < luxury
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Low,
    Medium,
    High,
    Luxury,
}

impl BudgetTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetTier::Low => "low",
            BudgetTier::Medium => "medium",
            BudgetTier::High => "high",
            BudgetTier::Luxury => "luxury",
        }
    }

    /// Convert a numeric budget into a tier using inclusive upper ceilings
    pub fn from_amount(amount: f64, ceilings: &BudgetCeilings) -> Self {
        if amount <= ceilings.low {
            BudgetTier::Low
        } else if amount <= ceilings.medium {
            BudgetTier::Medium
        } else if amount <= ceilings.high {
            BudgetTier::High
        } else {
            BudgetTier::Luxury
        }
    }
}

impl Default for BudgetTier {
    fn default() -> Self {
        BudgetTier::Medium
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetTier {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(BudgetTier::Low),
            "medium" => Ok(BudgetTier::Medium),
            "high" => Ok(BudgetTier::High),
            "luxury" => Ok(BudgetTier::Luxury),
            other => Err(EngineError::Configuration(format!(
                "unknown budget tier: {} (expected low, medium, high or luxury)",
                other
            ))),
        }
    }
}

/// Upper price bounds used when a caller supplies a numeric budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetCeilings {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for BudgetCeilings {
    fn default() -> Self {
        Self {
            low: 25.0,
            medium: 75.0,
            high: 200.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Cleanser,
    Toner,
    Serum,
    Moisturizer,
    Sunscreen,
    Treatment,
}

/// Six-band skin tone classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkinTone {
    VeryFair,
    Fair,
    Medium,
    Olive,
    Dark,
    VeryDark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }

    /// Ordinal used by the overall severity average
    pub fn score(&self) -> f64 {
        match self {
            Severity::Mild => 1.0,
            Severity::Moderate => 2.0,
            Severity::Severe => 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallSeverity {
    Normal,
    Mild,
    Moderate,
    Severe,
}

/// Catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: ProductCategory,
    pub ingredients: Vec<String>,
    pub price: f64,
    pub rating: f64,
    pub budget_tier: BudgetTier,
    #[serde(default, alias = "skin_type")]
    pub skin_types: Vec<SkinType>,
    #[serde(default)]
    pub concerns: Vec<Concern>,
    #[serde(default)]
    pub fragrance_free: bool,
    #[serde(default)]
    pub cruelty_free: bool,
    #[serde(default)]
    pub vegan: bool,
    #[serde(default = "default_usage")]
    pub usage: String,
    #[serde(default = "default_true", alias = "availability")]
    pub available: bool,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_usage() -> String { "any".to_string() }
fn default_true() -> bool { true }

/// Free-text preference tags plus requested product categories
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub tags: BTreeSet<String>,
    pub product_types: BTreeSet<ProductCategory>,
}

impl Preferences {
    pub fn new<I, S>(tags: I, product_types: impl IntoIterator<Item = ProductCategory>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tags: tags
                .into_iter()
                .map(|t| normalize_tag(t.as_ref()))
                .filter(|t| !t.is_empty())
                .collect(),
            product_types: product_types.into_iter().collect(),
        }
    }

    pub fn has(&self, tag: &str) -> bool {
        self.tags.contains(&normalize_tag(tag))
    }

    pub fn wants_fragrance_free(&self) -> bool {
        self.has("fragrance-free")
    }

    pub fn wants_cruelty_free(&self) -> bool {
        self.has("cruelty-free")
    }

    pub fn wants_vegan(&self) -> bool {
        self.has("vegan")
    }
}

/// "Fragrance Free", "fragrance_free" and "fragrance-free" are the same tag
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase().replace([' ', '_'], "-")
}

/// Unified per-request skin profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinProfile {
    pub concerns: BTreeSet<Concern>,
    pub skin_type: SkinType,
    pub sensitivity: Sensitivity,
    pub budget: BudgetTier,
    pub preferences: Preferences,
    pub skin_tone: Option<SkinTone>,
    pub allergies: Vec<String>,
    pub max_price: Option<f64>,
}

impl SkinProfile {
    pub fn has_concern(&self, concern: Concern) -> bool {
        self.concerns.contains(&concern)
    }
}

/// Pre-weight sub-scores for one product
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub ingredients: f64,
    pub skin_type: f64,
    pub concerns: f64,
    pub budget: f64,
    pub preferences: f64,
}

/// Product with its ranking score.
///
/// The score is a heuristic used only for ordering. The preference component
/// is not capped so totals are not guaranteed to stay within [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProduct {
    #[serde(flatten)]
    pub product: Product,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    #[serde(rename = "matchedIngredients")]
    pub matched_ingredients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineStep {
    #[serde(rename = "productId")]
    pub product_id: String,
    pub name: String,
    pub category: ProductCategory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub morning: Vec<RoutineStep>,
    pub evening: Vec<RoutineStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthLevel {
    Mild,
    Moderate,
    Strong,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthAdvice {
    pub ingredient: String,
    pub level: StrengthLevel,
    pub dosage: String,
}

/// Two selected ingredients that should not be layered together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientConflict {
    pub first: String,
    pub second: String,
}

/// Cleansing or moisturizing guidance for the profile's skin type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareStep {
    pub category: ProductCategory,
    pub frequency: String,
    pub usage: String,
    pub textures: Vec<String>,
    pub ingredients: Vec<String>,
    pub avoid: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunProtection {
    pub spf: String,
    pub texture: String,
    pub ingredients: Vec<String>,
    pub reapplication: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lifestyle {
    pub diet: Vec<String>,
    pub sleep: Vec<String>,
    pub stress: Vec<String>,
    pub environment: Vec<String>,
}

/// Price range and typical brands for the profile's budget tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetGuidance {
    pub tier: BudgetTier,
    pub range: String,
    pub brands: Vec<String>,
    pub priorities: Vec<String>,
}

/// Product-independent skincare advice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralCare {
    #[serde(rename = "skinType")]
    pub skin_type: SkinType,
    #[serde(rename = "preferredIngredients")]
    pub preferred_ingredients: Vec<String>,
    pub textures: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleansing: Option<CareStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moisturizing: Option<CareStep>,
    #[serde(rename = "sunProtection")]
    pub sun_protection: SunProtection,
    pub lifestyle: Lifestyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetGuidance>,
}

/// Final engine output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "ingredientAdvice")]
    pub ingredient_advice: String,
    pub products: Vec<ScoredProduct>,
    pub routine: Routine,
    #[serde(rename = "usageTips")]
    pub usage_tips: Vec<String>,
    #[serde(rename = "strengthGuidance")]
    pub strength_guidance: Vec<StrengthAdvice>,
    #[serde(rename = "ingredientConflicts")]
    pub ingredient_conflicts: Vec<IngredientConflict>,
    #[serde(rename = "generalCare")]
    pub general_care: GeneralCare,
}

/// Scoring weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub ingredients: f64,
    pub skin_type: f64,
    pub concerns: f64,
    pub budget: f64,
    pub preferences: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            ingredients: 0.4,
            skin_type: 0.2,
            concerns: 0.2,
            budget: 0.1,
            preferences: 0.1,
        }
    }
}
