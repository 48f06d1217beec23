//! Static skincare knowledge base.
//!
//! Built once at startup (either from the built-in tables or a TOML override)
//! and shared read-only with every request.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::core::error::{EngineError, EngineResult};
use crate::models::{
    BudgetTier, Concern, ProductCategory, Sensitivity, SkinType, StrengthAdvice, StrengthLevel,
};

/// Dosage guidance for one ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthLevels {
    pub mild: String,
    pub moderate: String,
    pub strong: String,
}

impl StrengthLevels {
    pub fn get(&self, level: StrengthLevel) -> &str {
        match level {
            StrengthLevel::Mild => &self.mild,
            StrengthLevel::Moderate => &self.moderate,
            StrengthLevel::Strong => &self.strong,
        }
    }
}

/// Knowledge base row for one concern.
///
/// `recommended` is ordered by authoring priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcernEntry {
    pub concern: Concern,
    pub recommended: Vec<String>,
    #[serde(default)]
    pub avoid_if_sensitive: Vec<String>,
    #[serde(default)]
    pub strength_levels: BTreeMap<String, StrengthLevels>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinTypeGuidance {
    pub skin_type: SkinType,
    pub preferred_ingredients: Vec<String>,
    #[serde(default)]
    pub avoid_ingredients: Vec<String>,
    #[serde(default)]
    pub texture_preferences: Vec<String>,
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTemplate {
    pub category: ProductCategory,
    pub ingredients: Vec<String>,
    pub usage: String,
    pub texture: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetTierInfo {
    pub tier: BudgetTier,
    pub range: String,
    #[serde(default)]
    pub brands: Vec<String>,
    #[serde(default)]
    pub priorities: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageTime {
    Morning,
    Evening,
    Any,
}

impl UsageTime {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageTime::Morning => "morning",
            UsageTime::Evening => "evening",
            UsageTime::Any => "any",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityEntry {
    pub ingredient: String,
    #[serde(default)]
    pub compatible: Vec<String>,
    #[serde(default)]
    pub incompatible: Vec<String>,
    pub best_time: UsageTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub concerns: Vec<ConcernEntry>,
    #[serde(default)]
    pub skin_types: Vec<SkinTypeGuidance>,
    #[serde(default)]
    pub categories: Vec<CategoryTemplate>,
    #[serde(default)]
    pub budget_tiers: Vec<BudgetTierInfo>,
    #[serde(default)]
    pub compatibility: Vec<CompatibilityEntry>,
}

/// Lowercase, trim and treat `_` as a space so "vitamin_c" == "Vitamin C"
pub fn normalize_ingredient(name: &str) -> String {
    name.trim().to_lowercase().replace('_', " ")
}

impl KnowledgeBase {
    /// Parse a knowledge base from TOML, rejecting unknown concern keys
    pub fn from_toml_str(source: &str) -> EngineResult<Self> {
        let kb: KnowledgeBase = toml::from_str(source)
            .map_err(|e| EngineError::Configuration(format!("invalid knowledge base: {}", e)))?;
        kb.validate()?;
        Ok(kb)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Configuration(format!("cannot read knowledge base {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&source)
    }

    fn validate(&self) -> EngineResult<()> {
        let mut seen = BTreeSet::new();
        for entry in &self.concerns {
            if !seen.insert(entry.concern) {
                return Err(EngineError::Configuration(format!(
                    "duplicate knowledge base entry for concern {}",
                    entry.concern
                )));
            }
            if entry.recommended.is_empty() {
                return Err(EngineError::Configuration(format!(
                    "concern {} has no recommended ingredients",
                    entry.concern
                )));
            }
        }
        Ok(())
    }

    pub fn concern(&self, concern: Concern) -> Option<&ConcernEntry> {
        self.concerns.iter().find(|e| e.concern == concern)
    }

    pub fn skin_type_guidance(&self, skin_type: SkinType) -> Option<&SkinTypeGuidance> {
        self.skin_types.iter().find(|g| g.skin_type == skin_type)
    }

    pub fn category(&self, category: ProductCategory) -> Option<&CategoryTemplate> {
        self.categories.iter().find(|c| c.category == category)
    }

    pub fn budget_tier(&self, tier: BudgetTier) -> Option<&BudgetTierInfo> {
        self.budget_tiers.iter().find(|b| b.tier == tier)
    }

    fn compatibility_entry(&self, ingredient: &str) -> Option<&CompatibilityEntry> {
        let key = normalize_ingredient(ingredient);
        self.compatibility
            .iter()
            .find(|e| normalize_ingredient(&e.ingredient) == key)
    }

    /// Preferred time of day for an ingredient; unknown ingredients are `Any`
    pub fn optimal_usage_time(&self, ingredient: &str) -> UsageTime {
        self.compatibility_entry(ingredient)
            .map(|e| e.best_time)
            .unwrap_or(UsageTime::Any)
    }

    /// Two ingredients conflict when either lists the other as incompatible
    pub fn is_compatible(&self, first: &str, second: &str) -> bool {
        let lists = |a: &str, b: &str| {
            let b = normalize_ingredient(b);
            self.compatibility_entry(a)
                .map(|e| e.incompatible.iter().any(|i| normalize_ingredient(i) == b))
                .unwrap_or(false)
        };
        !(lists(first, second) || lists(second, first))
    }

    /// Dosage guidance from the first concern that documents the ingredient.
    ///
    /// Medium and high sensitivity get the mild strength, everyone else moderate.
    pub fn strength_recommendation(
        &self,
        ingredient: &str,
        sensitivity: Sensitivity,
    ) -> Option<StrengthAdvice> {
        let key = normalize_ingredient(ingredient);
        let levels = self.concerns.iter().find_map(|entry| {
            entry
                .strength_levels
                .iter()
                .find(|(name, _)| normalize_ingredient(name) == key)
                .map(|(_, levels)| levels)
        })?;

        let level = if sensitivity >= Sensitivity::Medium {
            StrengthLevel::Mild
        } else {
            StrengthLevel::Moderate
        };

        Some(StrengthAdvice {
            ingredient: key,
            level,
            dosage: levels.get(level).to_string(),
        })
    }

    /// Built-in dermatology tables
    pub fn builtin() -> Self {
        Self {
            concerns: builtin_concerns(),
            skin_types: builtin_skin_types(),
            categories: builtin_categories(),
            budget_tiers: builtin_budget_tiers(),
            compatibility: builtin_compatibility(),
        }
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn levels(mild: &str, moderate: &str, strong: &str) -> StrengthLevels {
    StrengthLevels {
        mild: mild.to_string(),
        moderate: moderate.to_string(),
        strong: strong.to_string(),
    }
}

fn concern_entry(
    concern: Concern,
    recommended: &[&str],
    avoid_if_sensitive: &[&str],
    strength_levels: &[(&str, StrengthLevels)],
) -> ConcernEntry {
    ConcernEntry {
        concern,
        recommended: strings(recommended),
        avoid_if_sensitive: strings(avoid_if_sensitive),
        strength_levels: strength_levels
            .iter()
            .map(|(name, l)| (name.to_string(), l.clone()))
            .collect(),
    }
}

fn builtin_concerns() -> Vec<ConcernEntry> {
    vec![
        concern_entry(
            Concern::Acne,
            &[
                "salicylic acid", "niacinamide", "benzoyl peroxide", "azelaic acid", "tea tree oil",
                "zinc", "sulfur", "glycolic acid", "lactic acid", "retinol",
            ],
            &["high percentage aha/bha", "strong retinoids", "fragrance", "alcohol denat"],
            &[
                ("salicylic acid", levels("0.5-1%", "2%", "2%+")),
                ("benzoyl peroxide", levels("2.5%", "5%", "10%")),
                ("niacinamide", levels("2-5%", "10%", "10%+")),
                ("azelaic acid", levels("10%", "15%", "20%")),
            ],
        ),
        concern_entry(
            Concern::Wrinkles,
            &[
                "retinol", "peptides", "bakuchiol", "vitamin c", "niacinamide", "hyaluronic acid",
                "copper peptides", "matrixyl", "argireline", "collagen",
            ],
            &["high percentage retinol", "strong acids", "fragrance", "essential oils"],
            &[
                ("retinol", levels("0.01-0.03%", "0.05-0.1%", "0.1%+")),
                ("bakuchiol", levels("0.5-1%", "1-2%", "2%+")),
            ],
        ),
        concern_entry(
            Concern::Hyperpigmentation,
            &[
                "vitamin c", "niacinamide", "alpha arbutin", "azelaic acid", "kojic acid",
                "tranexamic acid", "licorice root extract", "vitamin e", "ferulic acid", "glutathione",
            ],
            &["hydroquinone", "high percentage acids", "fragrance", "essential oils"],
            &[
                ("vitamin c", levels("5-10%", "15-20%", "20%+")),
                ("niacinamide", levels("2-5%", "10%", "10%+")),
                ("alpha arbutin", levels("1-2%", "2-4%", "4%+")),
            ],
        ),
        concern_entry(
            Concern::Dryness,
            &[
                "hyaluronic acid", "ceramides", "squalane", "glycerin", "shea butter", "jojoba oil",
                "argan oil", "vitamin e", "panthenol", "urea",
            ],
            &["fragrance", "alcohol", "strong acids", "retinoids"],
            &[
                ("hyaluronic acid", levels("0.5-1%", "1-2%", "2%+")),
                ("ceramides", levels("0.5-1%", "1-2%", "2%+")),
                ("glycerin", levels("2-5%", "5-10%", "10%+")),
            ],
        ),
        concern_entry(
            Concern::Redness,
            &[
                "centella asiatica", "panthenol", "niacinamide", "aloe vera", "green tea extract",
                "chamomile", "licorice root", "zinc", "vitamin e", "ceramides",
            ],
            &["fragrance", "alcohol", "strong acids", "retinoids", "essential oils"],
            &[
                ("centella asiatica", levels("0.5-1%", "1-2%", "2%+")),
                ("panthenol", levels("1-2%", "2-5%", "5%+")),
            ],
        ),
        concern_entry(
            Concern::Oiliness,
            &["niacinamide", "salicylic acid", "zinc", "kaolin clay"],
            &["strong acids", "alcohol-based toners"],
            &[],
        ),
        concern_entry(
            Concern::Pores,
            &[
                "niacinamide", "salicylic acid", "glycolic acid", "lactic acid", "zinc", "clay",
                "vitamin c", "retinol", "azelaic acid", "tea tree oil",
            ],
            &["high percentage acids", "strong retinoids", "fragrance", "alcohol"],
            &[
                ("niacinamide", levels("2-5%", "10%", "10%+")),
                ("salicylic acid", levels("0.5-1%", "2%", "2%+")),
            ],
        ),
        concern_entry(
            Concern::Dullness,
            &[
                "vitamin c", "glycolic acid", "lactic acid", "niacinamide", "alpha hydroxy acids",
                "vitamin e", "ferulic acid", "kojic acid", "licorice root", "peptides",
            ],
            &["high percentage acids", "strong retinoids", "fragrance", "alcohol"],
            &[
                ("vitamin c", levels("5-10%", "15-20%", "20%+")),
                ("glycolic acid", levels("5-10%", "10-15%", "15%+")),
            ],
        ),
        concern_entry(
            Concern::SensitiveSkin,
            &["aloe vera", "oat extract", "squalane", "panthenol"],
            &["fragrance", "essential oils", "strong acids"],
            &[],
        ),
        concern_entry(
            Concern::UnevenTone,
            &["niacinamide", "alpha arbutin", "kojic acid", "vitamin c"],
            &["strong acids", "hydroquinone"],
            &[],
        ),
    ]
}

fn skin_type(
    skin_type: SkinType,
    preferred: &[&str],
    avoid: &[&str],
    textures: &[&str],
    frequency: &str,
) -> SkinTypeGuidance {
    SkinTypeGuidance {
        skin_type,
        preferred_ingredients: strings(preferred),
        avoid_ingredients: strings(avoid),
        texture_preferences: strings(textures),
        frequency: frequency.to_string(),
    }
}

fn builtin_skin_types() -> Vec<SkinTypeGuidance> {
    vec![
        skin_type(
            SkinType::Oily,
            &["niacinamide", "salicylic acid", "zinc", "clay"],
            &["heavy oils", "petrolatum", "lanolin"],
            &["gel", "serum", "light lotion"],
            "twice daily",
        ),
        skin_type(
            SkinType::Dry,
            &["hyaluronic acid", "ceramides", "squalane", "glycerin"],
            &["alcohol", "fragrance", "strong acids"],
            &["cream", "balm", "oil"],
            "twice daily",
        ),
        skin_type(
            SkinType::Combination,
            &["niacinamide", "hyaluronic acid", "lightweight oils"],
            &["heavy creams", "strong acids"],
            &["gel", "light cream", "serum"],
            "twice daily",
        ),
        skin_type(
            SkinType::Sensitive,
            &["centella asiatica", "panthenol", "ceramides", "aloe vera"],
            &["fragrance", "alcohol", "essential oils", "strong acids"],
            &["cream", "balm", "gentle lotion"],
            "once daily initially",
        ),
        skin_type(
            SkinType::Normal,
            &["vitamin c", "niacinamide", "hyaluronic acid"],
            &["irritating ingredients"],
            &["any texture"],
            "twice daily",
        ),
    ]
}

fn category(category: ProductCategory, ingredients: &[&str], usage: &str, texture: &str) -> CategoryTemplate {
    CategoryTemplate {
        category,
        ingredients: strings(ingredients),
        usage: usage.to_string(),
        texture: texture.to_string(),
    }
}

fn builtin_categories() -> Vec<CategoryTemplate> {
    vec![
        category(
            ProductCategory::Cleanser,
            &["salicylic acid", "glycolic acid", "niacinamide", "ceramides"],
            "morning and evening",
            "gel, foam, cream",
        ),
        category(
            ProductCategory::Toner,
            &["niacinamide", "glycolic acid", "lactic acid", "vitamin c"],
            "after cleansing",
            "liquid, mist",
        ),
        category(
            ProductCategory::Serum,
            &["vitamin c", "niacinamide", "retinol", "hyaluronic acid"],
            "after toner, before moisturizer",
            "liquid, gel",
        ),
        category(
            ProductCategory::Moisturizer,
            &["ceramides", "hyaluronic acid", "squalane", "glycerin"],
            "after serum",
            "cream, gel, lotion",
        ),
        category(
            ProductCategory::Sunscreen,
            &["zinc oxide", "titanium dioxide", "niacinamide"],
            "morning, last step",
            "cream, gel, lotion",
        ),
        category(
            ProductCategory::Treatment,
            &["retinol", "azelaic acid", "benzoyl peroxide", "alpha arbutin"],
            "evening, after serum",
            "cream, gel, liquid",
        ),
    ]
}

fn budget_tier(tier: BudgetTier, range: &str, brands: &[&str], priorities: &[&str]) -> BudgetTierInfo {
    BudgetTierInfo {
        tier,
        range: range.to_string(),
        brands: strings(brands),
        priorities: strings(priorities),
    }
}

fn builtin_budget_tiers() -> Vec<BudgetTierInfo> {
    vec![
        budget_tier(
            BudgetTier::Low,
            "$5-$25",
            &["The Ordinary", "CeraVe", "Neutrogena", "Simple"],
            &["effectiveness", "value", "availability"],
        ),
        budget_tier(
            BudgetTier::Medium,
            "$25-$75",
            &["Paula's Choice", "The Inkey List", "La Roche-Posay", "CeraVe"],
            &["quality", "effectiveness", "ingredient concentration"],
        ),
        budget_tier(
            BudgetTier::High,
            "$75-$200",
            &["Skinceuticals", "Drunk Elephant", "Sunday Riley", "Tatcha"],
            &["luxury", "innovation", "brand reputation"],
        ),
        budget_tier(
            BudgetTier::Luxury,
            "$200+",
            &["La Mer", "La Prairie", "Sisley", "Chantecaille"],
            &["luxury", "exclusivity", "premium ingredients"],
        ),
    ]
}

fn compatibility(ingredient: &str, compatible: &[&str], incompatible: &[&str], best_time: UsageTime) -> CompatibilityEntry {
    CompatibilityEntry {
        ingredient: ingredient.to_string(),
        compatible: strings(compatible),
        incompatible: strings(incompatible),
        best_time,
    }
}

fn builtin_compatibility() -> Vec<CompatibilityEntry> {
    vec![
        compatibility(
            "vitamin c",
            &["vitamin e", "ferulic acid", "hyaluronic acid"],
            &["niacinamide", "retinol", "benzoyl peroxide"],
            UsageTime::Morning,
        ),
        compatibility(
            "niacinamide",
            &["hyaluronic acid", "peptides", "ceramides"],
            &["vitamin c", "strong acids"],
            UsageTime::Any,
        ),
        compatibility(
            "retinol",
            &["hyaluronic acid", "ceramides", "peptides"],
            &["vitamin c", "benzoyl peroxide", "strong acids"],
            UsageTime::Evening,
        ),
        compatibility(
            "salicylic acid",
            &["niacinamide", "hyaluronic acid"],
            &["retinol", "strong acids"],
            UsageTime::Morning,
        ),
        compatibility(
            "benzoyl peroxide",
            &["clindamycin", "zinc"],
            &["retinol", "vitamin c"],
            UsageTime::Evening,
        ),
    ]
}
