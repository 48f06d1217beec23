use serde::{Deserialize, Serialize};

use crate::core::ingredients::IngredientRecommendation;
use crate::core::knowledge::{normalize_ingredient, KnowledgeBase, SkinTypeGuidance, UsageTime};
use crate::models::{
    BudgetGuidance, CareStep, Concern, GeneralCare, IngredientConflict, Lifestyle, ProductCategory,
    Recommendation, Routine, RoutineStep, ScoredProduct, Sensitivity, SkinProfile, SkinType,
    StrengthAdvice, SunProtection,
};

const ADVICE_INGREDIENTS: usize = 5;
const ADVICE_AVOID: usize = 3;
const TIMING_TIP_INGREDIENTS: usize = 3;
const CARE_STEP_INGREDIENTS: usize = 3;
const DEFAULT_FREQUENCY: &str = "twice daily";

const GENTLE_ADVICE: &str = "Based on your skin profile, focus on gentle, hydrating ingredients.";
const EMPTY_CATALOG_ADVICE: &str =
    "No catalog products matched your profile and filters, so no products are listed yet.";

/// Assemble the final recommendation from the ranked products
pub fn compose(
    profile: &SkinProfile,
    recommendation: &IngredientRecommendation,
    products: Vec<ScoredProduct>,
    knowledge_base: &KnowledgeBase,
) -> Recommendation {
    let mut ingredient_advice = ingredient_advice(recommendation);
    if products.is_empty() {
        ingredient_advice.push(' ');
        ingredient_advice.push_str(EMPTY_CATALOG_ADVICE);
    }

    Recommendation {
        ingredient_advice,
        routine: routine_split(&products),
        usage_tips: usage_tips(profile, recommendation, knowledge_base),
        strength_guidance: strength_guidance(profile, recommendation, knowledge_base),
        ingredient_conflicts: ingredient_conflicts(recommendation, knowledge_base),
        general_care: general_care(profile, knowledge_base),
        products,
    }
}

/// Sentence naming the active concerns, the first five ingredients and up to
/// three ingredients to avoid
pub fn ingredient_advice(recommendation: &IngredientRecommendation) -> String {
    if recommendation.ingredients.is_empty() {
        return GENTLE_ADVICE.to_string();
    }

    let concerns: Vec<&str> = recommendation.concerns.iter().map(|c| c.as_str()).collect();
    let ingredients: Vec<&str> = recommendation
        .ingredients
        .iter()
        .take(ADVICE_INGREDIENTS)
        .map(String::as_str)
        .collect();

    let mut advice = format!(
        "For your skin concerns ({}), look for products containing: {}.",
        concerns.join(", "),
        ingredients.join(", ")
    );

    if !recommendation.avoid.is_empty() {
        let avoid: Vec<&str> = recommendation
            .avoid
            .iter()
            .take(ADVICE_AVOID)
            .map(String::as_str)
            .collect();
        advice.push_str(&format!(" Avoid: {}.", avoid.join(", ")));
    }

    advice
}

/// Split products into morning and evening routines by their usage text
pub fn routine_split(products: &[ScoredProduct]) -> Routine {
    let mut routine = Routine::default();

    for scored in products {
        let usage = scored.product.usage.to_lowercase();
        let step = || RoutineStep {
            product_id: scored.product.id.clone(),
            name: scored.product.name.clone(),
            category: scored.product.category,
        };

        if usage.contains("morning") {
            routine.morning.push(step());
        }
        if usage.contains("evening") {
            routine.evening.push(step());
        }
    }

    routine
}

pub fn usage_tips(
    profile: &SkinProfile,
    recommendation: &IngredientRecommendation,
    knowledge_base: &KnowledgeBase,
) -> Vec<String> {
    let mut tips = Vec::new();

    if profile.sensitivity >= Sensitivity::Medium {
        tips.push("Start with lower concentrations and patch test new products".to_string());
        tips.push("Use products once daily initially, then increase frequency".to_string());
    }

    match profile.skin_type {
        SkinType::Oily => tips.push("Use lightweight, non-comedogenic products".to_string()),
        SkinType::Dry => tips.push("Layer products and use occlusive moisturizers".to_string()),
        _ => {}
    }

    for ingredient in recommendation.ingredients.iter().take(TIMING_TIP_INGREDIENTS) {
        let time = knowledge_base.optimal_usage_time(ingredient);
        if time != UsageTime::Any {
            tips.push(format!("Use {} products in the {}", ingredient, time.as_str()));
        }
    }

    tips
}

/// Dosage advice for every selected ingredient the knowledge base documents
pub fn strength_guidance(
    profile: &SkinProfile,
    recommendation: &IngredientRecommendation,
    knowledge_base: &KnowledgeBase,
) -> Vec<StrengthAdvice> {
    recommendation
        .ingredients
        .iter()
        .filter_map(|ingredient| knowledge_base.strength_recommendation(ingredient, profile.sensitivity))
        .collect()
}

/// Pairs of selected ingredients that should not share a routine step
pub fn ingredient_conflicts(
    recommendation: &IngredientRecommendation,
    knowledge_base: &KnowledgeBase,
) -> Vec<IngredientConflict> {
    pairwise_conflicts(&recommendation.ingredients, knowledge_base)
}

fn pairwise_conflicts(ingredients: &[String], knowledge_base: &KnowledgeBase) -> Vec<IngredientConflict> {
    let mut conflicts = Vec::new();

    for (i, first) in ingredients.iter().enumerate() {
        for second in &ingredients[i + 1..] {
            if !knowledge_base.is_compatible(first, second) {
                conflicts.push(IngredientConflict {
                    first: first.clone(),
                    second: second.clone(),
                });
            }
        }
    }

    conflicts
}

/// Outcome of checking a user-supplied ingredient list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub ingredients: Vec<String>,
    pub compatible: bool,
    pub conflicts: Vec<IngredientConflict>,
    pub advice: Vec<String>,
}

/// Check every pair in `ingredients` against the compatibility matrix.
///
/// Names are normalized and deduplicated first. Each conflict gets one line
/// of advice: split by time of day when the two ingredients prefer different
/// times, alternate days otherwise.
pub fn check_compatibility(ingredients: &[String], knowledge_base: &KnowledgeBase) -> CompatibilityReport {
    let mut normalized: Vec<String> = Vec::new();
    for ingredient in ingredients.iter().map(|i| normalize_ingredient(i)) {
        if !ingredient.is_empty() && !normalized.contains(&ingredient) {
            normalized.push(ingredient);
        }
    }

    let conflicts = pairwise_conflicts(&normalized, knowledge_base);
    let advice = conflicts
        .iter()
        .map(|conflict| {
            let first = knowledge_base.optimal_usage_time(&conflict.first);
            let second = knowledge_base.optimal_usage_time(&conflict.second);
            if first == UsageTime::Any || second == UsageTime::Any || first == second {
                format!("Use {} and {} on alternate days", conflict.first, conflict.second)
            } else {
                format!(
                    "Use {} in the {} and {} in the {}",
                    conflict.first,
                    first.as_str(),
                    conflict.second,
                    second.as_str()
                )
            }
        })
        .collect();

    CompatibilityReport {
        compatible: conflicts.is_empty(),
        ingredients: normalized,
        conflicts,
        advice,
    }
}

/// Skin-type, category and budget tables turned into routine-level advice
pub fn general_care(profile: &SkinProfile, knowledge_base: &KnowledgeBase) -> GeneralCare {
    let guidance = knowledge_base.skin_type_guidance(profile.skin_type);

    GeneralCare {
        skin_type: profile.skin_type,
        preferred_ingredients: guidance
            .map(|g| g.preferred_ingredients.clone())
            .unwrap_or_default(),
        textures: guidance
            .map(|g| g.texture_preferences.clone())
            .unwrap_or_default(),
        cleansing: care_step(ProductCategory::Cleanser, guidance, knowledge_base),
        moisturizing: care_step(ProductCategory::Moisturizer, guidance, knowledge_base),
        sun_protection: sun_protection(profile, knowledge_base),
        lifestyle: lifestyle(profile),
        budget: knowledge_base.budget_tier(profile.budget).map(|info| BudgetGuidance {
            tier: info.tier,
            range: info.range.clone(),
            brands: info.brands.clone(),
            priorities: info.priorities.clone(),
        }),
    }
}

/// Category template ingredients, skin-type favourites first
fn care_step(
    category: ProductCategory,
    guidance: Option<&SkinTypeGuidance>,
    knowledge_base: &KnowledgeBase,
) -> Option<CareStep> {
    let template = knowledge_base.category(category)?;

    let preferred = |ingredient: &&String| {
        guidance.map_or(false, |g| {
            g.preferred_ingredients
                .iter()
                .any(|p| normalize_ingredient(p) == normalize_ingredient(ingredient))
        })
    };
    let (mut ingredients, rest): (Vec<&String>, Vec<&String>) =
        template.ingredients.iter().partition(preferred);
    ingredients.extend(rest);

    Some(CareStep {
        category,
        frequency: guidance
            .map(|g| g.frequency.clone())
            .unwrap_or_else(|| DEFAULT_FREQUENCY.to_string()),
        usage: template.usage.clone(),
        textures: template
            .texture
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        ingredients: ingredients
            .into_iter()
            .take(CARE_STEP_INGREDIENTS)
            .cloned()
            .collect(),
        avoid: guidance.map(|g| g.avoid_ingredients.clone()).unwrap_or_default(),
    })
}

fn sun_protection(profile: &SkinProfile, knowledge_base: &KnowledgeBase) -> SunProtection {
    let pigment_prone =
        profile.has_concern(Concern::Hyperpigmentation) || profile.has_concern(Concern::UnevenTone);

    SunProtection {
        spf: if pigment_prone { "SPF 50+" } else { "SPF 30+" }.to_string(),
        texture: if profile.skin_type == SkinType::Oily {
            "oil-free gel"
        } else {
            "lightweight lotion"
        }
        .to_string(),
        ingredients: knowledge_base
            .category(ProductCategory::Sunscreen)
            .map(|t| t.ingredients.clone())
            .unwrap_or_else(|| vec!["zinc oxide".to_string(), "titanium dioxide".to_string()]),
        reapplication: "every 2 hours".to_string(),
        notes: "Apply 15 minutes before sun exposure".to_string(),
    }
}

fn lifestyle(profile: &SkinProfile) -> Lifestyle {
    let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    let mut lifestyle = Lifestyle {
        diet: owned(&["Stay hydrated", "Eat antioxidant-rich foods", "Limit dairy if acne-prone"]),
        sleep: owned(&["Get 7-9 hours of sleep", "Sleep on clean pillowcases"]),
        stress: owned(&["Practice stress management", "Exercise regularly"]),
        environment: owned(&[
            "Avoid touching face",
            "Clean phone regularly",
            "Use humidifier in dry climates",
        ]),
    };

    if profile.has_concern(Concern::Acne) {
        lifestyle.diet.push("Limit high-glycemic foods".to_string());
        lifestyle.environment.push("Change pillowcases weekly".to_string());
    }
    if profile.has_concern(Concern::Hyperpigmentation) {
        lifestyle.environment.push("Wear wide-brimmed hats".to_string());
        lifestyle.environment.push("Seek shade during peak hours".to_string());
    }

    lifestyle
}
