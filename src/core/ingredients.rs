use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::knowledge::{normalize_ingredient, KnowledgeBase};
use crate::models::{Concern, Sensitivity, SkinProfile};

/// Output of the ingredient selector.
///
/// `ingredients` and `avoid` keep first-seen order across the knowledge
/// base's concern order, so "first N" quotes are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngredientRecommendation {
    pub concerns: Vec<Concern>,
    pub ingredients: Vec<String>,
    pub avoid: Vec<String>,
}

impl IngredientRecommendation {
    pub fn contains(&self, ingredient: &str) -> bool {
        let key = normalize_ingredient(ingredient);
        self.ingredients.iter().any(|i| *i == key)
    }
}

fn push_unique(target: &mut Vec<String>, seen: &mut BTreeSet<String>, ingredient: &str) {
    let key = normalize_ingredient(ingredient);
    if seen.insert(key.clone()) {
        target.push(key);
    }
}

/// Walk the profile's active concerns through the knowledge base.
///
/// With high sensitivity no ingredient appearing on any active concern's
/// `avoid_if_sensitive` list survives.
pub fn select_ingredients(profile: &SkinProfile, knowledge_base: &KnowledgeBase) -> IngredientRecommendation {
    let active: Vec<_> = knowledge_base
        .concerns
        .iter()
        .filter(|entry| profile.has_concern(entry.concern))
        .collect();

    let sensitive_avoid: BTreeSet<String> = active
        .iter()
        .flat_map(|entry| entry.avoid_if_sensitive.iter())
        .map(|i| normalize_ingredient(i))
        .collect();
    let filter_sensitive = profile.sensitivity == Sensitivity::High;

    let mut result = IngredientRecommendation {
        concerns: active.iter().map(|entry| entry.concern).collect(),
        ..IngredientRecommendation::default()
    };

    let mut seen = BTreeSet::new();
    for entry in &active {
        for ingredient in &entry.recommended {
            if filter_sensitive && sensitive_avoid.contains(&normalize_ingredient(ingredient)) {
                tracing::debug!("Dropping {} for high sensitivity ({})", ingredient, entry.concern);
                continue;
            }
            push_unique(&mut result.ingredients, &mut seen, ingredient);
        }
    }

    let mut seen_avoid = BTreeSet::new();
    for ingredient in active.iter().flat_map(|entry| entry.avoid_if_sensitive.iter()) {
        push_unique(&mut result.avoid, &mut seen_avoid, ingredient);
    }
    if let Some(guidance) = knowledge_base.skin_type_guidance(profile.skin_type) {
        for ingredient in &guidance.avoid_ingredients {
            push_unique(&mut result.avoid, &mut seen_avoid, ingredient);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::knowledge::ConcernEntry;
    use crate::models::{BudgetTier, Preferences, SkinType};

    fn profile(concerns: &[Concern], sensitivity: Sensitivity) -> SkinProfile {
        SkinProfile {
            concerns: concerns.iter().copied().collect(),
            skin_type: SkinType::Normal,
            sensitivity,
            budget: BudgetTier::Medium,
            preferences: Preferences::default(),
            skin_tone: None,
            allergies: vec![],
            max_price: None,
        }
    }

    fn small_kb() -> KnowledgeBase {
        KnowledgeBase {
            concerns: vec![
                ConcernEntry {
                    concern: Concern::Acne,
                    recommended: vec!["salicylic acid".into(), "fragrance".into(), "niacinamide".into()],
                    avoid_if_sensitive: vec!["fragrance".into()],
                    strength_levels: Default::default(),
                },
                ConcernEntry {
                    concern: Concern::Dryness,
                    recommended: vec!["niacinamide".into(), "Ceramides".into(), "retinol".into()],
                    avoid_if_sensitive: vec!["retinol".into()],
                    strength_levels: Default::default(),
                },
            ],
            skin_types: vec![],
            categories: vec![],
            budget_tiers: vec![],
            compatibility: vec![],
        }
    }

    #[test]
    fn test_no_concerns_selects_nothing() {
        let result = select_ingredients(&profile(&[], Sensitivity::Low), &small_kb());
        assert!(result.ingredients.is_empty());
        assert!(result.concerns.is_empty());
    }

    #[test]
    fn test_single_concern_low_sensitivity_returns_full_list() {
        let result = select_ingredients(&profile(&[Concern::Acne], Sensitivity::Low), &small_kb());
        assert_eq!(result.ingredients, vec!["salicylic acid", "fragrance", "niacinamide"]);
        assert_eq!(result.avoid, vec!["fragrance"]);
    }

    #[test]
    fn test_high_sensitivity_strips_avoid_list() {
        let result = select_ingredients(&profile(&[Concern::Acne], Sensitivity::High), &small_kb());
        assert_eq!(result.ingredients, vec!["salicylic acid", "niacinamide"]);
    }

    #[test]
    fn test_high_sensitivity_applies_every_active_avoid_list() {
        let mut kb = small_kb();
        kb.concerns[0].recommended.push("retinol".into());

        let result = select_ingredients(
            &profile(&[Concern::Acne, Concern::Dryness], Sensitivity::High),
            &kb,
        );

        assert!(!result.contains("retinol"));
        assert!(!result.contains("fragrance"));
    }

    #[test]
    fn test_union_is_deduplicated_in_first_seen_order() {
        let result = select_ingredients(
            &profile(&[Concern::Dryness, Concern::Acne], Sensitivity::Medium),
            &small_kb(),
        );
        assert_eq!(result.concerns, vec![Concern::Acne, Concern::Dryness]);
        assert_eq!(
            result.ingredients,
            vec!["salicylic acid", "fragrance", "niacinamide", "ceramides", "retinol"]
        );
    }

    #[test]
    fn test_skin_type_avoid_list_included() {
        let kb = KnowledgeBase::builtin();
        let mut p = profile(&[Concern::Acne], Sensitivity::Low);
        p.skin_type = SkinType::Oily;

        let result = select_ingredients(&p, &kb);

        assert!(result.avoid.contains(&"petrolatum".to_string()));
        assert!(result.avoid.contains(&"fragrance".to_string()));
    }
}
