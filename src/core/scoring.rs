use crate::core::ingredients::IngredientRecommendation;
use crate::models::{
    BudgetTier, Concern, Preferences, Product, ScoreBreakdown, ScoringWeights, SkinProfile, SkinType,
};

/// Calculate the ranking score for a product against a profile
///
/// Scoring formula:
/// score = (
///     ingredient_score * 0.4 +     # Recommended ingredients present, avoided ones penalised
///     skin_type_score * 0.2 +      # 1.0 listed, 0.7 "normal" fallback, 0.3 otherwise
///     concern_score * 0.2 +        # Share of the profile's concerns the product targets
///     budget_score * 0.1 +         # 1.0 same tier, 0.7 cheaper tier, 0.3 pricier tier
///     preference_score * 0.1       # Stated preferences satisfied (uncapped)
/// )
///
/// No normalization is applied; the result is only meaningful for ordering.
pub fn calculate_product_score(
    product: &Product,
    profile: &SkinProfile,
    recommendation: &IngredientRecommendation,
    weights: &ScoringWeights,
) -> (f64, ScoreBreakdown, Vec<String>) {
    let (ingredients, matched) = calculate_ingredient_score(
        &product.ingredients,
        &recommendation.ingredients,
        &recommendation.avoid,
    );

    let breakdown = ScoreBreakdown {
        ingredients,
        skin_type: calculate_skin_type_score(&product.skin_types, profile.skin_type),
        concerns: calculate_concern_score(&product.concerns, profile),
        budget: calculate_budget_score(product.budget_tier, profile.budget),
        preferences: calculate_preference_score(product, &profile.preferences),
    };

    let total = breakdown.ingredients * weights.ingredients
        + breakdown.skin_type * weights.skin_type
        + breakdown.concerns * weights.concerns
        + breakdown.budget * weights.budget
        + breakdown.preferences * weights.preferences;

    (total, breakdown, matched)
}

/// Case-insensitive substring match of `needle` against any product ingredient
#[inline]
fn contains_ingredient(product_ingredients: &[String], needle: &str) -> bool {
    let needle = needle.to_lowercase();
    product_ingredients
        .iter()
        .any(|ingredient| ingredient.to_lowercase().contains(&needle))
}

/// Ingredient match score (floored at 0)
///
/// (recommended hits - 0.5 * avoid hits) / recommended count. With nothing
/// recommended there is nothing to match and the score is 0.
pub fn calculate_ingredient_score(
    product_ingredients: &[String],
    recommended: &[String],
    avoid: &[String],
) -> (f64, Vec<String>) {
    if recommended.is_empty() {
        return (0.0, Vec::new());
    }

    let matched: Vec<String> = recommended
        .iter()
        .filter(|ingredient| contains_ingredient(product_ingredients, ingredient))
        .cloned()
        .collect();

    let avoided = avoid
        .iter()
        .filter(|ingredient| contains_ingredient(product_ingredients, ingredient))
        .count();

    let raw = matched.len() as f64 - 0.5 * avoided as f64;
    ((raw / recommended.len() as f64).max(0.0), matched)
}

#[inline]
pub fn calculate_skin_type_score(product_skin_types: &[SkinType], skin_type: SkinType) -> f64 {
    if product_skin_types.contains(&skin_type) {
        1.0
    } else if product_skin_types.contains(&SkinType::Normal) {
        0.7
    } else {
        0.3
    }
}

/// Share of the profile's concerns that the product addresses
#[inline]
pub fn calculate_concern_score(product_concerns: &[Concern], profile: &SkinProfile) -> f64 {
    if profile.concerns.is_empty() {
        return 0.5;
    }

    let overlap = profile
        .concerns
        .iter()
        .filter(|concern| product_concerns.contains(concern))
        .count();

    overlap as f64 / profile.concerns.len() as f64
}

/// Cheaper-than-budget products are never scored below pricier ones
#[inline]
pub fn calculate_budget_score(product_tier: BudgetTier, profile_tier: BudgetTier) -> f64 {
    if product_tier == profile_tier {
        1.0
    } else if product_tier < profile_tier {
        0.7
    } else {
        0.3
    }
}

/// Preference score; each term counts only when requested and satisfied
pub fn calculate_preference_score(product: &Product, preferences: &Preferences) -> f64 {
    let mut score = 0.0;

    if preferences.wants_fragrance_free() && product.fragrance_free {
        score += 0.3;
    }
    if preferences.wants_cruelty_free() && product.cruelty_free {
        score += 0.3;
    }
    if preferences.wants_vegan() && product.vegan {
        score += 0.2;
    }
    if preferences.product_types.contains(&product.category) {
        score += 0.2;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductCategory, Sensitivity};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn create_test_product(ingredients: &[&str], tier: BudgetTier) -> Product {
        Product {
            id: "prod_test".to_string(),
            name: "Test Serum".to_string(),
            brand: "Test".to_string(),
            category: ProductCategory::Serum,
            ingredients: strings(ingredients),
            price: 15.0,
            rating: 4.0,
            budget_tier: tier,
            skin_types: vec![SkinType::Oily, SkinType::Normal],
            concerns: vec![Concern::Acne, Concern::Pores],
            fragrance_free: true,
            cruelty_free: true,
            vegan: true,
            usage: "morning and evening".to_string(),
            available: true,
            description: None,
        }
    }

    fn create_test_profile(concerns: &[Concern], tags: &[&str]) -> SkinProfile {
        SkinProfile {
            concerns: concerns.iter().copied().collect(),
            skin_type: SkinType::Oily,
            sensitivity: Sensitivity::Low,
            budget: BudgetTier::Low,
            preferences: Preferences::new(tags.iter().copied(), []),
            skin_tone: None,
            allergies: vec![],
            max_price: None,
        }
    }

    #[test]
    fn test_ingredient_score_substring_case_insensitive() {
        let (score, matched) = calculate_ingredient_score(
            &strings(&["Niacinamide 10%", "Zinc PCA"]),
            &strings(&["niacinamide", "zinc", "salicylic acid", "sulfur"]),
            &[],
        );
        assert_eq!(score, 0.5);
        assert_eq!(matched, vec!["niacinamide", "zinc"]);
    }

    #[test]
    fn test_ingredient_score_penalises_avoid_list() {
        let (score, _) = calculate_ingredient_score(
            &strings(&["niacinamide", "fragrance"]),
            &strings(&["niacinamide", "zinc"]),
            &strings(&["fragrance"]),
        );
        assert_eq!(score, 0.25);
    }

    #[test]
    fn test_ingredient_score_floored_at_zero() {
        let (score, matched) = calculate_ingredient_score(
            &strings(&["fragrance", "alcohol denat"]),
            &strings(&["salicylic acid"]),
            &strings(&["fragrance", "alcohol denat"]),
        );
        assert_eq!(score, 0.0);
        assert!(matched.is_empty());
    }

    #[test]
    fn test_ingredient_score_empty_recommendation() {
        let (score, _) = calculate_ingredient_score(&strings(&["fragrance"]), &[], &strings(&["fragrance"]));
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_skin_type_score() {
        assert_eq!(calculate_skin_type_score(&[SkinType::Oily], SkinType::Oily), 1.0);
        assert_eq!(calculate_skin_type_score(&[SkinType::Normal], SkinType::Dry), 0.7);
        assert_eq!(calculate_skin_type_score(&[SkinType::Oily], SkinType::Dry), 0.3);
    }

    #[test]
    fn test_concern_score() {
        let none = create_test_profile(&[], &[]);
        assert_eq!(calculate_concern_score(&[Concern::Acne], &none), 0.5);

        let two = create_test_profile(&[Concern::Acne, Concern::Dryness], &[]);
        assert_eq!(calculate_concern_score(&[Concern::Acne, Concern::Pores], &two), 0.5);
        assert_eq!(calculate_concern_score(&[], &two), 0.0);
    }

    #[test]
    fn test_budget_score_ordering() {
        let tiers = [BudgetTier::Low, BudgetTier::Medium, BudgetTier::High, BudgetTier::Luxury];
        for &profile_tier in &tiers {
            assert_eq!(calculate_budget_score(profile_tier, profile_tier), 1.0);
            for &below in tiers.iter().filter(|t| **t < profile_tier) {
                for &above in tiers.iter().filter(|t| **t > profile_tier) {
                    assert!(
                        calculate_budget_score(below, profile_tier)
                            >= calculate_budget_score(above, profile_tier)
                    );
                }
            }
        }
        assert_eq!(calculate_budget_score(BudgetTier::Low, BudgetTier::High), 0.7);
        assert_eq!(calculate_budget_score(BudgetTier::Luxury, BudgetTier::Medium), 0.3);
    }

    #[test]
    fn test_preference_score_uncapped_sum() {
        let product = create_test_product(&["niacinamide"], BudgetTier::Low);
        let mut prefs = Preferences::new(["fragrance-free", "cruelty-free", "vegan"], []);
        prefs.product_types.insert(ProductCategory::Serum);

        let score = calculate_preference_score(&product, &prefs);
        assert!((score - 1.0).abs() < 1e-9);

        let nothing = calculate_preference_score(&product, &Preferences::default());
        assert_eq!(nothing, 0.0);
    }

    #[test]
    fn test_preference_requires_product_support() {
        let mut product = create_test_product(&["niacinamide"], BudgetTier::Low);
        product.vegan = false;
        let prefs = Preferences::new(["vegan"], []);
        assert_eq!(calculate_preference_score(&product, &prefs), 0.0);
    }

    #[test]
    fn test_calculate_product_score() {
        let product = create_test_product(&["niacinamide", "zinc"], BudgetTier::Low);
        let profile = create_test_profile(&[Concern::Acne], &["fragrance-free"]);
        let recommendation = IngredientRecommendation {
            concerns: vec![Concern::Acne],
            ingredients: strings(&["salicylic acid", "niacinamide", "zinc", "sulfur"]),
            avoid: vec![],
        };

        let (score, breakdown, matched) =
            calculate_product_score(&product, &profile, &recommendation, &ScoringWeights::default());

        assert_eq!(breakdown.ingredients, 0.5);
        assert_eq!(breakdown.skin_type, 1.0);
        assert_eq!(breakdown.concerns, 1.0);
        assert_eq!(breakdown.budget, 1.0);
        assert!((breakdown.preferences - 0.3).abs() < 1e-9);
        // 0.5*0.4 + 1.0*0.2 + 1.0*0.2 + 1.0*0.1 + 0.3*0.1
        assert!((score - 0.73).abs() < 1e-9);
        assert_eq!(matched.len(), 2);
    }
}
