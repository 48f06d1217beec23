use crate::models::{Product, SkinProfile};

/// Check whether any of the user's allergies appears in the product's ingredients
///
/// Matching is a case-insensitive substring test, so an allergy to "lanolin"
/// also excludes "lanolin alcohol".
#[inline]
pub fn contains_allergen(product: &Product, allergies: &[String]) -> bool {
    if allergies.is_empty() {
        return false;
    }

    product.ingredients.iter().any(|ingredient| {
        let ingredient = ingredient.to_lowercase();
        allergies
            .iter()
            .any(|allergy| ingredient.contains(&allergy.to_lowercase()))
    })
}

/// Numeric budget ceiling; no ceiling accepts every price
#[inline]
pub fn within_price_ceiling(product: &Product, max_price: Option<f64>) -> bool {
    max_price.map_or(true, |ceiling| product.price <= ceiling)
}

/// Hard filters applied before scoring
///
/// Products that are unavailable, contain an allergen or exceed the price
/// ceiling are never ranked.
#[inline]
pub fn matches_profile_constraints(product: &Product, profile: &SkinProfile) -> bool {
    if !product.available {
        return false;
    }

    if contains_allergen(product, &profile.allergies) {
        return false;
    }

    within_price_ceiling(product, profile.max_price)
}
