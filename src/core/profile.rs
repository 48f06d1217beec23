use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::core::error::{EngineResult, ImageError};
use crate::core::severity::{
    map_severity, map_skin_tone, overall_severity, validate_predictions, Predictions, SeverityReport,
};
use crate::models::{
    BudgetTier, Concern, OverallSeverity, Preferences, ProductCategory, Sensitivity, SkinProfile,
    SkinTone, SkinType,
};

/// A concern is considered present when its probability exceeds this value
pub const ACTIVE_PROBABILITY: f64 = 0.5;

/// External image classifier.
///
/// Implementations must be deterministic per image and free of side effects
/// visible to the engine.
pub trait ImagePredictor: Send + Sync {
    fn predict(&self, image: &[u8]) -> Result<Predictions, ImageError>;
}

/// Questionnaire answers, already converted to engine types
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizAnswers {
    pub skin_type: SkinType,
    pub sensitivity: Sensitivity,
    pub budget: BudgetTier,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub product_types: Vec<ProductCategory>,
    #[serde(default)]
    pub concerns: BTreeSet<Concern>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub max_price: Option<f64>,
}

/// Boolean/categorical attributes derived from an image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageAttributes {
    pub concerns: BTreeMap<Concern, bool>,
    pub skin_tone: Option<SkinTone>,
}

impl ImageAttributes {
    /// Threshold raw probabilities into concern flags.
    ///
    /// The classifier's `pigmentation` output feeds the `hyperpigmentation`
    /// concern; attribute names the engine does not know are ignored.
    pub fn from_predictions(predictions: &Predictions) -> Self {
        let mut attributes = ImageAttributes::default();

        for (name, &probability) in predictions {
            if name == "skin_tone" {
                attributes.skin_tone = Some(map_skin_tone(probability));
                continue;
            }

            let concern = match name.as_str() {
                "pigmentation" => Some(Concern::Hyperpigmentation),
                other => other.parse::<Concern>().ok(),
            };

            match concern {
                Some(concern) => {
                    attributes.concerns.insert(concern, probability > ACTIVE_PROBABILITY);
                }
                None => tracing::debug!("Ignoring unknown image attribute: {}", name),
            }
        }

        attributes
    }
}

/// Severity analysis of one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub report: SeverityReport,
    pub overall: OverallSeverity,
    pub attributes: ImageAttributes,
}

/// Validate a prediction record and derive the severity report and attributes
pub fn analyze_predictions(predictions: &Predictions) -> EngineResult<ImageAnalysis> {
    validate_predictions(predictions)?;

    let report = map_severity(predictions);
    let overall = overall_severity(&report);

    Ok(ImageAnalysis {
        overall,
        attributes: ImageAttributes::from_predictions(predictions),
        report,
    })
}

/// Merge quiz answers with image attributes.
///
/// The quiz is the base; any concern the image reports on replaces the quiz
/// value, whether it switches the concern on or off.
pub fn build_profile(attributes: &ImageAttributes, quiz: &QuizAnswers) -> SkinProfile {
    let mut concerns = quiz.concerns.clone();
    for (&concern, &present) in &attributes.concerns {
        if present {
            concerns.insert(concern);
        } else {
            concerns.remove(&concern);
        }
    }

    SkinProfile {
        concerns,
        skin_type: quiz.skin_type,
        sensitivity: quiz.sensitivity,
        budget: quiz.budget,
        preferences: Preferences::new(&quiz.preferences, quiz.product_types.iter().copied()),
        skin_tone: attributes.skin_tone,
        allergies: quiz
            .allergies
            .iter()
            .map(|a| a.trim().to_lowercase())
            .filter(|a| !a.is_empty())
            .collect(),
        max_price: quiz.max_price,
    }
}

/// Run the predictor once on `image` and build the profile from its output.
///
/// Predictor failures surface as `EngineError::Image` unchanged.
pub fn build_profile_from_image<P>(
    predictor: &P,
    image: &[u8],
    quiz: &QuizAnswers,
) -> EngineResult<(SkinProfile, ImageAnalysis)>
where
    P: ImagePredictor + ?Sized,
{
    let predictions = predictor.predict(image)?;
    tracing::debug!("Predictor returned {} attributes", predictions.len());

    let analysis = analyze_predictions(&predictions)?;
    let profile = build_profile(&analysis.attributes, quiz);

    Ok((profile, analysis))
}
