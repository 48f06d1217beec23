use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::{EngineError, EngineResult};
use crate::models::{OverallSeverity, Severity, SkinTone};

/// Raw model output: attribute name -> probability in [0, 1]
pub type Predictions = BTreeMap<String, f64>;

/// Fields every prediction record must carry
pub const REQUIRED_FIELDS: [&str; 4] = ["acne", "pores", "pigmentation", "skin_tone"];

const SKIN_TONE_KEY: &str = "skin_tone";

/// Concern weights for the overall severity average
const OVERALL_WEIGHTS: [(&str, f64); 3] = [("acne", 0.4), ("pores", 0.25), ("pigmentation", 0.35)];

/// Upper bounds for the mild and moderate bands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityThresholds {
    pub mild: f64,
    pub moderate: f64,
}

impl SeverityThresholds {
    pub fn for_concern(concern: &str) -> Self {
        match concern {
            "acne" => Self { mild: 0.30, moderate: 0.60 },
            "pores" => Self { mild: 0.25, moderate: 0.55 },
            "pigmentation" => Self { mild: 0.20, moderate: 0.50 },
            _ => Self { mild: 0.25, moderate: 0.55 },
        }
    }
}

/// Severity assessment for a single concern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcernAssessment {
    pub probability: f64,
    pub severity: Severity,
    pub confidence: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinToneAssessment {
    pub classification: SkinTone,
    pub confidence: f64,
    pub probability: f64,
}

/// Structured view of a prediction record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityReport {
    pub concerns: BTreeMap<String, ConcernAssessment>,
    #[serde(rename = "skinTone")]
    pub skin_tone: Option<SkinToneAssessment>,
}

impl SeverityReport {
    pub fn get(&self, concern: &str) -> Option<&ConcernAssessment> {
        self.concerns.get(concern)
    }
}

/// Reject records missing a required field or carrying a value outside [0, 1]
pub fn validate_predictions(predictions: &Predictions) -> EngineResult<()> {
    for field in REQUIRED_FIELDS {
        let value = predictions
            .get(field)
            .ok_or_else(|| EngineError::Validation(format!("missing prediction field: {}", field)))?;

        if !value.is_finite() || *value < 0.0 || *value > 1.0 {
            return Err(EngineError::Validation(format!(
                "prediction {} must be within [0, 1], got {}",
                field, value
            )));
        }
    }
    Ok(())
}

/// Map every probability in the record to a severity assessment.
///
/// `skin_tone` is classified into a tone band instead of a severity.
pub fn map_severity(predictions: &Predictions) -> SeverityReport {
    let mut report = SeverityReport::default();

    for (name, &probability) in predictions {
        if name == SKIN_TONE_KEY {
            report.skin_tone = Some(SkinToneAssessment {
                classification: map_skin_tone(probability),
                confidence: calculate_confidence(probability),
                probability,
            });
            continue;
        }

        let severity = severity_level(probability, name);
        report.concerns.insert(
            name.clone(),
            ConcernAssessment {
                probability,
                severity,
                confidence: calculate_confidence(probability),
                description: severity_description(name, severity),
            },
        );
    }

    report
}

#[inline]
pub fn severity_level(probability: f64, concern: &str) -> Severity {
    let thresholds = SeverityThresholds::for_concern(concern);
    if probability < thresholds.mild {
        Severity::Mild
    } else if probability < thresholds.moderate {
        Severity::Moderate
    } else {
        Severity::Severe
    }
}

/// Decisive outputs (far from 0.5) earn higher confidence.
///
/// Bands are [0,0.1)|(0.9,1], [0.1,0.2)|(0.8,0.9], [0.2,0.3)|(0.7,0.8] and the
/// middle. Edges are compared on `p` itself since `p - 0.5` does not round-trip.
#[inline]
pub fn calculate_confidence(probability: f64) -> f64 {
    if probability < 0.1 || probability > 0.9 {
        0.95
    } else if probability < 0.2 || probability > 0.8 {
        0.85
    } else if probability < 0.3 || probability > 0.7 {
        0.75
    } else {
        0.65
    }
}

/// Bands are closed on the upper side, so 0.5 is still `Medium`
pub fn map_skin_tone(probability: f64) -> SkinTone {
    if probability <= 0.17 {
        SkinTone::VeryFair
    } else if probability <= 0.33 {
        SkinTone::Fair
    } else if probability <= 0.5 {
        SkinTone::Medium
    } else if probability <= 0.67 {
        SkinTone::Olive
    } else if probability <= 0.83 {
        SkinTone::Dark
    } else {
        SkinTone::VeryDark
    }
}

pub fn severity_description(concern: &str, severity: Severity) -> String {
    let text = match (concern, severity) {
        ("acne", Severity::Mild) => "Minor breakouts, few blemishes",
        ("acne", Severity::Moderate) => "Visible acne, some inflammation",
        ("acne", Severity::Severe) => "Extensive breakouts, significant inflammation",
        ("pores", Severity::Mild) => "Minimal pore visibility",
        ("pores", Severity::Moderate) => "Noticeable enlarged pores",
        ("pores", Severity::Severe) => "Large, prominent pores",
        ("pigmentation", Severity::Mild) => "Slight discoloration",
        ("pigmentation", Severity::Moderate) => "Visible dark spots or patches",
        ("pigmentation", Severity::Severe) => "Significant pigmentation issues",
        _ => return format!("{} {}", severity.as_str(), concern),
    };
    text.to_string()
}

/// Weighted average of the acne, pores and pigmentation severities
pub fn overall_severity(report: &SeverityReport) -> OverallSeverity {
    let mut total_score = 0.0;
    let mut total_weight = 0.0;

    for (concern, weight) in OVERALL_WEIGHTS {
        if let Some(assessment) = report.get(concern) {
            total_score += assessment.severity.score() * weight;
            total_weight += weight;
        }
    }

    if total_weight == 0.0 {
        return OverallSeverity::Normal;
    }

    let average = total_score / total_weight;
    if average < 1.5 {
        OverallSeverity::Mild
    } else if average < 2.5 {
        OverallSeverity::Moderate
    } else {
        OverallSeverity::Severe
    }
}
