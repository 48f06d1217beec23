use crate::core::{ImageError, ImagePredictor, Predictions};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

/// Image prediction service client
///
/// Posts raw image bytes to `{endpoint}/predict` and reads back a JSON object
/// of attribute probabilities, either flat or wrapped in a `results` field.
/// The blocking client is built per call so it is always created and dropped
/// on the caller's (blocking) thread.
#[derive(Debug, Clone)]
pub struct HttpImagePredictor {
    base_url: String,
    timeout: Duration,
}

impl HttpImagePredictor {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn predict_url(&self) -> String {
        format!("{}/predict", self.base_url.trim_end_matches('/'))
    }

    fn client(&self) -> Result<Client, ImageError> {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ImageError::Unavailable(format!("Failed to create HTTP client: {}", e)))
    }
}

impl ImagePredictor for HttpImagePredictor {
    fn predict(&self, image: &[u8]) -> Result<Predictions, ImageError> {
        let content_type = detect_content_type(image)?;
        let url = self.predict_url();

        tracing::debug!("Sending {} byte {} image to {}", image.len(), content_type, url);

        let response = self
            .client()?
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(image.to_vec())
            .send()
            .map_err(|e| ImageError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().unwrap_or_default();
            return Err(ImageError::Unsupported(format!("Predictor rejected image ({}): {}", status, body)));
        }
        if !status.is_success() {
            return Err(ImageError::Unavailable(format!("Predictor returned {}", status)));
        }

        let json: Value = response
            .json()
            .map_err(|e| ImageError::InvalidResponse(e.to_string()))?;

        parse_predictions(&json)
    }
}

/// Sniff the image container from its magic bytes
pub fn detect_content_type(image: &[u8]) -> Result<&'static str, ImageError> {
    if image.is_empty() {
        return Err(ImageError::Empty);
    }

    if image.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Ok("image/jpeg")
    } else if image.starts_with(&[0x89, b'P', b'N', b'G']) {
        Ok("image/png")
    } else if image.len() >= 12 && &image[0..4] == b"RIFF" && &image[8..12] == b"WEBP" {
        Ok("image/webp")
    } else {
        Err(ImageError::Unsupported("expected a JPEG, PNG or WebP image".to_string()))
    }
}

/// Extract numeric attribute probabilities from a predictor response
///
/// Values may be plain numbers or objects carrying a `probability` field.
/// Non-numeric fields are skipped; field validation happens in the engine.
pub fn parse_predictions(json: &Value) -> Result<Predictions, ImageError> {
    let results = json.get("results").unwrap_or(json);
    let object = results
        .as_object()
        .ok_or_else(|| ImageError::InvalidResponse("Expected a JSON object".into()))?;

    let predictions: Predictions = object
        .iter()
        .filter_map(|(name, value)| {
            let probability = value
                .as_f64()
                .or_else(|| value.get("probability").and_then(Value::as_f64))?;
            Some((name.clone(), probability))
        })
        .collect();

    if predictions.is_empty() {
        return Err(ImageError::InvalidResponse("No attribute probabilities in response".into()));
    }

    Ok(predictions)
}
