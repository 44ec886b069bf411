use serde::{Deserialize, Serialize};

/// A classification produced by the `/predict` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub is_malicious: bool,
    pub confidence: f64,
    #[serde(default)]
    pub explanation: Vec<String>,
}

/// Interpreted `/predict` response. The server signals validation
/// failures with an `error` field, which wins over any other field.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictResponse {
    Verdict(Verdict),
    Rejected(String),
}

#[derive(Debug, Deserialize)]
struct RawPredictResponse {
    error: Option<String>,
    is_malicious: Option<bool>,
    confidence: Option<f64>,
    explanation: Option<Vec<String>>,
}

impl PredictResponse {
    pub fn from_json(body: &str) -> Result<Self, String> {
        let raw: RawPredictResponse =
            serde_json::from_str(body).map_err(|e| format!("invalid predict body: {}", e))?;

        if let Some(error) = raw.error {
            return Ok(PredictResponse::Rejected(error));
        }

        match (raw.is_malicious, raw.confidence) {
            (Some(is_malicious), Some(confidence)) => Ok(PredictResponse::Verdict(Verdict {
                is_malicious,
                confidence,
                explanation: raw.explanation.unwrap_or_default(),
            })),
            _ => Err("predict body has neither a verdict nor an error".to_string()),
        }
    }
}

/// `/retrain` response. Only `message` is consumed; it is shown verbatim
/// whether or not the server considers the retrain a success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrainResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_body() {
        let body = r#"{"url":"http://example.com","is_malicious":false,"confidence":0.04,"explanation":["Domain age > 5 years"]}"#;
        let parsed = PredictResponse::from_json(body).unwrap();
        assert_eq!(
            parsed,
            PredictResponse::Verdict(Verdict {
                is_malicious: false,
                confidence: 0.04,
                explanation: vec!["Domain age > 5 years".to_string()],
            })
        );
    }

    #[test]
    fn test_error_field_takes_precedence() {
        let body = r#"{"error":"Invalid URL format","is_malicious":true,"confidence":0.9}"#;
        let parsed = PredictResponse::from_json(body).unwrap();
        assert_eq!(parsed, PredictResponse::Rejected("Invalid URL format".to_string()));
    }

    #[test]
    fn test_missing_explanation_defaults_to_empty() {
        let body = r#"{"is_malicious":true,"confidence":0.75}"#;
        match PredictResponse::from_json(body).unwrap() {
            PredictResponse::Verdict(v) => assert!(v.explanation.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_shapeless_body_is_an_error() {
        assert!(PredictResponse::from_json(r#"{"status":"ok"}"#).is_err());
        assert!(PredictResponse::from_json("<html>oops</html>").is_err());
    }

    #[test]
    fn test_retrain_ignores_status_field() {
        let body = r#"{"status":"success","message":"Model retrained on 1200 samples"}"#;
        let parsed: RetrainResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.message, "Model retrained on 1200 samples");
    }
}
