//! Offer submission client — forwards the assembled packet to the external
//! offer-processing service and classifies the outcome.

use async_trait::async_trait;
use serde::Serialize;

use crate::wizard::draft::SubmissionPayload;

/// User-facing failure messages, one per taxonomy class.
const SERVER_FAILURE_MSG: &str =
    "Something went wrong on our end. Please try again in a moment.";
const CLIENT_FAILURE_MSG: &str =
    "There was a problem with your submission. Please check your information and try again.";
const NETWORK_FAILURE_MSG: &str =
    "Network error. Please check your connection and try again.";
const UNEXPECTED_FAILURE_MSG: &str = "An unexpected error occurred. Please try again.";

/// How a failed submission is classified for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Rejected locally before any network call.
    Validation,
    /// Upstream 4xx — user-correctable.
    Client,
    /// Upstream 5xx — transient, retry later.
    Server,
    /// No response at all.
    Network,
}

/// Terminal outcome of a submission attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionResult {
    Success {
        /// Link to the generated offer document, when the service returned one.
        document_url: Option<String>,
        /// Remaining upstream response fields (listing agent info and such).
        details: serde_json::Value,
    },
    Failure {
        kind: FailureKind,
        message: String,
    },
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn network_failure() -> Self {
        Self::Failure {
            kind: FailureKind::Network,
            message: NETWORK_FAILURE_MSG.to_string(),
        }
    }
}

/// Classify an upstream HTTP response.
///
/// 2xx bodies are parsed for the document reference; 5xx bodies are never
/// parsed; 4xx bodies are probed for a structured `message` with a generic
/// fallback. Relative document paths are resolved against `base_url`.
pub fn classify_response(status: u16, body: &str, base_url: &str) -> SubmissionResult {
    match status {
        200..=299 => match serde_json::from_str::<serde_json::Value>(body) {
            Ok(details) => {
                let document_url = details
                    .get("pdf_url")
                    .and_then(|v| v.as_str())
                    .map(|url| resolve_document_url(url, base_url));
                SubmissionResult::Success {
                    document_url,
                    details,
                }
            }
            Err(_) => SubmissionResult::Failure {
                kind: FailureKind::Server,
                message: SERVER_FAILURE_MSG.to_string(),
            },
        },
        500..=599 => SubmissionResult::Failure {
            kind: FailureKind::Server,
            message: SERVER_FAILURE_MSG.to_string(),
        },
        400..=499 => {
            let message = serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or_else(|| CLIENT_FAILURE_MSG.to_string());
            SubmissionResult::Failure {
                kind: FailureKind::Client,
                message,
            }
        }
        _ => SubmissionResult::Failure {
            kind: FailureKind::Client,
            message: UNEXPECTED_FAILURE_MSG.to_string(),
        },
    }
}

fn resolve_document_url(url: &str, base_url: &str) -> String {
    if url.starts_with("http") {
        return url.to_string();
    }
    let path = url.trim_start_matches(['/', '\\']);
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

/// Seam for the submission orchestrator, so the controller is testable
/// without a live offer-processing service.
#[async_trait]
pub trait OfferSubmitter: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> SubmissionResult;
}

/// HTTP client for the offer-processing service.
pub struct HttpOfferSubmitter {
    http: reqwest::Client,
    base_url: String,
}

impl HttpOfferSubmitter {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn submit_url(&self) -> String {
        format!("{}/offer/", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl OfferSubmitter for HttpOfferSubmitter {
    async fn submit(&self, payload: &SubmissionPayload) -> SubmissionResult {
        let response = match self
            .http
            .post(self.submit_url())
            .json(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Offer submission transport failure");
                return SubmissionResult::network_failure();
            }
        };

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let result = classify_response(status, &body, &self.base_url);
        match &result {
            SubmissionResult::Success { document_url, .. } => {
                tracing::info!(document_url = ?document_url, "Offer submission accepted");
            }
            SubmissionResult::Failure { kind, message } => {
                tracing::warn!(status, ?kind, %message, "Offer submission rejected");
            }
        }
        result
    }
}
