//! Error types for the offer wizard.

use crate::wizard::step::Step;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Assistant API key not configured")]
    MissingApiKey,
}

/// Draft-store errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to serialize draft: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors talking to upstream services (property lookup, offer processing,
/// chat completions).
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Upstream {service} timed out")]
    Timeout { service: String },

    #[error("Failed to reach {service}: {reason}")]
    Transport { service: String, reason: String },

    #[error("Upstream {service} returned status {status}: {detail}")]
    Status {
        service: String,
        status: u16,
        detail: String,
    },

    #[error("Invalid response from {service}: {reason}")]
    InvalidResponse { service: String, reason: String },

    #[error("{service} found nothing: {detail}")]
    NotFound { service: String, detail: String },
}

/// Email delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP send failed: {0}")]
    Send(String),
}

/// Wizard state-machine errors.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Step {step} is incomplete")]
    StepIncomplete { step: Step },

    #[error("Draft update is not valid: {reason}")]
    InvalidDraftPatch { reason: String },

    #[error("Cannot submit from step {step}; finish the wizard through review first")]
    NotAtReview { step: Step },

    #[error("Already at the first step")]
    AtFirstStep,

    #[error("Already at the last step")]
    AtLastStep,

    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error("The offer has already been submitted")]
    AlreadySubmitted,
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
