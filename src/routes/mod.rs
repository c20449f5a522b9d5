//! HTTP surface for the offer wizard.

pub mod chat;
pub mod property;
pub mod wizard;

use std::sync::Arc;

use axum::{
    Json, Router,
    response::IntoResponse,
    routing::{get, post, put},
};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::clients::{AssistantClient, OfferSubmitter, PropertyClient};
use crate::email::OfferMailer;
use crate::wizard::WizardController;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub wizard: Arc<Mutex<WizardController>>,
    pub submitter: Arc<dyn OfferSubmitter>,
    pub property: Arc<PropertyClient>,
    pub assistant: Arc<AssistantClient>,
    /// Submission emails are skipped entirely when SMTP is not configured.
    pub mailer: Option<Arc<OfferMailer>>,
}

/// Build the Axum router with wizard, property and chat routes.
pub fn app_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/wizard", get(wizard::wizard_status))
        .route("/api/wizard/draft", put(wizard::update_draft))
        .route("/api/wizard/toggles", put(wizard::set_toggles))
        .route("/api/wizard/next", post(wizard::next_step))
        .route("/api/wizard/back", post(wizard::previous_step))
        .route("/api/wizard/submit", post(wizard::submit_offer))
        .route("/api/property/lookup", post(property::lookup_property))
        .route("/api/chat", post(chat::chat))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "offer-wizard"
    }))
}
