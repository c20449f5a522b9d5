//! Wizard session endpoints: status, draft updates, navigation, submission.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{debug, info};

use super::AppState;
use crate::clients::SubmissionResult;
use crate::error::{Error, WizardError};
use crate::wizard::{Toggles, run_submission};

fn wizard_error(e: WizardError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &e {
        WizardError::StepIncomplete { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        WizardError::InvalidDraftPatch { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::CONFLICT,
    };
    (status, Json(serde_json::json!({"error": e.to_string()})))
}

pub async fn wizard_status(State(state): State<AppState>) -> impl IntoResponse {
    let wizard = state.wizard.lock().await;
    Json(wizard.status())
}

pub async fn update_draft(
    State(state): State<AppState>,
    Json(patch): Json<serde_json::Value>,
) -> impl IntoResponse {
    let mut wizard = state.wizard.lock().await;
    match wizard.update_draft(&patch) {
        Ok(()) => {
            debug!("Draft updated");
            (StatusCode::OK, Json(serde_json::json!(wizard.status())))
        }
        Err(Error::Wizard(e)) => wizard_error(e),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": e.to_string()})),
        ),
    }
}

pub async fn set_toggles(
    State(state): State<AppState>,
    Json(toggles): Json<Toggles>,
) -> impl IntoResponse {
    let mut wizard = state.wizard.lock().await;
    wizard.set_toggles(toggles);
    info!(
        financing = toggles.include_financing,
        inspection = toggles.include_inspection,
        "Addendum toggles updated"
    );
    Json(wizard.status())
}

pub async fn next_step(State(state): State<AppState>) -> impl IntoResponse {
    let mut wizard = state.wizard.lock().await;
    match wizard.next() {
        Ok(step) => {
            info!(step = %step, "Advanced to next step");
            (StatusCode::OK, Json(serde_json::json!(wizard.status())))
        }
        Err(e) => wizard_error(e),
    }
}

pub async fn previous_step(State(state): State<AppState>) -> impl IntoResponse {
    let mut wizard = state.wizard.lock().await;
    match wizard.back() {
        Ok(step) => {
            info!(step = %step, "Moved back a step");
            (StatusCode::OK, Json(serde_json::json!(wizard.status())))
        }
        Err(e) => wizard_error(e),
    }
}

/// Run the submission and report the classified result. Failures are part
/// of the 200 body; only state conflicts surface as HTTP errors.
pub async fn submit_offer(State(state): State<AppState>) -> impl IntoResponse {
    // The payload alongside the result is the one that actually went
    // upstream; the emails are built from it, not from the live draft.
    let (result, payload) = match run_submission(&state.wizard, state.submitter.as_ref()).await {
        Ok(outcome) => outcome,
        Err(e) => return wizard_error(e),
    };

    if let (Some(mailer), SubmissionResult::Success { .. }) = (&state.mailer, &result) {
        let (include_inspection, agent_help, notes) = {
            let wizard = state.wizard.lock().await;
            let draft = wizard.draft();
            (
                wizard.toggles().include_inspection,
                draft.request_agent_help,
                draft.agent_help_notes.clone(),
            )
        };
        let mailer = Arc::clone(mailer);
        let email_result = result.clone();
        tokio::spawn(async move {
            mailer
                .send_submission_emails(payload, include_inspection, agent_help, notes, &email_result)
                .await;
        });
    }

    (StatusCode::OK, Json(serde_json::json!(result)))
}
