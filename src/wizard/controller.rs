//! Wizard controller — the single-writer owner of the draft, position, and
//! submission state.
//!
//! Every action (field edit, navigation, submit) runs to completion against
//! `&mut self`; the server serializes actions through one async mutex, so
//! no state is shared outside this struct.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::clients::scraper::{ScraperClient, spawn_trigger};
use crate::clients::submission::{OfferSubmitter, SubmissionResult};
use crate::error::{Error, WizardError};
use crate::storage::{DebouncedSaver, DraftStore, SAVE_DEBOUNCE};

use super::draft::{OfferDraft, SubmissionPayload};
use super::step::{Step, Toggles, advance, retreat};
use super::validate::step_is_complete;

/// Snapshot of the wizard for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct WizardStatus {
    pub step: Step,
    pub step_index: u8,
    pub step_title: &'static str,
    pub toggles: Toggles,
    pub step_complete: bool,
    pub submitted: bool,
    pub draft: OfferDraft,
}

pub struct WizardController {
    draft: OfferDraft,
    step: Step,
    toggles: Toggles,
    store: Arc<dyn DraftStore>,
    saver: DebouncedSaver,
    scraper: Option<Arc<ScraperClient>>,
    submission_in_flight: bool,
    submitted: bool,
}

impl WizardController {
    /// Start a wizard, rehydrating any persisted draft. A saved addendum
    /// turns its toggle on so the matching step is reachable again.
    pub async fn restore(
        store: Arc<dyn DraftStore>,
        scraper: Option<Arc<ScraperClient>>,
    ) -> Self {
        Self::restore_with_debounce(store, scraper, SAVE_DEBOUNCE).await
    }

    pub async fn restore_with_debounce(
        store: Arc<dyn DraftStore>,
        scraper: Option<Arc<ScraperClient>>,
        debounce: Duration,
    ) -> Self {
        let draft = match store.load().await {
            Ok(Some(draft)) => {
                tracing::info!("Restored a saved offer draft");
                draft
            }
            Ok(None) => OfferDraft::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not load saved draft, starting fresh");
                OfferDraft::default()
            }
        };

        let toggles = Toggles {
            include_financing: draft.financing.is_some(),
            include_inspection: draft.inspection.is_some(),
        };

        Self {
            draft,
            step: Step::MlsEntry,
            toggles,
            saver: DebouncedSaver::new(Arc::clone(&store), debounce),
            store,
            scraper,
            submission_in_flight: false,
            submitted: false,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn toggles(&self) -> Toggles {
        self.toggles
    }

    pub fn draft(&self) -> &OfferDraft {
        &self.draft
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn status(&self) -> WizardStatus {
        WizardStatus {
            step: self.step,
            step_index: self.step.index(),
            step_title: self.step.title(),
            toggles: self.toggles,
            step_complete: step_is_complete(self.step, &self.draft),
            submitted: self.submitted,
            draft: self.draft.clone(),
        }
    }

    /// Merge a partial update into the draft and arm a debounced save.
    /// A finished session is read-only: the store was cleared on success
    /// and must stay cleared.
    pub fn update_draft(&mut self, patch: &serde_json::Value) -> Result<(), Error> {
        if self.submitted {
            return Err(WizardError::AlreadySubmitted.into());
        }
        self.draft.apply_patch(patch)?;
        self.saver.schedule(self.draft.clone());
        Ok(())
    }

    /// Switch the addendum toggles. Already-entered addendum data stays in
    /// the draft so toggling back on restores it; it is only excluded from
    /// the submission payload while off.
    pub fn set_toggles(&mut self, toggles: Toggles) {
        self.toggles = toggles;
        // The active step must stay reachable.
        if !self.step.is_reachable(self.toggles) {
            self.step = Step::Addenda;
        }
    }

    /// Whether the current step permits forward navigation.
    pub fn current_step_complete(&self) -> bool {
        step_is_complete(self.step, &self.draft)
    }

    /// Advance to the next visible step, gated on the validator.
    ///
    /// Leaving the MLS-entry step with an id present also fires the
    /// listing-scraper notification; that call can neither block nor alter
    /// the transition.
    pub fn next(&mut self) -> Result<Step, WizardError> {
        if !self.current_step_complete() {
            return Err(WizardError::StepIncomplete { step: self.step });
        }
        let next = advance(self.step, self.toggles).ok_or(WizardError::AtLastStep)?;

        if self.step == Step::MlsEntry {
            if let (Some(scraper), Some(mls_id)) = (&self.scraper, &self.draft.mls_id) {
                if !mls_id.trim().is_empty() {
                    spawn_trigger(Arc::clone(scraper), mls_id.clone());
                }
            }
        }

        self.step = next;
        Ok(next)
    }

    /// Go back to the previous visible step. Never gated.
    pub fn back(&mut self) -> Result<Step, WizardError> {
        let previous = retreat(self.step, self.toggles).ok_or(WizardError::AtFirstStep)?;
        self.step = previous;
        Ok(previous)
    }

    /// Claim the one outstanding submission slot and assemble the payload.
    ///
    /// Only the review step may submit: reaching it means every earlier
    /// visible step passed its gate, so nothing unvalidated goes upstream.
    /// The pending debounced save is cancelled so it cannot fire between a
    /// successful submission and the store clear.
    pub fn begin_submission(&mut self) -> Result<SubmissionPayload, WizardError> {
        if self.submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        if self.submission_in_flight {
            return Err(WizardError::SubmissionInFlight);
        }
        if self.step != Step::Review {
            return Err(WizardError::NotAtReview { step: self.step });
        }
        self.submission_in_flight = true;
        self.saver.cancel();
        Ok(self.draft.submission_payload(self.toggles))
    }

    /// Record the submission outcome. Success clears the persisted draft
    /// unconditionally; a clear failure is logged and nothing more. Failure
    /// re-arms the save that `begin_submission` cancelled, so an edit made
    /// just before a failed submit still reaches the store.
    pub async fn complete_submission(&mut self, result: &SubmissionResult) {
        self.submission_in_flight = false;
        if result.is_success() {
            self.submitted = true;
            if let Err(e) = self.store.clear().await {
                tracing::warn!(error = %e, "Could not clear persisted draft after submission");
            }
        } else {
            self.saver.schedule(self.draft.clone());
        }
    }
}

/// Run one submission end to end, holding the wizard lock only while state
/// changes. The lock is released during the upstream call, yet no second
/// submission can start: the in-flight slot is claimed under the lock.
///
/// Returns the payload that actually went upstream alongside the result,
/// so downstream consumers (the notification emails) describe the
/// submitted packet even if the draft changed while the call was in
/// flight.
pub async fn run_submission(
    wizard: &Mutex<WizardController>,
    submitter: &dyn OfferSubmitter,
) -> Result<(SubmissionResult, SubmissionPayload), WizardError> {
    let payload = wizard.lock().await.begin_submission()?;
    let result = submitter.submit(&payload).await;
    wizard.lock().await.complete_submission(&result).await;
    Ok((result, payload))
}
