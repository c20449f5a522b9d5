//! The offer wizard core: step sequencing, validation, the draft model, and
//! the controller that owns them.

pub mod controller;
pub mod draft;
pub mod step;
pub mod validate;
pub mod words;

pub use controller::{WizardController, WizardStatus, run_submission};
pub use draft::{OfferDraft, SubmissionPayload};
pub use step::{Step, Toggles, advance, retreat};
pub use validate::{is_valid_email, step_is_complete};
pub use words::amount_in_words;
