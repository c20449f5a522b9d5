//! Thin clients for the external collaborators: property lookup, assistant
//! chat, offer submission, and the listing-scraper trigger.

pub mod assistant;
pub mod property;
pub mod scraper;
pub mod submission;

pub use assistant::{AssistantClient, ChatRequest, MAX_HISTORY_MESSAGES};
pub use property::{AddressQuery, PropertyClient, PropertyRecord};
pub use scraper::ScraperClient;
pub use submission::{FailureKind, HttpOfferSubmitter, OfferSubmitter, SubmissionResult};
