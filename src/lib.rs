//! Backend for a guided real-estate offer wizard.
//!
//! A buyer walks through seven steps (MLS entry, buyer info, offer details,
//! addenda selection, optional financing and inspection addenda, review),
//! with drafts persisted behind a debounce and the finished offer submitted
//! to the offer-processing service. Property lookup and an assistant chat
//! are proxied for the wizard UI.

pub mod clients;
pub mod config;
pub mod email;
pub mod error;
pub mod routes;
pub mod storage;
pub mod wizard;

pub use error::{Error, Result};
