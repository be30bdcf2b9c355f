//! Hosted backend access: auth, tables and document storage

mod client;
mod error;
mod records;
pub mod service;
mod traits;

pub use client::RestClient;
pub use error::BackendError;
pub use records::{
    ApplicationRecord, DocumentRecord, Profile, Session, SubmissionRecord, TimelineEntry,
};
pub use traits::BackendApi;

#[cfg(test)]
pub use traits::MockBackendApi;
