//! Trait abstraction for the backend client to enable mocking in tests

use super::error::BackendError;
use super::records::{
    ApplicationRecord, DocumentRecord, NewApplication, NewDocument, NewSubmission,
    NewTimelineEntry, Profile, Session, SubmissionRecord, TimelineEntry,
};
use async_trait::async_trait;

pub type BackendResult<T> = Result<T, BackendError>;

/// Operations against the hosted backend, all scoped to a signed-in user
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Exchange email and password for a session
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session>;

    /// Revoke the session's token
    async fn sign_out(&self, session: &Session) -> BackendResult<()>;

    /// Create a new application
    async fn create_application(
        &self,
        session: &Session,
        application: &NewApplication,
    ) -> BackendResult<ApplicationRecord>;

    /// Update an existing application
    async fn update_application(
        &self,
        session: &Session,
        application_id: &str,
        application: &NewApplication,
    ) -> BackendResult<ApplicationRecord>;

    /// List the user's applications, newest first
    async fn list_applications(&self, session: &Session) -> BackendResult<Vec<ApplicationRecord>>;

    /// Delete an application
    async fn delete_application(
        &self,
        session: &Session,
        application_id: &str,
    ) -> BackendResult<()>;

    /// Upload file bytes to object storage, returning the storage path
    async fn upload_file(
        &self,
        session: &Session,
        storage_path: &str,
        bytes: Vec<u8>,
    ) -> BackendResult<String>;

    /// Record document metadata
    async fn create_document(
        &self,
        session: &Session,
        document: &NewDocument,
    ) -> BackendResult<DocumentRecord>;

    /// List documents attached to an application
    async fn list_documents(
        &self,
        session: &Session,
        application_id: &str,
    ) -> BackendResult<Vec<DocumentRecord>>;

    /// Append a timeline entry
    async fn create_timeline_entry(
        &self,
        session: &Session,
        entry: &NewTimelineEntry,
    ) -> BackendResult<TimelineEntry>;

    /// List an application's timeline, oldest first
    async fn list_timeline(
        &self,
        session: &Session,
        application_id: &str,
    ) -> BackendResult<Vec<TimelineEntry>>;

    /// Create the submission record for a finished filing
    async fn create_submission(
        &self,
        session: &Session,
        submission: &NewSubmission,
    ) -> BackendResult<SubmissionRecord>;

    /// List the user's submissions, newest first
    async fn list_submissions(&self, session: &Session) -> BackendResult<Vec<SubmissionRecord>>;

    /// Fetch the user's profile, if one exists
    async fn get_profile(&self, session: &Session) -> BackendResult<Option<Profile>>;

    /// Insert or replace the user's profile
    async fn upsert_profile(&self, session: &Session, profile: &Profile) -> BackendResult<Profile>;
}
