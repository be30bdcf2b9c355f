//! REST client for the hosted backend
//!
//! Speaks the PostgREST dialect for tables (`/rest/v1/{table}`), the
//! password grant for auth (`/auth/v1/token`) and the storage object API
//! (`/storage/v1/object/{bucket}/{path}`).

use super::error::BackendError;
use super::records::{
    ApplicationRecord, DocumentRecord, NewApplication, NewDocument, NewSubmission,
    NewTimelineEntry, Profile, Session, SubmissionRecord, TimelineEntry,
};
use super::traits::{BackendApi, BackendResult};
use crate::config::{TuiConfig, API_KEY_ENV, BACKEND_URL_ENV};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default backend address (local development stack)
const DEFAULT_ADDRESS: &str = "http://127.0.0.1:54321";

/// Storage bucket holding uploaded tax documents
const DOCUMENT_BUCKET: &str = "documents";

const RETURN_REPRESENTATION: &str = "return=representation";

/// Client for the hosted backend
pub struct RestClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Build from config, with `TAXFILER_BACKEND_URL` / `TAXFILER_API_KEY` taking precedence
    pub fn from_config(config: &TuiConfig) -> Self {
        let base_url = std::env::var(BACKEND_URL_ENV)
            .ok()
            .or_else(|| config.backend_url.clone())
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("No backend API key configured; requests will likely be rejected");
        }
        Self::new(base_url, api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str, filter: &str) -> String {
        if filter.is_empty() {
            format!("{}/rest/v1/{}", self.base_url, table)
        } else {
            format!("{}/rest/v1/{}?{}", self.base_url, table, filter)
        }
    }

    fn storage_url(&self, storage_path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, DOCUMENT_BUCKET, storage_path
        )
    }

    fn authed(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
    }

    async fn select<R: DeserializeOwned>(
        &self,
        session: &Session,
        table: &str,
        filter: &str,
    ) -> BackendResult<Vec<R>> {
        let url = self.table_url(table, filter);
        debug!("GET {}", url);
        let response = self.authed(self.http.get(&url), session).send().await?;
        read_json(response).await
    }

    async fn insert<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        session: &Session,
        table: &str,
        body: &B,
        prefer: &str,
    ) -> BackendResult<R> {
        let url = self.table_url(table, "");
        debug!("POST {}", url);
        let response = self
            .authed(self.http.post(&url), session)
            .header("Prefer", prefer)
            .json(body)
            .send()
            .await?;
        first_row(read_json(response).await?)
    }
}

/// Map a non-success status to an error
fn status_error(status: u16, body: String) -> BackendError {
    match status {
        401 | 403 => BackendError::Unauthorized,
        _ => BackendError::Http {
            status,
            message: extract_message(&body),
        },
    }
}

/// Pull a human-readable message out of an error body
fn extract_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        msg: Option<String>,
        error_description: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error_description).or(b.msg))
        .unwrap_or_else(|| body.trim().to_string())
}

async fn check_status(response: Response) -> BackendResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status.as_u16(), body))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
    let response = check_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| BackendError::Decode(e.to_string()))
}

fn first_row<R>(rows: Vec<R>) -> BackendResult<R> {
    rows.into_iter().next().ok_or(BackendError::EmptyResponse)
}

#[async_trait]
impl BackendApi for RestClient {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session> {
        #[derive(Serialize)]
        struct PasswordGrant<'a> {
            email: &'a str,
            password: &'a str,
        }

        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            user: AuthUser,
        }

        #[derive(Deserialize)]
        struct AuthUser {
            id: String,
            email: Option<String>,
        }

        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&PasswordGrant { email, password })
            .send()
            .await?;

        // the auth endpoint answers bad credentials with 400
        if response.status().as_u16() == 400 {
            return Err(BackendError::Unauthorized);
        }
        let token: TokenResponse = read_json(response).await?;

        Ok(Session {
            user_id: token.user.id,
            email: token.user.email.unwrap_or_else(|| email.to_string()),
            access_token: token.access_token,
        })
    }

    async fn sign_out(&self, session: &Session) -> BackendResult<()> {
        let url = format!("{}/auth/v1/logout", self.base_url);
        let response = self.authed(self.http.post(&url), session).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn create_application(
        &self,
        session: &Session,
        application: &NewApplication,
    ) -> BackendResult<ApplicationRecord> {
        self.insert(session, "applications", application, RETURN_REPRESENTATION)
            .await
    }

    async fn update_application(
        &self,
        session: &Session,
        application_id: &str,
        application: &NewApplication,
    ) -> BackendResult<ApplicationRecord> {
        let url = self.table_url("applications", &format!("id=eq.{application_id}"));
        debug!("PATCH {}", url);
        let response = self
            .authed(self.http.patch(&url), session)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(application)
            .send()
            .await?;
        first_row(read_json(response).await?)
    }

    async fn list_applications(&self, session: &Session) -> BackendResult<Vec<ApplicationRecord>> {
        self.select(
            session,
            "applications",
            &format!("user_id=eq.{}&order=created_at.desc", session.user_id),
        )
        .await
    }

    async fn delete_application(
        &self,
        session: &Session,
        application_id: &str,
    ) -> BackendResult<()> {
        let url = self.table_url("applications", &format!("id=eq.{application_id}"));
        debug!("DELETE {}", url);
        let response = self.authed(self.http.delete(&url), session).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn upload_file(
        &self,
        session: &Session,
        storage_path: &str,
        bytes: Vec<u8>,
    ) -> BackendResult<String> {
        let url = self.storage_url(storage_path);
        debug!("POST {} ({} bytes)", url, bytes.len());
        let response = self
            .authed(self.http.post(&url), session)
            .header("Content-Type", "application/octet-stream")
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;
        check_status(response).await?;
        Ok(format!("{DOCUMENT_BUCKET}/{storage_path}"))
    }

    async fn create_document(
        &self,
        session: &Session,
        document: &NewDocument,
    ) -> BackendResult<DocumentRecord> {
        self.insert(session, "documents", document, RETURN_REPRESENTATION)
            .await
    }

    async fn list_documents(
        &self,
        session: &Session,
        application_id: &str,
    ) -> BackendResult<Vec<DocumentRecord>> {
        self.select(
            session,
            "documents",
            &format!("application_id=eq.{application_id}&order=uploaded_at.asc"),
        )
        .await
    }

    async fn create_timeline_entry(
        &self,
        session: &Session,
        entry: &NewTimelineEntry,
    ) -> BackendResult<TimelineEntry> {
        self.insert(session, "timeline", entry, RETURN_REPRESENTATION)
            .await
    }

    async fn list_timeline(
        &self,
        session: &Session,
        application_id: &str,
    ) -> BackendResult<Vec<TimelineEntry>> {
        self.select(
            session,
            "timeline",
            &format!("application_id=eq.{application_id}&order=created_at.asc"),
        )
        .await
    }

    async fn create_submission(
        &self,
        session: &Session,
        submission: &NewSubmission,
    ) -> BackendResult<SubmissionRecord> {
        self.insert(session, "submissions", submission, RETURN_REPRESENTATION)
            .await
    }

    async fn list_submissions(&self, session: &Session) -> BackendResult<Vec<SubmissionRecord>> {
        self.select(
            session,
            "submissions",
            &format!("user_id=eq.{}&order=created_at.desc", session.user_id),
        )
        .await
    }

    async fn get_profile(&self, session: &Session) -> BackendResult<Option<Profile>> {
        let rows: Vec<Profile> = self
            .select(session, "profiles", &format!("id=eq.{}", session.user_id))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_profile(&self, session: &Session, profile: &Profile) -> BackendResult<Profile> {
        self.insert(
            session,
            "profiles",
            profile,
            "resolution=merge-duplicates,return=representation",
        )
        .await
    }
}
