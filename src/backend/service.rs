//! Submission service calls
//!
//! Thin wrappers that turn a finished or in-progress filing into backend
//! create/update calls. No retries and no idempotency key: a repeated
//! call after a network failure may create a duplicate record.

use super::error::BackendError;
use super::records::{
    ApplicationRecord, DocumentRecord, NewApplication, NewDocument, NewSubmission,
    NewTimelineEntry, Profile, Session, SubmissionRecord, TimelineEntry,
};
use super::traits::{BackendApi, BackendResult};
use crate::flow::{DocumentSet, FlowTrack, FormSession};

pub const SERVICE_TYPE: &str = "personal-tax-filing";

const STATUS_DRAFT: &str = "draft";
const STATUS_SUBMITTED: &str = "submitted";

/// Build the application payload carrying the whole session as JSON
pub fn application_payload(
    session: &Session,
    form: &FormSession,
    status: &str,
) -> BackendResult<NewApplication> {
    let data = serde_json::to_value(form).map_err(|e| BackendError::Decode(e.to_string()))?;
    Ok(NewApplication {
        user_id: session.user_id.clone(),
        service_type: SERVICE_TYPE.to_string(),
        status: status.to_string(),
        tax_year: form.tax_year.clone(),
        data,
    })
}

/// Create the application on first save, update it afterwards
pub async fn save_application(
    api: &dyn BackendApi,
    session: &Session,
    form: &FormSession,
) -> BackendResult<ApplicationRecord> {
    save_with_status(api, session, form, STATUS_DRAFT).await
}

async fn save_with_status(
    api: &dyn BackendApi,
    session: &Session,
    form: &FormSession,
    status: &str,
) -> BackendResult<ApplicationRecord> {
    let payload = application_payload(session, form, status)?;
    match &form.application_id {
        Some(id) => {
            tracing::debug!("Updating application {id}");
            api.update_application(session, id, &payload).await
        }
        None => {
            tracing::debug!("Creating application");
            api.create_application(session, &payload).await
        }
    }
}

/// Upload every queued document and record its metadata
pub async fn upload_documents(
    api: &dyn BackendApi,
    session: &Session,
    application_id: &str,
    documents: &DocumentSet,
) -> BackendResult<Vec<DocumentRecord>> {
    let mut records = Vec::with_capacity(documents.files.len());
    for entry in &documents.files {
        let bytes = tokio::fs::read(&entry.path)
            .await
            .map_err(|source| BackendError::File {
                path: entry.path.display().to_string(),
                source,
            })?;
        let name = entry
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| entry.doc_type.clone());
        let size_bytes = bytes.len() as u64;
        let storage_path = format!("{}/{}/{}", session.user_id, application_id, name);

        let stored_at = api.upload_file(session, &storage_path, bytes).await?;
        let record = api
            .create_document(
                session,
                &NewDocument {
                    application_id: application_id.to_string(),
                    user_id: session.user_id.clone(),
                    name,
                    doc_type: entry.doc_type.clone(),
                    storage_path: stored_at,
                    size_bytes,
                },
            )
            .await?;
        tracing::info!("Uploaded {} ({} bytes)", record.name, size_bytes);
        records.push(record);
    }
    Ok(records)
}

/// Payment status and amount recorded with a submission
fn payment_terms(form: &FormSession) -> (&'static str, u64) {
    match form.track {
        FlowTrack::Online => {
            let payable = form.tax_summary().net_payable;
            if payable == 0 {
                ("not_required", 0)
            } else {
                ("unpaid", payable)
            }
        }
        // assessed by the filing team from the uploaded documents
        FlowTrack::DocumentUpload | FlowTrack::Undecided => ("pending_assessment", 0),
    }
}

/// File the return: upload documents, create the submission record, then
/// mark the application submitted and log it on the timeline.
///
/// The application should already exist (see [`save_application`]) so a
/// failed attempt is retried against the same row; without an id a draft
/// is created first. It stays a draft until the submission exists.
///
/// Errors from the application, upload and submission calls propagate.
/// The status change, timeline entry and profile refresh are best effort
/// once the submission exists.
pub async fn submit_tax_return(
    api: &dyn BackendApi,
    session: &Session,
    form: &FormSession,
    iris_password: &str,
) -> BackendResult<SubmissionRecord> {
    let application_id = match &form.application_id {
        Some(id) => id.clone(),
        None => save_application(api, session, form).await?.id,
    };

    if let Some(documents) = &form.documents {
        upload_documents(api, session, &application_id, documents).await?;
    }

    let (payment_status, tax_payable) = payment_terms(form);
    let credentials = form.credentials.clone().unwrap_or_default();
    let submission = api
        .create_submission(
            session,
            &NewSubmission {
                application_id: application_id.clone(),
                user_id: session.user_id.clone(),
                status: STATUS_SUBMITTED.to_string(),
                payment_status: payment_status.to_string(),
                tax_year: form.tax_year_or_default().to_string(),
                tax_payable,
                filing_method: form
                    .track
                    .method()
                    .map(|m| m.label().to_string())
                    .unwrap_or_default(),
                iris_username: credentials.iris_username,
                iris_password: iris_password.to_string(),
                payment_bank: credentials.payment_bank,
            },
        )
        .await?;

    tracing::info!(
        "Submission {} created for application {application_id}",
        submission.id
    );

    let filed = FormSession {
        application_id: Some(application_id.clone()),
        ..form.clone()
    };
    if let Err(e) = save_with_status(api, session, &filed, STATUS_SUBMITTED).await {
        tracing::warn!("Failed to mark application {application_id} submitted: {e}");
    }

    let entry = NewTimelineEntry {
        application_id,
        user_id: session.user_id.clone(),
        title: "Return submitted".to_string(),
        description: format!(
            "Tax year {} filed; reference {}",
            form.tax_year_or_default(),
            submission.reference_or_placeholder()
        ),
    };
    if let Err(e) = api.create_timeline_entry(session, &entry).await {
        tracing::warn!("Failed to record timeline entry: {e}");
    }

    if let Some(info) = &form.basic_info {
        let profile = Profile {
            id: session.user_id.clone(),
            full_name: info.full_name.clone(),
            cnic: info.cnic.clone(),
            email: info.email.clone(),
            phone: info.phone.clone(),
            address: info.address.clone(),
        };
        if let Err(e) = api.upsert_profile(session, &profile).await {
            tracing::warn!("Failed to refresh profile: {e}");
        }
    }

    Ok(submission)
}

/// Timeline and documents for the application detail view, fetched together
pub async fn load_application_detail(
    api: &dyn BackendApi,
    session: &Session,
    application_id: &str,
) -> BackendResult<(Vec<TimelineEntry>, Vec<DocumentRecord>)> {
    tokio::try_join!(
        api.list_timeline(session, application_id),
        api.list_documents(session, application_id)
    )
}
