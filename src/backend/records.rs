//! Records exchanged with the hosted backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated user session, created on sign-in and dropped on sign-out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
}

/// Application row as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: String,
    pub user_id: String,
    pub service_type: String,
    pub status: String,
    #[serde(default)]
    pub tax_year: Option<String>,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ApplicationRecord {
    pub fn reference_or_placeholder(&self) -> &str {
        self.reference_number.as_deref().unwrap_or("pending")
    }
}

/// Insert/update payload for an application
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewApplication {
    pub user_id: String,
    pub service_type: String,
    pub status: String,
    pub tax_year: Option<String>,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub application_id: String,
    pub user_id: String,
    pub name: String,
    pub doc_type: String,
    pub storage_path: String,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDocument {
    pub application_id: String,
    pub user_id: String,
    pub name: String,
    pub doc_type: String,
    pub storage_path: String,
    pub size_bytes: u64,
}

/// Audit entry shown on an application's timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: String,
    pub application_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTimelineEntry {
    pub application_id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
}

/// Result of a completed filing; the client keeps only this reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: String,
    pub application_id: String,
    pub user_id: String,
    #[serde(default)]
    pub reference_number: Option<String>,
    pub status: String,
    pub payment_status: String,
    #[serde(default)]
    pub tax_year: Option<String>,
    #[serde(default)]
    pub tax_payable: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl SubmissionRecord {
    pub fn reference_or_placeholder(&self) -> &str {
        self.reference_number.as_deref().unwrap_or("pending")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSubmission {
    pub application_id: String,
    pub user_id: String,
    pub status: String,
    pub payment_status: String,
    pub tax_year: String,
    pub tax_payable: u64,
    pub filing_method: String,
    pub iris_username: String,
    pub iris_password: String,
    pub payment_bank: String,
}

/// Taxpayer profile, one row per user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub cnic: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_deserializes_with_missing_optionals() {
        let json = r#"{
            "id": "a1",
            "user_id": "u1",
            "service_type": "personal-tax-filing",
            "status": "draft"
        }"#;
        let record: ApplicationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.reference_or_placeholder(), "pending");
        assert!(record.data.is_null());
    }

    #[test]
    fn test_submission_deserializes_server_fields() {
        let json = r#"{
            "id": "s1",
            "application_id": "a1",
            "user_id": "u1",
            "reference_number": "TX-2024-000123",
            "status": "submitted",
            "payment_status": "unpaid",
            "tax_year": "2024-2025",
            "tax_payable": 90000,
            "created_at": "2024-09-30T10:15:00Z"
        }"#;
        let record: SubmissionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.reference_or_placeholder(), "TX-2024-000123");
        assert_eq!(record.tax_payable, 90_000);
        assert!(record.created_at.is_some());
    }

    #[test]
    fn test_profile_tolerates_nulls_as_missing() {
        let json = r#"{"id": "u1", "full_name": "Omar"}"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.full_name, "Omar");
        assert!(profile.cnic.is_empty());
    }
}
