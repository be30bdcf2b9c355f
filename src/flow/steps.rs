//! Step identities, track variants and step fragments

use super::session::{
    BasicInfo, Deductions, DocumentSet, Expenses, FbrCredentials, IncomeDetails, TaxCredits,
    WealthStatement,
};
use serde::{Deserialize, Serialize};

/// Every step that can appear in a filing flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepId {
    TaxYear,
    FilingMethod,
    PersonalInfo,
    Income,
    TaxCredits,
    Deductions,
    WealthStatement,
    Expenses,
    UploadDocuments,
    Review,
    FbrSubmission,
}

impl StepId {
    pub fn title(&self) -> &'static str {
        match self {
            Self::TaxYear => "Tax Year",
            Self::FilingMethod => "Filing Method",
            Self::PersonalInfo => "Personal Info",
            Self::Income => "Income",
            Self::TaxCredits => "Tax Credits",
            Self::Deductions => "Deductions",
            Self::WealthStatement => "Wealth Statement",
            Self::Expenses => "Expenses",
            Self::UploadDocuments => "Upload Documents",
            Self::Review => "Review",
            Self::FbrSubmission => "FBR Submission",
        }
    }

    /// Steps whose validation is skipped in lenient mode (business
    /// detail entry and business portfolio)
    pub fn validation_relaxable(&self) -> bool {
        matches!(self, Self::Income | Self::WealthStatement)
    }
}

const UNDECIDED_STEPS: &[StepId] = &[StepId::TaxYear, StepId::FilingMethod];

const ONLINE_STEPS: &[StepId] = &[
    StepId::TaxYear,
    StepId::FilingMethod,
    StepId::PersonalInfo,
    StepId::Income,
    StepId::TaxCredits,
    StepId::Deductions,
    StepId::WealthStatement,
    StepId::Expenses,
    StepId::Review,
    StepId::FbrSubmission,
];

const DOCUMENT_UPLOAD_STEPS: &[StepId] = &[
    StepId::TaxYear,
    StepId::FilingMethod,
    StepId::PersonalInfo,
    StepId::UploadDocuments,
    StepId::FbrSubmission,
];

/// Filing method picked at the branch point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilingMethod {
    Online,
    DocumentUpload,
}

impl FilingMethod {
    pub const ALL: [FilingMethod; 2] = [FilingMethod::Online, FilingMethod::DocumentUpload];

    /// Picker labels, in `ALL` order
    pub const LABELS: &'static [&'static str] =
        &[FilingMethod::ALL[0].label(), FilingMethod::ALL[1].label()];

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Online => "File online (itemized)",
            Self::DocumentUpload => "Upload documents",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.label() == label)
    }
}

/// The active step sequence. Each variant owns a fixed step list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlowTrack {
    /// Before the filing method is chosen
    #[default]
    Undecided,
    Online,
    DocumentUpload,
}

impl FlowTrack {
    pub fn steps(&self) -> &'static [StepId] {
        match self {
            Self::Undecided => UNDECIDED_STEPS,
            Self::Online => ONLINE_STEPS,
            Self::DocumentUpload => DOCUMENT_UPLOAD_STEPS,
        }
    }

    pub fn step_count(&self) -> usize {
        self.steps().len()
    }

    /// Step at a 1-based index
    pub fn step_at(&self, index: usize) -> Option<StepId> {
        index
            .checked_sub(1)
            .and_then(|i| self.steps().get(i).copied())
    }

    pub fn descriptors(&self) -> Vec<StepDescriptor> {
        self.steps()
            .iter()
            .enumerate()
            .map(|(i, step)| StepDescriptor {
                index: i + 1,
                step: *step,
                title: step.title(),
            })
            .collect()
    }

    pub fn method(&self) -> Option<FilingMethod> {
        match self {
            Self::Undecided => None,
            Self::Online => Some(FilingMethod::Online),
            Self::DocumentUpload => Some(FilingMethod::DocumentUpload),
        }
    }
}

impl From<FilingMethod> for FlowTrack {
    fn from(method: FilingMethod) -> Self {
        match method {
            FilingMethod::Online => Self::Online,
            FilingMethod::DocumentUpload => Self::DocumentUpload,
        }
    }
}

/// Static metadata for one node of the active sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDescriptor {
    pub index: usize,
    pub step: StepId,
    pub title: &'static str,
}

/// Validated data a step hands to the orchestrator on continue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepFragment {
    TaxYear(String),
    Method(FilingMethod),
    BasicInfo(BasicInfo),
    Income(IncomeDetails),
    Credits(TaxCredits),
    Deductions(Deductions),
    Wealth(WealthStatement),
    Expenses(Expenses),
    Documents(DocumentSet),
    Review,
    Credentials(FbrCredentials),
}

impl StepFragment {
    /// The step that owns this fragment's section
    pub fn step(&self) -> StepId {
        match self {
            Self::TaxYear(_) => StepId::TaxYear,
            Self::Method(_) => StepId::FilingMethod,
            Self::BasicInfo(_) => StepId::PersonalInfo,
            Self::Income(_) => StepId::Income,
            Self::Credits(_) => StepId::TaxCredits,
            Self::Deductions(_) => StepId::Deductions,
            Self::Wealth(_) => StepId::WealthStatement,
            Self::Expenses(_) => StepId::Expenses,
            Self::Documents(_) => StepId::UploadDocuments,
            Self::Review => StepId::Review,
            Self::Credentials(_) => StepId::FbrSubmission,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_upload_track_has_five_steps() {
        let titles: Vec<_> = FlowTrack::DocumentUpload
            .descriptors()
            .iter()
            .map(|d| d.title)
            .collect();
        assert_eq!(
            titles,
            vec![
                "Tax Year",
                "Filing Method",
                "Personal Info",
                "Upload Documents",
                "FBR Submission"
            ]
        );
    }

    #[test]
    fn test_online_track_has_ten_steps() {
        assert_eq!(FlowTrack::Online.step_count(), 10);
        assert_eq!(FlowTrack::Online.step_at(10), Some(StepId::FbrSubmission));
    }

    #[test]
    fn test_tracks_share_the_prefix() {
        for track in [FlowTrack::Online, FlowTrack::DocumentUpload] {
            assert_eq!(&track.steps()[..2], FlowTrack::Undecided.steps());
        }
    }

    #[test]
    fn test_step_at_is_one_based() {
        assert_eq!(FlowTrack::Online.step_at(0), None);
        assert_eq!(FlowTrack::Online.step_at(1), Some(StepId::TaxYear));
        assert_eq!(FlowTrack::Online.step_at(11), None);
    }

    #[test]
    fn test_fragment_step_mapping() {
        assert_eq!(
            StepFragment::Method(FilingMethod::Online).step(),
            StepId::FilingMethod
        );
        assert_eq!(StepFragment::Review.step(), StepId::Review);
    }

    #[test]
    fn test_method_serializes_kebab_case() {
        let json = serde_json::to_string(&FlowTrack::DocumentUpload).unwrap();
        assert_eq!(json, "\"document-upload\"");
    }

    #[test]
    fn test_method_labels_follow_all() {
        for (method, label) in FilingMethod::ALL.iter().zip(FilingMethod::LABELS) {
            assert_eq!(method.label(), *label);
            assert_eq!(FilingMethod::from_label(label), Some(*method));
        }
        assert_eq!(FilingMethod::from_label("By post"), None);
    }
}
