//! Application state definitions

use super::forms::{CalculatorForm, LoginForm, StepForm};
use crate::backend::{
    ApplicationRecord, DocumentRecord, Profile, Session, SubmissionRecord, TimelineEntry,
};
use crate::tax::DEFAULT_TAX_YEAR;
use std::collections::{BTreeMap, VecDeque};

/// Current view in the application; each maps to one path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Login,
    Dashboard,
    ApplicationDetail,
    TaxCalculator,
    Filing,
    Confirmation,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Login,
        View::Dashboard,
        View::ApplicationDetail,
        View::TaxCalculator,
        View::Filing,
        View::Confirmation,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::ApplicationDetail => "/application",
            Self::TaxCalculator => "/tax-calculator",
            Self::Filing => "/personal-tax-filing",
            Self::Confirmation => "/submission",
        }
    }

    /// Resolve a path, ignoring a trailing slash
    pub fn from_path(path: &str) -> Option<View> {
        let trimmed = path.trim();
        let normalized = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        Self::ALL.into_iter().find(|v| v.path() == normalized)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Sign In",
            Self::Dashboard => "Dashboard",
            Self::ApplicationDetail => "Application",
            Self::TaxCalculator => "Salary Tax Calculator",
            Self::Filing => "Personal Tax Filing",
            Self::Confirmation => "Submission",
        }
    }

    /// Views that need a signed-in session
    pub fn requires_session(&self) -> bool {
        !matches!(self, Self::Login | Self::TaxCalculator)
    }

    /// Views skipped when walking back through history
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Login | Self::Confirmation)
    }
}

/// View parameters for navigation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewParams {
    pub application_id: Option<String>,
}

/// Destructive action waiting for a yes/no answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Discard the in-progress filing and start over
    ResetFiling,
    DeleteApplication { id: String, label: String },
    SignOut,
}

impl ConfirmAction {
    pub fn title(&self) -> &'static str {
        match self {
            Self::ResetFiling => "Start Over",
            Self::DeleteApplication { .. } => "Delete Draft",
            Self::SignOut => "Sign Out",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::ResetFiling => {
                "Discard everything entered for this return and start from the first step?"
                    .to_string()
            }
            Self::DeleteApplication { label, .. } => format!("Delete the draft {label}?"),
            Self::SignOut => "Sign out of your account?".to_string(),
        }
    }
}

/// Main application state
pub struct AppState {
    // Navigation
    pub current_view: View,
    pub view_params: ViewParams,
    pub view_history: Vec<(View, ViewParams)>,
    /// Where to land after signing in
    pub after_login: Option<View>,

    // Auth
    pub session: Option<Session>,
    pub profile: Option<Profile>,

    // Data
    pub applications: Vec<ApplicationRecord>,
    pub timeline: Vec<TimelineEntry>,
    pub documents: Vec<DocumentRecord>,
    pub submissions: Vec<SubmissionRecord>,
    pub last_submission: Option<SubmissionRecord>,

    // Selection
    pub selected_index: usize,
    pub scroll_offset: usize,
    /// Highlighted row in the review step's section list
    pub review_index: usize,

    // Forms
    pub login_form: LoginForm,
    pub login_errors: BTreeMap<String, String>,
    pub calculator_form: CalculatorForm,
    pub step_form: Option<StepForm>,

    // UI state
    pub errors: VecDeque<String>,
    pub confirm_action: Option<ConfirmAction>,
    pub submitting: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            current_view: View::default(),
            view_params: ViewParams::default(),
            view_history: Vec::new(),
            after_login: None,
            session: None,
            profile: None,
            applications: Vec::new(),
            timeline: Vec::new(),
            documents: Vec::new(),
            submissions: Vec::new(),
            last_submission: None,
            selected_index: 0,
            scroll_offset: 0,
            review_index: 0,
            login_form: LoginForm::new(),
            login_errors: BTreeMap::new(),
            calculator_form: CalculatorForm::new(DEFAULT_TAX_YEAR),
            step_form: None,
            errors: VecDeque::new(),
            confirm_action: None,
            submitting: false,
        }
    }
}

impl AppState {
    /// Queue an error for the modal error dialog
    pub fn push_error(&mut self, message: String) {
        self.errors.push_back(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The error currently on screen
    pub fn current_error(&self) -> Option<&str> {
        self.errors.front().map(String::as_str)
    }

    pub fn dismiss_error(&mut self) {
        self.errors.pop_front();
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Drop the session and everything fetched with it
    pub fn clear_session(&mut self) {
        self.session = None;
        self.profile = None;
        self.applications.clear();
        self.timeline.clear();
        self.documents.clear();
        self.submissions.clear();
        self.last_submission = None;
        self.step_form = None;
        self.submitting = false;
        self.reset_selection();
    }

    /// Move selection down
    pub fn move_selection_down(&mut self, max: usize) {
        if max > 0 && self.selected_index < max - 1 {
            self.selected_index += 1;
        }
    }

    /// Move selection up
    pub fn move_selection_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Reset selection
    pub fn reset_selection(&mut self) {
        self.selected_index = 0;
        self.scroll_offset = 0;
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn selected_application(&self) -> Option<&ApplicationRecord> {
        self.applications.get(self.selected_index)
    }

    /// Latest submission filed for an application
    pub fn submission_for(&self, application_id: &str) -> Option<&SubmissionRecord> {
        self.submissions
            .iter()
            .find(|s| s.application_id == application_id)
    }

    /// The application shown in the detail view
    pub fn viewed_application(&self) -> Option<&ApplicationRecord> {
        let id = self.view_params.application_id.as_deref()?;
        self.applications.iter().find(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn application(id: &str) -> ApplicationRecord {
        ApplicationRecord {
            id: id.to_string(),
            user_id: "u".to_string(),
            service_type: "personal-tax-filing".to_string(),
            status: "draft".to_string(),
            tax_year: None,
            reference_number: None,
            data: serde_json::Value::Null,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_view_path_round_trip() {
        for view in View::ALL {
            assert_eq!(View::from_path(view.path()), Some(view));
        }
    }

    #[test]
    fn test_view_from_path_tolerates_trailing_slash() {
        assert_eq!(View::from_path("/dashboard/"), Some(View::Dashboard));
        assert_eq!(View::from_path(" /tax-calculator "), Some(View::TaxCalculator));
        assert_eq!(View::from_path("/nowhere"), None);
        assert_eq!(View::from_path("/"), None);
    }

    #[test]
    fn test_session_gating() {
        assert!(!View::Login.requires_session());
        assert!(!View::TaxCalculator.requires_session());
        assert!(View::Filing.requires_session());
        assert!(View::Dashboard.requires_session());
    }

    #[test]
    fn test_error_queue_is_fifo() {
        let mut state = AppState::default();
        assert!(!state.has_errors());
        state.push_error("first".to_string());
        state.push_error("second".to_string());
        assert_eq!(state.current_error(), Some("first"));
        state.dismiss_error();
        assert_eq!(state.current_error(), Some("second"));
        state.dismiss_error();
        assert!(!state.has_errors());
    }

    #[test]
    fn test_selection_bounds() {
        let mut state = AppState::default();
        state.move_selection_up();
        assert_eq!(state.selected_index, 0);
        state.move_selection_down(2);
        state.move_selection_down(2);
        assert_eq!(state.selected_index, 1);
        state.move_selection_down(0);
        assert_eq!(state.selected_index, 1);
    }

    #[test]
    fn test_clear_session_drops_user_data() {
        let mut state = AppState {
            session: Some(Session {
                user_id: "u".to_string(),
                email: "e@example.pk".to_string(),
                access_token: "t".to_string(),
            }),
            applications: vec![application("a1")],
            selected_index: 1,
            ..Default::default()
        };
        state.clear_session();
        assert!(!state.is_signed_in());
        assert!(state.applications.is_empty());
        assert_eq!(state.selected_index, 0);
    }

    #[test]
    fn test_viewed_application_uses_params() {
        let state = AppState {
            applications: vec![application("a1"), application("a2")],
            view_params: ViewParams {
                application_id: Some("a2".to_string()),
            },
            ..Default::default()
        };
        assert_eq!(state.viewed_application().map(|a| a.id.as_str()), Some("a2"));
    }

    #[test]
    fn test_confirm_action_messages() {
        let action = ConfirmAction::DeleteApplication {
            id: "a1".to_string(),
            label: "2024-2025".to_string(),
        };
        assert_eq!(action.title(), "Delete Draft");
        assert!(action.message().contains("2024-2025"));
    }
}
