//! Application state and core logic

use crate::backend::{service, BackendApi, BackendError, RestClient, SubmissionRecord};
use crate::config::TuiConfig;
use crate::flow::{
    BasicInfo, FileSessionStore, FlowOrchestrator, MemorySessionStore, SessionStorage, StepId,
    Transition,
};
use crate::platform::COPY_MODIFIER;
use crate::state::{
    AppState, CalculatorForm, ConfirmAction, Form, LoginForm, StepForm, View, ViewParams,
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::oneshot::{self, error::TryRecvError};
use uuid::Uuid;

/// Final submission running on a background task
struct PendingSubmission {
    /// Flow epoch the submission was started in
    epoch: Uuid,
    rx: oneshot::Receiver<Result<SubmissionRecord, BackendError>>,
}

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Hosted backend
    backend: Arc<dyn BackendApi>,
    /// The in-progress filing
    pub flow: FlowOrchestrator,
    pub config: TuiConfig,
    /// Whether the app should quit
    quit: bool,
    /// One-line feedback shown in the status bar
    pub status_message: Option<String>,
    pending_submission: Option<PendingSubmission>,
    /// Regenerated whenever the filing is reset or left; results tagged with an
    /// older epoch are discarded
    flow_epoch: Uuid,
    /// Write config changes to disk
    persist_config: bool,
}

impl App {
    /// Create a new App instance from the user's config and data dirs
    pub fn new() -> Result<Self> {
        let config = TuiConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable config: {e}");
            TuiConfig::default()
        });

        let client = RestClient::from_config(&config);
        tracing::info!("Using backend at {}", client.base_url());

        let storage: Box<dyn SessionStorage> = match TuiConfig::data_dir() {
            Some(dir) => Box::new(FileSessionStore::new(dir)),
            None => {
                tracing::warn!(
                    "No data directory available; filing progress will not survive a restart"
                );
                Box::new(MemorySessionStore::default())
            }
        };

        let mut app = Self::with_parts(Arc::new(client), storage, config);
        app.persist_config = true;
        app.restore_last_view();
        Ok(app)
    }

    /// Assemble an app from explicit collaborators; config is never written
    pub fn with_parts(
        backend: Arc<dyn BackendApi>,
        storage: Box<dyn SessionStorage>,
        config: TuiConfig,
    ) -> Self {
        let login_form = match &config.remember_email {
            Some(email) => LoginForm::with_email(email),
            None => LoginForm::new(),
        };
        let state = AppState {
            login_form,
            calculator_form: CalculatorForm::new(config.tax_year()),
            ..Default::default()
        };

        Self {
            state,
            backend,
            flow: FlowOrchestrator::start(storage),
            config,
            quit: false,
            status_message: None,
            pending_submission: None,
            flow_epoch: Uuid::new_v4(),
            persist_config: false,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Whether a submission is still in flight
    pub fn has_pending_submission(&self) -> bool {
        self.pending_submission.is_some()
    }

    /// Push an error message to the error queue for display
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.state.push_error(message.into());
    }

    /// Resume the view recorded in config; gated views wait for sign-in
    fn restore_last_view(&mut self) {
        let view = match self.config.last_path.as_deref().and_then(View::from_path) {
            // these need in-memory context that does not survive a restart
            Some(View::Confirmation | View::ApplicationDetail) => View::Dashboard,
            Some(view) => view,
            None => View::Login,
        };
        tracing::debug!("Restoring {}", view.path());

        if view.requires_session() && !self.state.is_signed_in() {
            self.state.after_login = Some(view);
            self.state.current_view = View::Login;
        } else {
            self.state.current_view = view;
        }
    }

    fn remember_path(&mut self) {
        let path = self.state.current_view.path().to_string();
        if self.config.last_path.as_deref() == Some(path.as_str()) {
            return;
        }
        self.config.last_path = Some(path);
        self.save_config();
    }

    fn save_config(&self) {
        if !self.persist_config {
            return;
        }
        if let Err(e) = self.config.save() {
            tracing::warn!("Failed to save config: {e}");
        }
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle error dialog dismissal first (modal)
        if self.state.has_errors() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.dismiss_error();
            }
            return Ok(());
        }

        // Handle confirmation dialog (modal)
        if self.state.confirm_action.is_some() {
            self.handle_confirm_key(key).await;
            return Ok(());
        }

        // Clear any status messages on key press
        self.status_message = None;

        if key.code == KeyCode::Char('k')
            && key.modifiers.contains(KeyModifiers::CONTROL)
            && self.state.current_view != View::TaxCalculator
        {
            self.navigate(View::TaxCalculator, ViewParams::default());
            return Ok(());
        }

        match self.state.current_view {
            View::Login => self.handle_login_key(key).await,
            View::Dashboard => self.handle_dashboard_key(key).await,
            View::ApplicationDetail => self.handle_application_key(key).await,
            View::TaxCalculator => self.handle_calculator_key(key),
            View::Filing => self.handle_filing_key(key).await,
            View::Confirmation => self.handle_confirmation_key(key).await,
        }

        Ok(())
    }

    /// Navigate to a new view; gated views redirect to sign-in
    pub fn navigate(&mut self, view: View, params: ViewParams) {
        let (view, params) = if view.requires_session() && !self.state.is_signed_in() {
            self.state.after_login = Some(view);
            (View::Login, ViewParams::default())
        } else {
            (view, params)
        };

        self.state.view_history.push((
            self.state.current_view,
            self.state.view_params.clone(),
        ));
        self.state.current_view = view;
        self.state.view_params = params;
        self.state.reset_selection();
        if view == View::Filing {
            self.ensure_step_form();
        }
        self.remember_path();
    }

    /// Navigate and fetch whatever the view shows
    pub async fn open(&mut self, view: View, params: ViewParams) {
        self.navigate(view, params);
        match self.state.current_view {
            View::Dashboard => self.load_dashboard().await,
            View::ApplicationDetail => self.load_application_detail().await,
            _ => {}
        }
    }

    /// Go back to previous view
    pub fn go_back(&mut self) {
        while let Some((view, params)) = self.state.view_history.pop() {
            if view.is_transient() {
                continue;
            }
            if view.requires_session() && !self.state.is_signed_in() {
                continue;
            }
            self.state.current_view = view;
            self.state.view_params = params;
            if view == View::Filing {
                self.ensure_step_form();
            }
            self.remember_path();
            return;
        }

        // nothing left: land on the home view
        self.state.current_view = if self.state.is_signed_in() {
            View::Dashboard
        } else {
            View::Login
        };
        self.state.view_params = ViewParams::default();
        self.remember_path();
    }

    /// Handle keys in Login view
    async fn handle_login_key(&mut self, key: KeyEvent) {
        let form = &mut self.state.login_form;
        match key.code {
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Enter => self.sign_in().await,
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(field) = form.get_active_field_mut() {
                    field.push_char(c);
                    self.state.login_errors.remove(&field.name);
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = form.get_active_field_mut() {
                    field.pop_char();
                }
            }
            _ => {}
        }
    }

    async fn sign_in(&mut self) {
        let result = self.state.login_form.validate();
        self.state.login_errors = result.field_errors;
        if !result.valid {
            return;
        }

        let email = self.state.login_form.email.as_text().trim().to_string();
        let password = self.state.login_form.password.as_text().to_string();

        self.status_message = Some("Signing in...".to_string());
        match self.backend.sign_in(&email, &password).await {
            Ok(session) => {
                tracing::info!("Signed in as {}", session.email);
                self.status_message = Some(format!("Signed in as {}", session.email));
                self.config.remember_email = Some(session.email.clone());
                self.save_config();
                self.state.login_form = LoginForm::with_email(&session.email);
                self.state.session = Some(session);

                self.load_profile().await;

                let target = self.state.after_login.take().unwrap_or(View::Dashboard);
                self.state.view_history.clear();
                self.open(target, ViewParams::default()).await;
            }
            Err(e) => {
                self.state.login_form.password.clear();
                self.report_backend_error("sign in", e);
            }
        }
    }

    /// Revoke the token and drop everything scoped to it
    async fn sign_out(&mut self) {
        if let Some(session) = self.state.session.clone() {
            if let Err(e) = self.backend.sign_out(&session).await {
                tracing::warn!("Sign-out request failed: {e}");
            }
        }
        self.end_session();
        self.status_message = Some("Signed out".to_string());
    }

    fn end_session(&mut self) {
        self.invalidate_flow();
        self.state.clear_session();
        self.state.view_history.clear();
        self.state.current_view = View::Login;
        self.state.view_params = ViewParams::default();
        self.remember_path();
    }

    async fn load_profile(&mut self) {
        let Some(session) = self.state.session.clone() else {
            return;
        };
        match self.backend.get_profile(&session).await {
            Ok(profile) => self.state.profile = profile,
            // the profile only prefills forms
            Err(e) => tracing::warn!("Failed to load profile: {e}"),
        }
    }

    async fn load_dashboard(&mut self) {
        let Some(session) = self.state.session.clone() else {
            return;
        };
        let backend = self.backend.as_ref();
        let result = tokio::try_join!(
            backend.list_applications(&session),
            backend.list_submissions(&session)
        );
        match result {
            Ok((applications, submissions)) => {
                tracing::debug!("Loaded {} applications", applications.len());
                self.state.applications = applications;
                self.state.submissions = submissions;
                if self.state.selected_index >= self.state.applications.len() {
                    self.state.selected_index = self.state.applications.len().saturating_sub(1);
                }
            }
            Err(e) => self.report_backend_error("load your applications", e),
        }
    }

    async fn load_application_detail(&mut self) {
        let (Some(session), Some(id)) = (
            self.state.session.clone(),
            self.state.view_params.application_id.clone(),
        ) else {
            return;
        };
        match service::load_application_detail(self.backend.as_ref(), &session, &id).await {
            Ok((timeline, documents)) => {
                self.state.timeline = timeline;
                self.state.documents = documents;
            }
            Err(e) => self.report_backend_error("load the application", e),
        }
    }

    /// Log, queue for the error dialog, and sign out on rejected credentials
    fn report_backend_error(&mut self, action: &str, err: BackendError) {
        tracing::error!("Failed to {action}: {err}");
        if err.is_auth_error() && self.state.is_signed_in() {
            self.end_session();
        }
        self.push_error(format!("Could not {action}. {}", err.user_message()));
    }

    /// Handle keys in Dashboard view
    async fn handle_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.move_selection_down(self.state.applications.len());
            }
            KeyCode::Up | KeyCode::Char('k') => self.state.move_selection_up(),
            KeyCode::Enter => {
                let selected = self.state.selected_application().map(|a| a.id.clone());
                if let Some(id) = selected {
                    let params = ViewParams {
                        application_id: Some(id),
                    };
                    self.open(View::ApplicationDetail, params).await;
                }
            }
            KeyCode::Char('n') => self.navigate(View::Filing, ViewParams::default()),
            KeyCode::Char('c') => self.navigate(View::TaxCalculator, ViewParams::default()),
            KeyCode::Char('r') => {
                self.load_dashboard().await;
                if !self.state.has_errors() {
                    self.status_message = Some("Refreshed".to_string());
                }
            }
            KeyCode::Char('d') => {
                let selected = self.state.selected_application().map(|a| {
                    let label = a
                        .tax_year
                        .clone()
                        .unwrap_or_else(|| a.reference_or_placeholder().to_string());
                    let deletable =
                        a.status == "draft" && self.state.submission_for(&a.id).is_none();
                    (a.id.clone(), label, deletable)
                });
                match selected {
                    Some((id, label, true)) => {
                        self.state.confirm_action =
                            Some(ConfirmAction::DeleteApplication { id, label });
                    }
                    Some(_) => {
                        self.status_message = Some("Only drafts can be deleted".to_string());
                    }
                    None => {}
                }
            }
            KeyCode::Char('s') => self.state.confirm_action = Some(ConfirmAction::SignOut),
            KeyCode::Char('q') => self.quit = true,
            _ => {}
        }
    }

    /// Handle keys in Application detail view
    async fn handle_application_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.state.scroll_down(),
            KeyCode::Up | KeyCode::Char('k') => self.state.scroll_up(),
            KeyCode::Char('r') => self.load_application_detail().await,
            KeyCode::Esc | KeyCode::Backspace => self.go_back(),
            _ => {}
        }
    }

    /// Handle keys in the salary tax calculator
    fn handle_calculator_key(&mut self, key: KeyEvent) {
        let form = &mut self.state.calculator_form;
        match key.code {
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Left | KeyCode::Right => {
                if let Some(field) = form.get_active_field_mut() {
                    field.cycle(key.code == KeyCode::Right);
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(field) = form.get_active_field_mut() {
                    field.push_char(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = form.get_active_field_mut() {
                    field.pop_char();
                }
            }
            KeyCode::Esc => self.go_back(),
            _ => {}
        }
    }

    /// Handle keys in the filing wizard
    async fn handle_filing_key(&mut self, key: KeyEvent) {
        if self.state.submitting {
            // stop waiting; a late result is discarded
            if key.code == KeyCode::Esc {
                self.leave_flow();
            }
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if ctrl => self.continue_step().await,
            KeyCode::Char('d') if key.modifiers.contains(COPY_MODIFIER) => self.save_draft().await,
            KeyCode::Char('r') if ctrl => {
                self.state.confirm_action = Some(ConfirmAction::ResetFiling);
            }
            KeyCode::Esc => self.retreat_step(),
            _ if self.flow.current_step() == StepId::Review => self.handle_review_key(key).await,
            KeyCode::Enter => self.continue_step().await,
            _ => self.edit_step_field(key),
        }
    }

    fn edit_step_field(&mut self, key: KeyEvent) {
        let Some(form) = self.state.step_form.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Left | KeyCode::Right => {
                if let Some(field) = form.get_active_field_mut() {
                    field.cycle(key.code == KeyCode::Right);
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(field) = form.get_active_field_mut() {
                    field.push_char(c);
                    let name = field.name.clone();
                    form.errors.remove(&name);
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = form.get_active_field_mut() {
                    field.pop_char();
                }
            }
            _ => {}
        }
    }

    /// Review lists the completed steps; `e` jumps back to edit one
    async fn handle_review_key(&mut self, key: KeyEvent) {
        let completed = self.flow.current_index().saturating_sub(1);
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if self.state.review_index + 1 < completed {
                    self.state.review_index += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.review_index = self.state.review_index.saturating_sub(1);
            }
            KeyCode::Char('e') => self.jump_to_step(self.state.review_index + 1),
            KeyCode::Enter => self.continue_step().await,
            _ => {}
        }
    }

    /// Build the form for the current step unless one is already open for it
    fn ensure_step_form(&mut self) {
        let current = self.flow.current_step();
        if self.state.step_form.as_ref().map(|f| f.step) != Some(current) {
            self.open_step_form();
        }
    }

    fn open_step_form(&mut self) {
        let step = self.flow.current_step();
        let mut form = StepForm::for_step(step, self.flow.session(), self.config.tax_year());
        if step == StepId::PersonalInfo {
            if let Some(info) = self.known_basic_info() {
                form.prefill_basic_info(&info);
            }
        }
        self.state.review_index = 0;
        self.state.step_form = Some(form);
    }

    /// Identity details already known from the profile or the session
    fn known_basic_info(&self) -> Option<BasicInfo> {
        if let Some(profile) = &self.state.profile {
            return Some(BasicInfo {
                full_name: profile.full_name.clone(),
                cnic: profile.cnic.clone(),
                email: profile.email.clone(),
                phone: profile.phone.clone(),
                address: profile.address.clone(),
                ..Default::default()
            });
        }
        self.state.session.as_ref().map(|s| BasicInfo {
            email: s.email.clone(),
            ..Default::default()
        })
    }

    /// Validate the open step and move forward, submitting after the last step
    async fn continue_step(&mut self) {
        let mode = self.config.validation_mode;
        let Some(form) = self.state.step_form.as_mut() else {
            return;
        };
        let iris_password = form.iris_password();
        let Some(fragment) = form.submit(mode) else {
            self.status_message = Some("Fix the highlighted fields to continue".to_string());
            return;
        };

        match self.flow.advance(fragment) {
            Ok(Transition::Moved(_)) => self.open_step_form(),
            Ok(Transition::ReadyToSubmit) => {
                self.start_submission(iris_password.unwrap_or_default()).await;
            }
            Ok(Transition::Exit) => self.leave_flow(),
            Err(e) => {
                tracing::warn!("Step transition rejected: {e}");
                self.push_error(e.to_string());
            }
        }
    }

    fn retreat_step(&mut self) {
        match self.flow.retreat() {
            Transition::Exit => self.leave_flow(),
            _ => self.open_step_form(),
        }
    }

    fn jump_to_step(&mut self, index: usize) {
        match self.flow.edit_jump_to(index) {
            Ok(_) => self.open_step_form(),
            Err(e) => self.push_error(e.to_string()),
        }
    }

    /// Leave the wizard; saved progress stays on disk
    fn leave_flow(&mut self) {
        self.invalidate_flow();
        self.state.step_form = None;
        self.go_back();
    }

    /// Start over from an empty session
    fn reset_filing(&mut self) {
        self.flow.reset();
        self.invalidate_flow();
        self.open_step_form();
        self.status_message = Some("Started a new return".to_string());
    }

    fn invalidate_flow(&mut self) {
        self.flow_epoch = Uuid::new_v4();
        self.state.submitting = false;
    }

    async fn save_draft(&mut self) {
        let Some(session) = self.state.session.clone() else {
            self.push_error("Sign in to save a draft");
            return;
        };
        match service::save_application(self.backend.as_ref(), &session, self.flow.session()).await
        {
            Ok(record) => {
                tracing::info!("Draft saved as application {}", record.id);
                self.flow.set_application_id(record.id);
                self.status_message = Some("Draft saved".to_string());
            }
            Err(e) => self.report_backend_error("save your draft", e),
        }
    }

    /// Save the return as a draft, then submit it on a background task.
    /// The draft id is kept in the session so a retry reuses the same application.
    async fn start_submission(&mut self, iris_password: String) {
        let Some(session) = self.state.session.clone() else {
            self.push_error("Sign in to submit your return");
            return;
        };

        match service::save_application(self.backend.as_ref(), &session, self.flow.session()).await
        {
            Ok(record) => self.flow.set_application_id(record.id),
            Err(e) => {
                self.report_backend_error("save your return", e);
                return;
            }
        }

        let form = self.flow.session().clone();
        let backend = Arc::clone(&self.backend);
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result =
                service::submit_tax_return(backend.as_ref(), &session, &form, &iris_password)
                    .await;
            // receiver is gone when the app quit mid-submission
            let _ = tx.send(result);
        });

        tracing::info!("Submitting return for {}", self.flow.session().tax_year_or_default());
        self.pending_submission = Some(PendingSubmission {
            epoch: self.flow_epoch,
            rx,
        });
        self.state.submitting = true;
        self.status_message = Some("Submitting your return...".to_string());
    }

    /// Pick up a finished submission; called once per tick
    pub fn poll_background(&mut self) {
        let Some(pending) = self.pending_submission.as_mut() else {
            return;
        };
        let result = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Closed) => Err(BackendError::Network(
                "submission task ended without a result".to_string(),
            )),
        };
        let epoch = pending.epoch;
        self.pending_submission = None;

        if epoch != self.flow_epoch {
            tracing::info!("Discarding submission result from an abandoned filing");
            return;
        }
        self.state.submitting = false;

        match result {
            Ok(record) => {
                tracing::info!(
                    "Return filed with reference {}",
                    record.reference_or_placeholder()
                );
                self.flow.complete();
                self.invalidate_flow();
                self.state.step_form = None;
                self.state.last_submission = Some(record);
                self.navigate(View::Confirmation, ViewParams::default());
            }
            // session and saved progress stay as they were
            Err(e) => self.report_backend_error("submit your return", e),
        }
    }

    /// Handle keys on the submission confirmation
    async fn handle_confirmation_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.state.view_history.clear();
                self.open(View::Dashboard, ViewParams::default()).await;
            }
            KeyCode::Char('n') => self.navigate(View::Filing, ViewParams::default()),
            KeyCode::Char('y') => self.copy_reference(),
            KeyCode::Char('q') => self.quit = true,
            _ => {}
        }
    }

    fn copy_reference(&mut self) {
        let Some(reference) = self
            .state
            .last_submission
            .as_ref()
            .and_then(|s| s.reference_number.clone())
        else {
            self.status_message = Some("No reference number assigned yet".to_string());
            return;
        };
        match copy_to_clipboard(&reference) {
            Ok(()) => self.status_message = Some(format!("Copied {reference}")),
            Err(e) => {
                tracing::warn!("Clipboard unavailable: {e}");
                self.push_error("Could not copy to the clipboard");
            }
        }
    }

    /// Handle the yes/no confirmation dialog
    async fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Some(action) = self.state.confirm_action.take() {
                    self.execute_confirmed(action).await;
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => self.state.confirm_action = None,
            _ => {}
        }
    }

    async fn execute_confirmed(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::ResetFiling => self.reset_filing(),
            ConfirmAction::SignOut => self.sign_out().await,
            ConfirmAction::DeleteApplication { id, .. } => {
                let Some(session) = self.state.session.clone() else {
                    return;
                };
                match self.backend.delete_application(&session, &id).await {
                    Ok(()) => {
                        tracing::info!("Deleted application {id}");
                        if self.flow.session().application_id.as_deref() == Some(id.as_str()) {
                            self.flow.reset();
                            self.invalidate_flow();
                            self.state.step_form = None;
                        }
                        self.status_message = Some("Draft deleted".to_string());
                        self.load_dashboard().await;
                    }
                    Err(e) => self.report_backend_error("delete the draft", e),
                }
            }
        }
    }
}

/// Copy text to the system clipboard
fn copy_to_clipboard(text: &str) -> Result<()> {
    use arboard::Clipboard;
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text)?;
    Ok(())
}
