//! Filing flow state machine

use super::session::FormSession;
use super::steps::{FlowTrack, StepDescriptor, StepFragment, StepId};
use super::storage::SessionStorage;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("{fragment:?} data cannot be applied on the {current:?} step")]
    FragmentMismatch { current: StepId, fragment: StepId },
    #[error("filing method already chosen for this session; start over to change it")]
    TrackLocked,
    #[error("step {index} is not reachable (furthest step is {furthest})")]
    StepOutOfRange { index: usize, furthest: usize },
}

/// Outcome of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Now on the given 1-based step
    Moved(usize),
    /// Back was pressed on the first step
    Exit,
    /// The final step's data is merged; the session is ready to submit
    ReadyToSubmit,
}

/// Holds the aggregate session and persists it after every transition
pub struct FlowOrchestrator {
    session: FormSession,
    storage: Box<dyn SessionStorage>,
}

impl FlowOrchestrator {
    /// Resume the persisted session, or start an empty one at step 1
    pub fn start(storage: Box<dyn SessionStorage>) -> Self {
        let session = match storage.load() {
            Ok(Some(mut session)) => {
                clamp_indices(&mut session);
                tracing::info!(
                    "Resuming filing at step {} of {}",
                    session.current_step_index,
                    session.track.step_count()
                );
                session
            }
            Ok(None) => FormSession::default(),
            Err(e) => {
                tracing::warn!("Discarding unreadable saved session: {e}");
                FormSession::default()
            }
        };
        Self { session, storage }
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    pub fn current_index(&self) -> usize {
        self.session.current_step_index
    }

    pub fn current_step(&self) -> StepId {
        self.session
            .track
            .step_at(self.session.current_step_index)
            .unwrap_or(StepId::TaxYear)
    }

    pub fn track(&self) -> FlowTrack {
        self.session.track
    }

    /// The step list of the active track
    pub fn steps(&self) -> Vec<StepDescriptor> {
        self.session.track.descriptors()
    }

    pub fn is_last_step(&self) -> bool {
        self.session.track != FlowTrack::Undecided
            && self.session.current_step_index == self.session.track.step_count()
    }

    /// Merge the current step's fragment and move forward
    pub fn advance(&mut self, fragment: StepFragment) -> Result<Transition, FlowError> {
        let current = self.current_step();
        if fragment.step() != current {
            return Err(FlowError::FragmentMismatch {
                current,
                fragment: fragment.step(),
            });
        }

        self.merge(fragment)?;

        let transition = if self.is_last_step() {
            Transition::ReadyToSubmit
        } else {
            self.session.current_step_index += 1;
            self.session.furthest_step_index = self
                .session
                .furthest_step_index
                .max(self.session.current_step_index);
            Transition::Moved(self.session.current_step_index)
        };

        tracing::debug!("Advanced from {:?}: {:?}", current, transition);
        self.persist();
        Ok(transition)
    }

    /// Step back, or ask the caller to leave the flow from step 1
    pub fn retreat(&mut self) -> Transition {
        if self.session.current_step_index <= 1 {
            return Transition::Exit;
        }
        self.session.current_step_index -= 1;
        self.persist();
        Transition::Moved(self.session.current_step_index)
    }

    /// Jump back to any step already reached, keeping all entered data
    pub fn edit_jump_to(&mut self, index: usize) -> Result<Transition, FlowError> {
        let furthest = self.session.furthest_step_index;
        if index == 0 || index > furthest || index > self.session.track.step_count() {
            return Err(FlowError::StepOutOfRange { index, furthest });
        }
        self.session.current_step_index = index;
        self.persist();
        Ok(Transition::Moved(index))
    }

    /// Record the backend id of a saved draft
    pub fn set_application_id(&mut self, id: String) {
        self.session.application_id = Some(id);
        self.persist();
    }

    /// Terminal success: drop the persisted session and start fresh
    pub fn complete(&mut self) {
        self.clear_storage();
        self.session = FormSession::default();
    }

    /// User-initiated start over
    pub fn reset(&mut self) {
        tracing::info!("Filing session reset");
        self.complete();
    }

    fn merge(&mut self, fragment: StepFragment) -> Result<(), FlowError> {
        let session = &mut self.session;
        match fragment {
            StepFragment::TaxYear(year) => session.tax_year = Some(year),
            StepFragment::Method(method) => {
                let chosen = FlowTrack::from(method);
                match session.track {
                    FlowTrack::Undecided => session.track = chosen,
                    current if current == chosen => {}
                    _ => return Err(FlowError::TrackLocked),
                }
            }
            StepFragment::BasicInfo(info) => session.basic_info = Some(info),
            StepFragment::Income(income) => session.income = Some(income),
            StepFragment::Credits(credits) => session.credits = Some(credits),
            StepFragment::Deductions(deductions) => session.deductions = Some(deductions),
            StepFragment::Wealth(wealth) => session.wealth = Some(wealth),
            StepFragment::Expenses(expenses) => session.expenses = Some(expenses),
            StepFragment::Documents(documents) => session.documents = Some(documents),
            StepFragment::Review => {}
            StepFragment::Credentials(credentials) => session.credentials = Some(credentials),
        }
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.session) {
            tracing::warn!("Failed to persist filing session: {e}");
        }
    }

    fn clear_storage(&self) {
        if let Err(e) = self.storage.clear() {
            tracing::warn!("Failed to clear saved filing session: {e}");
        }
    }
}

/// Keep restored indices inside the restored track
fn clamp_indices(session: &mut FormSession) {
    let count = session.track.step_count();
    session.current_step_index = session.current_step_index.clamp(1, count);
    session.furthest_step_index = session
        .furthest_step_index
        .clamp(session.current_step_index, count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::session::{BasicInfo, FbrCredentials, IncomeDetails};
    use crate::flow::storage::{MemorySessionStore, StorageError, CURRENT_STEP_KEY};
    use crate::flow::FilingMethod;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    /// Storage handle that tests can inspect after handing a clone to the orchestrator
    #[derive(Clone, Default)]
    struct SharedStore(Arc<MemorySessionStore>);

    impl SessionStorage for SharedStore {
        fn read_key(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.read_key(key)
        }
        fn write_key(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.0.write_key(key, value)
        }
        fn remove_key(&self, key: &str) -> Result<(), StorageError> {
            self.0.remove_key(key)
        }
    }

    fn fresh() -> (FlowOrchestrator, SharedStore) {
        let store = SharedStore::default();
        (FlowOrchestrator::start(Box::new(store.clone())), store)
    }

    fn basic_info() -> BasicInfo {
        BasicInfo {
            full_name: "Bilal Ahmed".to_string(),
            ..Default::default()
        }
    }

    fn choose(orchestrator: &mut FlowOrchestrator, method: FilingMethod) {
        orchestrator
            .advance(StepFragment::TaxYear("2024-2025".to_string()))
            .unwrap();
        orchestrator.advance(StepFragment::Method(method)).unwrap();
    }

    #[test]
    fn test_starts_empty_at_step_one() {
        let (orchestrator, _) = fresh();
        assert_eq!(orchestrator.current_index(), 1);
        assert_eq!(orchestrator.current_step(), StepId::TaxYear);
        assert_eq!(orchestrator.session(), &FormSession::default());
    }

    #[test]
    fn test_document_upload_choice_yields_five_steps() {
        let (mut orchestrator, _) = fresh();
        choose(&mut orchestrator, FilingMethod::DocumentUpload);
        let titles: Vec<_> = orchestrator.steps().iter().map(|d| d.title).collect();
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
        assert_eq!(orchestrator.current_step(), StepId::PersonalInfo);
    }

    #[test]
    fn test_online_choice_yields_ten_steps() {
        let (mut orchestrator, _) = fresh();
        choose(&mut orchestrator, FilingMethod::Online);
        assert_eq!(orchestrator.steps().len(), 10);
        assert_eq!(orchestrator.current_index(), 3);
    }

    #[test]
    fn test_retreat_after_advance_restores_index() {
        let (mut orchestrator, _) = fresh();
        choose(&mut orchestrator, FilingMethod::Online);
        let before = orchestrator.current_index();
        orchestrator
            .advance(StepFragment::BasicInfo(basic_info()))
            .unwrap();
        assert_eq!(orchestrator.retreat(), Transition::Moved(before));
        assert_eq!(orchestrator.current_index(), before);
    }

    #[test]
    fn test_retreat_on_first_step_exits() {
        let (mut orchestrator, _) = fresh();
        assert_eq!(orchestrator.retreat(), Transition::Exit);
        assert_eq!(orchestrator.current_index(), 1);
    }

    #[test]
    fn test_fragment_for_other_step_is_rejected() {
        let (mut orchestrator, _) = fresh();
        let err = orchestrator
            .advance(StepFragment::BasicInfo(basic_info()))
            .unwrap_err();
        assert_eq!(
            err,
            FlowError::FragmentMismatch {
                current: StepId::TaxYear,
                fragment: StepId::PersonalInfo
            }
        );
        assert_eq!(orchestrator.current_index(), 1);
    }

    #[test]
    fn test_track_cannot_change_once_chosen() {
        let (mut orchestrator, _) = fresh();
        choose(&mut orchestrator, FilingMethod::Online);
        orchestrator.edit_jump_to(2).unwrap();
        let err = orchestrator
            .advance(StepFragment::Method(FilingMethod::DocumentUpload))
            .unwrap_err();
        assert_eq!(err, FlowError::TrackLocked);
        assert_eq!(orchestrator.track(), FlowTrack::Online);

        // re-confirming the same method is fine
        assert_eq!(
            orchestrator.advance(StepFragment::Method(FilingMethod::Online)),
            Ok(Transition::Moved(3))
        );
    }

    #[test]
    fn test_edit_jump_keeps_other_sections() {
        let (mut orchestrator, _) = fresh();
        choose(&mut orchestrator, FilingMethod::Online);
        orchestrator
            .advance(StepFragment::BasicInfo(basic_info()))
            .unwrap();
        let income = IncomeDetails {
            salary_income: 1_200_000,
            ..Default::default()
        };
        orchestrator
            .advance(StepFragment::Income(income.clone()))
            .unwrap();

        assert_eq!(orchestrator.edit_jump_to(3), Ok(Transition::Moved(3)));
        assert_eq!(orchestrator.session().income, Some(income));
        assert_eq!(orchestrator.session().basic_info, Some(basic_info()));
        assert_eq!(orchestrator.session().furthest_step_index, 5);
    }

    #[test]
    fn test_edit_jump_beyond_furthest_is_rejected() {
        let (mut orchestrator, _) = fresh();
        choose(&mut orchestrator, FilingMethod::Online);
        assert_eq!(
            orchestrator.edit_jump_to(7),
            Err(FlowError::StepOutOfRange {
                index: 7,
                furthest: 3
            })
        );
        assert!(orchestrator.edit_jump_to(0).is_err());
    }

    #[test]
    fn test_final_step_reports_ready_to_submit() {
        let (mut orchestrator, _) = fresh();
        choose(&mut orchestrator, FilingMethod::DocumentUpload);
        orchestrator
            .advance(StepFragment::BasicInfo(basic_info()))
            .unwrap();
        orchestrator
            .advance(StepFragment::Documents(Default::default()))
            .unwrap();
        assert!(orchestrator.is_last_step());
        assert_eq!(
            orchestrator.advance(StepFragment::Credentials(Default::default())),
            Ok(Transition::ReadyToSubmit)
        );
        assert_eq!(orchestrator.current_index(), 5);
    }

    #[test]
    fn test_saved_session_matches_live_one_after_credentials() {
        let (mut orchestrator, store) = fresh();
        choose(&mut orchestrator, FilingMethod::DocumentUpload);
        orchestrator
            .advance(StepFragment::BasicInfo(basic_info()))
            .unwrap();
        orchestrator
            .advance(StepFragment::Documents(Default::default()))
            .unwrap();
        let transition = orchestrator.advance(StepFragment::Credentials(FbrCredentials {
            iris_username: "3520212345671".to_string(),
            payment_bank: "HBL".to_string(),
        }));

        assert_eq!(transition, Ok(Transition::ReadyToSubmit));
        assert_eq!(store.load().unwrap().as_ref(), Some(orchestrator.session()));
    }

    #[test]
    fn test_every_transition_is_persisted() {
        let (mut orchestrator, store) = fresh();
        choose(&mut orchestrator, FilingMethod::Online);
        assert_eq!(store.load().unwrap().as_ref(), Some(orchestrator.session()));

        orchestrator.retreat();
        assert_eq!(
            store.read_key(CURRENT_STEP_KEY).unwrap().as_deref(),
            Some("2")
        );
    }

    #[test]
    fn test_restart_resumes_where_left_off() {
        let (mut orchestrator, store) = fresh();
        choose(&mut orchestrator, FilingMethod::Online);
        orchestrator
            .advance(StepFragment::BasicInfo(basic_info()))
            .unwrap();
        let snapshot = orchestrator.session().clone();
        drop(orchestrator);

        let resumed = FlowOrchestrator::start(Box::new(store));
        assert_eq!(resumed.session(), &snapshot);
        assert_eq!(resumed.current_step(), StepId::Income);
    }

    #[test]
    fn test_complete_clears_storage() {
        let (mut orchestrator, store) = fresh();
        choose(&mut orchestrator, FilingMethod::Online);
        orchestrator.complete();
        assert!(store.load().unwrap().is_none());
        assert_eq!(orchestrator.session(), &FormSession::default());
    }

    #[test]
    fn test_out_of_range_restored_index_is_clamped() {
        let store = SharedStore::default();
        let session = FormSession {
            current_step_index: 42,
            furthest_step_index: 42,
            track: FlowTrack::DocumentUpload,
            ..Default::default()
        };
        store.save(&session).unwrap();
        let orchestrator = FlowOrchestrator::start(Box::new(store));
        assert_eq!(orchestrator.current_index(), 5);
        assert_eq!(orchestrator.session().furthest_step_index, 5);
    }
}
