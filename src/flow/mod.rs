//! Personal tax filing flow
//!
//! The flow is a small state machine over a fixed list of steps. Which
//! list applies depends on the filing method picked at the second step:
//! an itemized online return, or a document upload that skips itemization.
//! Both tracks end with the FBR credential submission step.

mod orchestrator;
mod session;
mod steps;
mod storage;

pub use orchestrator::{FlowOrchestrator, Transition};
pub use session::{
    BasicInfo, Deductions, DocumentEntry, DocumentSet, Expenses, FbrCredentials, FormSession,
    IncomeDetails, TaxCredits, WealthStatement,
};
pub use steps::{FilingMethod, FlowTrack, StepFragment, StepId};
pub use storage::{FileSessionStore, MemorySessionStore, SessionStorage};
