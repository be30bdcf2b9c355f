//! Form domain layer
//!
//! Type-safe form handling: field values, validation rules, the login and
//! calculator forms, and the single parameterised form used by every
//! filing step.

mod field;
mod form_state;
mod step_form;
mod validation;

pub use field::{format_rupees, FieldKind, FormField};
pub use form_state::{CalculatorForm, Form, LoginForm};
pub use step_form::StepForm;
pub use validation::ValidationMode;
