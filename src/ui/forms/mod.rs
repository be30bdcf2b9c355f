//! Form rendering module
//!
//! - `field_renderer`: field rendering utilities
//! - `login_form`: sign-in
//! - `calculator`: salary tax calculator
//! - `wizard`: the filing steps, review and submission

mod calculator;
mod field_renderer;
mod login_form;
mod wizard;

pub use calculator::draw_calculator;
pub use login_form::draw_login;
pub use wizard::draw_filing;
