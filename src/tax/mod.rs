//! Income tax computation for salaried individuals
//!
//! Slab tables live in `slabs`, the progressive computation and the
//! salary breakdown shown by the calculator view live in `calculator`.

mod calculator;
mod slabs;

pub use calculator::{compute_tax_checked, SalaryBreakdown};
pub use slabs::{available_tax_years, DEFAULT_TAX_YEAR};
