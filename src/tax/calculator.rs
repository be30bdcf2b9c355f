//! Progressive marginal tax computation

use super::slabs::slabs_for;

/// Tax payable on `annual_income` for `tax_year`, rounded to whole rupees.
///
/// Each slab taxes only the part of the income between the previous
/// slab's upper bound and its own. Unknown years use the default table.
pub fn compute_tax(annual_income: u64, tax_year: &str) -> u64 {
    let mut tax = 0.0_f64;
    let mut lower = 0_u64;

    for slab in slabs_for(tax_year) {
        if annual_income <= lower {
            break;
        }
        let upper = slab.upper_bound.map_or(annual_income, |b| b.min(annual_income));
        tax += (upper - lower) as f64 * slab.rate;
        match slab.upper_bound {
            Some(bound) => lower = bound,
            None => break,
        }
    }

    tax.round() as u64
}

/// Guarded entry point for raw user input: negative or non-finite income pays no tax.
pub fn compute_tax_checked(annual_income: f64, tax_year: &str) -> u64 {
    if !annual_income.is_finite() || annual_income <= 0.0 {
        return 0;
    }
    compute_tax(annual_income.round() as u64, tax_year)
}

/// Figures shown by the salary tax calculator
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryBreakdown {
    pub tax_year: String,
    pub monthly_income: u64,
    pub yearly_income: u64,
    pub yearly_tax: u64,
    pub monthly_tax: u64,
    pub effective_rate: f64,
    pub monthly_take_home: u64,
    pub yearly_take_home: u64,
}

impl SalaryBreakdown {
    /// Build the breakdown for a monthly salary
    pub fn from_monthly(monthly_income: u64, tax_year: &str) -> Self {
        let yearly_income = monthly_income.saturating_mul(12);
        let yearly_tax = compute_tax(yearly_income, tax_year);
        let monthly_tax = (yearly_tax as f64 / 12.0).round() as u64;
        let effective_rate = if yearly_income == 0 {
            0.0
        } else {
            yearly_tax as f64 / yearly_income as f64 * 100.0
        };

        Self {
            tax_year: tax_year.to_string(),
            monthly_income,
            yearly_income,
            yearly_tax,
            monthly_tax,
            effective_rate,
            monthly_take_home: monthly_income.saturating_sub(monthly_tax),
            yearly_take_home: yearly_income.saturating_sub(yearly_tax),
        }
    }
}
