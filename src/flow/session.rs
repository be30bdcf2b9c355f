//! The aggregate in-progress filing

use super::steps::FlowTrack;
use crate::tax::{compute_tax_checked, DEFAULT_TAX_YEAR};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Taxpayer identity and refund account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub full_name: String,
    pub cnic: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub refund_bank: String,
    pub iban: String,
}

/// Income sources for the year, including the business detail entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeDetails {
    pub salary_income: u64,
    pub business_name: String,
    pub business_income: u64,
    pub rental_income: u64,
    pub other_income: u64,
}

impl IncomeDetails {
    pub fn total(&self) -> u64 {
        self.salary_income
            .saturating_add(self.business_income)
            .saturating_add(self.rental_income)
            .saturating_add(self.other_income)
    }
}

/// Amounts that earn an average-rate credit, plus tax already withheld
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCredits {
    pub charitable_donations: u64,
    pub pension_contributions: u64,
    pub tax_withheld: u64,
}

impl TaxCredits {
    /// Amount eligible for the average-rate credit
    pub fn eligible(&self) -> u64 {
        self.charitable_donations
            .saturating_add(self.pension_contributions)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    pub zakat: u64,
    pub education_expenses: u64,
    pub health_insurance: u64,
}

impl Deductions {
    pub fn total(&self) -> u64 {
        self.zakat
            .saturating_add(self.education_expenses)
            .saturating_add(self.health_insurance)
    }
}

/// Assets and liabilities at year end
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WealthStatement {
    pub property_value: u64,
    pub vehicles_value: u64,
    pub bank_balances: u64,
    pub business_capital: u64,
    pub liabilities: u64,
}

impl WealthStatement {
    pub fn net_worth(&self) -> i128 {
        let assets = self.property_value as i128
            + self.vehicles_value as i128
            + self.bank_balances as i128
            + self.business_capital as i128;
        assets - self.liabilities as i128
    }
}

/// Personal expenses declared alongside the wealth statement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expenses {
    pub household: u64,
    pub utilities: u64,
    pub education: u64,
    pub travel: u64,
    pub other: u64,
}

impl Expenses {
    pub fn total(&self) -> u64 {
        [
            self.household,
            self.utilities,
            self.education,
            self.travel,
            self.other,
        ]
        .iter()
        .fold(0_u64, |acc, v| acc.saturating_add(*v))
    }
}

/// A local file queued for upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub doc_type: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSet {
    pub files: Vec<DocumentEntry>,
}

/// IRIS portal account used to file on the taxpayer's behalf.
///
/// Only the username is part of the session; the password is handed
/// straight to the submission call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FbrCredentials {
    pub iris_username: String,
    pub payment_bank: String,
}

/// Whole-return tax figures for the itemized track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaxSummary {
    pub total_income: u64,
    pub total_deductions: u64,
    pub taxable_income: u64,
    pub gross_tax: u64,
    pub credit: u64,
    pub tax_withheld: u64,
    pub net_payable: u64,
}

/// The in-progress filing, persisted after every transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSession {
    /// 1-based index into the active track's step list
    pub current_step_index: usize,
    /// Highest step the user has reached; jumps may not go past it
    pub furthest_step_index: usize,
    #[serde(default)]
    pub track: FlowTrack,
    #[serde(default)]
    pub tax_year: Option<String>,
    #[serde(default)]
    pub basic_info: Option<BasicInfo>,
    #[serde(default)]
    pub income: Option<IncomeDetails>,
    #[serde(default)]
    pub credits: Option<TaxCredits>,
    #[serde(default)]
    pub deductions: Option<Deductions>,
    #[serde(default)]
    pub wealth: Option<WealthStatement>,
    #[serde(default)]
    pub expenses: Option<Expenses>,
    #[serde(default)]
    pub documents: Option<DocumentSet>,
    #[serde(default)]
    pub credentials: Option<FbrCredentials>,
    /// Backend application id once a draft has been saved
    #[serde(default)]
    pub application_id: Option<String>,
}

impl Default for FormSession {
    fn default() -> Self {
        Self {
            current_step_index: 1,
            furthest_step_index: 1,
            track: FlowTrack::default(),
            tax_year: None,
            basic_info: None,
            income: None,
            credits: None,
            deductions: None,
            wealth: None,
            expenses: None,
            documents: None,
            credentials: None,
            application_id: None,
        }
    }
}

impl FormSession {
    pub fn tax_year_or_default(&self) -> &str {
        self.tax_year.as_deref().unwrap_or(DEFAULT_TAX_YEAR)
    }

    /// Compute the return's tax figures from the itemized sections.
    ///
    /// Credits use the average rate of tax on taxable income, capped at
    /// taxable income, and never push the payable amount below zero.
    pub fn tax_summary(&self) -> TaxSummary {
        let total_income = self.income.as_ref().map_or(0, IncomeDetails::total);
        let total_deductions = self.deductions.as_ref().map_or(0, Deductions::total);
        let taxable_income = total_income.saturating_sub(total_deductions);
        // deductions above income leave nothing to tax
        let gross_tax = compute_tax_checked(
            total_income as f64 - total_deductions as f64,
            self.tax_year_or_default(),
        );

        let credits = self.credits.clone().unwrap_or_default();
        let credit = if taxable_income == 0 {
            0
        } else {
            let eligible = credits.eligible().min(taxable_income);
            (gross_tax as f64 / taxable_income as f64 * eligible as f64).round() as u64
        };

        let net_payable = gross_tax
            .saturating_sub(credit)
            .saturating_sub(credits.tax_withheld);

        TaxSummary {
            total_income,
            total_deductions,
            taxable_income,
            gross_tax,
            credit,
            tax_withheld: credits.tax_withheld,
            net_payable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowTrack;
    use pretty_assertions::assert_eq;

    fn populated_session() -> FormSession {
        FormSession {
            current_step_index: 7,
            furthest_step_index: 8,
            track: FlowTrack::Online,
            tax_year: Some("2024-2025".to_string()),
            basic_info: Some(BasicInfo {
                full_name: "Ayesha Khan".to_string(),
                cnic: "35202-1234567-1".to_string(),
                email: "ayesha@example.pk".to_string(),
                phone: "03001234567".to_string(),
                address: "12 Mall Road, Lahore".to_string(),
                refund_bank: "Meezan Bank".to_string(),
                iban: "PK36MEZN0000001234567890".to_string(),
            }),
            income: Some(IncomeDetails {
                salary_income: 1_800_000,
                business_name: "Khan Traders".to_string(),
                business_income: 200_000,
                rental_income: 0,
                other_income: 0,
            }),
            credits: Some(TaxCredits {
                charitable_donations: 50_000,
                pension_contributions: 0,
                tax_withheld: 40_000,
            }),
            deductions: Some(Deductions {
                zakat: 0,
                education_expenses: 0,
                health_insurance: 0,
            }),
            wealth: Some(WealthStatement::default()),
            expenses: Some(Expenses::default()),
            documents: None,
            credentials: Some(FbrCredentials {
                iris_username: "3520212345671".to_string(),
                payment_bank: "HBL".to_string(),
            }),
            application_id: Some("app-1".to_string()),
        }
    }

    #[test]
    fn test_round_trip_is_deep_equal() {
        let session = populated_session();
        let json = serde_json::to_string(&session).unwrap();
        let restored: FormSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
    }

    #[test]
    fn test_credentials_serialize_without_password() {
        let json = serde_json::to_value(populated_session()).unwrap();
        let credentials = &json["credentials"];
        assert_eq!(credentials["iris_username"], "3520212345671");
        assert!(credentials.get("iris_password").is_none());
    }

    #[test]
    fn test_empty_json_object_is_rejected_without_index() {
        assert!(serde_json::from_str::<FormSession>("{}").is_err());
    }

    #[test]
    fn test_minimal_json_fills_defaults() {
        let json = r#"{"current_step_index": 2, "furthest_step_index": 2}"#;
        let session: FormSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.track, FlowTrack::Undecided);
        assert!(session.basic_info.is_none());
    }

    #[test]
    fn test_tax_summary_applies_credit_and_withholding() {
        let summary = populated_session().tax_summary();
        assert_eq!(summary.total_income, 2_000_000);
        assert_eq!(summary.taxable_income, 2_000_000);
        // 15,000 + 800,000 * 12.5%
        assert_eq!(summary.gross_tax, 115_000);
        // average rate 5.75% on 50,000
        assert_eq!(summary.credit, 2_875);
        assert_eq!(summary.net_payable, 115_000 - 2_875 - 40_000);
    }

    #[test]
    fn test_tax_summary_never_negative() {
        let mut session = populated_session();
        session.credits = Some(TaxCredits {
            charitable_donations: 0,
            pension_contributions: 0,
            tax_withheld: 10_000_000,
        });
        assert_eq!(session.tax_summary().net_payable, 0);
    }

    #[test]
    fn test_tax_summary_of_empty_session() {
        assert_eq!(FormSession::default().tax_summary(), TaxSummary::default());
    }

    #[test]
    fn test_net_worth_subtracts_liabilities() {
        let wealth = WealthStatement {
            property_value: 5_000_000,
            vehicles_value: 1_000_000,
            bank_balances: 500_000,
            business_capital: 0,
            liabilities: 7_000_000,
        };
        assert_eq!(wealth.net_worth(), -500_000);
    }
}
