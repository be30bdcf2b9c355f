//! One parameterised form for every filing step
//!
//! Fields are built from the current session so returning to a step
//! shows what was entered before. `submit` validates and, only when the
//! form is valid, produces the fragment for the orchestrator.

use super::field::FormField;
use super::form_state::Form;
use super::validation::{validate_fields, Rule, ValidationMode, ValidationResult};
use crate::flow::{
    BasicInfo, Deductions, DocumentEntry, DocumentSet, Expenses, FbrCredentials, FilingMethod,
    FlowTrack, FormSession, IncomeDetails, StepFragment, StepId, TaxCredits, WealthStatement,
};
use crate::tax::available_tax_years;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// (field name, label) of each uploadable document; the first is mandatory
const DOCUMENT_SLOTS: &[(&str, &str)] = &[
    ("cnic_copy", "CNIC copy"),
    ("salary_certificate", "Salary certificate"),
    ("bank_statement", "Bank statement"),
    ("other_document", "Other document"),
];

#[derive(Debug, Clone)]
pub struct StepForm {
    pub step: StepId,
    pub fields: Vec<FormField>,
    pub active_field_index: usize,
    pub errors: BTreeMap<String, String>,
    /// Read-only: the filing method is fixed once chosen
    pub locked: bool,
}

impl StepForm {
    /// Build the form for `step`, prefilled from `session`
    pub fn for_step(step: StepId, session: &FormSession, default_tax_year: &str) -> Self {
        let fields = match step {
            StepId::TaxYear => vec![FormField::choice(
                "tax_year",
                "Tax Year",
                available_tax_years(),
                Some(session.tax_year.as_deref().unwrap_or(default_tax_year)),
            )],
            StepId::FilingMethod => {
                let current = session.track.method().map(|m| m.label());
                vec![FormField::choice(
                    "method",
                    "How do you want to file?",
                    FilingMethod::LABELS,
                    current,
                )]
            }
            StepId::PersonalInfo => {
                personal_info_fields(&session.basic_info.clone().unwrap_or_default())
            }
            StepId::Income => {
                let income = session.income.clone().unwrap_or_default();
                vec![
                    FormField::amount("salary_income", "Salary Income", income.salary_income),
                    FormField::text_with_value(
                        "business_name",
                        "Business Name",
                        income.business_name,
                    ),
                    FormField::amount(
                        "business_income",
                        "Business Income",
                        income.business_income,
                    ),
                    FormField::amount("rental_income", "Rental Income", income.rental_income),
                    FormField::amount("other_income", "Other Income", income.other_income),
                ]
            }
            StepId::TaxCredits => {
                let credits = session.credits.clone().unwrap_or_default();
                vec![
                    FormField::amount(
                        "charitable_donations",
                        "Charitable Donations",
                        credits.charitable_donations,
                    ),
                    FormField::amount(
                        "pension_contributions",
                        "Pension Fund Contributions",
                        credits.pension_contributions,
                    ),
                    FormField::amount(
                        "tax_withheld",
                        "Tax Already Deducted",
                        credits.tax_withheld,
                    ),
                ]
            }
            StepId::Deductions => {
                let deductions = session.deductions.clone().unwrap_or_default();
                vec![
                    FormField::amount("zakat", "Zakat Paid", deductions.zakat),
                    FormField::amount(
                        "education_expenses",
                        "Children's Education",
                        deductions.education_expenses,
                    ),
                    FormField::amount(
                        "health_insurance",
                        "Health Insurance",
                        deductions.health_insurance,
                    ),
                ]
            }
            StepId::WealthStatement => {
                let declared = session.wealth.is_some();
                let wealth = session.wealth.clone().unwrap_or_default();
                // a declared zero balance must stay visible, it is a required entry
                let mut bank_balances =
                    FormField::amount("bank_balances", "Bank Balances", wealth.bank_balances)
                        .required();
                if declared {
                    bank_balances.set_text(wealth.bank_balances.to_string());
                }
                vec![
                    FormField::amount("property_value", "Property", wealth.property_value),
                    FormField::amount("vehicles_value", "Vehicles", wealth.vehicles_value),
                    bank_balances,
                    FormField::amount(
                        "business_capital",
                        "Business Capital",
                        wealth.business_capital,
                    ),
                    FormField::amount("liabilities", "Liabilities", wealth.liabilities),
                ]
            }
            StepId::Expenses => {
                let expenses = session.expenses.clone().unwrap_or_default();
                vec![
                    FormField::amount("household", "Household", expenses.household),
                    FormField::amount("utilities", "Utilities", expenses.utilities),
                    FormField::amount("education", "Education", expenses.education),
                    FormField::amount("travel", "Travel", expenses.travel),
                    FormField::amount("other", "Other", expenses.other),
                ]
            }
            StepId::UploadDocuments => {
                let documents = session.documents.clone().unwrap_or_default();
                DOCUMENT_SLOTS
                    .iter()
                    .enumerate()
                    .map(|(i, (name, label))| {
                        let existing = documents
                            .files
                            .iter()
                            .find(|d| d.doc_type == *label)
                            .map(|d| d.path.to_string_lossy().to_string())
                            .unwrap_or_default();
                        let field = FormField::text_with_value(
                            name,
                            &format!("{label} (file path)"),
                            existing,
                        )
                        .with_rule(Rule::FileExists);
                        if i == 0 {
                            field.required()
                        } else {
                            field
                        }
                    })
                    .collect()
            }
            StepId::Review => Vec::new(),
            StepId::FbrSubmission => {
                let credentials = session.credentials.clone().unwrap_or_default();
                let username = if credentials.iris_username.is_empty() {
                    session
                        .basic_info
                        .as_ref()
                        .map(|b| b.cnic.replace('-', ""))
                        .unwrap_or_default()
                } else {
                    credentials.iris_username
                };
                vec![
                    FormField::text_with_value("iris_username", "IRIS Username (CNIC)", username)
                        .required()
                        .with_rule(Rule::Cnic),
                    FormField::secret("iris_password", "IRIS Password").required(),
                    FormField::bank(
                        "payment_bank",
                        "Bank for Tax Payment",
                        Some(credentials.payment_bank.as_str()),
                    ),
                ]
            }
        };

        Self {
            step,
            fields,
            active_field_index: 0,
            errors: BTreeMap::new(),
            locked: step == StepId::FilingMethod && session.track != FlowTrack::Undecided,
        }
    }

    /// Fill personal info from a stored profile when the step is still blank
    pub fn prefill_basic_info(&mut self, info: &BasicInfo) {
        if self.step != StepId::PersonalInfo {
            return;
        }
        let prefilled = personal_info_fields(info);
        for (field, value) in self.fields.iter_mut().zip(prefilled) {
            if !field.is_choice() && field.as_text().is_empty() {
                *field = value;
            }
        }
    }

    /// Validate without touching stored errors
    pub fn validate(&self, mode: ValidationMode) -> ValidationResult {
        if mode == ValidationMode::Lenient && self.step.validation_relaxable() {
            tracing::debug!("Skipping validation for {:?} in lenient mode", self.step);
            return ValidationResult::ok();
        }

        let mut result = validate_fields(&self.fields);
        if self.step == StepId::Income {
            if self.amount("business_income") > 0 && self.text("business_name").trim().is_empty() {
                result.add("business_name", "Business name is required for business income");
            }
            let total = ["salary_income", "business_income", "rental_income", "other_income"]
                .iter()
                .map(|n| self.amount(n))
                .fold(0_u64, u64::saturating_add);
            if total == 0 {
                result.add("salary_income", "Enter at least one source of income");
            }
        }
        result
    }

    /// Validate, record field errors, and return the fragment when valid
    pub fn submit(&mut self, mode: ValidationMode) -> Option<StepFragment> {
        let result = self.validate(mode);
        self.errors = result.field_errors;
        if !result.valid {
            // jump to the first invalid field
            if let Some(index) = self
                .fields
                .iter()
                .position(|f| self.errors.contains_key(&f.name))
            {
                self.active_field_index = index;
            }
            return None;
        }
        Some(self.fragment())
    }

    /// Build the fragment from current field values
    pub fn fragment(&self) -> StepFragment {
        match self.step {
            StepId::TaxYear => StepFragment::TaxYear(self.text("tax_year")),
            StepId::FilingMethod => StepFragment::Method(
                FilingMethod::from_label(&self.text("method")).unwrap_or(FilingMethod::Online),
            ),
            StepId::PersonalInfo => StepFragment::BasicInfo(BasicInfo {
                full_name: self.text("full_name").trim().to_string(),
                cnic: self.text("cnic").trim().to_string(),
                email: self.text("email").trim().to_string(),
                phone: self.text("phone").trim().to_string(),
                address: self.text("address").trim().to_string(),
                refund_bank: self.text("refund_bank"),
                iban: self.text("iban").trim().to_string(),
            }),
            StepId::Income => StepFragment::Income(IncomeDetails {
                salary_income: self.amount("salary_income"),
                business_name: self.text("business_name").trim().to_string(),
                business_income: self.amount("business_income"),
                rental_income: self.amount("rental_income"),
                other_income: self.amount("other_income"),
            }),
            StepId::TaxCredits => StepFragment::Credits(TaxCredits {
                charitable_donations: self.amount("charitable_donations"),
                pension_contributions: self.amount("pension_contributions"),
                tax_withheld: self.amount("tax_withheld"),
            }),
            StepId::Deductions => StepFragment::Deductions(Deductions {
                zakat: self.amount("zakat"),
                education_expenses: self.amount("education_expenses"),
                health_insurance: self.amount("health_insurance"),
            }),
            StepId::WealthStatement => StepFragment::Wealth(WealthStatement {
                property_value: self.amount("property_value"),
                vehicles_value: self.amount("vehicles_value"),
                bank_balances: self.amount("bank_balances"),
                business_capital: self.amount("business_capital"),
                liabilities: self.amount("liabilities"),
            }),
            StepId::Expenses => StepFragment::Expenses(Expenses {
                household: self.amount("household"),
                utilities: self.amount("utilities"),
                education: self.amount("education"),
                travel: self.amount("travel"),
                other: self.amount("other"),
            }),
            StepId::UploadDocuments => StepFragment::Documents(DocumentSet {
                files: DOCUMENT_SLOTS
                    .iter()
                    .filter_map(|(name, label)| {
                        let path = self.text(name).trim().to_string();
                        (!path.is_empty()).then(|| DocumentEntry {
                            doc_type: label.to_string(),
                            path: PathBuf::from(path),
                        })
                    })
                    .collect(),
            }),
            StepId::Review => StepFragment::Review,
            StepId::FbrSubmission => StepFragment::Credentials(FbrCredentials {
                iris_username: self.text("iris_username").trim().replace('-', ""),
                payment_bank: self.text("payment_bank"),
            }),
        }
    }

    /// The IRIS password typed on the submission step. It is kept out of
    /// the fragment so it never reaches session storage.
    pub fn iris_password(&self) -> Option<String> {
        (self.step == StepId::FbrSubmission).then(|| self.text("iris_password"))
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn error_for(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    fn text(&self, name: &str) -> String {
        self.field(name)
            .map(|f| f.as_text().to_string())
            .unwrap_or_default()
    }

    fn amount(&self, name: &str) -> u64 {
        self.field(name).map_or(0, FormField::as_amount)
    }
}

fn personal_info_fields(info: &BasicInfo) -> Vec<FormField> {
    vec![
        FormField::text_with_value("full_name", "Full Name", info.full_name.clone()).required(),
        FormField::text_with_value("cnic", "CNIC", info.cnic.clone())
            .required()
            .with_rule(Rule::Cnic),
        FormField::text_with_value("email", "Email", info.email.clone())
            .required()
            .with_rule(Rule::Email),
        FormField::text_with_value("phone", "Mobile Number", info.phone.clone())
            .required()
            .with_rule(Rule::Phone),
        FormField::text_with_value("address", "Address", info.address.clone()),
        FormField::bank("refund_bank", "Refund Bank", Some(info.refund_bank.as_str())),
        FormField::text_with_value("iban", "Refund IBAN", info.iban.clone()).with_rule(Rule::Iban),
    ]
}

impl Form for StepForm {
    fn field_count(&self) -> usize {
        self.fields.len()
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index.min(self.fields.len().saturating_sub(1));
    }
    fn get_active_field_mut(&mut self) -> Option<&mut FormField> {
        if self.locked {
            return None;
        }
        self.fields.get_mut(self.active_field_index)
    }
    fn get_field(&self, index: usize) -> Option<&FormField> {
        self.fields.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::field::BANKS;
    use pretty_assertions::assert_eq;

    fn form(step: StepId) -> StepForm {
        StepForm::for_step(step, &FormSession::default(), "2024-2025")
    }

    fn type_into(form: &mut StepForm, name: &str, value: &str) {
        let field = form.field_mut(name).unwrap();
        field.clear();
        for c in value.chars() {
            field.push_char(c);
        }
    }

    #[test]
    fn test_tax_year_defaults_to_configured_year() {
        let form = StepForm::for_step(StepId::TaxYear, &FormSession::default(), "2023-2024");
        assert_eq!(
            form.fragment(),
            StepFragment::TaxYear("2023-2024".to_string())
        );
    }

    #[test]
    fn test_method_choice_maps_to_fragment() {
        let mut form = form(StepId::FilingMethod);
        assert_eq!(form.fragment(), StepFragment::Method(FilingMethod::Online));
        form.get_active_field_mut().unwrap().cycle(true);
        assert_eq!(
            form.fragment(),
            StepFragment::Method(FilingMethod::DocumentUpload)
        );
    }

    #[test]
    fn test_method_is_locked_once_chosen() {
        let session = FormSession {
            track: FlowTrack::DocumentUpload,
            ..Default::default()
        };
        let mut form = StepForm::for_step(StepId::FilingMethod, &session, "2024-2025");
        assert!(form.locked);
        assert!(form.get_active_field_mut().is_none());
        assert_eq!(
            form.fragment(),
            StepFragment::Method(FilingMethod::DocumentUpload)
        );
    }

    #[test]
    fn test_personal_info_requires_fields() {
        let mut form = form(StepId::PersonalInfo);
        assert!(form.submit(ValidationMode::Strict).is_none());
        assert!(form.error_for("full_name").is_some());
        assert!(form.error_for("email").is_some());
        assert!(form.error_for("iban").is_none());
        assert_eq!(form.active_field_index, 0);
    }

    #[test]
    fn test_personal_info_valid_submission() {
        let mut form = form(StepId::PersonalInfo);
        type_into(&mut form, "full_name", "Sana Mirza");
        type_into(&mut form, "cnic", "42101-1234567-8");
        type_into(&mut form, "email", "sana@example.pk");
        type_into(&mut form, "phone", "03211234567");
        type_into(&mut form, "iban", "PK00AAAA0000000000000000");

        let fragment = form.submit(ValidationMode::Strict).unwrap();
        let StepFragment::BasicInfo(info) = fragment else {
            panic!("expected basic info");
        };
        assert_eq!(info.full_name, "Sana Mirza");
        assert_eq!(info.refund_bank, BANKS[0]);
        assert!(form.errors.is_empty());
    }

    #[test]
    fn test_bad_iban_blocks_continue() {
        let mut form = form(StepId::PersonalInfo);
        type_into(&mut form, "full_name", "Sana Mirza");
        type_into(&mut form, "cnic", "4210112345678");
        type_into(&mut form, "email", "sana@example.pk");
        type_into(&mut form, "phone", "03211234567");
        type_into(&mut form, "iban", "PK0AAAA00000000000000000");
        assert!(form.submit(ValidationMode::Lenient).is_none());
        assert!(form.error_for("iban").is_some());
        assert_eq!(form.active_field_index, 6);
    }

    #[test]
    fn test_income_strict_requires_business_name() {
        let mut form = form(StepId::Income);
        type_into(&mut form, "business_income", "250,000");
        assert!(form.submit(ValidationMode::Strict).is_none());
        assert!(form.error_for("business_name").is_some());
    }

    #[test]
    fn test_income_strict_requires_some_income() {
        let form = form(StepId::Income);
        let result = form.validate(ValidationMode::Strict);
        assert!(result.field_errors.contains_key("salary_income"));
    }

    #[test]
    fn test_income_lenient_skips_validation() {
        let mut form = form(StepId::Income);
        type_into(&mut form, "business_income", "250000");
        let fragment = form.submit(ValidationMode::Lenient).unwrap();
        assert_eq!(
            fragment,
            StepFragment::Income(IncomeDetails {
                business_income: 250_000,
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_wealth_strict_requires_bank_balance() {
        let mut form = form(StepId::WealthStatement);
        assert!(form.submit(ValidationMode::Strict).is_none());
        assert!(form.error_for("bank_balances").is_some());

        type_into(&mut form, "bank_balances", "0");
        assert!(form.submit(ValidationMode::Strict).is_some());
    }

    #[test]
    fn test_wealth_lenient_accepts_blank_statement() {
        let mut form = form(StepId::WealthStatement);
        assert_eq!(
            form.submit(ValidationMode::Lenient),
            Some(StepFragment::Wealth(WealthStatement::default()))
        );
    }

    #[test]
    fn test_declared_zero_balance_is_shown() {
        let session = FormSession {
            wealth: Some(WealthStatement::default()),
            ..Default::default()
        };
        let form = StepForm::for_step(StepId::WealthStatement, &session, "2024-2025");
        assert_eq!(form.field("bank_balances").unwrap().as_text(), "0");
    }

    #[test]
    fn test_lenient_does_not_relax_other_steps() {
        let form = form(StepId::FbrSubmission);
        assert!(!form.validate(ValidationMode::Lenient).valid);
    }

    #[test]
    fn test_fields_prefill_from_session() {
        let session = FormSession {
            deductions: Some(Deductions {
                zakat: 12_000,
                ..Default::default()
            }),
            ..Default::default()
        };
        let form = StepForm::for_step(StepId::Deductions, &session, "2024-2025");
        assert_eq!(form.field("zakat").unwrap().as_amount(), 12_000);
        assert_eq!(form.field("health_insurance").unwrap().as_text(), "");
    }

    #[test]
    fn test_upload_requires_existing_cnic_copy() {
        let mut form = form(StepId::UploadDocuments);
        assert!(form.submit(ValidationMode::Strict).is_none());
        assert!(form.error_for("cnic_copy").is_some());

        let file = tempfile::NamedTempFile::new().unwrap();
        type_into(&mut form, "cnic_copy", &file.path().to_string_lossy());
        let Some(StepFragment::Documents(docs)) = form.submit(ValidationMode::Strict) else {
            panic!("expected documents");
        };
        assert_eq!(docs.files.len(), 1);
        assert_eq!(docs.files[0].doc_type, "CNIC copy");
    }

    #[test]
    fn test_submission_username_defaults_to_cnic_digits() {
        let session = FormSession {
            basic_info: Some(BasicInfo {
                cnic: "35202-1234567-1".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let form = StepForm::for_step(StepId::FbrSubmission, &session, "2024-2025");
        assert_eq!(
            form.field("iris_username").unwrap().as_text(),
            "3520212345671"
        );
    }

    #[test]
    fn test_password_stays_out_of_the_fragment() {
        let mut submission = form(StepId::FbrSubmission);
        type_into(&mut submission, "iris_username", "35202-1234567-1");
        type_into(&mut submission, "iris_password", "iris-secret");

        assert_eq!(submission.iris_password().as_deref(), Some("iris-secret"));
        let fragment = submission.submit(ValidationMode::Strict).unwrap();
        let StepFragment::Credentials(credentials) = fragment else {
            panic!("expected credentials");
        };
        assert_eq!(credentials.iris_username, "3520212345671");
        assert_eq!(form(StepId::Income).iris_password(), None);
    }

    #[test]
    fn test_prefill_keeps_typed_values() {
        let mut form = form(StepId::PersonalInfo);
        type_into(&mut form, "full_name", "Typed Name");
        form.prefill_basic_info(&BasicInfo {
            full_name: "Profile Name".to_string(),
            email: "profile@example.pk".to_string(),
            ..Default::default()
        });
        assert_eq!(form.field("full_name").unwrap().as_text(), "Typed Name");
        assert_eq!(
            form.field("email").unwrap().as_text(),
            "profile@example.pk"
        );
    }

    #[test]
    fn test_review_has_no_fields() {
        let mut form = form(StepId::Review);
        assert_eq!(form.field_count(), 0);
        form.next_field();
        assert!(form.get_active_field_mut().is_none());
        assert_eq!(form.submit(ValidationMode::Strict), Some(StepFragment::Review));
    }
}
