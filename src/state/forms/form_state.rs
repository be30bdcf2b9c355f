//! Form trait and the non-wizard forms

use super::field::FormField;
use super::validation::{validate_fields, Rule, ValidationResult};
use crate::tax::{available_tax_years, SalaryBreakdown};

/// Trait for common form operations
pub trait Form {
    fn field_count(&self) -> usize;
    fn active_field(&self) -> usize;
    fn set_active_field(&mut self, index: usize);
    fn next_field(&mut self) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        let current = self.active_field();
        self.set_active_field((current + 1) % count);
    }
    fn prev_field(&mut self) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        let current = self.active_field();
        if current == 0 {
            self.set_active_field(count - 1);
        } else {
            self.set_active_field(current - 1);
        }
    }
    fn get_active_field_mut(&mut self) -> Option<&mut FormField>;
    fn get_field(&self, index: usize) -> Option<&FormField>;
}

// Login Form
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: FormField,
    pub password: FormField,
    pub active_field_index: usize,
}

impl LoginForm {
    pub fn new() -> Self {
        Self {
            email: FormField::text("email", "Email")
                .required()
                .with_rule(Rule::Email),
            password: FormField::secret("password", "Password").required(),
            active_field_index: 0,
        }
    }

    /// Start with a remembered email and the cursor on the password
    pub fn with_email(email: &str) -> Self {
        let mut form = Self::new();
        form.email.set_text(email);
        form.active_field_index = 1;
        form
    }

    pub fn validate(&self) -> ValidationResult {
        validate_fields(&[self.email.clone(), self.password.clone()])
    }
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new()
    }
}

impl Form for LoginForm {
    fn field_count(&self) -> usize {
        2
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index.min(1);
    }
    fn get_active_field_mut(&mut self) -> Option<&mut FormField> {
        match self.active_field_index {
            0 => Some(&mut self.email),
            _ => Some(&mut self.password),
        }
    }
    fn get_field(&self, index: usize) -> Option<&FormField> {
        match index {
            0 => Some(&self.email),
            1 => Some(&self.password),
            _ => None,
        }
    }
}

// Salary Tax Calculator Form
#[derive(Debug, Clone)]
pub struct CalculatorForm {
    pub monthly_salary: FormField,
    pub tax_year: FormField,
    pub active_field_index: usize,
}

impl CalculatorForm {
    pub fn new(tax_year: &str) -> Self {
        Self {
            monthly_salary: FormField::amount("monthly_salary", "Monthly Salary", 0),
            tax_year: FormField::choice(
                "tax_year",
                "Tax Year",
                available_tax_years(),
                Some(tax_year),
            ),
            active_field_index: 0,
        }
    }

    /// Live result; `None` until a salary is entered
    pub fn breakdown(&self) -> Option<SalaryBreakdown> {
        if self.monthly_salary.as_text().trim().is_empty() {
            return None;
        }
        Some(SalaryBreakdown::from_monthly(
            self.monthly_salary.as_amount(),
            self.tax_year.as_text(),
        ))
    }
}

impl Form for CalculatorForm {
    fn field_count(&self) -> usize {
        2
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index.min(1);
    }
    fn get_active_field_mut(&mut self) -> Option<&mut FormField> {
        match self.active_field_index {
            0 => Some(&mut self.monthly_salary),
            _ => Some(&mut self.tax_year),
        }
    }
    fn get_field(&self, index: usize) -> Option<&FormField> {
        match index {
            0 => Some(&self.monthly_salary),
            1 => Some(&self.tax_year),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_field_wraps() {
        let mut form = LoginForm::new();
        form.next_field();
        assert_eq!(form.active_field(), 1);
        form.next_field();
        assert_eq!(form.active_field(), 0);
    }

    #[test]
    fn test_prev_field_wraps() {
        let mut form = LoginForm::new();
        form.prev_field();
        assert_eq!(form.active_field(), 1);
    }

    #[test]
    fn test_login_requires_valid_email() {
        let mut form = LoginForm::new();
        form.email.set_text("not-an-email");
        form.password.set_text("secret");
        let result = form.validate();
        assert!(!result.valid);
        assert!(result.field_errors.contains_key("email"));
        assert!(!result.field_errors.contains_key("password"));
    }

    #[test]
    fn test_login_with_email_focuses_password() {
        let form = LoginForm::with_email("user@example.pk");
        assert_eq!(form.active_field(), 1);
        assert_eq!(form.email.as_text(), "user@example.pk");
    }

    #[test]
    fn test_calculator_has_no_result_until_salary_entered() {
        let form = CalculatorForm::new("2024-2025");
        assert!(form.breakdown().is_none());
    }

    #[test]
    fn test_calculator_live_result() {
        let mut form = CalculatorForm::new("2024-2025");
        for c in "150,000".chars() {
            form.get_active_field_mut().unwrap().push_char(c);
        }
        let breakdown = form.breakdown().unwrap();
        assert_eq!(breakdown.monthly_tax, 7_500);
        assert_eq!(breakdown.monthly_take_home, 142_500);
    }

    #[test]
    fn test_calculator_year_cycles() {
        let mut form = CalculatorForm::new("2025-2026");
        form.next_field();
        form.get_active_field_mut().unwrap().cycle(true);
        assert_eq!(form.tax_year.as_text(), "2022-2023");
    }
}
