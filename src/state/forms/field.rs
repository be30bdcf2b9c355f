//! Form field value objects

use super::validation::Rule;

/// Banks offered by every bank picker
pub const BANKS: &[&str] = &[
    "Allied Bank",
    "Askari Bank",
    "Bank Alfalah",
    "Bank Al-Habib",
    "Faysal Bank",
    "Habib Bank (HBL)",
    "MCB Bank",
    "Meezan Bank",
    "National Bank of Pakistan",
    "Standard Chartered",
    "United Bank (UBL)",
];

/// How a field accepts input and displays its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Masked on screen
    Secret,
    /// Whole rupees; digits and thousands separators only
    Amount,
    /// One of a fixed list, cycled with left/right
    Choice(&'static [&'static str]),
}

/// Type-safe field values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Choice(usize),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

/// Represents a single form field with its configuration and value
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub value: FieldValue,
    pub rules: Vec<Rule>,
}

impl FormField {
    fn new(name: &str, label: &str, kind: FieldKind, value: FieldValue) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            value,
            rules: Vec::new(),
        }
    }

    /// Create a new text field
    pub fn text(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Text, FieldValue::Text(String::new()))
    }

    /// Create a new text field with initial value
    pub fn text_with_value(name: &str, label: &str, value: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Text, FieldValue::Text(value.into()))
    }

    /// Create a masked text field
    pub fn secret(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Secret, FieldValue::Text(String::new()))
    }

    /// Create an amount field; zero shows as empty
    pub fn amount(name: &str, label: &str, value: u64) -> Self {
        let text = if value == 0 {
            String::new()
        } else {
            value.to_string()
        };
        Self::new(name, label, FieldKind::Amount, FieldValue::Text(text)).with_rule(Rule::Amount)
    }

    /// Create a choice field, preselecting `current` when it is one of the options
    pub fn choice(
        name: &str,
        label: &str,
        options: &'static [&'static str],
        current: Option<&str>,
    ) -> Self {
        let index = current
            .and_then(|c| options.iter().position(|o| *o == c))
            .unwrap_or(0);
        Self::new(name, label, FieldKind::Choice(options), FieldValue::Choice(index))
    }

    /// Shared bank picker
    pub fn bank(name: &str, label: &str, current: Option<&str>) -> Self {
        Self::choice(name, label, BANKS, current)
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        if !self.rules.contains(&rule) {
            self.rules.push(rule);
        }
        self
    }

    pub fn required(self) -> Self {
        self.with_rule(Rule::Required)
    }

    pub fn is_required(&self) -> bool {
        self.rules.contains(&Rule::Required)
    }

    /// Get the text value (the selected option for choice fields)
    pub fn as_text(&self) -> &str {
        match (&self.value, self.kind) {
            (FieldValue::Text(s), _) => s,
            (FieldValue::Choice(i), FieldKind::Choice(options)) => {
                options.get(*i).copied().unwrap_or("")
            }
            (FieldValue::Choice(_), _) => "",
        }
    }

    /// Parse an amount, ignoring separators; unparseable input reads as 0
    pub fn as_amount(&self) -> u64 {
        parse_amount(self.as_text()).unwrap_or(0)
    }

    /// Set the text value
    pub fn set_text(&mut self, value: impl Into<String>) {
        self.value = FieldValue::Text(value.into());
    }

    /// Push a character to the field value
    pub fn push_char(&mut self, c: char) {
        match (&mut self.value, self.kind) {
            (FieldValue::Choice(_), _) => {}
            (FieldValue::Text(s), FieldKind::Amount) => {
                if c.is_ascii_digit() || c == ',' {
                    s.push(c);
                }
            }
            (FieldValue::Text(s), _) => s.push(c),
        }
    }

    /// Remove the last character from the field value
    pub fn pop_char(&mut self) {
        if let FieldValue::Text(s) = &mut self.value {
            s.pop();
        }
    }

    /// Move a choice field's selection, wrapping around
    pub fn cycle(&mut self, forward: bool) {
        if let (FieldValue::Choice(i), FieldKind::Choice(options)) = (&mut self.value, self.kind) {
            let count = options.len();
            if count == 0 {
                return;
            }
            *i = if forward {
                (*i + 1) % count
            } else {
                (*i + count - 1) % count
            };
        }
    }

    /// Clear the field value
    pub fn clear(&mut self) {
        match &mut self.value {
            FieldValue::Text(s) => s.clear(),
            FieldValue::Choice(i) => *i = 0,
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self.kind, FieldKind::Choice(_))
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match self.kind {
            FieldKind::Secret => "•".repeat(self.as_text().chars().count()),
            FieldKind::Choice(_) => format!("◂ {} ▸", self.as_text()),
            FieldKind::Amount => match parse_amount(self.as_text()) {
                Some(v) if !self.as_text().is_empty() => format!("Rs. {}", format_rupees(v)),
                _ => self.as_text().to_string(),
            },
            FieldKind::Text => self.as_text().to_string(),
        }
    }
}

/// Parse whole rupees, accepting thousands separators
pub fn parse_amount(input: &str) -> Option<u64> {
    let digits: String = input.chars().filter(|c| *c != ',').collect();
    if digits.is_empty() {
        return Some(0);
    }
    digits.parse().ok()
}

/// Format with thousands separators, e.g. 1800000 -> "1,800,000"
pub fn format_rupees(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
