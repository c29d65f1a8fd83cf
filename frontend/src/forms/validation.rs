use super::descriptor::{FieldKind, FieldSpec, FormDescriptor};
use super::values::{FieldValue, FormValues};
use crate::utils::{digits_only, is_valid_email};

pub const REQUIRED_MESSAGE: &str = "Este campo é obrigatório";
pub const EMAIL_MESSAGE: &str = "Digite um e-mail válido";
pub const PHONE_MESSAGE: &str = "Digite um telefone válido (10-11 dígitos)";
pub const CONSENT_MESSAGE: &str = "Você deve concordar para continuar";

pub const PHONE_MIN_DIGITS: usize = 10;
pub const PHONE_MAX_DIGITS: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOutcome {
    pub valid: bool,
    pub message: Option<String>,
}

impl FieldOutcome {
    fn ok() -> Self {
        Self { valid: true, message: None }
    }

    fn fail(message: &str) -> Self {
        Self {
            valid: false,
            message: Some(message.to_string()),
        }
    }
}

/// First failing rule wins: required, email, phone, consent.
pub fn validate_field(spec: &FieldSpec, value: &FieldValue) -> FieldOutcome {
    if spec.kind == FieldKind::Consent {
        return if spec.required && !value.is_checked() {
            FieldOutcome::fail(CONSENT_MESSAGE)
        } else {
            FieldOutcome::ok()
        };
    }

    let text = value.as_text().trim();
    if spec.required && text.is_empty() {
        return FieldOutcome::fail(REQUIRED_MESSAGE);
    }
    if text.is_empty() {
        return FieldOutcome::ok();
    }
    match spec.kind {
        FieldKind::Email if !is_valid_email(text) => FieldOutcome::fail(EMAIL_MESSAGE),
        FieldKind::Phone => {
            let digits = digits_only(text).len();
            if (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits) {
                FieldOutcome::ok()
            } else {
                FieldOutcome::fail(PHONE_MESSAGE)
            }
        }
        _ => FieldOutcome::ok(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Required,
    Email,
    Phone,
    Checkbox,
}

impl From<FieldKind> for RuleKind {
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Email => RuleKind::Email,
            FieldKind::Phone => RuleKind::Phone,
            FieldKind::Consent => RuleKind::Checkbox,
            FieldKind::Text | FieldKind::Select => RuleKind::Required,
        }
    }
}

/// Validation state of one field, with the error currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidationRule {
    pub field: &'static str,
    pub kind: RuleKind,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormValidation {
    specs: Vec<FieldSpec>,
    rules: Vec<FieldValidationRule>,
}

impl FormValidation {
    /// One rule per required field; optional fields are never annotated.
    pub fn for_form(descriptor: &FormDescriptor) -> Self {
        let specs: Vec<FieldSpec> = descriptor.fields.iter().filter(|f| f.required).cloned().collect();
        let rules = specs
            .iter()
            .map(|spec| FieldValidationRule {
                field: spec.name,
                kind: spec.kind.into(),
                error: None,
            })
            .collect();
        Self { specs, rules }
    }

    /// Validates one field (on blur) and updates its annotation.
    /// Fields without a rule are always valid.
    pub fn on_blur(&mut self, name: &str, values: &FormValues) -> FieldOutcome {
        let Some(index) = self.rules.iter().position(|r| r.field == name) else {
            return FieldOutcome::ok();
        };
        let outcome = match values.get(name) {
            Some(value) => validate_field(&self.specs[index], value),
            None => FieldOutcome::ok(),
        };
        self.rules[index].error = outcome.message.clone();
        outcome
    }

    /// Typing into a field hides its error until the next blur or submit.
    pub fn on_input(&mut self, name: &str) {
        if let Some(rule) = self.rules.iter_mut().find(|r| r.field == name) {
            rule.error = None;
        }
    }

    /// Evaluates every rule so all errors are shown at once.
    pub fn validate_all(&mut self, values: &FormValues) -> bool {
        let mut valid = true;
        for index in 0..self.rules.len() {
            let name = self.rules[index].field;
            if !self.on_blur(name, values).valid {
                valid = false;
            }
        }
        valid
    }

    pub fn clear(&mut self) {
        for rule in self.rules.iter_mut() {
            rule.error = None;
        }
    }

    pub fn error_for(&self, name: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| r.field == name)
            .and_then(|r| r.error.as_deref())
    }

    pub fn error_count(&self) -> usize {
        self.rules.iter().filter(|r| r.error.is_some()).count()
    }

    #[cfg(test)]
    pub fn rules(&self) -> &[FieldValidationRule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(kind: FieldKind) -> FieldSpec {
        FormDescriptor::partnership()
            .fields
            .into_iter()
            .find(|f| f.kind == kind)
            .unwrap()
    }

    fn text(value: &str) -> FieldValue {
        FieldValue::Text(value.to_string())
    }

    #[test]
    fn required_field_rejects_blank_input() {
        let name = spec(FieldKind::Text);
        let outcome = validate_field(&name, &text("   "));
        assert!(!outcome.valid);
        assert_eq!(outcome.message.as_deref(), Some(REQUIRED_MESSAGE));
        assert!(validate_field(&name, &text("Ana")).valid);
    }

    #[test]
    fn email_field_follows_pattern() {
        let email = spec(FieldKind::Email);
        for bad in ["ana", "ana@escola", "ana@ escola.com", "a@b.c d"] {
            let outcome = validate_field(&email, &text(bad));
            assert_eq!(outcome.message.as_deref(), Some(EMAIL_MESSAGE), "{bad}");
        }
        for good in ["ana@escola.com", "x@y.z", "  ana@escola.com.br  "] {
            assert!(validate_field(&email, &text(good)).valid, "{good}");
        }
    }

    #[test]
    fn empty_required_email_reports_required_not_format() {
        let outcome = validate_field(&spec(FieldKind::Email), &text(""));
        assert_eq!(outcome.message.as_deref(), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn phone_digit_count_boundaries() {
        let phone = spec(FieldKind::Phone);
        let cases = [
            ("119876543", false),
            ("1198765432", true),
            ("11987654321", true),
            ("119876543210", false),
            ("(11) 98765-4321", true),
        ];
        for (input, expected) in cases {
            let outcome = validate_field(&phone, &text(input));
            assert_eq!(outcome.valid, expected, "{input}");
            if !expected {
                assert_eq!(outcome.message.as_deref(), Some(PHONE_MESSAGE));
            }
        }
    }

    #[test]
    fn consent_must_be_checked() {
        let consent = spec(FieldKind::Consent);
        let outcome = validate_field(&consent, &FieldValue::Checked(false));
        assert_eq!(outcome.message.as_deref(), Some(CONSENT_MESSAGE));
        assert!(validate_field(&consent, &FieldValue::Checked(true)).valid);
    }

    #[test]
    fn optional_field_is_not_annotated() {
        let descriptor = FormDescriptor::partnership();
        let validation = FormValidation::for_form(&descriptor);
        assert!(validation.rules().iter().all(|r| r.field != "message"));
    }

    #[test]
    fn validate_all_is_exhaustive() {
        let descriptor = FormDescriptor::lead_capture();
        let mut values = FormValues::for_form(&descriptor);
        values.set("email", text("not-an-email"));
        let mut validation = FormValidation::for_form(&descriptor);

        assert!(!validation.validate_all(&values));
        assert_eq!(validation.error_for("email"), Some(EMAIL_MESSAGE));
        assert_eq!(validation.error_for("whatsapp"), Some(REQUIRED_MESSAGE));
        assert_eq!(validation.error_for("consent"), Some(CONSENT_MESSAGE));
        assert_eq!(validation.error_count(), 3);
    }

    #[test]
    fn input_clears_error_until_next_blur() {
        let descriptor = FormDescriptor::lead_capture();
        let mut values = FormValues::for_form(&descriptor);
        let mut validation = FormValidation::for_form(&descriptor);
        validation.on_blur("email", &values);
        assert!(validation.error_for("email").is_some());

        values.set("email", text("still wrong"));
        validation.on_input("email");
        assert_eq!(validation.error_for("email"), None);

        validation.on_blur("email", &values);
        assert_eq!(validation.error_for("email"), Some(EMAIL_MESSAGE));
    }
}
