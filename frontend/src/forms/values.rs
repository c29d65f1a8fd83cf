use super::descriptor::{FieldKind, FormDescriptor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Checked(bool),
}

impl FieldValue {
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(text) => text,
            FieldValue::Checked(_) => "",
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, FieldValue::Checked(true))
    }
}

/// Current values of one form, one entry per declared field, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    entries: Vec<(&'static str, FieldValue)>,
}

impl FormValues {
    pub fn for_form(descriptor: &FormDescriptor) -> Self {
        let entries = descriptor
            .fields
            .iter()
            .map(|field| (field.name, Self::blank(field.kind)))
            .collect();
        Self { entries }
    }

    fn blank(kind: FieldKind) -> FieldValue {
        match kind {
            FieldKind::Consent => FieldValue::Checked(false),
            _ => FieldValue::Text(String::new()),
        }
    }

    /// Returns false when the form has no such field.
    pub fn set(&mut self, name: &str, value: FieldValue) -> bool {
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(key, _)| *key == name).map(|(_, v)| v)
    }

    pub fn text(&self, name: &str) -> &str {
        self.get(name).map(FieldValue::as_text).unwrap_or("")
    }

    pub fn checked(&self, name: &str) -> bool {
        self.get(name).map(FieldValue::is_checked).unwrap_or(false)
    }

    pub fn clear(&mut self) {
        for (_, value) in self.entries.iter_mut() {
            *value = match value {
                FieldValue::Checked(_) => FieldValue::Checked(false),
                FieldValue::Text(_) => FieldValue::Text(String::new()),
            };
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_declaration_order_and_ignores_unknown_fields() {
        let descriptor = FormDescriptor::lead_capture();
        let mut values = FormValues::for_form(&descriptor);
        assert!(values.set("whatsapp", FieldValue::Text("11987654321".into())));
        assert!(values.set("email", FieldValue::Text("ana@escola.com".into())));
        assert!(!values.set("nickname", FieldValue::Text("x".into())));

        let keys: Vec<_> = values.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["email", "whatsapp", "consent"]);
        assert_eq!(values.text("email"), "ana@escola.com");
        assert!(!values.checked("consent"));
    }

    #[test]
    fn clear_blanks_text_and_unchecks_boxes() {
        let mut values = FormValues::for_form(&FormDescriptor::lead_capture());
        values.set("email", FieldValue::Text("a@b.co".into()));
        values.set("consent", FieldValue::Checked(true));
        values.clear();
        assert_eq!(values, FormValues::for_form(&FormDescriptor::lead_capture()));
    }
}
