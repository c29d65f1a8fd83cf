use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormCategory {
    Main,
    Modal,
    LeadCapture,
}

impl FormCategory {
    pub fn form_type(&self) -> &'static str {
        match self {
            FormCategory::Main => "main_form",
            FormCategory::Modal => "modal_form",
            FormCategory::LeadCapture => "lead_capture",
        }
    }

    /// UI surface the form lives on, reported with every lead.
    pub fn source(&self) -> &'static str {
        match self {
            FormCategory::Main => "landing_page_section",
            FormCategory::Modal => "modal_popup",
            FormCategory::LeadCapture => "floating_buttons",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    Select,
    Consent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub placeholder: &'static str,
    /// `(value, label)` pairs for select fields.
    pub options: Vec<(&'static str, &'static str)>,
}

impl FieldSpec {
    fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            placeholder: "",
            options: Vec::new(),
        }
    }

    fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }

    fn options(mut self, options: &[(&'static str, &'static str)]) -> Self {
        self.options = options.to_vec();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormDescriptor {
    pub identifier: &'static str,
    pub category: FormCategory,
    pub modal_id: Option<&'static str>,
    pub fields: Vec<FieldSpec>,
}

impl FormDescriptor {
    pub fn surface(&self) -> &'static str {
        self.category.source()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Landing page section form, `#partnership-form`.
    pub fn partnership() -> Self {
        Self {
            identifier: "partnership-form",
            category: FormCategory::Main,
            modal_id: None,
            fields: vec![
                FieldSpec::new("name", "Nome completo", FieldKind::Text).placeholder("Seu nome"),
                FieldSpec::new("email", "E-mail", FieldKind::Email).placeholder("seu@email.com"),
                FieldSpec::new("phone", "WhatsApp", FieldKind::Phone).placeholder("(00) 00000-0000"),
                FieldSpec::new("city", "Cidade", FieldKind::Text).placeholder("Sua cidade"),
                FieldSpec::new("partnership-interest", "Tipo de parceria", FieldKind::Select).options(&[
                    ("small", "Pequena (20-50 alunos)"),
                    ("medium", "Média (50-150 alunos)"),
                    ("large", "Grande (150+ alunos)"),
                ]),
                FieldSpec::new("message", "Mensagem", FieldKind::Text)
                    .optional()
                    .placeholder("Conte um pouco sobre você"),
                FieldSpec::new("terms", "Aceito os termos e a política de privacidade", FieldKind::Consent),
            ],
        }
    }

    /// Short form inside the partnership modal, `#partner-form`.
    pub fn partner_modal() -> Self {
        Self {
            identifier: "partner-form",
            category: FormCategory::Modal,
            modal_id: Some("partnership-form-modal"),
            fields: vec![
                FieldSpec::new("name", "Nome", FieldKind::Text).placeholder("Seu nome"),
                FieldSpec::new("email", "E-mail", FieldKind::Email).placeholder("seu@email.com"),
                FieldSpec::new("phone", "WhatsApp", FieldKind::Phone).placeholder("(00) 00000-0000"),
                FieldSpec::new("experience", "Experiência com educação", FieldKind::Select).options(&[
                    ("none", "Nenhuma"),
                    ("some", "Alguma experiência"),
                    ("experienced", "Já atuo na área"),
                ]),
                FieldSpec::new("privacyConsent", "Concordo com a política de privacidade", FieldKind::Consent),
            ],
        }
    }

    /// Floating-button lead capture, `#leadForm`.
    pub fn lead_capture() -> Self {
        Self {
            identifier: "leadForm",
            category: FormCategory::LeadCapture,
            modal_id: Some("leadCaptureModal"),
            fields: vec![
                FieldSpec::new("email", "E-mail", FieldKind::Email).placeholder("seu@email.com"),
                FieldSpec::new("whatsapp", "WhatsApp", FieldKind::Phone).placeholder("(00) 00000-0000"),
                FieldSpec::new("consent", "Concordo em receber conteúdos da Educa+", FieldKind::Consent),
            ],
        }
    }

    pub fn standard() -> Vec<FormDescriptor> {
        vec![Self::partnership(), Self::partner_modal(), Self::lead_capture()]
    }
}

/// Forms found on the page, built once at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormRegistry {
    forms: Vec<FormDescriptor>,
}

impl FormRegistry {
    /// Registers the standard descriptors whose identifier is present.
    pub fn discover<'a, I>(present: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: Vec<&str> = present.into_iter().collect();
        let forms: Vec<FormDescriptor> = FormDescriptor::standard()
            .into_iter()
            .filter(|descriptor| present.contains(&descriptor.identifier))
            .collect();
        for descriptor in &forms {
            info!("Form {} registered ({})", descriptor.identifier, descriptor.category.form_type());
        }
        Self { forms }
    }

    #[cfg(test)]
    pub fn get(&self, identifier: &str) -> Option<&FormDescriptor> {
        self.forms.iter().find(|f| f.identifier == identifier)
    }

    pub fn by_category(&self, category: FormCategory) -> Option<&FormDescriptor> {
        self.forms.iter().find(|f| f.category == category)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discover_registers_only_present_forms() {
        let registry = FormRegistry::discover(["leadForm", "unknown-form"]);
        assert_eq!(registry.len(), 1);
        let lead = registry.get("leadForm").unwrap();
        assert_eq!(lead.category, FormCategory::LeadCapture);
        assert_eq!(lead.surface(), "floating_buttons");
        assert!(registry.get("partner-form").is_none());
    }

    #[test]
    fn discover_with_nothing_present_is_empty() {
        let registry = FormRegistry::discover(std::iter::empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn field_names_are_unique_per_form() {
        for descriptor in FormDescriptor::standard() {
            let mut names: Vec<_> = descriptor.fields.iter().map(|f| f.name).collect();
            let total = names.len();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), total, "{}", descriptor.identifier);
        }
    }
}
