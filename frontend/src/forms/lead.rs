use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::descriptor::FormCategory;
use super::values::{FieldValue, FormValues};

pub const DIRECT_REFERRER: &str = "Acesso direto";
pub const GUIDE_FILENAME: &str = "guia-parceria-educa-plus.pdf";

/// Where request metadata comes from. The browser implementation lives in
/// `crate::browser`.
pub trait PageEnvironment {
    fn now(&self) -> DateTime<Utc>;
    fn user_agent(&self) -> String;
    fn page_url(&self) -> String;
    /// Empty when the visitor arrived directly.
    fn referrer(&self) -> String;
    fn screen_size(&self) -> (u32, u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Guide,
    Podcast,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Guide => "guide",
            ContentType::Podcast => "podcast",
        }
    }
}

/// What the lead-capture modal was opened for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadCaptureContent {
    pub content_type: ContentType,
    pub file_url: String,
}

impl LeadCaptureContent {
    pub fn redirect(&self) -> ContentRedirect {
        match self.content_type {
            ContentType::Guide => ContentRedirect::Download {
                url: self.file_url.clone(),
                filename: GUIDE_FILENAME.to_string(),
            },
            ContentType::Podcast => ContentRedirect::NewTab {
                url: self.file_url.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRedirect {
    Download { url: String, filename: String },
    NewTab { url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeadRecord {
    pub category: FormCategory,
    pub values: FormValues,
    pub timestamp: DateTime<Utc>,
    pub user_agent: String,
    pub page_url: String,
    pub referrer: String,
    pub screen_resolution: String,
    pub content: Option<LeadCaptureContent>,
}

impl LeadRecord {
    pub fn collect(
        category: FormCategory,
        values: &FormValues,
        env: &dyn PageEnvironment,
        content: Option<&LeadCaptureContent>,
    ) -> Self {
        let referrer = env.referrer();
        let (width, height) = env.screen_size();
        Self {
            category,
            values: values.clone(),
            timestamp: env.now(),
            user_agent: env.user_agent(),
            page_url: env.page_url(),
            referrer: if referrer.is_empty() { DIRECT_REFERRER.to_string() } else { referrer },
            screen_resolution: format!("{}x{}", width, height),
            content: match category {
                FormCategory::LeadCapture => content.cloned(),
                _ => None,
            },
        }
    }

    pub fn email_domain(&self) -> Option<&str> {
        self.values.text("email").trim().split_once('@').map(|(_, domain)| domain)
    }
}

impl Serialize for LeadRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("form_type", self.category.form_type())?;
        map.serialize_entry("source", self.category.source())?;
        map.serialize_entry(
            "timestamp",
            &self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        )?;
        map.serialize_entry("user_agent", &self.user_agent)?;
        map.serialize_entry("page_url", &self.page_url)?;
        map.serialize_entry("referrer", &self.referrer)?;
        map.serialize_entry("screen_resolution", &self.screen_resolution)?;
        for (name, value) in self.values.iter() {
            match value {
                FieldValue::Text(text) => map.serialize_entry(name, text.trim())?,
                FieldValue::Checked(checked) => map.serialize_entry(name, checked)?,
            }
        }
        if let Some(content) = &self.content {
            map.serialize_entry("file_url", &content.file_url)?;
            map.serialize_entry("content_type", content.content_type.as_str())?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::descriptor::FormDescriptor;
    use crate::forms::testing::FixedEnvironment;

    fn guide() -> LeadCaptureContent {
        LeadCaptureContent {
            content_type: ContentType::Guide,
            file_url: "/assets/guia.pdf".to_string(),
        }
    }

    #[test]
    fn serializes_metadata_then_fields_in_order() {
        let descriptor = FormDescriptor::lead_capture();
        let mut values = FormValues::for_form(&descriptor);
        values.set("email", FieldValue::Text(" ana@escola.com ".into()));
        values.set("whatsapp", FieldValue::Text("(11) 98765-4321".into()));
        values.set("consent", FieldValue::Checked(true));

        let record = LeadRecord::collect(descriptor.category, &values, &FixedEnvironment::default(), Some(&guide()));
        let json = serde_json::to_string(&record).unwrap();
        let keys = [
            "form_type", "source", "timestamp", "user_agent", "page_url", "referrer",
            "screen_resolution", "email", "whatsapp", "consent", "file_url", "content_type",
        ];
        let mut last = 0;
        for key in keys {
            let pos = json.find(&format!("\"{}\"", key)).unwrap_or_else(|| panic!("missing {key}"));
            assert!(pos >= last, "{key} out of order");
            last = pos;
        }

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["form_type"], "lead_capture");
        assert_eq!(value["email"], "ana@escola.com");
        assert_eq!(value["consent"], true);
        assert_eq!(value["referrer"], DIRECT_REFERRER);
        assert_eq!(value["screen_resolution"], "1920x1080");
        assert_eq!(value["content_type"], "guide");
        assert_eq!(record.email_domain(), Some("escola.com"));
    }

    #[test]
    fn content_is_dropped_for_non_lead_capture_forms() {
        let descriptor = FormDescriptor::partner_modal();
        let values = FormValues::for_form(&descriptor);
        let record = LeadRecord::collect(descriptor.category, &values, &FixedEnvironment::default(), Some(&guide()));
        assert!(record.content.is_none());
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("file_url").is_none());
    }

    #[test]
    fn redirect_depends_on_content_type() {
        assert_eq!(
            guide().redirect(),
            ContentRedirect::Download {
                url: "/assets/guia.pdf".into(),
                filename: GUIDE_FILENAME.into()
            }
        );
        let podcast = LeadCaptureContent {
            content_type: ContentType::Podcast,
            file_url: "https://podcast.example/ep1".into(),
        };
        assert_eq!(
            podcast.redirect(),
            ContentRedirect::NewTab {
                url: "https://podcast.example/ep1".into()
            }
        );
    }
}
