use std::collections::BTreeSet;
use std::rc::Rc;

use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{js_sys, window};
use yew::prelude::*;

/// A named event with flat key/value parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsEvent {
    pub name: String,
    pub params: Map<String, Value>,
}

impl AnalyticsEvent {
    pub fn new(name: impl Into<String>, category: &str) -> Self {
        let mut params = Map::new();
        params.insert("event_category".to_string(), Value::from(category));
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    #[cfg(test)]
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }
}

/// Fire-and-forget: implementations must never fail the caller.
pub trait AnalyticsSink {
    fn track(&self, event: AnalyticsEvent);
}

/// Forwards events to whichever of `gtag` and `fbq` the page defines.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserAnalytics;

fn global_function(name: &str) -> Option<js_sys::Function> {
    let window = window()?;
    js_sys::Reflect::get(&window, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<js_sys::Function>()
        .ok()
}

impl AnalyticsSink for BrowserAnalytics {
    fn track(&self, event: AnalyticsEvent) {
        debug!("Event tracked: {} {:?}", event.name, event.params);
        let params = match event
            .params
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        {
            Ok(params) => params,
            Err(_) => return,
        };
        let name = JsValue::from_str(&event.name);
        if let Some(gtag) = global_function("gtag") {
            let _ = gtag.call3(&JsValue::NULL, &JsValue::from_str("event"), &name, &params);
        }
        if let Some(fbq) = global_function("fbq") {
            let _ = fbq.call3(&JsValue::NULL, &JsValue::from_str("track"), &name, &params);
        }
    }
}

/// Shared sink handed to components through context.
#[derive(Clone)]
pub struct AnalyticsHandle(pub Rc<dyn AnalyticsSink>);

impl AnalyticsHandle {
    pub fn track(&self, event: AnalyticsEvent) {
        self.0.track(event);
    }
}

impl PartialEq for AnalyticsHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for AnalyticsHandle {
    fn default() -> Self {
        Self(Rc::new(BrowserAnalytics))
    }
}

#[hook]
pub fn use_analytics() -> AnalyticsHandle {
    use_context::<AnalyticsHandle>().unwrap_or_default()
}

/// Reports each threshold once, the first time a reading reaches it.
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneTracker {
    milestones: Vec<u32>,
    reached: BTreeSet<u32>,
}

impl MilestoneTracker {
    pub fn new(milestones: &[u32]) -> Self {
        Self {
            milestones: milestones.to_vec(),
            reached: BTreeSet::new(),
        }
    }

    pub fn scroll_depth() -> Self {
        Self::new(&[25, 50, 75, 100])
    }

    pub fn time_on_page() -> Self {
        Self::new(&[30, 60, 120, 300, 600])
    }

    pub fn video_progress() -> Self {
        Self::new(&[25, 50, 75])
    }

    /// Thresholds newly reached by `value`, in ascending order.
    pub fn observe(&mut self, value: u32) -> Vec<u32> {
        let mut newly = Vec::new();
        for &milestone in &self.milestones {
            if value >= milestone && self.reached.insert(milestone) {
                newly.push(milestone);
            }
        }
        newly
    }
}

/// Percentage of the scrollable height already passed, clamped to 0..=100.
pub fn scroll_percent(scroll_y: f64, document_height: f64, viewport_height: f64) -> u32 {
    let scrollable = document_height - viewport_height;
    if scrollable <= 0.0 {
        return 100;
    }
    ((scroll_y / scrollable) * 100.0).round().clamp(0.0, 100.0) as u32
}

pub fn link_type(href: &str) -> &'static str {
    if href.contains("mailto:") {
        "email"
    } else if href.contains("tel:") {
        "phone"
    } else if href.contains("wa.me") || href.contains("whatsapp") {
        "whatsapp"
    } else if href.contains("facebook.com") {
        "facebook"
    } else if href.contains("instagram.com") {
        "instagram"
    } else if href.contains("linkedin.com") {
        "linkedin"
    } else if href.contains("youtube.com") {
        "youtube"
    } else {
        "external"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_carries_category_and_params() {
        let event = AnalyticsEvent::new("cta_click", "conversion").with("cta_location", "hero");
        assert_eq!(event.param("event_category"), Some(&Value::from("conversion")));
        assert_eq!(event.param("cta_location"), Some(&Value::from("hero")));
    }

    #[test]
    fn milestones_fire_once_each() {
        let mut tracker = MilestoneTracker::scroll_depth();
        assert_eq!(tracker.observe(10), Vec::<u32>::new());
        assert_eq!(tracker.observe(60), vec![25, 50]);
        assert_eq!(tracker.observe(55), Vec::<u32>::new());
        assert_eq!(tracker.observe(100), vec![75, 100]);
        assert_eq!(tracker.observe(100), Vec::<u32>::new());
    }

    #[test]
    fn scroll_percent_handles_short_pages() {
        assert_eq!(scroll_percent(0.0, 800.0, 900.0), 100);
        assert_eq!(scroll_percent(500.0, 2000.0, 1000.0), 50);
        assert_eq!(scroll_percent(5000.0, 2000.0, 1000.0), 100);
    }

    #[test]
    fn classifies_outbound_links() {
        assert_eq!(link_type("https://wa.me/5531999999999"), "whatsapp");
        assert_eq!(link_type("mailto:contato@educa.com"), "email");
        assert_eq!(link_type("https://www.instagram.com/educa"), "instagram");
        assert_eq!(link_type("https://example.com"), "external");
    }
}
