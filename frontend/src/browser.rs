use chrono::{DateTime, Utc};
use log::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{window, Document, HtmlAnchorElement, HtmlElement, ScrollBehavior, ScrollToOptions};

use crate::config::SCROLL_OFFSET;
use crate::forms::lead::{ContentRedirect, PageEnvironment};

/// Request metadata read from `window`, `navigator` and `document`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserEnvironment;

impl PageEnvironment for BrowserEnvironment {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn user_agent(&self) -> String {
        window()
            .and_then(|w| w.navigator().user_agent().ok())
            .unwrap_or_default()
    }

    fn page_url(&self) -> String {
        page_location()
    }

    fn referrer(&self) -> String {
        document().map(|d| d.referrer()).unwrap_or_default()
    }

    fn screen_size(&self) -> (u32, u32) {
        window()
            .and_then(|w| w.screen().ok())
            .map(|s| {
                let width = s.width().unwrap_or(0).max(0) as u32;
                let height = s.height().unwrap_or(0).max(0) as u32;
                (width, height)
            })
            .unwrap_or((0, 0))
    }
}

pub fn page_location() -> String {
    window()
        .and_then(|w| w.location().href().ok())
        .unwrap_or_default()
}

fn document() -> Option<Document> {
    window().and_then(|w| w.document())
}

pub fn open_content(redirect: &ContentRedirect) {
    match redirect {
        ContentRedirect::Download { url, filename } => {
            let anchor = document()
                .and_then(|d| d.create_element("a").ok())
                .and_then(|el| el.dyn_into::<HtmlAnchorElement>().ok());
            match anchor {
                Some(anchor) => {
                    anchor.set_href(url);
                    anchor.set_download(filename);
                    anchor.click();
                }
                None => warn!("Could not start download of {}", url),
            }
        }
        ContentRedirect::NewTab { url } => {
            let opened = window().and_then(|w| w.open_with_url_and_target(url, "_blank").ok());
            if opened.flatten().is_none() {
                warn!("Popup blocked for {}", url);
            }
        }
    }
}

/// Locks or releases scrolling of the page behind a modal.
pub fn lock_body_scroll(locked: bool) {
    if let Some(body) = document().and_then(|d| d.body()) {
        let value = if locked { "hidden" } else { "" };
        let _ = body.style().set_property("overflow", value);
    }
}

pub fn focus_first_field(container_id: &str) {
    let selector = format!("#{0} input, #{0} select, #{0} textarea", container_id);
    let field = document()
        .and_then(|d| d.query_selector(&selector).ok().flatten())
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    if let Some(field) = field {
        let _ = field.focus();
    }
}

/// True once the `load` event has already fired.
pub fn page_loaded() -> bool {
    document().map_or(false, |d| d.ready_state() == "complete")
}

/// Milliseconds since navigation started.
pub fn since_navigation_ms() -> Option<f64> {
    window().and_then(|w| w.performance()).map(|p| p.now())
}

pub fn scroll_y() -> f64 {
    window().and_then(|w| w.scroll_y().ok()).unwrap_or(0.0)
}

/// `(scroll_y, document_height, viewport_height)`
pub fn scroll_metrics() -> (f64, f64, f64) {
    let document_height = document()
        .and_then(|d| d.document_element())
        .map(|el| el.scroll_height() as f64)
        .unwrap_or(0.0);
    let viewport_height = window()
        .and_then(|w| w.inner_height().ok())
        .and_then(|h| h.as_f64())
        .unwrap_or(0.0);
    (scroll_y(), document_height, viewport_height)
}

fn smooth_scroll(top: f64) {
    if let Some(window) = window() {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        window.scroll_to_with_scroll_to_options(&options);
    }
}

pub fn scroll_to_top() {
    smooth_scroll(0.0);
}

/// Scrolls so the section starts just below the fixed header. Returns false
/// when no element has that id.
pub fn scroll_to_section(id: &str) -> bool {
    let target = document().and_then(|d| d.get_element_by_id(id));
    match target {
        Some(el) => {
            let top = el.get_bounding_client_rect().top() + scroll_y() - SCROLL_OFFSET;
            debug!("Scrolling to #{}", id);
            smooth_scroll(top.max(0.0));
            true
        }
        None => false,
    }
}

pub fn storage_get(key: &str) -> Option<String> {
    window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|s| s.get_item(key).ok().flatten())
}

pub fn storage_set(key: &str, value: &str) {
    let storage = window().and_then(|w| w.local_storage().ok().flatten());
    match storage {
        Some(storage) => {
            if storage.set_item(key, value).is_err() {
                warn!("Could not store {}", key);
            }
        }
        None => debug!("localStorage unavailable, {} not stored", key),
    }
}
