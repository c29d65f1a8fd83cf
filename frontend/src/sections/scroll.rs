use std::cell::RefCell;
use std::rc::Rc;

use yew::prelude::*;
use yew_hooks::prelude::*;

use crate::analytics::{use_analytics, AnalyticsEvent};
use crate::browser;
use crate::config::SCROLL_DEBOUNCE_MS;
use crate::utils::Debouncer;

pub const BACK_TO_TOP_AFTER_PX: f64 = 300.0;
pub const FIRST_SCROLL_AFTER_PX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollState {
    pub back_to_top_visible: bool,
    pub has_scrolled: bool,
}

impl ScrollState {
    /// Returns true the first time the page passes the scroll threshold.
    pub fn observe(&mut self, scroll_y: f64) -> bool {
        self.back_to_top_visible = scroll_y > BACK_TO_TOP_AFTER_PX;
        if scroll_y > FIRST_SCROLL_AFTER_PX && !self.has_scrolled {
            self.has_scrolled = true;
            return true;
        }
        false
    }
}

#[function_component(BackToTop)]
pub fn back_to_top() -> Html {
    let visible = use_state(|| false);
    let state = use_mut_ref(ScrollState::default);
    let debouncer = use_memo(|_| Debouncer::new(SCROLL_DEBOUNCE_MS), ());
    let analytics = use_analytics();

    {
        let visible = visible.clone();
        let analytics = analytics.clone();
        let debouncer = debouncer.clone();
        use_event_with_window("scroll", move |_: Event| {
            let visible = visible.clone();
            let analytics = analytics.clone();
            let state: Rc<RefCell<ScrollState>> = state.clone();
            debouncer.call(move || {
                let first = state.borrow_mut().observe(browser::scroll_y());
                if first {
                    analytics.track(AnalyticsEvent::new("page_scroll", "engagement").with("scroll_depth", "100px"));
                }
                visible.set(state.borrow().back_to_top_visible);
            });
        });
    }

    let onclick = Callback::from(move |_: MouseEvent| {
        browser::scroll_to_top();
        analytics.track(AnalyticsEvent::new("back_to_top_click", "navigation"));
    });

    let shown = if *visible {
        classes!("opacity-100", "visible")
    } else {
        classes!("opacity-0", "invisible")
    };

    html! {
        <button id="back-to-top" {onclick} aria-label="Voltar ao topo"
            class={classes!("fixed", "bottom-24", "right-6", "w-12", "h-12", "rounded-full", "bg-educa-blue", "text-white", "shadow-lg", "transition-all", shown)}>
            <i class="fas fa-arrow-up"></i>
        </button>
    }
}

#[derive(Properties, PartialEq)]
pub struct SectionLinkProps {
    /// Element id of the target section, without `#`.
    pub target: AttrValue,
    #[prop_or_default]
    pub class: Classes,
    /// Where the link sits on the page, for analytics.
    #[prop_or(AttrValue::Static("navigation"))]
    pub location: AttrValue,
    #[prop_or_default]
    pub children: Children,
}

/// In-page anchor that scrolls smoothly below the fixed header.
#[function_component(SectionLink)]
pub fn section_link(props: &SectionLinkProps) -> Html {
    let analytics = use_analytics();
    let onclick = {
        let target = props.target.clone();
        let location = props.location.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            if browser::scroll_to_section(&target) {
                analytics.track(
                    AnalyticsEvent::new("scroll_to_section", "navigation").with("section_name", target.as_str()),
                );
                analytics.track(
                    AnalyticsEvent::new("internal_navigation", "navigation")
                        .with("target_section", format!("#{}", target))
                        .with("source_location", location.as_str()),
                );
                if target.contains("formulario") {
                    analytics.track(
                        AnalyticsEvent::new("cta_click", "conversion")
                            .with("cta_location", location.as_str())
                            .with("cta_type", "form_redirect"),
                    );
                }
            }
        })
    };

    html! {
        <a href={format!("#{}", props.target)} class={props.class.clone()} {onclick}>
            { for props.children.iter() }
        </a>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_to_top_follows_threshold() {
        let mut state = ScrollState::default();
        state.observe(301.0);
        assert!(state.back_to_top_visible);
        state.observe(300.0);
        assert!(!state.back_to_top_visible);
    }

    #[test]
    fn first_scroll_is_reported_once() {
        let mut state = ScrollState::default();
        assert!(!state.observe(50.0));
        assert!(state.observe(150.0));
        assert!(!state.observe(900.0));
        assert!(!state.observe(0.0));
        assert!(state.has_scrolled);
    }
}
