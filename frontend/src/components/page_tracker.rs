use chrono::{DateTime, Utc};
use wasm_bindgen::JsCast;
use web_sys::Element;
use yew::prelude::*;
use yew_hooks::prelude::*;

use crate::analytics::{link_type, scroll_percent, use_analytics, AnalyticsEvent, MilestoneTracker};
use crate::browser;
use crate::components::lead_form::FormHandle;
use crate::config::{ANALYTICS_SCROLL_DEBOUNCE_MS, TIME_ON_PAGE_CHECK_MS};
use crate::utils::{format_duration, Debouncer};

pub fn elapsed_seconds(since: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    (now - since).num_seconds().clamp(0, i64::from(u32::MAX)) as u32
}

/// Whole milliseconds, zero for readings the browser could not give.
pub fn load_time_ms(since_navigation: Option<f64>) -> u64 {
    match since_navigation {
        Some(ms) if ms.is_finite() && ms > 0.0 => ms.round() as u64,
        _ => 0,
    }
}

/// Links that leave the page, or open a mail or phone app.
pub fn is_outbound(href: &str) -> bool {
    href.starts_with("http") || href.starts_with("mailto:") || href.starts_with("tel:")
}

#[derive(Properties, PartialEq)]
pub struct PageTrackerProps {
    /// Forms to report as abandoned when the visitor leaves.
    pub forms: Vec<FormHandle>,
}

/// Page-level engagement events. Renders nothing.
#[function_component(PageTracker)]
pub fn page_tracker(props: &PageTrackerProps) -> Html {
    let analytics = use_analytics();
    let started = use_mut_ref(Utc::now);
    let time_milestones = use_mut_ref(MilestoneTracker::time_on_page);
    let scroll_milestones = use_mut_ref(MilestoneTracker::scroll_depth);
    let debouncer = use_memo(|_| Debouncer::new(ANALYTICS_SCROLL_DEBOUNCE_MS), ());

    {
        let reported = use_mut_ref(|| false);
        let report_load = {
            let analytics = analytics.clone();
            Callback::from(move |_: ()| {
                if std::mem::replace(&mut *reported.borrow_mut(), true) {
                    return;
                }
                analytics.track(
                    AnalyticsEvent::new("page_load_time", "performance")
                        .with("load_time_ms", load_time_ms(browser::since_navigation_ms())),
                );
            })
        };
        {
            let report_load = report_load.clone();
            use_effect_with_deps(
                move |_| {
                    // The wasm bundle often starts after `load` has fired.
                    if browser::page_loaded() {
                        report_load.emit(());
                    }
                    || ()
                },
                (),
            );
        }
        use_event_with_window("load", move |_: Event| report_load.emit(()));
    }

    {
        let analytics = analytics.clone();
        let started = started.clone();
        use_interval(
            move || {
                let seconds = elapsed_seconds(*started.borrow(), Utc::now());
                for milestone in time_milestones.borrow_mut().observe(seconds) {
                    analytics.track(
                        AnalyticsEvent::new("time_on_page", "engagement")
                            .with("time_seconds", milestone)
                            .with("time_formatted", format_duration(milestone)),
                    );
                }
            },
            TIME_ON_PAGE_CHECK_MS,
        );
    }

    {
        let analytics = analytics.clone();
        use_event_with_window("scroll", move |_: Event| {
            let analytics = analytics.clone();
            let milestones = scroll_milestones.clone();
            debouncer.call(move || {
                let (y, document_height, viewport_height) = browser::scroll_metrics();
                let percent = scroll_percent(y, document_height, viewport_height);
                for milestone in milestones.borrow_mut().observe(percent) {
                    analytics.track(
                        AnalyticsEvent::new("scroll", "engagement")
                            .with("scroll_depth", milestone)
                            .with("page_location", browser::page_location()),
                    );
                }
            });
        });
    }

    {
        let analytics = analytics.clone();
        let forms = props.forms.clone();
        use_event_with_window("beforeunload", move |_: Event| {
            let seconds = elapsed_seconds(*started.borrow(), Utc::now());
            analytics.track(
                AnalyticsEvent::new("page_exit", "engagement")
                    .with("total_time_seconds", seconds)
                    .with("time_formatted", format_duration(seconds)),
            );
            for form in &forms {
                form.0.abandon();
            }
        });
    }

    use_event_with_window("click", move |e: MouseEvent| {
        let link = e
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|el| el.closest("a").ok().flatten());
        let Some(link) = link else {
            return;
        };
        let href = link.get_attribute("href").unwrap_or_default();
        if is_outbound(&href) {
            analytics.track(
                AnalyticsEvent::new("external_link_click", "engagement")
                    .with("link_url", href.as_str())
                    .with("link_text", link.text_content().unwrap_or_default().trim())
                    .with("link_type", link_type(&href)),
            );
        }
    });

    html! {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn elapsed_time_never_goes_negative() {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 14, 0, 0).unwrap();
        assert_eq!(elapsed_seconds(start, start + Duration::seconds(125)), 125);
        assert_eq!(elapsed_seconds(start, start - Duration::seconds(5)), 0);
    }

    #[test]
    fn load_time_is_rounded_and_never_negative() {
        assert_eq!(load_time_ms(Some(1234.6)), 1235);
        assert_eq!(load_time_ms(Some(-3.0)), 0);
        assert_eq!(load_time_ms(Some(f64::NAN)), 0);
        assert_eq!(load_time_ms(None), 0);
    }

    #[test]
    fn outbound_links() {
        assert!(is_outbound("https://wa.me/5531999999999"));
        assert!(is_outbound("mailto:contato@educa.com"));
        assert!(is_outbound("tel:+5531999999999"));
        assert!(!is_outbound("#faq"));
        assert!(!is_outbound("/materiais/podcast"));
    }
}
