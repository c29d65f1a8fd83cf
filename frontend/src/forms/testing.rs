//! Test doubles for the form pipeline. None of them touch the browser.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};
use futures::channel::oneshot;
use futures::future::{self, FutureExt};

use super::backup::LeadBackup;
use super::descriptor::FormDescriptor;
use super::lead::{ContentRedirect, LeadRecord, PageEnvironment};
use super::pipeline::{FormServices, FormView};
use super::transport::{LeadTransport, NetworkError, SendFuture, SubmissionResponse};
use super::values::{FieldValue, FormValues};
use crate::analytics::{AnalyticsEvent, AnalyticsSink};
use crate::components::toast::Toast;

pub struct FixedEnvironment {
    pub now: DateTime<Utc>,
    pub referrer: String,
}

impl Default for FixedEnvironment {
    fn default() -> Self {
        Self {
            now: Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap(),
            referrer: String::new(),
        }
    }
}

impl PageEnvironment for FixedEnvironment {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn user_agent(&self) -> String {
        "TestAgent/1.0".to_string()
    }

    fn page_url(&self) -> String {
        "https://educa.example/".to_string()
    }

    fn referrer(&self) -> String {
        self.referrer.clone()
    }

    fn screen_size(&self) -> (u32, u32) {
        (1920, 1080)
    }
}

pub fn sample_record() -> LeadRecord {
    let descriptor = FormDescriptor::lead_capture();
    let mut values = FormValues::for_form(&descriptor);
    values.set("email", FieldValue::Text("ana@escola.com".into()));
    values.set("whatsapp", FieldValue::Text("(31) 98765-4321".into()));
    values.set("consent", FieldValue::Checked(true));
    LeadRecord::collect(descriptor.category, &values, &FixedEnvironment::default(), None)
}

/// Answers with the queued results in order, then accepts everything.
pub struct ScriptedTransport {
    results: RefCell<VecDeque<Result<SubmissionResponse, NetworkError>>>,
    calls: Cell<usize>,
}

impl ScriptedTransport {
    pub fn new(results: Vec<Result<SubmissionResponse, NetworkError>>) -> Self {
        Self {
            results: RefCell::new(results.into()),
            calls: Cell::new(0),
        }
    }

    pub fn accepting() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl LeadTransport for ScriptedTransport {
    fn send(&self, _record: &LeadRecord) -> SendFuture {
        self.calls.set(self.calls.get() + 1);
        let result = self
            .results
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(SubmissionResponse::accepted()));
        future::ready(result).boxed_local()
    }
}

/// Stays pending until the test sends the result through the returned sender.
pub struct GatedTransport {
    gate: RefCell<Option<oneshot::Receiver<Result<SubmissionResponse, NetworkError>>>>,
}

impl GatedTransport {
    pub fn new() -> (Self, oneshot::Sender<Result<SubmissionResponse, NetworkError>>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                gate: RefCell::new(Some(rx)),
            },
            tx,
        )
    }
}

impl LeadTransport for GatedTransport {
    fn send(&self, _record: &LeadRecord) -> SendFuture {
        let gate = self.gate.borrow_mut().take();
        async move {
            match gate {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(NetworkError::Request("gate dropped".into()))),
                None => Err(NetworkError::Request("gate already used".into())),
            }
        }
        .boxed_local()
    }
}

#[derive(Default)]
pub struct RecordingAnalytics {
    events: RefCell<Vec<AnalyticsEvent>>,
}

impl RecordingAnalytics {
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.borrow().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.events.borrow().iter().map(|e| e.name.clone()).collect()
    }
}

impl AnalyticsSink for RecordingAnalytics {
    fn track(&self, event: AnalyticsEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    Busy(bool),
    Refresh,
    Notify(Toast),
    CloseModal,
    OpenContent(ContentRedirect),
}

#[derive(Default)]
pub struct RecordingView {
    calls: RefCell<Vec<ViewCall>>,
}

impl RecordingView {
    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.borrow().clone()
    }
}

impl FormView for RecordingView {
    fn set_busy(&self, busy: bool) {
        self.calls.borrow_mut().push(ViewCall::Busy(busy));
    }

    fn refresh(&self) {
        self.calls.borrow_mut().push(ViewCall::Refresh);
    }

    fn notify(&self, toast: Toast) {
        self.calls.borrow_mut().push(ViewCall::Notify(toast));
    }

    fn close_modal(&self) {
        self.calls.borrow_mut().push(ViewCall::CloseModal);
    }

    fn open_content(&self, redirect: ContentRedirect) {
        self.calls.borrow_mut().push(ViewCall::OpenContent(redirect));
    }
}

pub fn services_with(
    backup: Rc<dyn LeadBackup>,
    transport: Rc<dyn LeadTransport>,
    analytics: Rc<dyn AnalyticsSink>,
) -> FormServices {
    FormServices {
        backup,
        transport,
        analytics,
        environment: Rc::new(FixedEnvironment::default()),
    }
}
