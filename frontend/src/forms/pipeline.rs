use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, error, info, warn};
use thiserror::Error;

use super::backup::LeadBackup;
use super::descriptor::{FieldKind, FormCategory, FormDescriptor};
use super::lead::{ContentRedirect, ContentType, LeadCaptureContent, LeadRecord, PageEnvironment};
use super::transport::{LeadTransport, NetworkError};
use super::validation::{FieldOutcome, FormValidation};
use super::values::{FieldValue, FormValues};
use crate::analytics::{AnalyticsEvent, AnalyticsSink};
use crate::components::toast::Toast;
use crate::utils::format_phone;

pub const MAIN_SUCCESS_MESSAGE: &str = "Obrigado! Entraremos em contato em até 24 horas.";
pub const MODAL_SUCCESS_MESSAGE: &str = "Solicitação enviada! Nossa equipe entrará em contato.";
pub const GUIDE_SUCCESS_MESSAGE: &str = "Download iniciado! Verifique seus arquivos.";
pub const PODCAST_SUCCESS_MESSAGE: &str = "Podcast aberto em uma nova aba!";
pub const ERROR_MESSAGE: &str = "Ops! Algo deu errado. Tente novamente em alguns instantes.";

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("unexpected submission failure: {0}")]
    Unexpected(String),
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Another submission of this form was still running.
    Ignored,
    Invalid,
    Submitted,
    Failed(SubmitError),
}

/// Everything a form needs from the outside world, built once at startup.
#[derive(Clone)]
pub struct FormServices {
    pub backup: Rc<dyn LeadBackup>,
    pub transport: Rc<dyn LeadTransport>,
    pub analytics: Rc<dyn AnalyticsSink>,
    pub environment: Rc<dyn PageEnvironment>,
}

/// UI side effects the pipeline drives. Implementations must not call back
/// into the controller synchronously while handling `set_busy`.
pub trait FormView {
    fn set_busy(&self, busy: bool);
    /// Values or validation annotations changed.
    fn refresh(&self);
    fn notify(&self, toast: Toast);
    fn close_modal(&self);
    fn open_content(&self, redirect: ContentRedirect);
}

#[derive(Debug)]
struct FormState {
    values: FormValues,
    validation: FormValidation,
    content: Option<LeadCaptureContent>,
    started: bool,
    submitted: bool,
}

/// Validation and submission workflow of one form.
///
/// All methods take `&self`: the controller is shared between the component
/// and the in-flight submission future, on a single thread.
pub struct FormController {
    descriptor: FormDescriptor,
    services: FormServices,
    state: RefCell<FormState>,
    submitting: Cell<bool>,
}

/// Releases the submitting flag and the busy state on every exit path,
/// including the future being dropped mid-flight.
struct SubmittingGuard<'a> {
    flag: &'a Cell<bool>,
    view: &'a dyn FormView,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
        self.view.set_busy(false);
    }
}

impl FormController {
    pub fn new(descriptor: FormDescriptor, services: FormServices) -> Self {
        let state = FormState {
            values: FormValues::for_form(&descriptor),
            validation: FormValidation::for_form(&descriptor),
            content: None,
            started: false,
            submitted: false,
        };
        Self {
            descriptor,
            services,
            state: RefCell::new(state),
            submitting: Cell::new(false),
        }
    }

    pub fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.get()
    }

    pub fn values(&self) -> FormValues {
        self.state.borrow().values.clone()
    }

    pub fn error_for(&self, field: &str) -> Option<String> {
        self.state.borrow().validation.error_for(field).map(str::to_string)
    }

    pub fn set_content(&self, content: Option<LeadCaptureContent>) {
        self.state.borrow_mut().content = content;
    }

    fn event(&self, name: &str) -> AnalyticsEvent {
        AnalyticsEvent::new(name, "forms")
            .with("form_type", self.descriptor.category.form_type())
            .with("form_id", self.descriptor.identifier)
    }

    /// First focus of any field counts as starting the form.
    pub fn focus(&self, field: &str) {
        let first = {
            let mut state = self.state.borrow_mut();
            !std::mem::replace(&mut state.started, true)
        };
        if first {
            self.services.analytics.track(self.event("form_start").with("field_name", field));
        }
    }

    /// Stores a typed value and returns it as it should be displayed.
    pub fn input(&self, field: &str, value: FieldValue) -> FieldValue {
        let value = match (self.descriptor.field(field).map(|f| f.kind), value) {
            (Some(FieldKind::Phone), FieldValue::Text(raw)) => FieldValue::Text(format_phone(&raw)),
            (_, value) => value,
        };
        let mut state = self.state.borrow_mut();
        state.values.set(field, value.clone());
        state.validation.on_input(field);
        value
    }

    pub fn blur(&self, field: &str) -> FieldOutcome {
        let (outcome, filled) = {
            let mut state = self.state.borrow_mut();
            let FormState { values, validation, .. } = &mut *state;
            let filled = !values.text(field).trim().is_empty();
            (validation.on_blur(field, values), filled)
        };
        if filled {
            let kind = self.descriptor.field(field).map(|f| f.kind);
            self.services.analytics.track(
                self.event("form_field_complete")
                    .with("field_name", field)
                    .with("field_type", format!("{:?}", kind.unwrap_or(FieldKind::Text)).to_lowercase()),
            );
        }
        outcome
    }

    /// Clears values and annotations; the lead-capture content is kept.
    pub fn reset(&self) {
        let mut state = self.state.borrow_mut();
        state.values.clear();
        state.validation.clear();
    }

    /// Called when the page is being left.
    pub fn abandon(&self) {
        let abandoned = {
            let state = self.state.borrow();
            state.started && !state.submitted
        };
        if abandoned {
            self.services.analytics.track(self.event("form_abandon"));
        }
    }

    pub async fn submit(&self, view: &dyn FormView) -> SubmitOutcome {
        let id = self.descriptor.identifier;
        if self.submitting.get() {
            debug!("Form {} already submitting, ignoring", id);
            return SubmitOutcome::Ignored;
        }
        self.services.analytics.track(self.event("form_submit_attempt"));

        let valid = {
            let mut state = self.state.borrow_mut();
            let FormState { values, validation, .. } = &mut *state;
            validation.validate_all(values)
        };
        if !valid {
            let errors = self.state.borrow().validation.error_count();
            info!("Validation failed for {} ({} fields)", id, errors);
            view.refresh();
            return SubmitOutcome::Invalid;
        }

        self.submitting.set(true);
        view.set_busy(true);
        let _guard = SubmittingGuard {
            flag: &self.submitting,
            view,
        };

        info!("Submitting form {}", id);
        match self.deliver().await {
            Ok(()) => {
                self.on_success(view);
                SubmitOutcome::Submitted
            }
            Err(e) => {
                error!("Form {} submission failed: {}", id, e);
                view.notify(Toast::error(ERROR_MESSAGE));
                SubmitOutcome::Failed(e)
            }
        }
    }

    async fn deliver(&self) -> Result<(), SubmitError> {
        let record = {
            let state = self.state.borrow();
            if self.descriptor.category == FormCategory::LeadCapture && state.content.is_none() {
                return Err(SubmitError::Unexpected("lead capture has no content selected".to_string()));
            }
            LeadRecord::collect(
                self.descriptor.category,
                &state.values,
                self.services.environment.as_ref(),
                state.content.as_ref(),
            )
        };

        if let Err(e) = self.services.backup.append(&record) {
            warn!("Could not save lead locally: {}", e);
        }

        if let Some(content) = &record.content {
            let mut event = AnalyticsEvent::new("lead_captured", "lead_generation")
                .with("content_type", content.content_type.as_str());
            if let Some(domain) = record.email_domain() {
                event = event.with("email_domain", domain);
            }
            self.services.analytics.track(event);
        }

        let response = self.services.transport.send(&record).await?;
        if let Some(message) = response.message {
            debug!("Server said: {}", message);
        }
        Ok(())
    }

    fn on_success(&self, view: &dyn FormView) {
        let category = self.descriptor.category;
        self.services.analytics.track(
            AnalyticsEvent::new("form_submitted", "form_interaction")
                .with("form_type", category.form_type())
                .with("source", self.descriptor.surface()),
        );

        let content = {
            let mut state = self.state.borrow_mut();
            state.submitted = true;
            state.values.clear();
            state.validation.clear();
            state.content.clone()
        };
        view.refresh();

        let message = match (category, content.as_ref().map(|c| c.content_type)) {
            (FormCategory::Main, _) => MAIN_SUCCESS_MESSAGE,
            (FormCategory::Modal, _) => MODAL_SUCCESS_MESSAGE,
            (FormCategory::LeadCapture, Some(ContentType::Podcast)) => PODCAST_SUCCESS_MESSAGE,
            (FormCategory::LeadCapture, _) => GUIDE_SUCCESS_MESSAGE,
        };
        view.notify(Toast::success(message));
        if let Some(modal) = self.descriptor.modal_id {
            debug!("Closing {} after submission", modal);
            view.close_modal();
        }
        if let Some(content) = content {
            view.open_content(content.redirect());
        }
        info!("Form {} submitted", self.descriptor.identifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::toast::ToastKind;
    use crate::forms::backup::MemoryBackup;
    use crate::forms::testing::{
        services_with, GatedTransport, RecordingAnalytics, RecordingView, ScriptedTransport, ViewCall,
    };
    use crate::forms::transport::SubmissionResponse;
    use crate::forms::validation::REQUIRED_MESSAGE;
    use futures::executor::block_on;
    use futures::FutureExt;

    fn text(value: &str) -> FieldValue {
        FieldValue::Text(value.to_string())
    }

    fn fill_modal(controller: &FormController) {
        controller.input("name", text("Ana Souza"));
        controller.input("email", text("ana@escola.com"));
        controller.input("phone", text("31987654321"));
        controller.input("experience", text("some"));
        controller.input("privacyConsent", FieldValue::Checked(true));
    }

    fn fill_lead(controller: &FormController) {
        controller.input("email", text("ana@escola.com"));
        controller.input("whatsapp", text("31987654321"));
        controller.input("consent", FieldValue::Checked(true));
    }

    #[test]
    fn empty_name_shows_one_error_and_never_submits() {
        let backup = Rc::new(MemoryBackup::new());
        let transport = Rc::new(ScriptedTransport::accepting());
        let controller = FormController::new(
            FormDescriptor::partner_modal(),
            services_with(backup.clone(), transport.clone(), Rc::new(RecordingAnalytics::default())),
        );
        fill_modal(&controller);
        controller.input("name", text(""));
        let view = RecordingView::default();

        let outcome = block_on(controller.submit(&view));

        assert!(matches!(outcome, SubmitOutcome::Invalid));
        assert_eq!(controller.error_for("name").as_deref(), Some(REQUIRED_MESSAGE));
        assert_eq!(controller.state.borrow().validation.error_count(), 1);
        assert_eq!(transport.calls(), 0);
        assert!(backup.is_empty());
        assert!(!controller.is_submitting());
        assert!(!view.calls().contains(&ViewCall::Busy(true)));
    }

    #[test]
    fn second_submit_while_in_flight_is_ignored() {
        let backup = Rc::new(MemoryBackup::new());
        let (transport, release) = GatedTransport::new();
        let controller = FormController::new(
            FormDescriptor::partner_modal(),
            services_with(backup.clone(), Rc::new(transport), Rc::new(RecordingAnalytics::default())),
        );
        fill_modal(&controller);
        let view = RecordingView::default();

        let mut first = Box::pin(controller.submit(&view));
        assert!((&mut first).now_or_never().is_none());
        assert!(controller.is_submitting());

        let second = block_on(controller.submit(&view));
        assert!(matches!(second, SubmitOutcome::Ignored));
        assert_eq!(backup.len(), 1);

        release.send(Ok(SubmissionResponse::accepted())).unwrap();
        assert!(matches!(block_on(first), SubmitOutcome::Submitted));
        assert!(!controller.is_submitting());
        assert_eq!(backup.len(), 1);
    }

    #[test]
    fn guide_lead_is_saved_announced_closed_and_downloaded() {
        let backup = Rc::new(MemoryBackup::new());
        let analytics = Rc::new(RecordingAnalytics::default());
        let controller = FormController::new(
            FormDescriptor::lead_capture(),
            services_with(backup.clone(), Rc::new(ScriptedTransport::accepting()), analytics.clone()),
        );
        controller.set_content(Some(LeadCaptureContent {
            content_type: ContentType::Guide,
            file_url: "/assets/guia-parceria.pdf".to_string(),
        }));
        fill_lead(&controller);
        let view = RecordingView::default();

        assert!(matches!(block_on(controller.submit(&view)), SubmitOutcome::Submitted));

        let leads = backup.load().unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0]["content_type"], "guide");
        assert_eq!(leads[0]["file_url"], "/assets/guia-parceria.pdf");

        let calls = view.calls();
        assert!(calls.contains(&ViewCall::Notify(Toast::success(GUIDE_SUCCESS_MESSAGE))));
        assert!(calls.contains(&ViewCall::CloseModal));
        assert!(calls.contains(&ViewCall::OpenContent(ContentRedirect::Download {
            url: "/assets/guia-parceria.pdf".to_string(),
            filename: "guia-parceria-educa-plus.pdf".to_string(),
        })));
        assert_eq!(calls.first(), Some(&ViewCall::Busy(true)));
        assert_eq!(calls.last(), Some(&ViewCall::Busy(false)));

        assert!(analytics.names().contains(&"form_submitted".to_string()));
        let captured = analytics
            .events()
            .into_iter()
            .find(|e| e.name == "lead_captured")
            .expect("lead_captured tracked");
        assert_eq!(captured.param("email_domain"), Some(&serde_json::Value::from("escola.com")));
        assert_eq!(captured.param("content_type"), Some(&serde_json::Value::from("guide")));
        assert_eq!(controller.values().text("email"), "");
    }

    #[test]
    fn podcast_lead_opens_in_a_new_tab() {
        let backup = Rc::new(MemoryBackup::new());
        let analytics = Rc::new(RecordingAnalytics::default());
        let controller = FormController::new(
            FormDescriptor::lead_capture(),
            services_with(backup.clone(), Rc::new(ScriptedTransport::accepting()), analytics.clone()),
        );
        controller.set_content(Some(LeadCaptureContent {
            content_type: ContentType::Podcast,
            file_url: "/materiais/podcast".to_string(),
        }));
        fill_lead(&controller);
        let view = RecordingView::default();

        assert!(matches!(block_on(controller.submit(&view)), SubmitOutcome::Submitted));

        let leads = backup.load().unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0]["content_type"], "podcast");

        let calls = view.calls();
        assert!(calls.contains(&ViewCall::Notify(Toast::success(PODCAST_SUCCESS_MESSAGE))));
        assert!(!calls.contains(&ViewCall::Notify(Toast::success(GUIDE_SUCCESS_MESSAGE))));
        let close = calls.iter().position(|c| *c == ViewCall::CloseModal).expect("modal closed");
        let open = calls
            .iter()
            .position(|c| {
                *c == ViewCall::OpenContent(ContentRedirect::NewTab {
                    url: "/materiais/podcast".to_string(),
                })
            })
            .expect("podcast opened");
        assert!(close < open);

        let captured = analytics
            .events()
            .into_iter()
            .find(|e| e.name == "lead_captured")
            .expect("lead_captured tracked");
        assert_eq!(captured.param("content_type"), Some(&serde_json::Value::from("podcast")));
    }

    #[test]
    fn network_failure_keeps_input_and_shows_error() {
        let backup = Rc::new(MemoryBackup::new());
        let transport = Rc::new(ScriptedTransport::new(vec![Err(NetworkError::Timeout(10_000))]));
        let controller = FormController::new(
            FormDescriptor::partner_modal(),
            services_with(backup.clone(), transport, Rc::new(RecordingAnalytics::default())),
        );
        fill_modal(&controller);
        let view = RecordingView::default();

        let outcome = block_on(controller.submit(&view));

        assert!(matches!(outcome, SubmitOutcome::Failed(SubmitError::Network(NetworkError::Timeout(_)))));
        assert_eq!(controller.values().text("name"), "Ana Souza");
        assert!(!controller.is_submitting());
        let calls = view.calls();
        assert!(calls.contains(&ViewCall::Notify(Toast::error(ERROR_MESSAGE))));
        assert!(!calls.contains(&ViewCall::CloseModal));
        assert_eq!(backup.len(), 1, "the lead is kept locally even when sending fails");
    }

    #[test]
    fn persistence_failure_does_not_block_submission() {
        let transport = Rc::new(ScriptedTransport::accepting());
        let controller = FormController::new(
            FormDescriptor::partnership(),
            services_with(Rc::new(MemoryBackup::failing()), transport.clone(), Rc::new(RecordingAnalytics::default())),
        );
        controller.input("name", text("Ana"));
        controller.input("email", text("ana@escola.com"));
        controller.input("phone", text("3133334444"));
        controller.input("city", text("Belo Horizonte"));
        controller.input("partnership-interest", text("medium"));
        controller.input("terms", FieldValue::Checked(true));
        let view = RecordingView::default();

        assert!(matches!(block_on(controller.submit(&view)), SubmitOutcome::Submitted));
        assert_eq!(transport.calls(), 1);
        let toasts: Vec<_> = view
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                ViewCall::Notify(t) => Some(t),
                _ => None,
            })
            .collect();
        assert_eq!(toasts, vec![Toast::success(MAIN_SUCCESS_MESSAGE)]);
        assert!(!view.calls().contains(&ViewCall::CloseModal));
    }

    #[test]
    fn lead_capture_without_content_fails_cleanly() {
        let controller = FormController::new(
            FormDescriptor::lead_capture(),
            services_with(
                Rc::new(MemoryBackup::new()),
                Rc::new(ScriptedTransport::accepting()),
                Rc::new(RecordingAnalytics::default()),
            ),
        );
        fill_lead(&controller);
        let view = RecordingView::default();
        let outcome = block_on(controller.submit(&view));
        assert!(matches!(outcome, SubmitOutcome::Failed(SubmitError::Unexpected(_))));
        assert!(!controller.is_submitting());
        assert_eq!(view.calls().last(), Some(&ViewCall::Busy(false)));
        let errors = view
            .calls()
            .iter()
            .filter(|c| matches!(c, ViewCall::Notify(t) if t.kind == ToastKind::Error))
            .count();
        assert_eq!(errors, 1);
    }

    #[test]
    fn dropping_an_in_flight_submission_releases_the_flag() {
        let (transport, _release) = GatedTransport::new();
        let controller = FormController::new(
            FormDescriptor::partner_modal(),
            services_with(Rc::new(MemoryBackup::new()), Rc::new(transport), Rc::new(RecordingAnalytics::default())),
        );
        fill_modal(&controller);
        let view = RecordingView::default();
        {
            let mut pending = Box::pin(controller.submit(&view));
            assert!((&mut pending).now_or_never().is_none());
            assert!(controller.is_submitting());
        }
        assert!(!controller.is_submitting());
        assert_eq!(view.calls().last(), Some(&ViewCall::Busy(false)));
    }

    #[test]
    fn phone_input_is_masked_and_clears_error() {
        let controller = FormController::new(
            FormDescriptor::lead_capture(),
            services_with(
                Rc::new(MemoryBackup::new()),
                Rc::new(ScriptedTransport::accepting()),
                Rc::new(RecordingAnalytics::default()),
            ),
        );
        controller.blur("whatsapp");
        assert!(controller.error_for("whatsapp").is_some());

        let shown = controller.input("whatsapp", text("1133334444"));
        assert_eq!(shown, text("(11) 3333-4444"));
        assert_eq!(controller.error_for("whatsapp"), None);
        assert!(controller.blur("whatsapp").valid);
    }

    #[test]
    fn start_and_abandon_are_tracked_once() {
        let analytics = Rc::new(RecordingAnalytics::default());
        let controller = FormController::new(
            FormDescriptor::lead_capture(),
            services_with(Rc::new(MemoryBackup::new()), Rc::new(ScriptedTransport::accepting()), analytics.clone()),
        );
        controller.focus("email");
        controller.focus("whatsapp");
        controller.abandon();
        let names = analytics.names();
        assert_eq!(names.iter().filter(|n| *n == "form_start").count(), 1);
        assert_eq!(names.iter().filter(|n| *n == "form_abandon").count(), 1);
    }
}
