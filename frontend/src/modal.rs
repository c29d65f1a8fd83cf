use std::rc::Rc;

use log::debug;
use web_sys::KeyboardEvent;
use yew::prelude::*;
use yew_hooks::prelude::*;

use crate::analytics::{use_analytics, AnalyticsEvent};
use crate::browser::{focus_first_field, lock_body_scroll};
use crate::config::MODAL_FOCUS_DELAY_MS;
use crate::timers::DelayedTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalEvent {
    Trigger,
    CloseButton,
    Backdrop,
    Escape,
    /// The embedded form was submitted successfully.
    Submitted,
}

impl ModalEvent {
    pub fn close_method(&self) -> Option<&'static str> {
        match self {
            ModalEvent::Trigger => None,
            ModalEvent::CloseButton => Some("button"),
            ModalEvent::Backdrop => Some("backdrop"),
            ModalEvent::Escape => Some("escape"),
            ModalEvent::Submitted => Some("submitted"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Opened,
    Closed,
    Unchanged,
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        matches!(self, ModalState::Open)
    }

    pub fn apply(self, event: ModalEvent) -> (ModalState, Transition) {
        match (self, event) {
            (ModalState::Closed, ModalEvent::Trigger) => (ModalState::Open, Transition::Opened),
            (ModalState::Open, ModalEvent::Trigger) => (ModalState::Open, Transition::Unchanged),
            (ModalState::Open, _) => (ModalState::Closed, Transition::Closed),
            (ModalState::Closed, _) => (ModalState::Closed, Transition::Unchanged),
        }
    }
}

fn modal_type(id: &str) -> &'static str {
    if id.contains("partnership") {
        "partnership"
    } else if id.contains("member") {
        "team_member"
    } else {
        "lead_capture"
    }
}

/// Current state plus the last transition that changed it.
///
/// Events are applied to the live state, so one that arrives after the
/// modal was already closed (a form finishing late) is a no-op.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModalMachine {
    pub state: ModalState,
    last: Option<(Transition, ModalEvent)>,
    changes: u32,
}

impl Reducible for ModalMachine {
    type Action = ModalEvent;

    fn reduce(self: Rc<Self>, event: ModalEvent) -> Rc<Self> {
        let (state, transition) = self.state.apply(event);
        if transition == Transition::Unchanged {
            return self;
        }
        Rc::new(Self {
            state,
            last: Some((transition, event)),
            changes: self.changes.wrapping_add(1),
        })
    }
}

#[derive(Clone, PartialEq)]
pub struct ModalHandle {
    pub state: ModalState,
    pub dispatch: Callback<ModalEvent>,
}

/// Open/closed state of one modal. `on_closed` runs after every close so
/// the embedded form can reset itself.
#[hook]
pub fn use_modal(id: &'static str, on_closed: Callback<()>) -> ModalHandle {
    let machine = use_reducer(ModalMachine::default);
    let analytics = use_analytics();

    {
        let last = machine.last;
        use_effect_with_deps(
            move |_| {
                match last {
                    Some((Transition::Opened, _)) => {
                        debug!("Modal {} opened", id);
                        analytics.track(
                            AnalyticsEvent::new("modal_open", "engagement")
                                .with("modal_type", modal_type(id))
                                .with("modal_id", id),
                        );
                    }
                    Some((Transition::Closed, event)) => {
                        debug!("Modal {} closed", id);
                        let mut close = AnalyticsEvent::new("modal_close", "engagement")
                            .with("modal_type", modal_type(id))
                            .with("modal_id", id);
                        if let Some(method) = event.close_method() {
                            close = close.with("close_method", method);
                        }
                        analytics.track(close);
                        on_closed.emit(());
                    }
                    _ => {}
                }
                || ()
            },
            machine.changes,
        );
    }

    let dispatcher = machine.dispatcher();
    ModalHandle {
        state: machine.state,
        dispatch: Callback::from(move |event: ModalEvent| dispatcher.dispatch(event)),
    }
}

#[derive(Properties, PartialEq)]
pub struct ModalProps {
    pub id: AttrValue,
    pub title: AttrValue,
    pub handle: ModalHandle,
    #[prop_or_default]
    pub children: Children,
}

#[function_component(Modal)]
pub fn modal(props: &ModalProps) -> Html {
    let open = props.handle.state.is_open();

    {
        let id = props.id.clone();
        use_effect_with_deps(
            move |open: &bool| {
                let open = *open;
                let focus = if open {
                    lock_body_scroll(true);
                    Some(DelayedTask::schedule(MODAL_FOCUS_DELAY_MS, move || focus_first_field(&id)))
                } else {
                    None
                };
                move || {
                    // Closing before the delay elapses cancels the focus.
                    drop(focus);
                    if open {
                        lock_body_scroll(false);
                    }
                }
            },
            open,
        );
    }

    {
        let dispatch = props.handle.dispatch.clone();
        use_event_with_window("keydown", move |e: KeyboardEvent| {
            if open && e.key() == "Escape" {
                dispatch.emit(ModalEvent::Escape);
            }
        });
    }

    let on_backdrop = {
        let dispatch = props.handle.dispatch.clone();
        Callback::from(move |e: MouseEvent| {
            // Clicks inside the dialog bubble up here too.
            if e.target() == e.current_target() {
                dispatch.emit(ModalEvent::Backdrop);
            }
        })
    };
    let on_close = {
        let dispatch = props.handle.dispatch.clone();
        Callback::from(move |_: MouseEvent| dispatch.emit(ModalEvent::CloseButton))
    };

    html! {
        <div
            id={props.id.clone()}
            class={classes!("modal-overlay", "fixed", "inset-0", "bg-black/60", "z-50", "flex", "items-center", "justify-center", (!open).then_some("hidden"))}
            aria-hidden={(!open).to_string()}
            role="dialog"
            aria-modal="true"
            onclick={on_backdrop}
        >
            <div class="modal-content bg-white rounded-2xl shadow-2xl max-w-lg w-full mx-4 p-8 relative">
                <button class="modal-close absolute top-4 right-4 text-gray-400" onclick={on_close} aria-label="Fechar">
                    <i class="fas fa-times text-xl"></i>
                </button>
                <h3 class="text-2xl font-bold text-educa-blue mb-6">{props.title.clone()}</h3>
                { for props.children.iter() }
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_opens_only_a_closed_modal() {
        assert_eq!(
            ModalState::Closed.apply(ModalEvent::Trigger),
            (ModalState::Open, Transition::Opened)
        );
        assert_eq!(
            ModalState::Open.apply(ModalEvent::Trigger),
            (ModalState::Open, Transition::Unchanged)
        );
    }

    #[test]
    fn every_close_path_closes_an_open_modal() {
        for event in [
            ModalEvent::CloseButton,
            ModalEvent::Backdrop,
            ModalEvent::Escape,
            ModalEvent::Submitted,
        ] {
            assert_eq!(ModalState::Open.apply(event), (ModalState::Closed, Transition::Closed));
            assert_eq!(
                ModalState::Closed.apply(event),
                (ModalState::Closed, Transition::Unchanged),
                "{:?} on a closed modal",
                event
            );
            assert!(event.close_method().is_some());
        }
    }

    #[test]
    fn modal_type_follows_identifier() {
        assert_eq!(modal_type("partnership-form-modal"), "partnership");
        assert_eq!(modal_type("leadCaptureModal"), "lead_capture");
        assert_eq!(modal_type("memberModal"), "team_member");
    }

    #[test]
    fn late_submission_after_manual_close_changes_nothing() {
        let machine = Rc::new(ModalMachine::default());
        let machine = machine.reduce(ModalEvent::Trigger);
        assert!(machine.state.is_open());
        let closed = machine.reduce(ModalEvent::Escape);
        assert_eq!(closed.state, ModalState::Closed);
        assert_eq!(closed.last, Some((Transition::Closed, ModalEvent::Escape)));

        // The form's success arrives after the visitor already closed it.
        let after = closed.clone().reduce(ModalEvent::Submitted);
        assert!(Rc::ptr_eq(&closed, &after));
        assert_eq!(after.changes, closed.changes);
        assert_eq!(after.last, Some((Transition::Closed, ModalEvent::Escape)));
    }

    #[test]
    fn each_real_transition_is_counted_once() {
        let machine = Rc::new(ModalMachine::default());
        let opened = machine.reduce(ModalEvent::Trigger);
        let again = opened.clone().reduce(ModalEvent::Trigger);
        assert!(Rc::ptr_eq(&opened, &again));
        let closed = again.reduce(ModalEvent::Backdrop);
        assert_eq!(closed.changes, 2);
        assert_eq!(closed.last, Some((Transition::Closed, ModalEvent::Backdrop)));
    }
}
