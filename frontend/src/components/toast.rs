use std::rc::Rc;

use yew::prelude::*;

use crate::config::TOAST_LIFETIME_MS;
use crate::timers::DelayedTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            title: "Sucesso!".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            title: "Erro".to_string(),
            message: message.into(),
        }
    }
}

pub enum ToastAction {
    Push(Toast),
    Dismiss(u32),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToastList {
    next_id: u32,
    pub items: Vec<(u32, Toast)>,
}

impl Reducible for ToastList {
    type Action = ToastAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut list = (*self).clone();
        match action {
            ToastAction::Push(toast) => {
                list.items.push((list.next_id, toast));
                list.next_id = list.next_id.wrapping_add(1);
            }
            ToastAction::Dismiss(id) => list.items.retain(|(item_id, _)| *item_id != id),
        }
        Rc::new(list)
    }
}

#[derive(Properties, PartialEq)]
struct ToastItemProps {
    id: u32,
    toast: Toast,
    on_dismiss: Callback<u32>,
}

#[function_component(ToastItem)]
fn toast_item(props: &ToastItemProps) -> Html {
    {
        let on_dismiss = props.on_dismiss.clone();
        use_effect_with_deps(
            move |id: &u32| {
                let id = *id;
                let task = DelayedTask::schedule(TOAST_LIFETIME_MS, move || on_dismiss.emit(id));
                // Unmounting early drops the task and cancels the timer.
                move || drop(task)
            },
            props.id,
        );
    }

    let (color, icon) = match props.toast.kind {
        ToastKind::Success => ("bg-green-500", "fa-check-circle"),
        ToastKind::Error => ("bg-red-500", "fa-exclamation-triangle"),
    };
    let close = {
        let on_dismiss = props.on_dismiss.clone();
        let id = props.id;
        Callback::from(move |_: MouseEvent| on_dismiss.emit(id))
    };

    html! {
        <div class={classes!("toast", color, "text-white", "px-6", "py-4", "rounded-lg", "shadow-lg", "animate-fade-in")} role="status">
            <div class="flex items-center">
                <i class={classes!("fas", icon, "mr-3", "text-xl")}></i>
                <div>
                    <div class="font-semibold">{&props.toast.title}</div>
                    <div class="text-sm opacity-90">{&props.toast.message}</div>
                </div>
                <button class="toast-close ml-4" onclick={close} aria-label="Fechar">{"✕"}</button>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ToastHostProps {
    pub items: Vec<(u32, Toast)>,
    pub on_dismiss: Callback<u32>,
}

#[function_component(ToastHost)]
pub fn toast_host(props: &ToastHostProps) -> Html {
    html! {
        <div class="toast-host fixed top-4 right-4 z-[10000] max-w-sm space-y-2">
            { for props.items.iter().map(|(id, toast)| html! {
                <ToastItem key={*id} id={*id} toast={toast.clone()} on_dismiss={props.on_dismiss.clone()} />
            }) }
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_assigns_ids_and_dismiss_removes_only_that_toast() {
        let list = Rc::new(ToastList::default());
        let list = list.reduce(ToastAction::Push(Toast::success("ok")));
        let list = list.reduce(ToastAction::Push(Toast::error("falhou")));
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].0, 0);
        assert_eq!(list.items[1].0, 1);

        let list = list.reduce(ToastAction::Dismiss(0));
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].1.kind, ToastKind::Error);

        let list = list.reduce(ToastAction::Dismiss(42));
        assert_eq!(list.items.len(), 1);
    }
}
