use std::rc::Rc;

use log::info;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::html::Scope;
use yew::prelude::*;

use crate::browser;
use crate::components::toast::Toast;
use crate::forms::descriptor::{FieldKind, FieldSpec, FormCategory};
use crate::forms::lead::ContentRedirect;
use crate::forms::pipeline::{FormController, FormView, SubmitOutcome};
use crate::forms::values::FieldValue;
use crate::modal::ModalEvent;

/// Shared controller; props compare by identity.
#[derive(Clone)]
pub struct FormHandle(pub Rc<FormController>);

impl PartialEq for FormHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Properties, PartialEq)]
pub struct LeadFormProps {
    pub form: FormHandle,
    pub on_toast: Callback<Toast>,
    /// Closes the surrounding modal, if any.
    #[prop_or_default]
    pub on_modal: Callback<ModalEvent>,
}

pub enum LeadFormMsg {
    Focus(&'static str),
    Input(&'static str, FieldValue),
    Blur(&'static str),
    Submit,
    Busy(bool),
    Refresh,
}

pub struct LeadForm {
    busy: bool,
}

struct ComponentView {
    link: Scope<LeadForm>,
    on_toast: Callback<Toast>,
    on_modal: Callback<ModalEvent>,
}

impl FormView for ComponentView {
    fn set_busy(&self, busy: bool) {
        self.link.send_message(LeadFormMsg::Busy(busy));
    }

    fn refresh(&self) {
        self.link.send_message(LeadFormMsg::Refresh);
    }

    fn notify(&self, toast: Toast) {
        self.on_toast.emit(toast);
    }

    fn close_modal(&self) {
        self.on_modal.emit(ModalEvent::Submitted);
    }

    fn open_content(&self, redirect: ContentRedirect) {
        browser::open_content(&redirect);
    }
}

fn submit_label(category: FormCategory) -> &'static str {
    match category {
        FormCategory::Main => "Quero ser parceiro",
        FormCategory::Modal => "Enviar solicitação",
        FormCategory::LeadCapture => "Receber conteúdo",
    }
}

impl LeadForm {
    fn render_field(&self, ctx: &Context<Self>, spec: &FieldSpec) -> Html {
        let controller = &ctx.props().form.0;
        let link = ctx.link();
        let name = spec.name;
        let field_id = format!("{}-{}", controller.descriptor().identifier, name);
        let error = controller.error_for(name);
        let values = controller.values();

        let onfocus = link.callback(move |_: FocusEvent| LeadFormMsg::Focus(name));
        let onblur = link.callback(move |_: FocusEvent| LeadFormMsg::Blur(name));
        let border = if error.is_some() { "border-red-500" } else { "border-gray-300" };

        let control = match spec.kind {
            FieldKind::Select => {
                let onchange = link.callback(move |e: Event| {
                    let select: HtmlSelectElement = e.target_unchecked_into();
                    LeadFormMsg::Input(name, FieldValue::Text(select.value()))
                });
                let current = values.text(name).to_string();
                html! {
                    <select id={field_id.clone()} name={name} class={classes!("form-input", "w-full", "rounded-lg", "border", border, "px-4", "py-3")}
                        {onchange} {onfocus} {onblur}>
                        <option value="" selected={current.is_empty()}>{spec.placeholder}</option>
                        { for spec.options.iter().map(|(value, label)| html! {
                            <option value={*value} selected={current == *value}>{*label}</option>
                        }) }
                    </select>
                }
            }
            FieldKind::Consent => {
                let onchange = link.callback(move |e: Event| {
                    let input: HtmlInputElement = e.target_unchecked_into();
                    LeadFormMsg::Input(name, FieldValue::Checked(input.checked()))
                });
                return html! {
                    <div class="form-field mb-4">
                        <label class="flex items-start text-sm text-gray-600">
                            <input type="checkbox" id={field_id} name={name} class="mt-1 mr-2"
                                checked={values.checked(name)} {onchange} {onfocus} {onblur} />
                            <span>{spec.label}</span>
                        </label>
                        { error_line(error) }
                    </div>
                };
            }
            FieldKind::Text | FieldKind::Email | FieldKind::Phone => {
                let input_type = match spec.kind {
                    FieldKind::Email => "email",
                    FieldKind::Phone => "tel",
                    _ => "text",
                };
                let oninput = link.callback(move |e: InputEvent| {
                    let input: HtmlInputElement = e.target_unchecked_into();
                    LeadFormMsg::Input(name, FieldValue::Text(input.value()))
                });
                html! {
                    <input type={input_type} id={field_id.clone()} name={name} placeholder={spec.placeholder}
                        class={classes!("form-input", "w-full", "rounded-lg", "border", border, "px-4", "py-3")}
                        value={values.text(name).to_string()} {oninput} {onfocus} {onblur} />
                }
            }
        };

        html! {
            <div class="form-field mb-4">
                <label for={field_id} class="block text-sm font-semibold text-gray-700 mb-1">
                    {spec.label}{ if spec.required { " *" } else { "" } }
                </label>
                { control }
                { error_line(error) }
            </div>
        }
    }
}

fn error_line(error: Option<String>) -> Html {
    match error {
        Some(message) => html! { <p class="field-error text-red-500 text-sm mt-1">{message}</p> },
        None => html! {},
    }
}

impl Component for LeadForm {
    type Message = LeadFormMsg;
    type Properties = LeadFormProps;

    fn create(ctx: &Context<Self>) -> Self {
        // A modal form can be remounted while its submission is still running.
        Self {
            busy: ctx.props().form.0.is_submitting(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let controller = ctx.props().form.0.clone();
        match msg {
            LeadFormMsg::Focus(name) => {
                controller.focus(name);
                false
            }
            LeadFormMsg::Input(name, value) => {
                controller.input(name, value);
                true
            }
            LeadFormMsg::Blur(name) => {
                controller.blur(name);
                true
            }
            LeadFormMsg::Submit => {
                let view = ComponentView {
                    link: ctx.link().clone(),
                    on_toast: ctx.props().on_toast.clone(),
                    on_modal: ctx.props().on_modal.clone(),
                };
                spawn_local(async move {
                    let outcome = controller.submit(&view).await;
                    if !matches!(outcome, SubmitOutcome::Submitted) {
                        info!("Form {} outcome: {:?}", controller.descriptor().identifier, outcome);
                    }
                });
                false
            }
            LeadFormMsg::Busy(busy) => {
                self.busy = busy;
                true
            }
            LeadFormMsg::Refresh => true,
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let descriptor = ctx.props().form.0.descriptor();
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            LeadFormMsg::Submit
        });

        html! {
            <form id={descriptor.identifier} class="lead-form" novalidate=true {onsubmit}>
                { for descriptor.fields.iter().map(|spec| self.render_field(ctx, spec)) }
                <button type="submit" disabled={self.busy}
                    class={classes!("btn-primary", "w-full", "py-4", "rounded-lg", "font-bold", self.busy.then_some("opacity-75"))}>
                    if self.busy {
                        <i class="fas fa-spinner fa-spin mr-2"></i>{"Enviando..."}
                    } else {
                        { submit_label(descriptor.category) }
                    }
                </button>
            </form>
        }
    }
}
