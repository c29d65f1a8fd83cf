use std::rc::Rc;

use log::{info, warn};
use web_sys::window;
use yew::prelude::*;

use crate::analytics::{AnalyticsEvent, AnalyticsHandle};
use crate::browser::BrowserEnvironment;
use crate::components::lead_form::{FormHandle, LeadForm};
use crate::components::page_tracker::PageTracker;
use crate::components::toast::{ToastAction, ToastHost, ToastList};
use crate::config::{SubmissionConfig, GUIDE_FILE_URL, LEADS_STORAGE_KEY, PODCAST_URL};
use crate::forms::backup::browser_backup;
use crate::forms::descriptor::{FormCategory, FormRegistry};
use crate::forms::lead::{ContentType, LeadCaptureContent};
use crate::forms::pipeline::{FormController, FormServices};
use crate::forms::transport::transport_for;
use crate::utils::format_count;
use crate::modal::{use_modal, Modal, ModalEvent};
use crate::sections::{
    calculator::ProfitabilityCalculator, carousel::TestimonialCarousel, faq::Faq, loading::LoadingOverlay,
    projection::PartnershipLadder, scroll::{BackToTop, SectionLink}, team::TeamSection, video::VideoSection,
};

/// Figures shown under the hero.
const STATS: [(u32, &str); 3] = [(12000, "alunos formados"), (85, "polos parceiros"), (1500, "cursos de pós-graduação")];

/// Form identifiers rendered by this page.
const PAGE_FORMS: [&str; 3] = ["partnership-form", "partner-form", "leadForm"];

struct PageForms {
    main: Option<FormHandle>,
    partner: Option<FormHandle>,
    lead: Option<FormHandle>,
}

impl PageForms {
    fn build(analytics: &AnalyticsHandle) -> Self {
        let config = SubmissionConfig::from_build();
        let services = FormServices {
            backup: browser_backup(LEADS_STORAGE_KEY),
            transport: transport_for(&config),
            analytics: analytics.0.clone(),
            environment: Rc::new(BrowserEnvironment),
        };
        let registry = FormRegistry::discover(PAGE_FORMS);
        let controller = |category| {
            registry
                .by_category(category)
                .map(|descriptor| FormHandle(Rc::new(FormController::new(descriptor.clone(), services.clone()))))
        };
        if registry.is_empty() {
            warn!("No forms registered on this page");
        } else {
            info!("{} forms ready", registry.len());
        }
        Self {
            main: controller(FormCategory::Main),
            partner: controller(FormCategory::Modal),
            lead: controller(FormCategory::LeadCapture),
        }
    }

    fn all(&self) -> Vec<FormHandle> {
        [&self.main, &self.partner, &self.lead].into_iter().flatten().cloned().collect()
    }
}

fn reset_on_close(form: &Option<FormHandle>) -> Callback<()> {
    let form = form.clone();
    Callback::from(move |_| {
        if let Some(form) = &form {
            form.0.reset();
        }
    })
}

#[function_component(Home)]
pub fn home() -> Html {
    let analytics = use_memo(|_| AnalyticsHandle::default(), ());
    let forms = {
        let analytics = analytics.clone();
        use_memo(move |_| PageForms::build(&analytics), ())
    };
    let toasts = use_reducer(ToastList::default);
    let partner_modal = use_modal("partnership-form-modal", reset_on_close(&forms.partner));
    let lead_modal = use_modal("leadCaptureModal", reset_on_close(&forms.lead));

    use_effect_with_deps(
        |_| {
            if let Some(window) = window() {
                window.scroll_to_with_x_and_y(0.0, 0.0);
            }
            || ()
        },
        (),
    );

    let on_toast = {
        let toasts = toasts.dispatcher();
        Callback::from(move |toast| toasts.dispatch(ToastAction::Push(toast)))
    };
    let on_dismiss = {
        let toasts = toasts.dispatcher();
        Callback::from(move |id| toasts.dispatch(ToastAction::Dismiss(id)))
    };

    let open_partner = {
        let dispatch = partner_modal.dispatch.clone();
        let analytics = (*analytics).clone();
        Callback::from(move |_: MouseEvent| {
            analytics.track(
                AnalyticsEvent::new("cta_click", "conversion")
                    .with("cta_location", "hero")
                    .with("cta_type", "modal_open"),
            );
            dispatch.emit(ModalEvent::Trigger);
        })
    };
    let open_content = |content_type: ContentType, file_url: &'static str| {
        let dispatch = lead_modal.dispatch.clone();
        let analytics = (*analytics).clone();
        let lead = forms.lead.clone();
        Callback::from(move |_: MouseEvent| {
            analytics.track(
                AnalyticsEvent::new("floating_button_click", "engagement").with("button_type", content_type.as_str()),
            );
            if let Some(lead) = &lead {
                lead.0.set_content(Some(LeadCaptureContent {
                    content_type,
                    file_url: file_url.to_string(),
                }));
            }
            dispatch.emit(ModalEvent::Trigger);
        })
    };
    let open_guide = open_content(ContentType::Guide, GUIDE_FILE_URL);
    let open_podcast = open_content(ContentType::Podcast, PODCAST_URL);

    let render_form = |form: &Option<FormHandle>, on_modal: Callback<ModalEvent>| match form {
        Some(form) => html! { <LeadForm form={form.clone()} on_toast={on_toast.clone()} {on_modal} /> },
        None => html! {},
    };

    html! {
        <ContextProvider<AnalyticsHandle> context={(*analytics).clone()}>
            <LoadingOverlay />
            <header class="fixed top-0 inset-x-0 z-40 bg-white/95 shadow-sm">
                <nav class="container mx-auto px-4 h-20 flex items-center justify-between">
                    <span class="text-2xl font-extrabold text-educa-blue">{"Educa+"}</span>
                    <div class="hidden md:flex space-x-8 text-gray-700">
                        <SectionLink target="simulacao">{"Simulação"}</SectionLink>
                        <SectionLink target="escada-parceria">{"Escada de Parceria"}</SectionLink>
                        <SectionLink target="quem-somos">{"Quem somos"}</SectionLink>
                        <SectionLink target="depoimentos">{"Depoimentos"}</SectionLink>
                        <SectionLink target="faq">{"FAQ"}</SectionLink>
                    </div>
                    <SectionLink target="formulario-parceria" location="header" class={classes!("btn-primary", "px-6", "py-3", "rounded-lg")}>
                        {"Seja parceiro"}
                    </SectionLink>
                </nav>
            </header>

            <main class="pt-20">
                <section id="inicio" class="py-24 bg-gradient-to-br from-educa-blue to-educa-pink text-white text-center">
                    <div class="container mx-auto px-4">
                        <h1 class="text-5xl font-extrabold mb-6">{"Leve a pós-graduação Educa+ para a sua cidade"}</h1>
                        <p class="text-xl opacity-90 mb-10">{"Abra um polo parceiro e cresça com uma marca que já forma milhares de alunos."}</p>
                        <button class="bg-white text-educa-blue font-bold px-8 py-4 rounded-lg" onclick={open_partner}>
                            {"Quero ser parceiro"}
                        </button>
                    </div>
                </section>

                <section id="numeros" class="py-12 bg-white">
                    <div class="container mx-auto px-4 grid grid-cols-1 md:grid-cols-3 gap-8 text-center">
                        { for STATS.iter().map(|(value, label)| html! {
                            <div class="stat">
                                <span class="block text-4xl font-extrabold text-educa-pink">{format!("+{}", format_count(*value))}</span>
                                <span class="text-gray-600">{*label}</span>
                            </div>
                        }) }
                    </div>
                </section>

                <VideoSection />
                <ProfitabilityCalculator />
                <PartnershipLadder />
                <TeamSection />
                <TestimonialCarousel />
                <Faq />

                <section id="formulario-parceria" class="py-20 bg-gray-50">
                    <div class="container mx-auto px-4 max-w-2xl">
                        <h2 class="text-4xl font-bold text-center text-educa-blue mb-10">{"Fale com a nossa equipe"}</h2>
                        { render_form(&forms.main, Callback::noop()) }
                    </div>
                </section>
            </main>

            <footer class="py-10 bg-educa-blue text-white text-center text-sm">
                <a href="mailto:parcerias@educamais.com.br" class="underline">{"parcerias@educamais.com.br"}</a>
            </footer>

            <div class="fixed bottom-6 right-6 z-40 flex flex-col space-y-3">
                <button class="floating-btn bg-educa-pink text-white px-5 py-3 rounded-full shadow-lg" onclick={open_guide}>
                    <i class="fas fa-file-pdf mr-2"></i>{"Guia grátis"}
                </button>
                <button class="floating-btn bg-educa-blue text-white px-5 py-3 rounded-full shadow-lg" onclick={open_podcast}>
                    <i class="fas fa-podcast mr-2"></i>{"Podcast"}
                </button>
            </div>

            <Modal id="partnership-form-modal" title="Seja um parceiro Educa+" handle={partner_modal.clone()}>
                { render_form(&forms.partner, partner_modal.dispatch.clone()) }
            </Modal>
            <Modal id="leadCaptureModal" title="Receba o conteúdo no seu e-mail" handle={lead_modal.clone()}>
                { render_form(&forms.lead, lead_modal.dispatch.clone()) }
            </Modal>

            <ToastHost items={toasts.items.clone()} {on_dismiss} />
            <BackToTop />
            <PageTracker forms={forms.all()} />
        </ContextProvider<AnalyticsHandle>>
    }
}
