use yew::prelude::*;

use crate::analytics::{use_analytics, AnalyticsEvent};

/// At most one entry is expanded at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Accordion {
    open: Option<usize>,
}

impl Accordion {
    #[cfg(test)]
    pub fn open(&self) -> Option<usize> {
        self.open
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.open == Some(index)
    }

    /// Returns the new state and whether `index` was just opened.
    pub fn toggle(self, index: usize) -> (Self, bool) {
        if self.is_open(index) {
            (Self { open: None }, false)
        } else {
            (Self { open: Some(index) }, true)
        }
    }
}

pub const QUESTIONS: &[(&str, &str)] = &[
    (
        "Preciso ter experiência com educação para ser parceiro?",
        "Não. Oferecemos treinamento completo e acompanhamento da nossa equipe desde o primeiro dia.",
    ),
    (
        "Qual é o investimento inicial?",
        "Não há taxa de franquia. O investimento se resume à estrutura física do polo e à equipe comercial.",
    ),
    (
        "Como funciona a comissão?",
        "O parceiro recebe uma porcentagem sobre o faturamento das matrículas, que cresce conforme o polo sobe na escada de parceria.",
    ),
    (
        "Quanto tempo leva para o polo começar a operar?",
        "Em média 30 dias entre a assinatura do contrato e a abertura das primeiras turmas.",
    ),
];

#[function_component(Faq)]
pub fn faq() -> Html {
    let accordion = use_state(Accordion::default);
    let analytics = use_analytics();

    html! {
        <section id="faq" class="py-20 bg-white">
            <div class="container mx-auto px-4 max-w-3xl">
                <h2 class="text-4xl font-bold text-center text-educa-blue mb-12">{"Perguntas frequentes"}</h2>
                { for QUESTIONS.iter().enumerate().map(|(index, (question, answer))| {
                    let is_open = accordion.is_open(index);
                    let onclick = {
                        let accordion = accordion.clone();
                        let analytics = analytics.clone();
                        let question = *question;
                        Callback::from(move |_: MouseEvent| {
                            let (next, opened) = (*accordion).toggle(index);
                            if opened {
                                analytics.track(AnalyticsEvent::new("faq_open", "engagement").with("faq_question", question));
                            }
                            accordion.set(next);
                        })
                    };
                    let rotation = if is_open { "transform: rotate(180deg);" } else { "transform: rotate(0deg);" };
                    html! {
                        <div class="border-b border-gray-200">
                            <button class="faq-button w-full flex justify-between items-center py-5 text-left" {onclick}
                                aria-expanded={is_open.to_string()}>
                                <h3 class="text-lg font-semibold text-gray-800">{*question}</h3>
                                <i class="fas fa-chevron-down text-educa-pink transition-transform" style={rotation}></i>
                            </button>
                            <div class={classes!("faq-content", "pb-5", "text-gray-600", (!is_open).then_some("hidden"))}>
                                {*answer}
                            </div>
                        </div>
                    }
                }) }
            </div>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_one_entry_closes_the_other() {
        let (accordion, opened) = Accordion::default().toggle(1);
        assert!(opened);
        let (accordion, opened) = accordion.toggle(3);
        assert!(opened);
        assert_eq!(accordion.open(), Some(3));
        assert!(!accordion.is_open(1));
    }

    #[test]
    fn toggling_the_open_entry_closes_it() {
        let (accordion, _) = Accordion::default().toggle(2);
        let (accordion, opened) = accordion.toggle(2);
        assert!(!opened);
        assert_eq!(accordion.open(), None);
    }
}
