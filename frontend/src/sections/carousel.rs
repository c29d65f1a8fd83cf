use std::rc::Rc;

use web_sys::{KeyboardEvent, TouchEvent};
use yew::prelude::*;
use yew_hooks::prelude::*;

use crate::analytics::{use_analytics, AnalyticsEvent};
use crate::config::CAROUSEL_AUTO_PLAY_MS;

/// Horizontal travel a touch needs before it counts as a swipe.
pub const SWIPE_THRESHOLD_PX: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    index: usize,
    len: usize,
}

pub enum CarouselAction {
    Next,
    Previous,
    GoTo(usize),
    Swipe { start_x: f64, end_x: f64 },
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(self) -> Self {
        if self.len == 0 {
            return self;
        }
        Self {
            index: (self.index + 1) % self.len,
            ..self
        }
    }

    pub fn previous(self) -> Self {
        if self.len == 0 {
            return self;
        }
        let index = if self.index == 0 { self.len - 1 } else { self.index - 1 };
        Self { index, ..self }
    }

    /// Out of range indices are ignored.
    pub fn go_to(self, index: usize) -> Self {
        if index < self.len {
            Self { index, ..self }
        } else {
            self
        }
    }

    /// Swiping left advances, swiping right goes back.
    pub fn swipe(self, start_x: f64, end_x: f64) -> Self {
        let diff = start_x - end_x;
        if diff.abs() <= SWIPE_THRESHOLD_PX {
            self
        } else if diff > 0.0 {
            self.next()
        } else {
            self.previous()
        }
    }
}

impl Reducible for Carousel {
    type Action = CarouselAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let current = *self;
        let next = match action {
            CarouselAction::Next => current.next(),
            CarouselAction::Previous => current.previous(),
            CarouselAction::GoTo(index) => current.go_to(index),
            CarouselAction::Swipe { start_x, end_x } => current.swipe(start_x, end_x),
        };
        if next == current {
            self
        } else {
            Rc::new(next)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Testimonial {
    pub quote: &'static str,
    pub author: &'static str,
    pub role: &'static str,
}

pub const TESTIMONIALS: &[Testimonial] = &[
    Testimonial {
        quote: "Em um ano de parceria dobramos o número de alunos da pós-graduação sem precisar montar uma estrutura nova.",
        author: "Mariana Lopes",
        role: "Diretora, Polo Belo Horizonte",
    },
    Testimonial {
        quote: "O suporte comercial e pedagógico faz toda a diferença. Nossa equipe sabe exatamente o que oferecer.",
        author: "Ricardo Almeida",
        role: "Coordenador, Polo Campinas",
    },
    Testimonial {
        quote: "A comissão é transparente e os repasses chegam em dia. Recomendo para qualquer escola que queira crescer.",
        author: "Fernanda Castro",
        role: "Mantenedora, Polo Recife",
    },
];

#[function_component(TestimonialCarousel)]
pub fn testimonial_carousel() -> Html {
    let carousel = use_reducer(|| Carousel::new(TESTIMONIALS.len()));
    let touch_start = use_mut_ref(|| 0.0_f64);
    let analytics = use_analytics();

    {
        let carousel = carousel.dispatcher();
        use_interval(move || carousel.dispatch(CarouselAction::Next), CAROUSEL_AUTO_PLAY_MS);
    }

    {
        let carousel = carousel.dispatcher();
        use_event_with_window("keydown", move |e: KeyboardEvent| match e.key().as_str() {
            "ArrowLeft" => carousel.dispatch(CarouselAction::Previous),
            "ArrowRight" => carousel.dispatch(CarouselAction::Next),
            _ => {}
        });
    }

    use_effect_update_with_deps(
        move |index: &usize| {
            analytics.track(AnalyticsEvent::new("testimonial_view", "engagement").with("testimonial_index", *index));
            || ()
        },
        carousel.index(),
    );

    let ontouchstart = {
        let touch_start = touch_start.clone();
        Callback::from(move |e: TouchEvent| {
            if let Some(touch) = e.touches().get(0) {
                *touch_start.borrow_mut() = touch.client_x() as f64;
            }
        })
    };
    let ontouchend = {
        let carousel = carousel.dispatcher();
        Callback::from(move |e: TouchEvent| {
            if let Some(touch) = e.changed_touches().get(0) {
                carousel.dispatch(CarouselAction::Swipe {
                    start_x: *touch_start.borrow(),
                    end_x: touch.client_x() as f64,
                });
            }
        })
    };
    let previous = {
        let carousel = carousel.dispatcher();
        Callback::from(move |_: MouseEvent| carousel.dispatch(CarouselAction::Previous))
    };
    let next = {
        let carousel = carousel.dispatcher();
        Callback::from(move |_: MouseEvent| carousel.dispatch(CarouselAction::Next))
    };

    let offset = format!("transform: translateX(-{}%);", carousel.index() * 100);

    html! {
        <section id="depoimentos" class="py-20 bg-gray-50">
            <div class="container mx-auto px-4">
                <h2 class="text-4xl font-bold text-center text-educa-blue mb-12">{"O que dizem nossos parceiros"}</h2>
                <div class="relative overflow-hidden max-w-3xl mx-auto">
                    <div id="testimonial-carousel" class="flex transition-transform duration-500" style={offset} {ontouchstart} {ontouchend}>
                        { for TESTIMONIALS.iter().map(|t| html! {
                            <div class="w-full flex-shrink-0 px-8 text-center">
                                <p class="text-xl italic text-gray-700 mb-6">{format!("\u{201c}{}\u{201d}", t.quote)}</p>
                                <p class="font-bold text-educa-blue">{t.author}</p>
                                <p class="text-sm text-gray-500">{t.role}</p>
                            </div>
                        }) }
                    </div>
                    <button id="prev-testimonial" class="absolute left-0 top-1/2 -translate-y-1/2" onclick={previous} aria-label="Anterior">
                        <i class="fas fa-chevron-left"></i>
                    </button>
                    <button id="next-testimonial" class="absolute right-0 top-1/2 -translate-y-1/2" onclick={next} aria-label="Próximo">
                        <i class="fas fa-chevron-right"></i>
                    </button>
                </div>
                <div class="flex justify-center mt-8 space-x-2">
                    { for (0..TESTIMONIALS.len()).map(|i| {
                        let dispatcher = carousel.dispatcher();
                        let color = if i == carousel.index() { "bg-educa-pink" } else { "bg-gray-300" };
                        html! {
                            <button class={classes!("testimonial-indicator", "w-3", "h-3", "rounded-full", color)}
                                onclick={Callback::from(move |_: MouseEvent| dispatcher.dispatch(CarouselAction::GoTo(i)))}
                                aria-label={format!("Depoimento {}", i + 1)}></button>
                        }
                    }) }
                </div>
            </div>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_wraps_around() {
        let carousel = Carousel::new(3);
        assert_eq!(carousel.previous().index(), 2);
        assert_eq!(carousel.next().next().next().index(), 0);
        assert_eq!(carousel.go_to(2).next().index(), 0);
    }

    #[test]
    fn go_to_ignores_out_of_range() {
        let carousel = Carousel::new(3).go_to(1);
        assert_eq!(carousel.go_to(7).index(), 1);
    }

    #[test]
    fn swipe_needs_more_than_threshold() {
        let carousel = Carousel::new(3).go_to(1);
        assert_eq!(carousel.swipe(200.0, 150.0).index(), 1, "exactly 50px is not a swipe");
        assert_eq!(carousel.swipe(200.0, 100.0).index(), 2);
        assert_eq!(carousel.swipe(100.0, 200.0).index(), 0);
    }

    #[test]
    fn empty_carousel_stays_put() {
        let carousel = Carousel::new(0);
        assert_eq!(carousel.next().index(), 0);
        assert_eq!(carousel.previous().index(), 0);
    }
}
