use yew::prelude::*;

use crate::config::{ANIMATION_DURATION_MS, LOADING_HIDE_DELAY_MS};
use crate::timers::DelayedTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingPhase {
    #[default]
    Visible,
    Fading,
    Hidden,
}

impl LoadingPhase {
    /// Next phase and how long to wait before entering it.
    pub fn next(self) -> Option<(LoadingPhase, u32)> {
        match self {
            LoadingPhase::Visible => Some((LoadingPhase::Fading, LOADING_HIDE_DELAY_MS)),
            LoadingPhase::Fading => Some((LoadingPhase::Hidden, ANIMATION_DURATION_MS)),
            LoadingPhase::Hidden => None,
        }
    }
}

#[function_component(LoadingOverlay)]
pub fn loading_overlay() -> Html {
    let phase = use_state(LoadingPhase::default);

    {
        let handle = phase.clone();
        use_effect_with_deps(
            move |phase: &LoadingPhase| {
                let task = phase
                    .next()
                    .map(|(next, delay)| DelayedTask::schedule(delay, move || handle.set(next)));
                move || drop(task)
            },
            *phase,
        );
    }

    match *phase {
        LoadingPhase::Hidden => html! {},
        current => {
            let opacity = if current == LoadingPhase::Fading { "opacity: 0;" } else { "opacity: 1;" };
            html! {
                <div id="loading-spinner" style={opacity}
                    class="fixed inset-0 z-[9999] bg-white flex items-center justify-center transition-opacity duration-300">
                    <div class="w-16 h-16 border-4 border-educa-pink border-t-transparent rounded-full animate-spin"></div>
                </div>
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fades_then_disappears() {
        assert_eq!(LoadingPhase::Visible.next(), Some((LoadingPhase::Fading, 500)));
        assert_eq!(LoadingPhase::Fading.next(), Some((LoadingPhase::Hidden, 300)));
        assert_eq!(LoadingPhase::Hidden.next(), None);
    }
}
