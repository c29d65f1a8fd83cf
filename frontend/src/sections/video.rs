use log::warn;
use web_sys::HtmlVideoElement;
use yew::prelude::*;

use crate::analytics::{use_analytics, AnalyticsEvent, MilestoneTracker};

pub const VIDEO_TITLE: &str = "Vinheta Educa+";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoState {
    /// Poster shown, video hidden and rewound.
    #[default]
    Poster,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCommand {
    Play,
    Pause,
}

impl VideoState {
    /// Play/pause button or a click on the video itself.
    pub fn toggle(self) -> (VideoState, VideoCommand) {
        match self {
            VideoState::Playing => (VideoState::Paused, VideoCommand::Pause),
            VideoState::Poster | VideoState::Paused => (VideoState::Playing, VideoCommand::Play),
        }
    }

    pub fn ended(self) -> VideoState {
        VideoState::Poster
    }

    pub fn overlay_visible(&self, hovering: bool) -> bool {
        !matches!(self, VideoState::Playing) || hovering
    }
}

/// Whole percent watched; 0 while the duration is unknown.
pub fn watched_percent(current_time: f64, duration: f64) -> u32 {
    if !duration.is_finite() || duration <= 0.0 {
        return 0;
    }
    ((current_time / duration) * 100.0).round().clamp(0.0, 100.0) as u32
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoTracking {
    started: bool,
    progress: MilestoneTracker,
}

impl Default for VideoTracking {
    fn default() -> Self {
        Self {
            started: false,
            progress: MilestoneTracker::video_progress(),
        }
    }
}

impl VideoTracking {
    /// True only for the first play of the page.
    pub fn on_play(&mut self) -> bool {
        !std::mem::replace(&mut self.started, true)
    }

    pub fn on_time_update(&mut self, percent: u32) -> Vec<u32> {
        self.progress.observe(percent)
    }
}

#[function_component(VideoSection)]
pub fn video_section() -> Html {
    let video_ref = use_node_ref();
    let state = use_state(VideoState::default);
    let hovering = use_state(|| false);
    let tracking = use_mut_ref(VideoTracking::default);
    let analytics = use_analytics();

    let toggle = {
        let video_ref = video_ref.clone();
        let state = state.clone();
        Callback::from(move |_: MouseEvent| {
            let Some(video) = video_ref.cast::<HtmlVideoElement>() else {
                return;
            };
            let (next, command) = (*state).toggle();
            match command {
                VideoCommand::Play => {
                    if video.play().is_err() {
                        warn!("Video playback was refused");
                        return;
                    }
                }
                VideoCommand::Pause => {
                    let _ = video.pause();
                }
            }
            state.set(next);
        })
    };

    let onplay = {
        let tracking = tracking.clone();
        let analytics = analytics.clone();
        let video_ref = video_ref.clone();
        Callback::from(move |_: Event| {
            if tracking.borrow_mut().on_play() {
                let duration = video_ref.cast::<HtmlVideoElement>().map(|v| v.duration()).unwrap_or(0.0);
                analytics.track(
                    AnalyticsEvent::new("video_start", "engagement")
                        .with("video_title", VIDEO_TITLE)
                        .with("video_duration", if duration.is_finite() { duration } else { 0.0 }),
                );
            }
        })
    };
    let onpause = {
        let analytics = analytics.clone();
        let video_ref = video_ref.clone();
        Callback::from(move |_: Event| {
            if let Some(video) = video_ref.cast::<HtmlVideoElement>() {
                analytics.track(
                    AnalyticsEvent::new("video_pause", "engagement")
                        .with("video_title", VIDEO_TITLE)
                        .with("video_current_time", video.current_time())
                        .with("video_percent", watched_percent(video.current_time(), video.duration())),
                );
            }
        })
    };
    let ontimeupdate = {
        let analytics = analytics.clone();
        let video_ref = video_ref.clone();
        Callback::from(move |_: Event| {
            if let Some(video) = video_ref.cast::<HtmlVideoElement>() {
                let percent = watched_percent(video.current_time(), video.duration());
                for quarter in tracking.borrow_mut().on_time_update(percent) {
                    analytics.track(
                        AnalyticsEvent::new("video_progress", "engagement")
                            .with("video_title", VIDEO_TITLE)
                            .with("video_percent", quarter),
                    );
                }
            }
        })
    };
    let onended = {
        let state = state.clone();
        let video_ref = video_ref.clone();
        Callback::from(move |_: Event| {
            if let Some(video) = video_ref.cast::<HtmlVideoElement>() {
                video.set_current_time(0.0);
                analytics.track(
                    AnalyticsEvent::new("video_complete", "engagement")
                        .with("video_title", VIDEO_TITLE)
                        .with("video_duration", video.duration()),
                );
            }
            state.set(state.ended());
        })
    };
    let onmouseenter = {
        let hovering = hovering.clone();
        Callback::from(move |_: MouseEvent| hovering.set(true))
    };
    let onmouseleave = {
        let hovering = hovering.clone();
        Callback::from(move |_: MouseEvent| hovering.set(false))
    };

    let showing_poster = *state == VideoState::Poster;
    let overlay_hidden = !state.overlay_visible(*hovering);
    let (icon, title) = if *state == VideoState::Playing {
        ("fas fa-pause text-educa-pink text-xl", "Pausar Vídeo")
    } else {
        ("fas fa-play text-educa-pink text-xl ml-1", "Reproduzir Vídeo")
    };

    html! {
        <section id="video" class="py-20 bg-educa-blue">
            <div class="container mx-auto px-4">
                <div class="relative max-w-4xl mx-auto rounded-2xl overflow-hidden shadow-2xl aspect-video"
                    onmouseenter={onmouseenter} onmouseleave={onmouseleave}>
                    <img id="video-poster" src="/assets/video-poster.jpg" alt={VIDEO_TITLE}
                        class={classes!("w-full", "h-full", "object-cover", (!showing_poster).then_some("hidden"))} />
                    <video id="main-video" ref={video_ref} src="/assets/vinheta-educa.mp4" preload="metadata"
                        class={classes!("w-full", "h-full", showing_poster.then_some("hidden"))}
                        onclick={toggle.clone()} {onplay} {onpause} {ontimeupdate} {onended}>
                    </video>
                    <div id="video-overlay"
                        class={classes!("absolute", "inset-0", "flex", "items-center", "justify-center", "bg-black/30", "transition-opacity", overlay_hidden.then_some("opacity-0"), overlay_hidden.then_some("pointer-events-none"))}>
                        <button id="play-button" class="w-20 h-20 rounded-full bg-white flex items-center justify-center" {title} onclick={toggle}>
                            <i class={icon}></i>
                        </button>
                    </div>
                </div>
            </div>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_alternates_play_and_pause() {
        let (state, command) = VideoState::Poster.toggle();
        assert_eq!((state, command), (VideoState::Playing, VideoCommand::Play));
        let (state, command) = state.toggle();
        assert_eq!((state, command), (VideoState::Paused, VideoCommand::Pause));
        assert_eq!(state.toggle().0, VideoState::Playing);
        assert_eq!(VideoState::Playing.ended(), VideoState::Poster);
    }

    #[test]
    fn overlay_hides_only_while_playing_without_hover() {
        assert!(VideoState::Paused.overlay_visible(false));
        assert!(!VideoState::Playing.overlay_visible(false));
        assert!(VideoState::Playing.overlay_visible(true));
    }

    #[test]
    fn percent_is_zero_until_duration_known() {
        assert_eq!(watched_percent(3.0, f64::NAN), 0);
        assert_eq!(watched_percent(3.0, 0.0), 0);
        assert_eq!(watched_percent(15.0, 60.0), 25);
    }

    #[test]
    fn start_fires_once_and_quarters_once() {
        let mut tracking = VideoTracking::default();
        assert!(tracking.on_play());
        assert!(!tracking.on_play());
        assert_eq!(tracking.on_time_update(30), vec![25]);
        assert_eq!(tracking.on_time_update(80), vec![50, 75]);
        assert!(tracking.on_time_update(100).is_empty());
    }
}
