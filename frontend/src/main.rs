use log::{info, Level};
use yew::prelude::*;

mod analytics;
mod browser;
mod config;
mod modal;
mod timers;
mod utils;
mod forms {
    pub mod backup;
    pub mod descriptor;
    pub mod lead;
    pub mod pipeline;
    pub mod transport;
    pub mod validation;
    pub mod values;
    #[cfg(test)]
    pub mod testing;
}
mod components {
    pub mod lead_form;
    pub mod page_tracker;
    pub mod toast;
}
mod sections {
    pub mod calculator;
    pub mod carousel;
    pub mod faq;
    pub mod loading;
    pub mod projection;
    pub mod scroll;
    pub mod team;
    pub mod video;
}
mod pages {
    pub mod home;
}

use pages::home::Home;

#[function_component]
fn App() -> Html {
    html! { <Home /> }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(Level::Info).expect("error initializing log");

    info!("Starting Educa+ landing page");
    yew::Renderer::<App>::new().render();
}
