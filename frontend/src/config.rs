
pub const ANIMATION_DURATION_MS: u32 = 300;
pub const SCROLL_OFFSET: f64 = 80.0;
pub const CAROUSEL_AUTO_PLAY_MS: u32 = 5_000;
pub const FORM_ENDPOINT: &str = "/api/partnership-form";

pub const LEADS_STORAGE_KEY: &str = "educa_leads";
pub const REVENUE_STORAGE_KEY: &str = "escada.faturamento";
pub const TIER_STORAGE_KEY: &str = "escada.tierSelect";

pub const GUIDE_FILE_URL: &str = "/materiais/guia-parceria-educa-plus.pdf";
pub const PODCAST_URL: &str = "/materiais/podcast";

pub const TOAST_LIFETIME_MS: u32 = 5_000;
pub const MODAL_FOCUS_DELAY_MS: u32 = 300;
pub const SCROLL_DEBOUNCE_MS: u32 = 100;
pub const ANALYTICS_SCROLL_DEBOUNCE_MS: u32 = 500;
pub const TIME_ON_PAGE_CHECK_MS: u32 = 10_000;
pub const LOADING_HIDE_DELAY_MS: u32 = 500;

#[cfg(debug_assertions)]
pub fn get_backend_url() -> &'static str {
    "http://localhost:3001"  // Development URL when running locally
}

#[cfg(not(debug_assertions))]
pub fn get_backend_url() -> &'static str {
    ""  // Production URL
}

/// Outbound submission settings, fixed at build time.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionConfig {
    pub endpoint: String,
    pub timeout_ms: u32,
    pub retries: u32,
    pub retry_backoff_ms: u32,
    pub simulated_latency_ms: u32,
    /// When false the lead is only kept locally and the network call is simulated.
    pub enabled: bool,
}

impl SubmissionConfig {
    pub fn from_build() -> Self {
        let enabled = matches!(option_env!("EDUCA_API_ENABLED"), Some("1") | Some("true"));
        Self {
            endpoint: format!("{}{}", get_backend_url(), FORM_ENDPOINT),
            enabled,
            ..Self::default()
        }
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            endpoint: FORM_ENDPOINT.to_string(),
            timeout_ms: 10_000,
            retries: 3,
            retry_backoff_ms: 500,
            simulated_latency_ms: 1_500,
            enabled: false,
        }
    }
}
