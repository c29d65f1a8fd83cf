use std::rc::Rc;

use futures::future::{select, Either, FutureExt, LocalBoxFuture};
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::lead::LeadRecord;
use crate::config::SubmissionConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("no response within {0} ms")]
    Timeout(u32),
    #[error("submission rejected: {0}")]
    Rejected(String),
}

impl NetworkError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::Request(_) | NetworkError::Timeout(_) => true,
            NetworkError::Status(status) => *status >= 500,
            NetworkError::Rejected(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmissionResponse {
    #[serde(default = "accepted_by_default")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn accepted_by_default() -> bool {
    true
}

impl SubmissionResponse {
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: None,
        }
    }
}

pub type SendFuture = LocalBoxFuture<'static, Result<SubmissionResponse, NetworkError>>;

pub trait LeadTransport {
    fn send(&self, record: &LeadRecord) -> SendFuture;
}

/// Stand-in used while the lead API is switched off: waits, then accepts.
pub struct SimulatedTransport {
    latency_ms: u32,
}

impl SimulatedTransport {
    pub fn new(latency_ms: u32) -> Self {
        Self { latency_ms }
    }
}

impl LeadTransport for SimulatedTransport {
    fn send(&self, _record: &LeadRecord) -> SendFuture {
        let latency_ms = self.latency_ms;
        async move {
            TimeoutFuture::new(latency_ms).await;
            Ok(SubmissionResponse::accepted())
        }
        .boxed_local()
    }
}

pub struct HttpTransport {
    endpoint: String,
    timeout_ms: u32,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout_ms: u32) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_ms,
        }
    }
}

async fn post_lead(endpoint: String, body: Value) -> Result<SubmissionResponse, NetworkError> {
    let response = Request::post(&endpoint)
        .json(&body)
        .map_err(|e| NetworkError::Request(e.to_string()))?
        .send()
        .await
        .map_err(|e| NetworkError::Request(e.to_string()))?;

    if !response.ok() {
        return Err(NetworkError::Status(response.status()));
    }

    // An empty or non-JSON 2xx body still counts as accepted.
    let parsed = response
        .json::<SubmissionResponse>()
        .await
        .unwrap_or_else(|_| SubmissionResponse::accepted());
    if parsed.success {
        Ok(parsed)
    } else {
        Err(NetworkError::Rejected(parsed.message.unwrap_or_default()))
    }
}

impl LeadTransport for HttpTransport {
    fn send(&self, record: &LeadRecord) -> SendFuture {
        let endpoint = self.endpoint.clone();
        let timeout_ms = self.timeout_ms;
        let body = serde_json::to_value(record);
        async move {
            let body = body.map_err(|e| NetworkError::Request(e.to_string()))?;
            let request = Box::pin(post_lead(endpoint, body));
            let timer = Box::pin(TimeoutFuture::new(timeout_ms));
            match select(request, timer).await {
                Either::Left((result, _)) => result,
                Either::Right(_) => Err(NetworkError::Timeout(timeout_ms)),
            }
        }
        .boxed_local()
    }
}

pub type Backoff = Rc<dyn Fn(u32) -> LocalBoxFuture<'static, ()>>;

/// Retries transient failures up to `retries` extra times.
pub struct RetryingTransport {
    inner: Rc<dyn LeadTransport>,
    retries: u32,
    backoff: Backoff,
}

impl RetryingTransport {
    pub fn new(inner: Rc<dyn LeadTransport>, retries: u32, backoff: Backoff) -> Self {
        Self {
            inner,
            retries,
            backoff,
        }
    }

    /// Waits `step_ms * attempt` between attempts.
    pub fn linear_backoff(step_ms: u32) -> Backoff {
        Rc::new(move |attempt| TimeoutFuture::new(step_ms.saturating_mul(attempt)).boxed_local())
    }
}

impl LeadTransport for RetryingTransport {
    fn send(&self, record: &LeadRecord) -> SendFuture {
        let inner = self.inner.clone();
        let backoff = self.backoff.clone();
        let retries = self.retries;
        let record = record.clone();
        async move {
            let mut attempt = 0;
            loop {
                match inner.send(&record).await {
                    Ok(response) => return Ok(response),
                    Err(e) if attempt < retries && e.is_retryable() => {
                        attempt += 1;
                        warn!("Lead submission failed ({}), retry {}/{}", e, attempt, retries);
                        backoff(attempt).await;
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        .boxed_local()
    }
}

pub fn transport_for(config: &SubmissionConfig) -> Rc<dyn LeadTransport> {
    if config.enabled {
        info!("Submitting leads to {}", config.endpoint);
        let http: Rc<dyn LeadTransport> = Rc::new(HttpTransport::new(config.endpoint.clone(), config.timeout_ms));
        Rc::new(RetryingTransport::new(
            http,
            config.retries,
            RetryingTransport::linear_backoff(config.retry_backoff_ms),
        ))
    } else {
        info!("Lead API disabled, submissions are simulated");
        Rc::new(SimulatedTransport::new(config.simulated_latency_ms))
    }
}
