use async_trait::async_trait;
use hyper::ext::ReasonPhrase;
use reqwest::{Response, StatusCode};
use std::error::Error as StdError;
use std::time::{Duration, Instant};

use super::types::ProbeOutcome;

/// Upper bound for a single probe, connection setup included
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

pub const USER_AGENT: &str = "Kokoromi-API-Monitor/1.0";

/// Performs one health check against a URL.
///
/// Implementations never fail: transport problems are folded into a
/// `down` outcome so callers can persist every result the same way.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

/// Probes targets with a plain HTTP GET
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new() -> reqwest::Result<Self> {
        Self::with_timeout(PROBE_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).user_agent(USER_AGENT).build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        let start = Instant::now();

        match self.client.get(url).send().await {
            Ok(response) => {
                let elapsed = start.elapsed().as_millis() as u64;
                classify(response.status(), reason_phrase(&response).as_deref(), elapsed)
            }
            Err(e) => {
                let elapsed = start.elapsed().as_millis() as u64;
                ProbeOutcome::down(Some(elapsed), describe_error(&e))
            }
        }
    }
}

/// Map an HTTP status onto a health status.
///
/// 2xx and 3xx are healthy, 5xx is an outage and everything else below
/// 500 is reported as a warning. `reason` is the phrase the server sent;
/// without one the canonical phrase for the code is used.
pub fn classify(status: StatusCode, reason: Option<&str>, response_time_ms: u64) -> ProbeOutcome {
    if status.is_success() || status.is_redirection() {
        return ProbeOutcome::up(response_time_ms);
    }

    let reason = reason
        .filter(|r| !r.trim().is_empty())
        .or_else(|| status.canonical_reason())
        .unwrap_or("Unknown");
    let error = format!("HTTP {}: {}", status.as_u16(), reason);
    if status.is_server_error() {
        ProbeOutcome::down(Some(response_time_ms), error)
    } else {
        ProbeOutcome::warning(response_time_ms, error)
    }
}

/// hyper only records the phrase when it differs from the canonical one
fn reason_phrase(response: &Response) -> Option<String> {
    response
        .extensions()
        .get::<ReasonPhrase>()
        .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned())
}

/// reqwest keeps the useful part ("connection refused", "operation timed
/// out") in the source chain, so flatten it into one line.
fn describe_error(error: &reqwest::Error) -> String {
    let mut message = if error.is_timeout() {
        format!("request timed out: {error}")
    } else {
        error.to_string()
    };

    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
