//! Probes the coaching server's HTTP health endpoint.

use reqwest::Url;
use serde::Deserialize;

/// Body returned by `GET /api/health`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("Cannot derive a health URL from {0}")]
    InvalidUrl(String),
    #[error("Health request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Maps the WebSocket endpoint onto the server's HTTP health route on the
/// same host and port.
pub fn health_url(ws_url: &Url) -> Result<Url, HealthError> {
    let scheme = match ws_url.scheme() {
        "ws" => "http",
        "wss" => "https",
        _ => return Err(HealthError::InvalidUrl(ws_url.to_string())),
    };
    let mut url = ws_url.clone();
    url.set_scheme(scheme)
        .map_err(|_| HealthError::InvalidUrl(ws_url.to_string()))?;
    url.set_path("/api/health");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

pub async fn check(ws_url: &Url) -> Result<HealthStatus, HealthError> {
    let url = health_url(ws_url)?;
    tracing::debug!(%url, "Checking server health");
    let status = reqwest::get(url)
        .await?
        .error_for_status()?
        .json::<HealthStatus>()
        .await?;
    Ok(status)
}
