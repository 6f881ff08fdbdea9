//! Reachability checks for external URLs.

use std::time::Duration;
use ureq::Agent;

/// Answers whether an external URL is reachable.
pub trait UrlChecker {
    /// `Ok` when the URL answers with a success or redirect status, else a
    /// short reason (`HTTP 404`, a transport error).
    fn check(&self, url: &str) -> Result<(), String>;
}

/// Blocking HEAD requests with a fixed per-request timeout.
pub struct HttpChecker {
    agent: Agent,
}

impl HttpChecker {
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl UrlChecker for HttpChecker {
    fn check(&self, url: &str) -> Result<(), String> {
        let response = self.agent.head(url).call().map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        tracing::debug!(url, status, "Checked external URL");
        status_result(status)
    }
}

/// 2xx and 3xx pass, everything else fails.
fn status_result(status: u16) -> Result<(), String> {
    if (200..400).contains(&status) {
        Ok(())
    } else {
        Err(format!("HTTP {status}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_and_redirect_statuses_pass() {
        assert!(status_result(200).is_ok());
        assert!(status_result(204).is_ok());
        assert!(status_result(301).is_ok());
        assert!(status_result(399).is_ok());
    }

    #[test]
    fn client_and_server_errors_fail() {
        assert_eq!(status_result(404), Err("HTTP 404".to_string()));
        assert_eq!(status_result(500), Err("HTTP 500".to_string()));
        assert_eq!(status_result(199), Err("HTTP 199".to_string()));
    }

    #[test]
    fn unreachable_host_is_an_error() {
        let checker = HttpChecker::new(Duration::from_millis(500));
        assert!(checker.check("http://127.0.0.1:9/").is_err());
    }
}
