//! HTTP client for the digest backend's /send endpoint

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Timeout for a single backend request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Request body consumed by the backend
///
/// `preferences` is ordered: the country code comes first, followed by up
/// to four category names.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionPayload {
    pub email: String,
    pub name: String,
    pub preferences: Vec<String>,
    pub api_key: String,
    pub gmail_user: String,
    pub gmail_pass: String,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Outcome of one submission, as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryReport {
    /// Backend accepted the request; body text shown verbatim
    Sent(String),
    /// Request failed or was rejected; message shown with a fixed prefix
    Failed(String),
}

impl DeliveryReport {
    pub fn message(&self) -> &str {
        match self {
            DeliveryReport::Sent(msg) | DeliveryReport::Failed(msg) => msg,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryReport::Sent(_))
    }
}

impl From<Result<String, DeliveryError>> for DeliveryReport {
    fn from(result: Result<String, DeliveryError>) -> Self {
        match result {
            Ok(body) => DeliveryReport::Sent(body),
            Err(e) => DeliveryReport::Failed(format!("Failed to send digest: {}", e)),
        }
    }
}

pub struct DigestClient {
    endpoint: String,
    client: reqwest::Client,
}

impl DigestClient {
    /// `endpoint` is the backend base URL; the /send path is fixed
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    fn send_url(&self) -> String {
        format!("{}/send", self.endpoint.trim_end_matches('/'))
    }

    /// POST the payload and read the response body as text
    ///
    /// Any 2xx status counts as delivered; everything else is surfaced as
    /// a rejection carrying the status and the verbatim body.
    pub async fn send(&self, payload: &SubmissionPayload) -> Result<String, DeliveryError> {
        let url = self.send_url();
        tracing::info!(
            "Submitting digest request to {} (preferences: {:?})",
            url,
            payload.preferences
        );

        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("Backend response status: {}", status);

        if status.is_success() {
            Ok(body)
        } else {
            Err(DeliveryError::Rejected { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn sample_payload() -> SubmissionPayload {
        SubmissionPayload {
            email: "jon@example.com".to_string(),
            name: "Jon".to_string(),
            preferences: vec!["fr".to_string(), "World".to_string(), "Health".to_string()],
            api_key: "key-123".to_string(),
            gmail_user: "sender@gmail.com".to_string(),
            gmail_pass: "app-pass".to_string(),
        }
    }

    #[test]
    fn test_payload_wire_format() {
        let json = serde_json::to_value(sample_payload()).unwrap();

        assert_eq!(json["email"], "jon@example.com");
        assert_eq!(json["name"], "Jon");
        assert_eq!(json["api_key"], "key-123");
        assert_eq!(json["gmail_user"], "sender@gmail.com");
        assert_eq!(json["gmail_pass"], "app-pass");

        let prefs = json["preferences"].as_array().unwrap();
        assert_eq!(prefs.len(), 3);
        assert_eq!(prefs[0], "fr");
        assert_eq!(prefs[1], "World");
        assert_eq!(prefs[2], "Health");
    }

    #[tokio::test]
    async fn test_send_success_returns_body_verbatim() {
        let server = MockServer::start();
        let send_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/send")
                .header("Content-Type", "application/json")
                .json_body(serde_json::to_value(sample_payload()).unwrap());
            then.status(200).body("Email sent successfully!");
        });

        let client = DigestClient::new(server.base_url());
        let body = client.send(&sample_payload()).await.unwrap();

        send_mock.assert();
        assert_eq!(body, "Email sent successfully!");
    }

    #[tokio::test]
    async fn test_send_non_success_is_rejected_with_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/send");
            then.status(500).body("{\"error\": \"Missing required fields\"}");
        });

        let client = DigestClient::new(server.base_url());
        let err = client.send(&sample_payload()).await.unwrap_err();

        match err {
            DeliveryError::Rejected { status, body } => {
                assert_eq!(status.as_u16(), 500);
                assert!(body.contains("Missing required fields"));
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_transport_failure_is_reported() {
        // Nothing listens here; the connection is refused
        let client = DigestClient::new("http://127.0.0.1:9");
        let err = client.send(&sample_payload()).await.unwrap_err();

        assert!(matches!(err, DeliveryError::Transport(_)));
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn test_failed_report_carries_error_detail() {
        let client = DigestClient::new("http://127.0.0.1:9");
        let report: DeliveryReport = client.send(&sample_payload()).await.into();

        assert!(!report.is_sent());
        assert!(report.message().starts_with("Failed to send digest: "));
        assert!(report.message().len() > "Failed to send digest: ".len());
    }

    #[test]
    fn test_send_url_tolerates_trailing_slash() {
        let client = DigestClient::new("http://localhost:5000/");
        assert_eq!(client.send_url(), "http://localhost:5000/send");
    }
}
