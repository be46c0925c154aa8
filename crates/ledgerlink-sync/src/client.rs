//! # ERP Client
//!
//! The only door to the Priority OData service.
//!
//! ## Request Shape
//! ```text
//! request(PATCH, "LOGPART", Some(body))
//!      │
//!      ▼
//! PATCH {url}/odata/Priority/{application}/{environment}/LOGPART
//!       Authorization: Basic ...      (when credentials are configured)
//!       Content-Type: application/json
//!      │
//!      ▼
//! ErpResponse { ok: 2xx, status_code, raw_body }
//!      transport failure → { ok: false, status_code: 0, raw_body: error text }
//! ```
//!
//! Failures never surface as `Err`: the engine decides what a failed
//! response means for its operation.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ErpSettings;
use crate::error::{SyncError, SyncResult};

// =============================================================================
// Request / Response
// =============================================================================

/// HTTP verbs the ERP accepts from us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErpMethod {
    Get,
    Post,
    Patch,
}

impl ErpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErpMethod::Get => "GET",
            ErpMethod::Post => "POST",
            ErpMethod::Patch => "PATCH",
        }
    }
}

impl std::fmt::Display for ErpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one ERP call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErpResponse {
    /// True for a 2xx answer.
    pub ok: bool,
    /// HTTP status, 0 when the request never got an answer.
    pub status_code: u16,
    pub raw_body: String,
}

impl ErpResponse {
    /// Response standing in for a transport failure.
    pub fn transport_failure(reason: impl Into<String>) -> Self {
        ErpResponse {
            ok: false,
            status_code: 0,
            raw_body: reason.into(),
        }
    }
}

/// Issues requests against named ERP resources.
///
/// `resource` may carry an OData query (`LOGPART?$filter=...`); `body` is
/// already-serialized JSON.
#[async_trait]
pub trait ErpClient: Send + Sync {
    async fn request(&self, method: ErpMethod, resource: &str, body: Option<&str>) -> ErpResponse;

    /// Full URL of a resource, as recorded in the request log.
    fn resource_url(&self, resource: &str) -> String;
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// reqwest-backed [`ErpClient`].
#[derive(Debug, Clone)]
pub struct HttpErpClient {
    http: Client,
    service_root: String,
    username: Option<String>,
    password: Option<String>,
}

impl HttpErpClient {
    /// Builds the client from the `[erp]` settings.
    pub fn new(settings: &ErpSettings) -> SyncResult<Self> {
        url::Url::parse(&settings.service_root())?;

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .build()
            .map_err(|e| SyncError::HttpClient(format!("Failed to build HTTP client: {e}")))?;

        Ok(HttpErpClient {
            http,
            service_root: settings.service_root(),
            username: settings.username.clone().filter(|u| !u.is_empty()),
            password: settings.password.clone(),
        })
    }

    fn method(method: ErpMethod) -> Method {
        match method {
            ErpMethod::Get => Method::GET,
            ErpMethod::Post => Method::POST,
            ErpMethod::Patch => Method::PATCH,
        }
    }
}

#[async_trait]
impl ErpClient for HttpErpClient {
    async fn request(&self, method: ErpMethod, resource: &str, body: Option<&str>) -> ErpResponse {
        let url = self.resource_url(resource);
        debug!(%method, %url, "ERP request");

        let mut request = self
            .http
            .request(Self::method(method), &url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body.to_string());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%method, %url, error = %e, "ERP transport failure");
                return ErpResponse::transport_failure(e.to_string());
            }
        };

        let status = response.status();
        let raw_body = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(%method, %url, error = %e, "Failed to read ERP response body");
                return ErpResponse::transport_failure(e.to_string());
            }
        };

        ErpResponse {
            ok: status.is_success(),
            status_code: status.as_u16(),
            raw_body,
        }
    }

    fn resource_url(&self, resource: &str) -> String {
        format!("{}{}", self.service_root, resource)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(url: &str) -> ErpSettings {
        ErpSettings {
            url: url.to_string(),
            application: "tabula.ini".into(),
            environment: "demo".into(),
            username: Some("api".into()),
            password: Some("secret".into()),
            timeout_secs: 5,
            connect_timeout_secs: 2,
        }
    }

    #[tokio::test]
    async fn test_get_with_filter_and_basic_auth() {
        let server = MockServer::start().await;

        // "api:secret" base64
        Mock::given(method("GET"))
            .and(path("/odata/Priority/tabula.ini/demo/LOGPART"))
            .and(query_param("$filter", "ROYY_ISUDATE eq 'Y'"))
            .and(header("Authorization", "Basic YXBpOnNlY3JldA=="))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"PARTNAME": "A1"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpErpClient::new(&settings(&server.uri())).unwrap();
        let response = client
            .request(ErpMethod::Get, "LOGPART?$filter=ROYY_ISUDATE eq 'Y'", None)
            .await;

        assert!(response.ok);
        assert_eq!(response.status_code, 200);
        assert!(response.raw_body.contains("A1"));
    }

    #[tokio::test]
    async fn test_patch_sends_json_body() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/odata/Priority/tabula.ini/demo/CUSTOMERS"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({"CUSTNAME": "7"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpErpClient::new(&settings(&server.uri())).unwrap();
        let response = client
            .request(ErpMethod::Patch, "CUSTOMERS", Some(r#"{"CUSTNAME":"7"}"#))
            .await;

        assert!(response.ok);
        assert_eq!(response.status_code, 204);
    }

    #[tokio::test]
    async fn test_error_status_is_not_ok() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/odata/Priority/tabula.ini/demo/ORDERS"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Customer missing"))
            .mount(&server)
            .await;

        let client = HttpErpClient::new(&settings(&server.uri())).unwrap();
        let response = client.request(ErpMethod::Post, "ORDERS", Some("{}")).await;

        assert!(!response.ok);
        assert_eq!(response.status_code, 400);
        assert_eq!(response.raw_body, "Customer missing");
    }

    #[tokio::test]
    async fn test_transport_failure_is_status_zero() {
        // Nothing listens on port 9 of localhost.
        let client = HttpErpClient::new(&settings("http://127.0.0.1:9")).unwrap();
        let response = client.request(ErpMethod::Get, "LOGPART", None).await;

        assert!(!response.ok);
        assert_eq!(response.status_code, 0);
        assert!(!response.raw_body.is_empty());
    }

    #[test]
    fn test_resource_url() {
        let client = HttpErpClient::new(&settings("https://erp.example.com/")).unwrap();
        assert_eq!(
            client.resource_url("ORDERS"),
            "https://erp.example.com/odata/Priority/tabula.ini/demo/ORDERS"
        );
        assert_eq!(
            client.resource_url(""),
            "https://erp.example.com/odata/Priority/tabula.ini/demo/"
        );
    }

    #[test]
    fn test_bad_url_is_rejected() {
        assert!(HttpErpClient::new(&settings("not a url")).is_err());
    }
}
