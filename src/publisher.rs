use crate::error::PublishError;
use crate::record::EventRecord;
use crate::signature::{self, SigningContext};
use crate::sink::EventSink;
use chrono::Utc;
use reqwest::blocking::Client;
use reqwest::StatusCode;

/// Data Collector API version sent as the `api-version` query parameter.
pub const DEFAULT_API_VERSION: &str = "2016-04-01";

/// Configuration for [`AzurePublisher`].
///
/// All values are fixed at construction; the publisher never mutates them
/// and an in-flight publish never observes a change.
#[derive(Clone, Debug)]
pub struct AzureConfig {
    /// Workspace (customer) id, also the subdomain of the ingestion host.
    pub customer_id: String,
    /// Base64-encoded shared secret.
    pub shared_key: String,
    /// `Log-Type` header value; names the target custom log table.
    pub log_type: String,
    /// API version, [`DEFAULT_API_VERSION`] unless overridden.
    pub api_version: String,
    /// Base URL override without trailing slash, e.g. for sovereign-cloud
    /// domains or a local test server. `None` selects
    /// `https://{customer_id}.ods.opinsights.azure.com`.
    pub endpoint: Option<String>,
}

impl AzureConfig {
    pub fn new(
        customer_id: impl Into<String>,
        shared_key: impl Into<String>,
        log_type: impl Into<String>,
    ) -> Self {
        AzureConfig {
            customer_id: customer_id.into(),
            shared_key: shared_key.into(),
            log_type: log_type.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            endpoint: None,
        }
    }
}

/// [`EventSink`] implementation that delivers each record to the Azure
/// Log Analytics HTTP Data Collector endpoint with a signed POST.
///
/// One blocking request per record; no queue, no batching, no retry. A
/// caller wanting bounded latency should set a timeout on the client via
/// [`AzurePublisher::with_client`].
#[derive(Clone)]
pub struct AzurePublisher {
    client: Client,
    config: AzureConfig,
}

impl AzurePublisher {
    /// Construct a publisher with a default HTTP client (no timeout).
    pub fn new(config: AzureConfig) -> Self {
        AzurePublisher {
            client: Client::new(),
            config,
        }
    }

    /// Construct a publisher with a caller-built client, e.g. one with a
    /// transport-level timeout.
    pub fn with_client(config: AzureConfig, client: Client) -> Self {
        AzurePublisher { client, config }
    }

    fn endpoint(&self) -> String {
        let base = match &self.config.endpoint {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}.ods.opinsights.azure.com",
                self.config.customer_id
            ),
        };
        format!(
            "{}{}?api-version={}",
            base,
            signature::RESOURCE_PATH,
            urlencoding::encode(&self.config.api_version)
        )
    }
}

impl EventSink for AzurePublisher {
    fn publish(&self, record: &EventRecord) -> Result<(), PublishError> {
        if self.config.customer_id.is_empty() {
            return Err(PublishError::Configuration(
                "customer id is empty".to_string(),
            ));
        }

        let body = serde_json::to_vec(record)?;

        // One timestamp shared by the header and the signature. The
        // signature covers the byte length of the body as transmitted.
        let x_ms_date = signature::rfc1123(Utc::now());
        let authorization = SigningContext {
            customer_id: &self.config.customer_id,
            shared_key: &self.config.shared_key,
            x_ms_date: &x_ms_date,
            content_length: body.len(),
        }
        .authorization()?;

        let resp = self
            .client
            .post(self.endpoint())
            .header("Content-Type", signature::CONTENT_TYPE)
            .header("Log-Type", self.config.log_type.as_str())
            .header("x-ms-date", x_ms_date.as_str())
            .header("Authorization", authorization)
            .body(body)
            .send()?;

        let status = resp.status();
        if status == StatusCode::OK || status == StatusCode::ACCEPTED {
            return Ok(());
        }

        let detail = resp
            .text()
            .unwrap_or_else(|_| "<no body>".to_string());
        Err(PublishError::Rejected {
            status: status.as_u16(),
            detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawEvent;
    use httpmock::MockServer;

    const ZERO_KEY: &str =
        "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA==";

    fn sample_record() -> EventRecord {
        EventRecord::new(RawEvent {
            level_value: 40_000,
            level_name: "INFO".to_string(),
            logger_name: "demo".to_string(),
            rendered_message: "hello café".to_string(),
            ..Default::default()
        })
    }

    fn config_for(server: &MockServer) -> AzureConfig {
        let mut config = AzureConfig::new("test-workspace", ZERO_KEY, "TestLog");
        config.endpoint = Some(server.base_url());
        config
    }

    #[test]
    fn accepted_response_is_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST)
                .path("/api/logs")
                .query_param("api-version", "2016-04-01")
                .header("content-type", "application/json")
                .header("log-type", "TestLog")
                .header_exists("x-ms-date")
                .header_exists("authorization");
            then.status(202);
        });

        let publisher = AzurePublisher::new(config_for(&server));
        publisher.publish(&sample_record()).unwrap();
        mock.assert();
    }

    #[test]
    fn ok_response_is_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/api/logs");
            then.status(200);
        });

        let publisher = AzurePublisher::new(config_for(&server));
        publisher.publish(&sample_record()).unwrap();
        assert_eq!(mock.hits(), 1);
    }

    #[test]
    fn rejection_surfaces_response_body() {
        let server = MockServer::start();
        let _mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/api/logs");
            then.status(500).body("quota exceeded");
        });

        let publisher = AzurePublisher::new(config_for(&server));
        let err = publisher.publish(&sample_record()).unwrap_err();
        match err {
            PublishError::Rejected { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(detail, "quota exceeded");
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn invalid_shared_key_fails_before_any_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/api/logs");
            then.status(202);
        });

        let mut config = config_for(&server);
        config.shared_key = "%%% not base64 %%%".to_string();
        let publisher = AzurePublisher::new(config);

        let err = publisher.publish(&sample_record()).unwrap_err();
        assert!(matches!(err, PublishError::Configuration(_)), "{:?}", err);
        assert_eq!(mock.hits(), 0);
    }

    #[test]
    fn empty_customer_id_is_a_configuration_error() {
        let server = MockServer::start();
        let mut config = config_for(&server);
        config.customer_id = String::new();
        let publisher = AzurePublisher::new(config);

        let err = publisher.publish(&sample_record()).unwrap_err();
        assert!(matches!(err, PublishError::Configuration(_)), "{:?}", err);
    }

    #[test]
    fn failed_publish_does_not_poison_the_next_one() {
        let server = MockServer::start();
        let mut reject = server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/api/logs");
            then.status(503).body("busy");
        });

        let publisher = AzurePublisher::new(config_for(&server));
        assert!(publisher.publish(&sample_record()).is_err());

        reject.delete();
        let accept = server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/api/logs");
            then.status(202);
        });

        publisher.publish(&sample_record()).unwrap();
        assert_eq!(accept.hits(), 1);
    }

    #[test]
    fn default_endpoint_targets_the_workspace_subdomain() {
        let config = AzureConfig::new("abc123", ZERO_KEY, "TestLog");
        let publisher = AzurePublisher::new(config);
        assert_eq!(
            publisher.endpoint(),
            "https://abc123.ods.opinsights.azure.com/api/logs?api-version=2016-04-01"
        );
    }
}
