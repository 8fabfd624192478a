//! Authenticated SOAP session for one API namespace

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use super::envelope;
use crate::error::{DespatchError, DespatchResult};

/// Remote procedure namespaces exposed by the carrier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Account,
    Addressing,
    Shipping,
    Tracking,
}

impl Service {
    /// Path segment of the service endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Account => "account",
            Service::Addressing => "addressing",
            Service::Shipping => "shipping",
            Service::Tracking => "tracking",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

struct Credentials {
    api_user: String,
    api_key: String,
}

/// Binding to one SOAP namespace
///
/// Cheap to clone; the HTTP client and credentials are shared.
#[derive(Clone)]
pub struct SoapSession {
    service: Service,
    endpoint: Url,
    namespace: String,
    http: Client,
    credentials: Arc<Credentials>,
}

impl SoapSession {
    /// Create a session for `service` under `{base}/soap/{version}/`.
    ///
    /// Does not contact the server.
    pub fn new(
        http: Client,
        base_url: &Url,
        version: &str,
        service: Service,
        api_user: &str,
        api_key: &str,
    ) -> DespatchResult<Self> {
        let endpoint = Url::parse(&format!(
            "{}/soap/{}/{}",
            base_url.as_str().trim_end_matches('/'),
            version,
            service.as_str()
        ))?;

        Ok(SoapSession {
            service,
            namespace: endpoint.to_string(),
            endpoint,
            http,
            credentials: Arc::new(Credentials {
                api_user: api_user.to_string(),
                api_key: api_key.to_string(),
            }),
        })
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// True when both handles point at the same namespace of the same host
    pub fn same_namespace(&self, other: &SoapSession) -> bool {
        self.service == other.service && self.endpoint == other.endpoint
    }

    /// Invoke `operation` and return the decoded return part.
    ///
    /// Non-2xx responses carrying a SOAP fault come back as
    /// [`DespatchError::SoapFault`]; anything else as [`DespatchError::ApiError`].
    pub async fn call(&self, operation: &str, parts: &[(&str, Value)]) -> DespatchResult<Value> {
        let body = envelope::encode_request(&self.namespace, operation, parts)?;

        debug!(
            service = %self.service,
            operation,
            endpoint = %self.endpoint,
            "SOAP request"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .basic_auth(&self.credentials.api_user, Some(&self.credentials.api_key))
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{}#{}\"", self.namespace, operation))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            warn!(
                service = %self.service,
                operation,
                status = status.as_u16(),
                "SOAP call failed"
            );
            return Err(match envelope::decode_response(&bytes) {
                Err(fault @ DespatchError::SoapFault { .. }) => fault,
                _ => DespatchError::ApiError {
                    status: status.as_u16(),
                    message: String::from_utf8_lossy(&bytes).into_owned(),
                },
            });
        }

        envelope::decode_response(&bytes)
    }
}

impl fmt::Debug for SoapSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoapSession")
            .field("service", &self.service)
            .field("endpoint", &self.endpoint.as_str())
            .field("api_user", &self.credentials.api_user)
            .finish_non_exhaustive()
    }
}
