use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;

/// Error body returned by the management and directory services.
///
/// Both services wrap failures in an `{"error": {"code", "message"}}`
/// envelope; bodies that do not parse keep the raw text as the message.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CloudError {
    pub code: String,
    pub message: String,
    #[serde(skip)]
    pub status: u16,
}

impl fmt::Display for CloudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "status={}, code={}", self.status, self.code)
        } else {
            write!(
                f,
                "status={}, code={}, message={}",
                self.status, self.code, self.message
            )
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CloudErrorEnvelope {
    error: CloudError,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0} environment variable is not set")]
    MissingEnv(&'static str),
    #[error("credential error: {0}")]
    Credential(String),
    #[error("token claims error: {0}")]
    Claims(String),
    #[error("no accessible subscriptions found")]
    NoSubscriptions,
    #[error("could not determine tenant id from token claims or subscription metadata")]
    TenantUnresolved,
    #[error(
        "subscription '{id}' not found or not accessible\navailable subscriptions:\n{available}"
    )]
    SubscriptionNotFound { id: String, available: String },
    #[error("cloud api error: {0}")]
    Api(CloudError),
}

/// Builds an `Error::Api` from a non-success response body, degrading to the
/// raw status and body text when the envelope does not parse.
pub(crate) fn parse_error_from_body(status: StatusCode, body: &[u8]) -> Error {
    let mut err = serde_json::from_slice::<CloudErrorEnvelope>(body)
        .map(|envelope| envelope.error)
        .unwrap_or_default();
    if err.message.is_empty() {
        err.message = String::from_utf8_lossy(body).trim().to_string();
    }
    if err.code.is_empty() {
        err.code = status.canonical_reason().unwrap_or("unknown").to_string();
    }
    err.status = status.as_u16();
    Error::Api(err)
}
