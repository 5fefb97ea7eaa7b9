use crate::build_url::build_url;
use crate::client_defaults::DEFAULT_TIMEOUT;
use crate::error::Error;
use log::debug;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use std::collections::HashMap;
use std::process::Command;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use url::Url;

/// Authority issuing tokens for the client-credentials flow.
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Cached tokens are replaced this close to expiry rather than on the
/// boundary, so a token handed out is never about to lapse mid-request.
const REFRESH_THRESHOLD: Duration = Duration::from_secs(300);

/// Bearer token issued for one resource scope.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Source of bearer tokens for the management and directory services.
pub trait TokenCredential {
    /// Returns a token valid for the given resource scope.
    fn token(&self, scope: &str) -> Result<AccessToken, Error>;
}

/// Fixed pre-acquired token, used in tests and when a token is provisioned
/// out of band.
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenCredential for StaticTokenCredential {
    fn token(&self, _scope: &str) -> Result<AccessToken, Error> {
        Ok(AccessToken {
            access_token: self.token.clone(),
            expires_in: None,
        })
    }
}

struct CachedToken {
    token: AccessToken,
    acquired: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        match self.token.expires_in {
            Some(secs) => {
                let lifetime = Duration::from_secs(secs);
                self.acquired.elapsed() + REFRESH_THRESHOLD < lifetime
            }
            None => false,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TokenErrorBody {
    error: String,
    error_description: String,
}

/// OAuth2 client-credentials flow against the tenant's token endpoint.
pub struct ClientSecretCredential {
    authority: Url,
    tenant_id: String,
    client_id: String,
    client_secret: String,
    http: HttpClient,
    cache: Mutex<HashMap<String, CachedToken>>,
}

impl ClientSecretCredential {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, Error> {
        Self::with_authority(DEFAULT_AUTHORITY, tenant_id, client_id, client_secret)
    }

    pub fn with_authority(
        authority: impl AsRef<str>,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, Error> {
        Ok(Self {
            authority: Url::parse(authority.as_ref())?,
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            http: HttpClient::builder().timeout(DEFAULT_TIMEOUT).build()?,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Builds the credential from `AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, and
    /// `AZURE_CLIENT_SECRET`; `None` when any of them is absent or blank.
    pub fn from_env() -> Result<Option<Self>, Error> {
        let vars = ["AZURE_TENANT_ID", "AZURE_CLIENT_ID", "AZURE_CLIENT_SECRET"]
            .map(|name| std::env::var(name).unwrap_or_default().trim().to_string());
        if vars.iter().any(String::is_empty) {
            return Ok(None);
        }
        let [tenant_id, client_id, client_secret] = vars;
        Ok(Some(Self::new(tenant_id, client_id, client_secret)?))
    }

    fn request_token(&self, scope: &str) -> Result<AccessToken, Error> {
        let url = build_url(
            &self.authority,
            &[&self.tenant_id, "oauth2", "v2.0", "token"],
        )?;
        let resp = self
            .http
            .post(url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
                ("scope", scope),
            ])
            .send()?;
        if resp.status().is_success() {
            return resp.json::<AccessToken>().map_err(Error::from);
        }
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        let detail = match serde_json::from_str::<TokenErrorBody>(&body) {
            Ok(err) if !err.error.is_empty() => {
                format!("{}: {}", err.error, err.error_description)
            }
            _ => body.trim().to_string(),
        };
        Err(Error::Credential(format!(
            "token request failed ({status}): {detail}"
        )))
    }
}

impl TokenCredential for ClientSecretCredential {
    fn token(&self, scope: &str) -> Result<AccessToken, Error> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| Error::Credential("token cache poisoned".to_string()))?;
        if let Some(cached) = cache.get(scope) {
            if cached.is_fresh() {
                return Ok(cached.token.clone());
            }
        }
        let token = self.request_token(scope)?;
        cache.insert(
            scope.to_string(),
            CachedToken {
                token: token.clone(),
                acquired: Instant::now(),
            },
        );
        Ok(token)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliTokenOutput {
    access_token: String,
}

/// Token acquisition through a logged-in `az` CLI session.
pub struct AzureCliCredential;

impl AzureCliCredential {
    fn parse_output(stdout: &[u8]) -> Result<AccessToken, Error> {
        let output: CliTokenOutput = serde_json::from_slice(stdout)
            .map_err(|e| Error::Credential(format!("unexpected azure cli output: {e}")))?;
        Ok(AccessToken {
            access_token: output.access_token,
            expires_in: None,
        })
    }
}

impl TokenCredential for AzureCliCredential {
    fn token(&self, scope: &str) -> Result<AccessToken, Error> {
        let output = Command::new("az")
            .args(["account", "get-access-token", "--scope", scope, "--output", "json"])
            .output()
            .map_err(|e| Error::Credential(format!("azure cli not available: {e}")))?;
        if !output.status.success() {
            return Err(Error::Credential(format!(
                "azure cli exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Self::parse_output(&output.stdout)
    }
}

/// Ordered credential chain mirroring the provider's default credential:
/// environment-configured client secret first, then the CLI session.
pub struct DefaultCredential {
    sources: Vec<(&'static str, Box<dyn TokenCredential>)>,
}

impl DefaultCredential {
    pub fn from_env() -> Result<Self, Error> {
        let mut sources: Vec<(&'static str, Box<dyn TokenCredential>)> = Vec::new();
        if let Some(credential) = ClientSecretCredential::from_env()? {
            sources.push(("client secret", Box::new(credential)));
        }
        sources.push(("azure cli", Box::new(AzureCliCredential)));
        Ok(Self { sources })
    }
}

impl TokenCredential for DefaultCredential {
    fn token(&self, scope: &str) -> Result<AccessToken, Error> {
        let mut failures = Vec::new();
        for (name, source) in &self.sources {
            match source.token(scope) {
                Ok(token) => return Ok(token),
                Err(err) => {
                    debug!("credential source '{name}' failed: {err}");
                    failures.push(format!("{name}: {err}"));
                }
            }
        }
        Err(Error::Credential(format!(
            "no credential source produced a token ({})",
            failures.join("; ")
        )))
    }
}
