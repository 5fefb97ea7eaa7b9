use crate::build_url::build_url;
use crate::client_defaults::DEFAULT_TIMEOUT;
use crate::credentials::TokenCredential;
use crate::error::{parse_error_from_body, Error};
use crate::graph::GRAPH_SCOPE;
use crate::models::{ListPage, ServicePrincipal, ServicePrincipalCreateRequest};
use log::info;
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub struct GraphClientBuilder {
    base_url: Url,
    timeout: Option<Duration>,
    credential: Option<Arc<dyn TokenCredential>>,
}

impl GraphClientBuilder {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, Error> {
        Ok(Self {
            base_url: Url::parse(base_url.as_ref())?,
            timeout: Some(DEFAULT_TIMEOUT),
            credential: None,
        })
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn credential(mut self, credential: Arc<dyn TokenCredential>) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn build(self) -> Result<GraphClient, Error> {
        let credential = self
            .credential
            .ok_or_else(|| Error::Credential("directory client requires a credential".into()))?;
        let mut builder = HttpClient::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(GraphClient {
            base_url: self.base_url,
            http,
            credential,
        })
    }
}

/// Blocking client for the directory API, covering service principal
/// lookup and creation.
pub struct GraphClient {
    base_url: Url,
    http: HttpClient,
    credential: Arc<dyn TokenCredential>,
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("base_url", &self.base_url)
            .field("http", &self.http)
            .finish_non_exhaustive()
    }
}

impl GraphClient {
    pub fn builder(base_url: impl AsRef<str>) -> Result<GraphClientBuilder, Error> {
        GraphClientBuilder::new(base_url)
    }

    fn bearer(&self) -> Result<String, Error> {
        Ok(format!(
            "Bearer {}",
            self.credential.token(GRAPH_SCOPE)?.access_token
        ))
    }

    /// Finds the service principal backing the given application id, if any.
    pub fn find_service_principal(
        &self,
        app_id: &str,
    ) -> Result<Option<ServicePrincipal>, Error> {
        let mut url = build_url(&self.base_url, &["v1.0", "servicePrincipals"])?;
        url.query_pairs_mut()
            .append_pair("$filter", &format!("appId eq '{app_id}'"));
        let resp = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.bearer()?)
            .send()?;
        let page: ListPage<ServicePrincipal> = self.expect_success_json(resp)?;
        Ok(page.value.into_iter().next())
    }

    /// Creates a service principal bound to the application id.
    pub fn create_service_principal(&self, app_id: &str) -> Result<ServicePrincipal, Error> {
        let url = build_url(&self.base_url, &["v1.0", "servicePrincipals"])?;
        let body = ServicePrincipalCreateRequest {
            app_id: app_id.to_string(),
        };
        let resp = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.bearer()?)
            .json(&body)
            .send()?;
        self.expect_success_json(resp)
    }

    /// Returns the existing principal for the application or creates one.
    pub fn get_or_create_service_principal(
        &self,
        app_id: &str,
    ) -> Result<ServicePrincipal, Error> {
        info!("resolving service principal for application {app_id}");
        if let Some(principal) = self.find_service_principal(app_id)? {
            info!("service principal already exists: {}", principal.id);
            return Ok(principal);
        }
        let principal = self.create_service_principal(app_id)?;
        info!("created service principal: {}", principal.id);
        Ok(principal)
    }

    fn expect_success_json<T: DeserializeOwned>(&self, resp: Response) -> Result<T, Error> {
        if resp.status().is_success() {
            resp.json::<T>().map_err(Error::from)
        } else {
            let status = resp.status();
            let body = resp.bytes()?;
            Err(parse_error_from_body(status, &body))
        }
    }
}
