use crate::arm::ARM_SCOPE;
use crate::build_url::build_url;
use crate::client_defaults::DEFAULT_TIMEOUT;
use crate::credentials::{AccessToken, TokenCredential};
use crate::error::{parse_error_from_body, Error};
use crate::models::ListPage;
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

mod role_assignments;
mod role_definitions;
mod subscriptions;

pub struct ArmClientBuilder {
    base_url: Url,
    timeout: Option<Duration>,
    credential: Option<Arc<dyn TokenCredential>>,
}

impl ArmClientBuilder {
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

    pub fn build(self) -> Result<ArmClient, Error> {
        let credential = self
            .credential
            .ok_or_else(|| Error::Credential("management client requires a credential".into()))?;
        let mut builder = HttpClient::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(ArmClient {
            base_url: self.base_url,
            http,
            credential,
        })
    }
}

/// Blocking client for the resource management API: subscriptions, role
/// definitions, and role assignments.
pub struct ArmClient {
    base_url: Url,
    http: HttpClient,
    credential: Arc<dyn TokenCredential>,
}

impl std::fmt::Debug for ArmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmClient")
            .field("base_url", &self.base_url)
            .field("http", &self.http)
            .finish_non_exhaustive()
    }
}

impl ArmClient {
    pub fn builder(base_url: impl AsRef<str>) -> Result<ArmClientBuilder, Error> {
        ArmClientBuilder::new(base_url)
    }

    /// Returns a management-scoped access token from the underlying
    /// credential.
    pub fn access_token(&self) -> Result<AccessToken, Error> {
        self.credential.token(ARM_SCOPE)
    }

    fn bearer(&self) -> Result<String, Error> {
        Ok(format!("Bearer {}", self.access_token()?.access_token))
    }

    /// Builds a request URL for a resource under an authorization scope,
    /// with the API version and an optional `$filter` as query pairs.
    fn scoped_url(
        &self,
        scope: &str,
        resource: &[&str],
        api_version: &str,
        filter: Option<&str>,
    ) -> Result<Url, Error> {
        let mut segments: Vec<&str> = scope.split('/').filter(|s| !s.is_empty()).collect();
        segments.extend_from_slice(resource);
        let mut url = build_url(&self.base_url, &segments)?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        if let Some(filter) = filter {
            url.query_pairs_mut().append_pair("$filter", filter);
        }
        Ok(url)
    }

    /// Fetches every page of a list result, following `nextLink`.
    fn get_paged<T: DeserializeOwned>(&self, first: Url) -> Result<Vec<T>, Error> {
        let mut items = Vec::new();
        let mut next = Some(first);
        while let Some(url) = next {
            let resp = self
                .http
                .get(url)
                .header(AUTHORIZATION, self.bearer()?)
                .send()?;
            let page: ListPage<T> = self.expect_success_json(resp)?;
            items.extend(page.value);
            next = match page.next_link.as_deref() {
                Some(link) => Some(Url::parse(link)?),
                None => None,
            };
        }
        Ok(items)
    }

    fn put_json<B: Serialize, T: DeserializeOwned>(&self, url: Url, body: &B) -> Result<T, Error> {
        let resp = self
            .http
            .put(url)
            .header(AUTHORIZATION, self.bearer()?)
            .json(body)
            .send()?;
        self.expect_success_json(resp)
    }

    fn expect_success_json<T: DeserializeOwned>(&self, resp: Response) -> Result<T, Error> {
        if resp.status().is_success() {
            resp.json::<T>().map_err(Error::from)
        } else {
            self.parse_error(resp)
        }
    }

    fn parse_error<T>(&self, resp: Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.bytes()?;
        Err(parse_error_from_body(status, &body))
    }
}

#[cfg(test)]
mod tests {
    use super::ArmClient;
    use crate::credentials::StaticTokenCredential;
    use std::sync::Arc;

    fn client() -> ArmClient {
        ArmClient::builder("https://management.example.com")
            .expect("builder")
            .credential(Arc::new(StaticTokenCredential::new("tok")))
            .build()
            .expect("build")
    }

    #[test]
    fn build_requires_credential() {
        let err = ArmClient::builder("https://management.example.com")
            .expect("builder")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("requires a credential"));
    }

    #[test]
    fn scoped_url_splits_scope_and_appends_query() {
        let url = client()
            .scoped_url(
                "/subscriptions/abc",
                &["providers", "Microsoft.Authorization", "roleDefinitions"],
                "2022-04-01",
                Some("roleName eq 'Reader'"),
            )
            .expect("url");
        assert_eq!(
            url.path(),
            "/subscriptions/abc/providers/Microsoft.Authorization/roleDefinitions"
        );
        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert!(query.contains(&("api-version".to_string(), "2022-04-01".to_string())));
        assert!(query.contains(&("$filter".to_string(), "roleName eq 'Reader'".to_string())));
    }

    #[test]
    fn scoped_url_allows_empty_scope() {
        let url = client()
            .scoped_url("", &["subscriptions"], "2020-08-01", None)
            .expect("url");
        assert_eq!(url.path(), "/subscriptions");
    }
}
