use super::ArmClient;
use crate::error::Error;
use crate::models::Subscription;

const API_VERSION: &str = "2020-08-01";

impl ArmClient {
    /// Lists every subscription visible to the caller, following result
    /// pages to exhaustion.
    pub fn list_subscriptions(&self) -> Result<Vec<Subscription>, Error> {
        let url = self.scoped_url("", &["subscriptions"], API_VERSION, None)?;
        self.get_paged(url)
    }
}
