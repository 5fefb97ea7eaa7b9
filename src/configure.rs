use crate::arm::ArmClient;
use crate::discovery::{discover, DiscoveryMode};
use crate::error::Error;
use crate::graph::GraphClient;
use crate::models::SubscriptionState;
use crate::roles::{configure_subscription, SubscriptionOutcome};
use log::info;
use std::env;

pub const APP_ID_VAR: &str = "INFOBLOX_APP_ID";
pub const SUBSCRIPTION_ID_VAR: &str = "AZURE_SUBSCRIPTION_ID";

/// Run inputs resolved from the environment.
#[derive(Debug, Clone)]
pub struct Inputs {
    /// Application id of the Infoblox integration.
    pub app_id: String,
    /// Explicit target subscription; absent selects auto-discovery.
    pub target_subscription_id: Option<String>,
}

impl Inputs {
    pub fn from_env() -> Result<Self, Error> {
        let app_id = env::var(APP_ID_VAR)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(Error::MissingEnv(APP_ID_VAR))?;
        let target_subscription_id = env::var(SUBSCRIPTION_ID_VAR)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        Ok(Self {
            app_id,
            target_subscription_id,
        })
    }
}

/// Everything reporting needs about a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub tenant_id: String,
    pub app_id: String,
    pub principal_id: String,
    pub mode: DiscoveryMode,
    pub outcomes: Vec<SubscriptionOutcome>,
}

/// Drives the pipeline: discovers the tenant context, resolves the
/// service principal once, then configures each enabled subscription in
/// the order discovered.
pub fn configure(
    arm: &ArmClient,
    graph: &GraphClient,
    inputs: &Inputs,
) -> Result<RunReport, Error> {
    let context = discover(arm, inputs.target_subscription_id.as_deref())?;
    let principal = graph.get_or_create_service_principal(&inputs.app_id)?;

    let total = context.subscriptions.len();
    let mut outcomes = Vec::new();
    for (idx, subscription) in context.subscriptions.iter().enumerate() {
        match context.mode {
            DiscoveryMode::Single => info!(
                "configuring single subscription: {}",
                subscription.display_name
            ),
            DiscoveryMode::AutoDiscover => info!(
                "configuring subscription {}/{}: {}",
                idx + 1,
                total,
                subscription.display_name
            ),
        }
        if subscription.state != SubscriptionState::Enabled {
            info!(
                "skipping subscription {} (state: {})",
                subscription.display_name, subscription.state
            );
            continue;
        }
        outcomes.push(configure_subscription(arm, subscription, &principal.id));
    }

    Ok(RunReport {
        tenant_id: context.tenant_id,
        app_id: inputs.app_id.clone(),
        principal_id: principal.id,
        mode: context.mode,
        outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::Inputs;
    use crate::error::Error;
    use std::env;

    // Single test mutating the process environment; keeping both cases in
    // one function avoids races between parallel tests.
    #[test]
    fn inputs_resolve_from_env() {
        env::set_var(super::APP_ID_VAR, "  app-123  ");
        env::set_var(super::SUBSCRIPTION_ID_VAR, "   ");
        let inputs = Inputs::from_env().expect("inputs");
        assert_eq!(inputs.app_id, "app-123");
        assert!(inputs.target_subscription_id.is_none());

        env::set_var(super::SUBSCRIPTION_ID_VAR, "sub-42");
        let inputs = Inputs::from_env().expect("inputs");
        assert_eq!(inputs.target_subscription_id.as_deref(), Some("sub-42"));

        env::remove_var(super::APP_ID_VAR);
        env::remove_var(super::SUBSCRIPTION_ID_VAR);
        match Inputs::from_env() {
            Err(Error::MissingEnv(name)) => assert_eq!(name, super::APP_ID_VAR),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
