use crate::arm::ArmClient;
use crate::claims;
use crate::error::Error;
use crate::models::Subscription;
use log::{info, warn};
use std::fmt;

/// How the set of subscriptions to configure was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMode {
    /// An explicit target subscription was supplied.
    Single,
    /// Every visible subscription is configured.
    AutoDiscover,
}

impl fmt::Display for DiscoveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryMode::Single => f.write_str("Single"),
            DiscoveryMode::AutoDiscover => f.write_str("Auto-Discover Multiple"),
        }
    }
}

/// Tenant and subscription context for one run.
#[derive(Debug, Clone)]
pub struct AzureContext {
    pub tenant_id: String,
    pub subscriptions: Vec<Subscription>,
    pub mode: DiscoveryMode,
}

/// Discovers the tenant and the subscriptions to configure.
///
/// A blank or absent target id selects every visible subscription; an
/// explicit target must match one of them or the run fails with the full
/// listing in the error.
pub fn discover(
    arm: &ArmClient,
    target_subscription_id: Option<&str>,
) -> Result<AzureContext, Error> {
    let all_subscriptions = arm.list_subscriptions()?;
    if all_subscriptions.is_empty() {
        return Err(Error::NoSubscriptions);
    }

    let tenant_id = resolve_tenant_id(arm, &all_subscriptions)?;

    let target = target_subscription_id
        .map(str::trim)
        .filter(|id| !id.is_empty());
    match target {
        Some(id) => {
            info!("discovering Azure context (Single Subscription mode)");
            let subscription = all_subscriptions
                .iter()
                .find(|sub| sub.subscription_id == id)
                .cloned()
                .ok_or_else(|| Error::SubscriptionNotFound {
                    id: id.to_string(),
                    available: available_listing(&all_subscriptions),
                })?;
            info!("tenant id: {tenant_id}");
            info!(
                "target subscription: {} ({})",
                subscription.display_name, subscription.subscription_id
            );
            info!("state: {}", subscription.state);
            Ok(AzureContext {
                tenant_id,
                subscriptions: vec![subscription],
                mode: DiscoveryMode::Single,
            })
        }
        None => {
            info!("discovering Azure context (Auto-Discover Multiple mode)");
            info!("tenant id: {tenant_id}");
            info!("found {} subscription(s)", all_subscriptions.len());
            for (idx, sub) in all_subscriptions.iter().enumerate() {
                info!(
                    "  {}. {} ({}) state={}",
                    idx + 1,
                    sub.display_name,
                    sub.subscription_id,
                    sub.state
                );
            }
            Ok(AzureContext {
                tenant_id,
                subscriptions: all_subscriptions,
                mode: DiscoveryMode::AutoDiscover,
            })
        }
    }
}

/// Resolves the tenant id from token claims, falling back to the tenant
/// attributes of the first subscription record.
fn resolve_tenant_id(arm: &ArmClient, subscriptions: &[Subscription]) -> Result<String, Error> {
    match arm
        .access_token()
        .and_then(|token| claims::tenant_from_token(&token.access_token))
    {
        Ok(tenant_id) => return Ok(tenant_id),
        Err(err) => warn!("could not extract tenant id from token: {err}"),
    }
    subscriptions
        .first()
        .and_then(|sub| sub.tenant_hint())
        .map(str::to_owned)
        .ok_or(Error::TenantUnresolved)
}

fn available_listing(subscriptions: &[Subscription]) -> String {
    subscriptions
        .iter()
        .map(|sub| format!("  - {} ({})", sub.display_name, sub.subscription_id))
        .collect::<Vec<_>>()
        .join("\n")
}
