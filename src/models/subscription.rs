use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a subscription. States the provider may add later
/// deserialize as `Unknown` instead of failing the whole listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SubscriptionState {
    Enabled,
    Disabled,
    Warned,
    PastDue,
    Deleted,
    #[serde(other)]
    #[default]
    Unknown,
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubscriptionState::Enabled => "Enabled",
            SubscriptionState::Disabled => "Disabled",
            SubscriptionState::Warned => "Warned",
            SubscriptionState::PastDue => "PastDue",
            SubscriptionState::Deleted => "Deleted",
            SubscriptionState::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub subscription_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub state: SubscriptionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_tenant_id: Option<String>,
}

impl Subscription {
    /// Tenant identifier carried on the subscription record, if any,
    /// preferring `tenantId` over `homeTenantId`.
    pub fn tenant_hint(&self) -> Option<&str> {
        self.tenant_id
            .as_deref()
            .or(self.home_tenant_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::{Subscription, SubscriptionState};

    #[test]
    fn deserializes_provider_fields() {
        let sub: Subscription = serde_json::from_str(
            r#"{
                "id": "/subscriptions/abc",
                "subscriptionId": "abc",
                "displayName": "Production",
                "state": "Enabled",
                "tenantId": "tenant-1"
            }"#,
        )
        .expect("subscription");
        assert_eq!(sub.subscription_id, "abc");
        assert_eq!(sub.display_name, "Production");
        assert_eq!(sub.state, SubscriptionState::Enabled);
        assert_eq!(sub.tenant_hint(), Some("tenant-1"));
    }

    #[test]
    fn unknown_state_does_not_fail() {
        let sub: Subscription = serde_json::from_str(
            r#"{"subscriptionId": "abc", "displayName": "x", "state": "Expired"}"#,
        )
        .expect("subscription");
        assert_eq!(sub.state, SubscriptionState::Unknown);
    }

    #[test]
    fn tenant_hint_falls_back_to_home_tenant() {
        let sub: Subscription = serde_json::from_str(
            r#"{"subscriptionId": "abc", "state": "Enabled", "homeTenantId": "home-1"}"#,
        )
        .expect("subscription");
        assert_eq!(sub.tenant_hint(), Some("home-1"));
    }
}
