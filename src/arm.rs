mod client;

pub use client::{ArmClient, ArmClientBuilder};

/// Public endpoint of the resource management API.
pub const ARM_ENDPOINT: &str = "https://management.azure.com";

/// Token scope covering the resource management API.
pub const ARM_SCOPE: &str = "https://management.azure.com/.default";

/// Authorization scope string for a subscription.
pub fn subscription_scope(subscription_id: &str) -> String {
    format!("/subscriptions/{subscription_id}")
}
