use crate::configure::RunReport;
use crate::discovery::DiscoveryMode;
use crate::error::Error;
use crate::roles::CUSTOM_ROLE_NAME;
use std::fs;
use std::path::Path;

/// Summary file written in the working directory, replaced on every run.
pub const SUMMARY_FILE: &str = "azure_config_summary.txt";

const RULE: &str =
    "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Renders the fixed-format configuration summary.
pub fn render_summary(report: &RunReport) -> String {
    let mode_label = match report.mode {
        DiscoveryMode::Single => "Single Subscription Mode",
        DiscoveryMode::AutoDiscover => "Auto-Discover Multiple Mode",
    };

    let mut subscriptions_section = String::new();
    for outcome in &report.outcomes {
        let roles_section = outcome
            .assigned_role_names()
            .iter()
            .map(|role| format!("      ✓ {role}"))
            .collect::<Vec<_>>()
            .join("\n");
        subscriptions_section.push_str(&format!(
            "\n  📋 Subscription: {}\n     ID: {}\n     State: {}\n\n     Roles Assigned:\n{}\n",
            outcome.name, outcome.subscription_id, outcome.state, roles_section
        ));
        if outcome.custom_role_assigned() {
            subscriptions_section.push_str(&format!(
                "\n     Custom Role for Cloud Forwarding:\n      ✓ {CUSTOM_ROLE_NAME}\n"
            ));
        }
    }

    let first_subscription_id = report
        .outcomes
        .first()
        .map(|outcome| outcome.subscription_id.as_str());

    let copy_line = match (report.mode, first_subscription_id) {
        (DiscoveryMode::Single, Some(id)) => format!("Subscription ID: {id}"),
        _ => String::new(),
    };

    let next_steps = match report.mode {
        DiscoveryMode::Single => format!(
            "Next Steps in Infoblox Portal:\n\
             {RULE}\n\
             1. Navigate to the Azure Discovery Job configuration\n\
             2. Set Account Preference to: Single\n\
             3. Paste the Subscription ID: {}\n\
             4. Paste the Tenant ID: {}\n\
             5. Complete the configuration and test the connection",
            first_subscription_id.unwrap_or("-"),
            report.tenant_id
        ),
        DiscoveryMode::AutoDiscover => format!(
            "Next Steps in Infoblox Portal:\n\
             {RULE}\n\
             1. Navigate to the Azure Discovery Job configuration (step 13)\n\
             2. Set Account Preference to: Auto-Discover Multiple\n\
             3. Paste the Tenant ID shown above: {}\n\
             4. The system will auto-discover all {} configured subscription(s)\n\
             5. Complete the configuration and test the connection",
            report.tenant_id,
            report.outcomes.len()
        ),
    };

    format!(
        "\n\
         ╔══════════════════════════════════════════════════════════════════╗\n\
         ║        Azure Configuration Summary for Infoblox                  ║\n\
         ║                  {mode_label:^42}  ║\n\
         ╚══════════════════════════════════════════════════════════════════╝\n\
         \n\
         🎯 COPY THESE VALUES TO INFOBLOX PORTAL:\n\
         {RULE}\n\
         \n  Tenant ID: {tenant_id}\n  {copy_line}\n\
         \n\
         {RULE}\n\
         \n\
         Application Details:\n\
         {RULE}\n  Application ID: {app_id}\n  Service Principal ID: {principal_id}\n\
         \n\
         Configured Subscriptions ({total} total):\n\
         {RULE}\n\
         {subscriptions_section}\n\
         \n\
         {next_steps}\n\
         \n\
         ✅ Configuration completed successfully!\n   \
         Subscription(s) configured with required permissions for:\n   \
         • IPAM Synchronization (Reader role)\n   \
         • DNS Management (DNS Zone Contributor roles)\n   \
         • Cloud Forwarding (Custom role)\n",
        tenant_id = report.tenant_id,
        app_id = report.app_id,
        principal_id = report.principal_id,
        total = report.outcomes.len(),
    )
}

/// Writes the summary, replacing any previous run's file.
pub fn write_summary(path: impl AsRef<Path>, summary: &str) -> Result<(), Error> {
    fs::write(path, summary).map_err(Error::from)
}
