use crate::arm::{subscription_scope, ArmClient};
use crate::error::Error;
use crate::models::{
    RoleAssignmentCreateParameters, RoleAssignmentProperties, RoleDefinitionCreateParameters,
    RoleDefinitionProperties, RolePermission, Subscription, SubscriptionState,
};
use log::{info, warn};
use uuid::Uuid;

/// Built-in roles the integration requires, each with the purpose it
/// serves in the discovery job.
pub const BUILT_IN_ROLES: [(&str, &str); 3] = [
    ("Reader", "IPAM synchronization and asset discovery"),
    ("DNS Zone Contributor", "managing Azure DNS zones and records"),
    (
        "Private DNS Zone Contributor",
        "managing Private DNS zones and records",
    ),
];

pub const CUSTOM_ROLE_NAME: &str = "Infoblox Cloud Forwarding Custom Role";

const CUSTOM_ROLE_DESCRIPTION: &str =
    "Custom role for Infoblox Cloud Forwarding with write and delete permissions for resource groups";

const CUSTOM_ROLE_ACTIONS: [&str; 7] = [
    "Microsoft.Resources/subscriptions/resourceGroups/write",
    "Microsoft.Resources/subscriptions/resourceGroups/delete",
    "Microsoft.Network/dnsResolvers/*",
    "Microsoft.Network/dnsForwardingRulesets/*",
    "Microsoft.Network/virtualNetworks/read",
    "Microsoft.Network/virtualNetworks/subnets/read",
    "Microsoft.Network/virtualNetworks/subnets/join/action",
];

const SERVICE_PRINCIPAL_TYPE: &str = "ServicePrincipal";

/// Result of one role attempt. Failures stay local to the role; nothing
/// here aborts the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleOutcome {
    /// A new assignment was created.
    Assigned,
    /// An assignment for (principal, role) already existed at the scope.
    AlreadyAssigned,
    /// The role definition could not be found at the scope.
    DefinitionMissing,
    /// Creation was attempted and rejected.
    Failed(String),
}

impl RoleOutcome {
    /// True when the role is in place after the attempt, whether it was
    /// created by this run or a previous one.
    pub fn is_in_place(&self) -> bool {
        matches!(self, RoleOutcome::Assigned | RoleOutcome::AlreadyAssigned)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedRole {
    pub name: String,
    pub outcome: RoleOutcome,
}

/// Accumulated configuration result for one subscription, consumed only
/// by reporting.
#[derive(Debug, Clone)]
pub struct SubscriptionOutcome {
    pub subscription_id: String,
    pub name: String,
    pub state: SubscriptionState,
    pub roles: Vec<AssignedRole>,
    pub custom_role: RoleOutcome,
}

impl SubscriptionOutcome {
    /// Names of the built-in roles in place after the run.
    pub fn assigned_role_names(&self) -> Vec<&str> {
        self.roles
            .iter()
            .filter(|role| role.outcome.is_in_place())
            .map(|role| role.name.as_str())
            .collect()
    }

    pub fn custom_role_assigned(&self) -> bool {
        self.custom_role.is_in_place()
    }
}

/// Runs built-in and custom role configuration for one enabled
/// subscription.
pub fn configure_subscription(
    arm: &ArmClient,
    subscription: &Subscription,
    principal_id: &str,
) -> SubscriptionOutcome {
    info!(
        "assigning built-in roles to subscription: {}",
        subscription.display_name
    );
    let roles = assign_built_in_roles(arm, &subscription.subscription_id, principal_id);

    info!("ensuring custom role for Cloud Forwarding");
    let custom_role = match ensure_custom_role(arm, &subscription.subscription_id) {
        Ok(role_definition_id) => assign_custom_role(
            arm,
            &subscription.subscription_id,
            &role_definition_id,
            principal_id,
        ),
        Err(err) => {
            warn!("could not create custom role: {err}");
            RoleOutcome::Failed(err.to_string())
        }
    };

    SubscriptionOutcome {
        subscription_id: subscription.subscription_id.clone(),
        name: subscription.display_name.clone(),
        state: subscription.state,
        roles,
        custom_role,
    }
}

/// Assigns the built-in roles to the principal at subscription scope.
/// Each role succeeds or fails on its own.
pub fn assign_built_in_roles(
    arm: &ArmClient,
    subscription_id: &str,
    principal_id: &str,
) -> Vec<AssignedRole> {
    let scope = subscription_scope(subscription_id);
    BUILT_IN_ROLES
        .iter()
        .map(|&(name, purpose)| {
            info!("assigning '{name}' role (for {purpose})");
            let outcome = assign_named_role(arm, &scope, principal_id, name);
            match &outcome {
                RoleOutcome::Assigned => info!("assigned '{name}' role"),
                RoleOutcome::AlreadyAssigned => info!("'{name}' role assignment already exists"),
                RoleOutcome::DefinitionMissing | RoleOutcome::Failed(_) => {
                    info!("skipping '{name}' role")
                }
            }
            AssignedRole {
                name: name.to_string(),
                outcome,
            }
        })
        .collect()
}

fn assign_named_role(
    arm: &ArmClient,
    scope: &str,
    principal_id: &str,
    role_name: &str,
) -> RoleOutcome {
    let role_definition_id = match find_role_definition(arm, scope, role_name) {
        Ok(Some(id)) => id,
        Ok(None) => {
            warn!("built-in role '{role_name}' not found");
            return RoleOutcome::DefinitionMissing;
        }
        Err(err) => {
            warn!("could not look up role '{role_name}': {err}");
            return RoleOutcome::Failed(err.to_string());
        }
    };
    ensure_assignment(arm, scope, principal_id, &role_definition_id)
}

/// Resolves a role definition id by exact role name at the scope.
fn find_role_definition(
    arm: &ArmClient,
    scope: &str,
    role_name: &str,
) -> Result<Option<String>, Error> {
    let definitions = arm.list_role_definitions(scope, Some(role_name))?;
    Ok(definitions
        .into_iter()
        .find(|def| def.role_name() == Some(role_name))
        .map(|def| def.id))
}

/// Ensures the Cloud Forwarding custom role exists at subscription scope
/// and returns its definition id.
pub fn ensure_custom_role(arm: &ArmClient, subscription_id: &str) -> Result<String, Error> {
    let scope = subscription_scope(subscription_id);
    match arm.list_role_definitions(&scope, None) {
        Ok(definitions) => {
            if let Some(existing) = definitions
                .into_iter()
                .find(|def| def.role_name() == Some(CUSTOM_ROLE_NAME))
            {
                info!("custom role already exists: {}", existing.id);
                return Ok(existing.id);
            }
        }
        // Listing failures fall through to an unconditional create attempt.
        Err(err) => warn!("could not check existing role definitions: {err}"),
    }

    let role_definition_id = Uuid::new_v4().to_string();
    let parameters = RoleDefinitionCreateParameters {
        properties: RoleDefinitionProperties {
            role_name: Some(CUSTOM_ROLE_NAME.to_string()),
            role_type: Some("CustomRole".to_string()),
            description: Some(CUSTOM_ROLE_DESCRIPTION.to_string()),
            permissions: vec![RolePermission {
                actions: CUSTOM_ROLE_ACTIONS.iter().map(|a| a.to_string()).collect(),
                not_actions: Vec::new(),
            }],
            assignable_scopes: vec![scope.clone()],
        },
    };
    let created = arm.create_role_definition(&scope, &role_definition_id, &parameters)?;
    info!("created custom role for Cloud Forwarding");
    Ok(created.id)
}

/// Assigns an already-provisioned custom role to the principal.
pub fn assign_custom_role(
    arm: &ArmClient,
    subscription_id: &str,
    role_definition_id: &str,
    principal_id: &str,
) -> RoleOutcome {
    info!("assigning custom Cloud Forwarding role");
    let scope = subscription_scope(subscription_id);
    ensure_assignment(arm, &scope, principal_id, role_definition_id)
}

/// Creates the assignment unless one already exists for (principal, role)
/// at the scope. Role assignments are not polled for provider-side
/// propagation after creation; an immediately following read may not
/// observe them yet.
fn ensure_assignment(
    arm: &ArmClient,
    scope: &str,
    principal_id: &str,
    role_definition_id: &str,
) -> RoleOutcome {
    match assignment_exists(arm, scope, principal_id, role_definition_id) {
        Ok(true) => return RoleOutcome::AlreadyAssigned,
        Ok(false) => {}
        // An unreadable assignment list is not proof of absence; try the
        // create anyway and let the service arbitrate.
        Err(err) => warn!("could not check existing assignments: {err}"),
    }

    let assignment_name = Uuid::new_v4().to_string();
    let parameters = RoleAssignmentCreateParameters {
        properties: RoleAssignmentProperties {
            principal_id: principal_id.to_string(),
            role_definition_id: role_definition_id.to_string(),
            scope: None,
            principal_type: Some(SERVICE_PRINCIPAL_TYPE.to_string()),
        },
    };
    match arm.create_role_assignment(scope, &assignment_name, &parameters) {
        Ok(_) => RoleOutcome::Assigned,
        Err(err) => {
            warn!("could not create role assignment: {err}");
            RoleOutcome::Failed(err.to_string())
        }
    }
}

fn assignment_exists(
    arm: &ArmClient,
    scope: &str,
    principal_id: &str,
    role_definition_id: &str,
) -> Result<bool, Error> {
    let assignments = arm.list_role_assignments(scope)?;
    Ok(assignments.iter().any(|assignment| {
        assignment.properties.principal_id == principal_id
            && assignment.properties.role_definition_id == role_definition_id
    }))
}
