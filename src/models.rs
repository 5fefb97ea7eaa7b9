mod authorization;
mod directory;
mod subscription;

pub use authorization::{
    ListPage, RoleAssignment, RoleAssignmentCreateParameters, RoleAssignmentProperties,
    RoleDefinition, RoleDefinitionCreateParameters, RoleDefinitionProperties, RolePermission,
};
pub use directory::{ServicePrincipal, ServicePrincipalCreateRequest};
pub use subscription::{Subscription, SubscriptionState};
