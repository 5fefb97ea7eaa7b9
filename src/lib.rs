#![forbid(unsafe_code)]

mod arm;
mod build_url;
mod claims;
mod client_defaults;
mod configure;
mod credentials;
mod discovery;
mod error;
mod graph;
mod models;
mod report;
mod roles;

pub use arm::{subscription_scope, ArmClient, ArmClientBuilder, ARM_ENDPOINT, ARM_SCOPE};

pub use configure::{configure, Inputs, RunReport, APP_ID_VAR, SUBSCRIPTION_ID_VAR};

pub use credentials::{
    AccessToken, AzureCliCredential, ClientSecretCredential, DefaultCredential,
    StaticTokenCredential, TokenCredential, DEFAULT_AUTHORITY,
};

pub use discovery::{discover, AzureContext, DiscoveryMode};

pub use error::{CloudError, Error};

pub use graph::{GraphClient, GraphClientBuilder, GRAPH_ENDPOINT, GRAPH_SCOPE};

pub use models::{
    ListPage, RoleAssignment, RoleAssignmentCreateParameters, RoleAssignmentProperties,
    RoleDefinition, RoleDefinitionCreateParameters, RoleDefinitionProperties, RolePermission,
    ServicePrincipal, ServicePrincipalCreateRequest, Subscription, SubscriptionState,
};

pub use report::{render_summary, write_summary, SUMMARY_FILE};

pub use roles::{
    assign_built_in_roles, assign_custom_role, configure_subscription, ensure_custom_role,
    AssignedRole, RoleOutcome, SubscriptionOutcome, BUILT_IN_ROLES, CUSTOM_ROLE_NAME,
};
