use super::ArmClient;
use crate::error::Error;
use crate::models::{RoleDefinition, RoleDefinitionCreateParameters};

const API_VERSION: &str = "2022-04-01";

impl ArmClient {
    /// Lists role definitions at the scope, optionally filtered by exact
    /// role name.
    pub fn list_role_definitions(
        &self,
        scope: &str,
        role_name: Option<&str>,
    ) -> Result<Vec<RoleDefinition>, Error> {
        let filter = role_name.map(|name| format!("roleName eq '{name}'"));
        let url = self.scoped_url(
            scope,
            &["providers", "Microsoft.Authorization", "roleDefinitions"],
            API_VERSION,
            filter.as_deref(),
        )?;
        self.get_paged(url)
    }

    /// Creates or updates a custom role definition under the given
    /// definition id.
    pub fn create_role_definition(
        &self,
        scope: &str,
        role_definition_id: &str,
        parameters: &RoleDefinitionCreateParameters,
    ) -> Result<RoleDefinition, Error> {
        let url = self.scoped_url(
            scope,
            &[
                "providers",
                "Microsoft.Authorization",
                "roleDefinitions",
                role_definition_id,
            ],
            API_VERSION,
            None,
        )?;
        self.put_json(url, parameters)
    }
}
