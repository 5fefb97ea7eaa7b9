use super::ArmClient;
use crate::error::Error;
use crate::models::{RoleAssignment, RoleAssignmentCreateParameters};

const API_VERSION: &str = "2022-04-01";

impl ArmClient {
    /// Lists every role assignment at the scope.
    pub fn list_role_assignments(&self, scope: &str) -> Result<Vec<RoleAssignment>, Error> {
        let url = self.scoped_url(
            scope,
            &["providers", "Microsoft.Authorization", "roleAssignments"],
            API_VERSION,
            None,
        )?;
        self.get_paged(url)
    }

    /// Creates a role assignment under the given assignment name.
    pub fn create_role_assignment(
        &self,
        scope: &str,
        assignment_name: &str,
        parameters: &RoleAssignmentCreateParameters,
    ) -> Result<RoleAssignment, Error> {
        let url = self.scoped_url(
            scope,
            &[
                "providers",
                "Microsoft.Authorization",
                "roleAssignments",
                assignment_name,
            ],
            API_VERSION,
            None,
        )?;
        self.put_json(url, parameters)
    }
}
