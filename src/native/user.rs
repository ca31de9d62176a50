use super::{HostProject, HostUser, ProjectDirectory, UserDirectory, project_not_found};
use crate::error::{Error, Result};
use crate::jira::{UserOperator, distinct_by_name};
use crate::models::JiraUser;
use async_trait::async_trait;
use std::sync::Arc;

pub struct NativeUserOperator<H> {
    host: Arc<H>,
}

impl<H> NativeUserOperator<H>
where
    H: ProjectDirectory + UserDirectory + 'static,
{
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    fn project(&self, project_key: &str) -> Result<HostProject> {
        self.host
            .project_by_key(project_key)
            .map_err(|e| Error::native(&e))?
            .ok_or_else(|| project_not_found(&format!("projectKey {}", project_key)))
    }

    /// ロールのユーザーを名前で重複除去する
    fn role_users(&self, project: &HostProject) -> Result<Vec<HostUser>> {
        let users = self
            .host
            .project_role_users(project)
            .map_err(|e| Error::native(&e))?;
        Ok(distinct_by_name(users, |user| user.name.as_str()))
    }
}

#[async_trait]
impl<H> UserOperator for NativeUserOperator<H>
where
    H: ProjectDirectory + UserDirectory + 'static,
{
    async fn get_users_by_project_key(&self, project_key: &str) -> Result<Vec<JiraUser>> {
        let project = self.project(project_key)?;
        let users = self.role_users(&project)?;
        Ok(users.iter().map(HostUser::to_jira_user).collect())
    }

    async fn get_system_admin_users(&self) -> Result<Vec<JiraUser>> {
        let admins = self
            .host
            .system_administrators()
            .map_err(|e| Error::native(&e))?;
        Ok(admins.iter().map(HostUser::to_jira_user).collect())
    }

    async fn get_users_by_project_key_and_permission(
        &self,
        project_key: &str,
        permission_name: &str,
    ) -> Result<Vec<JiraUser>> {
        let project = self.project(project_key)?;

        let mut permitted = Vec::new();
        for user in self.role_users(&project)? {
            let allowed = self
                .host
                .has_permission(&user, &project, permission_name)
                .map_err(|e| Error::native(&e))?;
            if allowed {
                permitted.push(user.to_jira_user());
            }
        }
        Ok(permitted)
    }
}
