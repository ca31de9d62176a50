use super::{HostProject, ProjectDirectory};
use crate::error::{Error, Result};
use crate::jira::ProjectOperator;
use crate::models::JiraProject;
use async_trait::async_trait;
use std::sync::Arc;

pub struct NativeProjectOperator<H> {
    host: Arc<H>,
}

impl<H> NativeProjectOperator<H>
where
    H: ProjectDirectory + 'static,
{
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }
}

#[async_trait]
impl<H> ProjectOperator for NativeProjectOperator<H>
where
    H: ProjectDirectory + 'static,
{
    async fn get_projects(&self) -> Result<Vec<JiraProject>> {
        let projects = self.host.projects().map_err(|e| Error::native(&e))?;
        Ok(projects.iter().map(HostProject::to_jira_project).collect())
    }

    async fn get_project(&self, project_id: i64) -> Result<Option<JiraProject>> {
        let project = self
            .host
            .project_by_id(project_id)
            .map_err(|e| Error::native(&e))?;
        Ok(project.as_ref().map(HostProject::to_jira_project))
    }
}
