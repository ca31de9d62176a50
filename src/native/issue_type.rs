use super::{
    HostIssueType, HostProject, IssueTypeDirectory, ProjectDirectory, ScreenField, missing,
    project_not_found,
};
use crate::error::{Error, Result};
use crate::jira::IssueTypeOperator;
use crate::models::{
    JiraIssueType, JiraIssueTypeAttribute, JiraIssueTypeAttributeSchema,
};
use async_trait::async_trait;
use std::sync::Arc;

pub struct NativeIssueTypeOperator<H> {
    host: Arc<H>,
}

impl<H> NativeIssueTypeOperator<H>
where
    H: ProjectDirectory + IssueTypeDirectory + 'static,
{
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    fn project(&self, project_id: i64) -> Result<HostProject> {
        self.host
            .project_by_id(project_id)
            .map_err(|e| Error::native(&e))?
            .ok_or_else(|| project_not_found(&format!("id {}", project_id)))
    }

    fn issue_type(&self, issue_type_id: i64) -> Result<Option<HostIssueType>> {
        self.host
            .issue_type(&issue_type_id.to_string())
            .map_err(|e| Error::native(&e))
    }
}

fn to_jira_issue_type(issue_type: HostIssueType) -> JiraIssueType {
    JiraIssueType {
        id: issue_type.id,
        name: issue_type.name,
    }
}

fn to_attribute(field: ScreenField) -> JiraIssueTypeAttribute {
    JiraIssueTypeAttribute {
        id: field.id,
        name: field.name,
        schema: field.schema.unwrap_or_else(JiraIssueTypeAttributeSchema::any),
    }
}

#[async_trait]
impl<H> IssueTypeOperator for NativeIssueTypeOperator<H>
where
    H: ProjectDirectory + IssueTypeDirectory + 'static,
{
    async fn get_issue_types(&self, project_id: i64) -> Result<Vec<JiraIssueType>> {
        let project = self.project(project_id)?;
        let issue_types = self
            .host
            .project_issue_types(&project)
            .map_err(|e| Error::native(&e))?;
        Ok(issue_types.into_iter().map(to_jira_issue_type).collect())
    }

    async fn get_issue_type(&self, issue_type_id: i64) -> Result<Option<JiraIssueType>> {
        Ok(self.issue_type(issue_type_id)?.map(to_jira_issue_type))
    }

    /// 作成画面に並ぶフィールド
    async fn get_attributes_of_issue_type(
        &self,
        project_id: i64,
        issue_type_id: i64,
    ) -> Result<Vec<JiraIssueTypeAttribute>> {
        let issue_type = self.issue_type(issue_type_id)?.ok_or_else(|| {
            missing(
                "IssueType not found",
                format!("No IssueType with id:{} found.", issue_type_id),
            )
        })?;
        let project = self.project(project_id)?;

        let fields = self
            .host
            .create_screen_fields(&project, &issue_type)
            .map_err(|e| Error::native(&e))?;
        Ok(fields.into_iter().map(to_attribute).collect())
    }
}
