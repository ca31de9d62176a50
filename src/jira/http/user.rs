use crate::error::{Error, Result};
use crate::http::{
    DEFAULT_PAGE_SIZE, DefaultHttpPage, HttpClientContext, QueryParams, collect_all,
    collect_all_pages, query_params,
};
use crate::jira::{UserOperator, distinct_by_name};
use crate::models::{HttpJiraRole, HttpJiraRoleActor, HttpJiraUser, JiraUser};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

const USER_ROLE_ACTOR: &str = "atlassian-user-role-actor";
const GROUP_ROLE_ACTOR: &str = "atlassian-group-role-actor";
const SYSTEM_ADMIN_GROUP: &str = "jira-administrators";

pub struct HttpJiraUserOperator {
    context: Arc<HttpClientContext>,
}

impl HttpJiraUserOperator {
    pub fn new(context: Arc<HttpClientContext>) -> Self {
        Self { context }
    }

    /// 配列を返す一覧APIを全件取得
    async fn get_users(&self, path: &str, params: QueryParams) -> Result<Vec<JiraUser>> {
        let users = collect_all(DEFAULT_PAGE_SIZE, |index, page_size| {
            let params = paged(&params, index, page_size);
            async move {
                self.context
                    .execute_get_body::<Vec<HttpJiraUser>>(path, &params)
                    .await
            }
        })
        .await?;

        Ok(users.into_iter().map(HttpJiraUser::into_jira_user).collect())
    }

    /// ページ形式の一覧APIを全件取得
    async fn get_users_paginated(&self, path: &str, params: QueryParams) -> Result<Vec<JiraUser>> {
        let users = collect_all_pages(DEFAULT_PAGE_SIZE, |index, page_size| {
            let params = paged(&params, index, page_size);
            async move {
                self.context
                    .execute_get_body::<DefaultHttpPage<HttpJiraUser>>(path, &params)
                    .await
            }
        })
        .await?;

        Ok(users.into_iter().map(HttpJiraUser::into_jira_user).collect())
    }

    async fn get_group_members(&self, group_name: &str) -> Result<Vec<JiraUser>> {
        self.get_users_paginated(
            "/rest/api/2/group/member",
            query_params([("groupname", group_name.to_string())]),
        )
        .await
    }

    /// ロールURLの末尾をロールIDとして返す
    async fn get_project_role_ids(&self, project_key: &str) -> Result<Vec<String>> {
        let roles: Value = self
            .context
            .execute_get_body(&format!("/rest/api/2/project/{}/role", project_key), &[])
            .await?;

        Ok(roles
            .as_object()
            .map(|roles| {
                roles
                    .values()
                    .filter_map(Value::as_str)
                    .filter_map(|url| url.rsplit('/').next())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_project_role_actors(
        &self,
        project_key: &str,
        role_id: &str,
    ) -> Result<Vec<HttpJiraRoleActor>> {
        let role: HttpJiraRole = self
            .context
            .execute_get_body(
                &format!("/rest/api/2/project/{}/role/{}", project_key, role_id),
                &[],
            )
            .await?;
        Ok(role.actors)
    }

    async fn get_user(&self, user_name: &str) -> Result<JiraUser> {
        let user: HttpJiraUser = self
            .context
            .execute_get_body(
                "/rest/api/2/user",
                &query_params([("username", user_name.to_string())]),
            )
            .await?;
        Ok(user.into_jira_user())
    }

    async fn actor_to_users(&self, actor: &HttpJiraRoleActor) -> Result<Vec<JiraUser>> {
        match actor.actor_type.as_str() {
            USER_ROLE_ACTOR => Ok(vec![self.get_user(&actor.name).await?]),
            GROUP_ROLE_ACTOR => self.get_group_members(&actor.name).await,
            other => Err(Error::Http {
                error: "Unknown actor type".to_string(),
                message: format!(
                    "Actor type {} for actor {} is not known.",
                    other, actor.name
                ),
                status_code: Some(404),
            }),
        }
    }
}

fn paged(params: &[(String, String)], index: u32, page_size: u32) -> QueryParams {
    let mut params = params.to_vec();
    params.push(("startAt".to_string(), index.to_string()));
    params.push(("maxResults".to_string(), page_size.to_string()));
    params
}

#[async_trait]
impl UserOperator for HttpJiraUserOperator {
    async fn get_users_by_project_key(&self, project_key: &str) -> Result<Vec<JiraUser>> {
        let mut actors = Vec::new();
        for role_id in self.get_project_role_ids(project_key).await? {
            actors.extend(self.get_project_role_actors(project_key, &role_id).await?);
        }
        let actors = distinct_by_name(actors, |actor| actor.name.as_str());

        let mut users = Vec::new();
        for actor in &actors {
            users.extend(self.actor_to_users(actor).await?);
        }
        Ok(distinct_by_name(users, |user| user.name.as_str()))
    }

    async fn get_system_admin_users(&self) -> Result<Vec<JiraUser>> {
        self.get_group_members(SYSTEM_ADMIN_GROUP).await
    }

    async fn get_users_by_project_key_and_permission(
        &self,
        project_key: &str,
        permission_name: &str,
    ) -> Result<Vec<JiraUser>> {
        self.get_users(
            "/rest/api/2/user/permission/search",
            query_params([
                ("permissions", permission_name.to_string()),
                ("projectKey", project_key.to_string()),
            ]),
        )
        .await
    }
}
