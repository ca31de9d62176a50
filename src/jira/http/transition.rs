use crate::error::Result;
use crate::http::HttpClientContext;
use crate::jira::TransitionOperator;
use crate::models::{HttpJiraTransitions, JiraTransition};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

pub struct HttpJiraTransitionOperator {
    context: Arc<HttpClientContext>,
}

impl HttpJiraTransitionOperator {
    pub fn new(context: Arc<HttpClientContext>) -> Self {
        Self { context }
    }
}

/// コメント付きの場合は `update.comment` に追加する
fn transition_body(transition_id: &str, comment: Option<&str>) -> String {
    let mut body = json!({ "transition": { "id": transition_id } });
    if let Some(comment) = comment {
        body["update"] = json!({ "comment": [{ "add": { "body": comment } }] });
    }
    body.to_string()
}

#[async_trait]
impl TransitionOperator for HttpJiraTransitionOperator {
    async fn get_available_transitions(&self, issue_key: &str) -> Result<Vec<JiraTransition>> {
        let transitions: HttpJiraTransitions = self
            .context
            .execute_get_body(&format!("/rest/api/2/issue/{}/transitions", issue_key), &[])
            .await?;
        Ok(transitions.transitions)
    }

    async fn do_transition(
        &self,
        issue_key: &str,
        transition_id: &str,
        comment: Option<&str>,
    ) -> Result<()> {
        self.context
            .execute_rest_call(
                "POST",
                &format!("/rest/api/2/issue/{}/transitions", issue_key),
                &[],
                Some(transition_body(transition_id, comment)),
                None,
            )
            .await?;
        Ok(())
    }
}
