use super::{IssueStore, Workflow, existing_issue};
use crate::error::{Error, Result};
use crate::jira::TransitionOperator;
use crate::models::JiraTransition;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub struct NativeTransitionOperator<H> {
    host: Arc<H>,
}

impl<H> NativeTransitionOperator<H>
where
    H: IssueStore + Workflow + 'static,
{
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }
}

/// 遷移IDはワークフローのアクションID（整数）
fn action_id(transition_id: &str) -> Result<i32> {
    transition_id.trim().parse().map_err(|_| {
        Error::internal(
            "Illegal Argument",
            format!("Transition with id {} must be of type Int.", transition_id),
        )
    })
}

#[async_trait]
impl<H> TransitionOperator for NativeTransitionOperator<H>
where
    H: IssueStore + Workflow + 'static,
{
    /// 現在のステータスから検証を通る遷移だけを返す
    async fn get_available_transitions(&self, issue_key: &str) -> Result<Vec<JiraTransition>> {
        let issue = existing_issue(self.host.as_ref(), issue_key)?;
        let transitions = self
            .host
            .workflow_transitions(&issue)
            .map_err(|e| Error::native(&e))?;

        let mut available = Vec::new();
        for transition in transitions {
            let valid = self
                .host
                .validate_transition(&issue, transition.action_id, None)
                .map_err(|e| Error::native(&e))?;
            if valid {
                available.push(JiraTransition {
                    id: transition.action_id.to_string(),
                    name: transition.name,
                });
            }
        }
        Ok(available)
    }

    async fn do_transition(
        &self,
        issue_key: &str,
        transition_id: &str,
        comment: Option<&str>,
    ) -> Result<()> {
        let action_id = action_id(transition_id)?;
        let issue = existing_issue(self.host.as_ref(), issue_key)?;

        let valid = self
            .host
            .validate_transition(&issue, action_id, comment)
            .map_err(|e| Error::native(&e))?;
        if !valid {
            return Err(Error::InvalidInput(format!(
                "Transition {} is not available for issue {}",
                transition_id, issue_key
            )));
        }

        let executed = self
            .host
            .transition(&issue, action_id, comment)
            .map_err(|e| Error::native(&e))?;
        if !executed {
            return Err(Error::internal(
                "Transition failed",
                format!("Transition {} on issue {} was rejected", transition_id, issue_key),
            ));
        }
        debug!("Transitioned {} with action {}", issue_key, action_id);
        Ok(())
    }
}
