use super::{IssueLinkStore, IssueStore, existing_issue, issue_id, missing, parse_id};
use crate::error::{Error, Result};
use crate::jira::IssueLinkOperator;
use async_trait::async_trait;
use std::sync::Arc;

pub struct NativeIssueLinkOperator<H> {
    host: Arc<H>,
}

impl<H> NativeIssueLinkOperator<H>
where
    H: IssueStore + IssueLinkStore + 'static,
{
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    fn issue_id_by_key(&self, issue_key: &str) -> Result<i64> {
        let issue = existing_issue(self.host.as_ref(), issue_key)?;
        issue_id(&issue, issue_key)
    }
}

#[async_trait]
impl<H> IssueLinkOperator for NativeIssueLinkOperator<H>
where
    H: IssueStore + IssueLinkStore + 'static,
{
    async fn create_issue_link(
        &self,
        inward_issue_key: &str,
        outward_issue_key: &str,
        relation_name: &str,
    ) -> Result<()> {
        let inward = self.issue_id_by_key(inward_issue_key)?;
        let outward = self.issue_id_by_key(outward_issue_key)?;
        let link_type = self
            .host
            .link_type_id(relation_name)
            .map_err(|e| Error::native(&e))?
            .ok_or_else(|| {
                missing(
                    "IssueLinkType not found",
                    format!("No IssueLinkType named {} found.", relation_name),
                )
            })?;

        self.host
            .create_link(inward, outward, link_type)
            .map_err(|e| Error::native(&e))
    }

    async fn delete_issue_link(&self, link_id: &str) -> Result<()> {
        let id = parse_id("Issue link", link_id)?;
        let removed = self
            .host
            .remove_link(id)
            .map_err(|e| Error::native(&e))?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found(format!("Issue link {} does not exist", link_id)))
        }
    }
}
