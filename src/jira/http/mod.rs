//! REST API (`rest/api/2`) によるオペレーター実装

mod comment;
mod issue;
mod issue_type;
mod link;
mod project;
mod transition;
mod user;

pub use comment::HttpJiraCommentOperator;
pub use issue::HttpJiraIssueOperator;
pub use issue_type::HttpJiraIssueTypeOperator;
pub use link::HttpJiraIssueLinkOperator;
pub use project::HttpJiraProjectOperator;
pub use transition::HttpJiraTransitionOperator;
pub use user::HttpJiraUserOperator;
