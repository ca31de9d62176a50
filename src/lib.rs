pub mod client;
pub mod config_store;
pub mod error;
pub mod field;
pub mod http;
pub mod insight;
pub mod jira;
pub mod models;
pub mod native;
pub mod page;

pub use client::{Auth, InsightClient, JiraClient, JiraConfig};
pub use error::{Error, Result};
pub use models::*;
pub use page::Page;

// Field re-exports
pub use field::{Field, FieldFactory, FieldKind, FieldMappings, HttpField, HttpFieldFactory};

// Operator trait re-exports
pub use jira::{
    CommentOperator, IssueLinkOperator, IssueOperator, IssueParser, IssueTypeOperator,
    ProjectOperator, TransitionOperator, UserOperator,
};
pub use insight::{
    InsightAttachmentOperator, InsightHistoryOperator, InsightObjectOperator,
    InsightObjectTypeOperator, InsightSchemaCache, InsightSchemaOperator, SchemaSource,
};

// Transport re-exports
pub use http::{HttpClientContext, HttpTransport, ReqwestTransport};

// Config store re-exports
pub use config_store::{ClientSettings, ConfigStore, MemoryConfigStore};
#[cfg(feature = "settings-file")]
pub use config_store::FileConfigStore;
