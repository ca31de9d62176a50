//! REST API (`rest/insight/1.0`) によるオペレーター実装

mod api;
mod attachment;
mod history;
mod object;
mod object_type;
mod schema;
mod schema_source;

pub use attachment::{HttpInsightAttachmentOperator, guess_mime_type};
pub use history::HttpInsightHistoryOperator;
pub use object::HttpInsightObjectOperator;
pub use object_type::HttpInsightObjectTypeOperator;
pub use schema::HttpInsightSchemaOperator;
pub use schema_source::HttpSchemaSource;
