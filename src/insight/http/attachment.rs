use crate::error::Result;
use crate::http::HttpClientContext;
use crate::insight::{AttachmentId, InsightAttachment, InsightAttachmentOperator, InsightObjectId};
use async_trait::async_trait;
use std::sync::Arc;

const OCTET_STREAM: &str = "application/octet-stream";

const MIME_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
    ("pdf", "application/pdf"),
    ("txt", "text/plain"),
    ("csv", "text/csv"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("xml", "application/xml"),
    ("json", "application/json"),
    ("zip", "application/zip"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
];

/// 拡張子からMIMEタイプを推定する。不明なら `application/octet-stream`
pub fn guess_mime_type(filename: &str) -> &'static str {
    let Some((_, extension)) = filename.rsplit_once('.') else {
        return OCTET_STREAM;
    };
    let extension = extension.to_ascii_lowercase();
    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, mime_type)| *mime_type)
        .unwrap_or(OCTET_STREAM)
}

pub struct HttpInsightAttachmentOperator {
    context: Arc<HttpClientContext>,
}

impl HttpInsightAttachmentOperator {
    pub fn new(context: Arc<HttpClientContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl InsightAttachmentOperator for HttpInsightAttachmentOperator {
    async fn get_attachments(&self, object_id: InsightObjectId) -> Result<Vec<InsightAttachment>> {
        let attachments = self
            .context
            .execute_get::<Vec<InsightAttachment>>(
                &format!("/rest/insight/1.0/attachments/object/{}", object_id),
                &[],
            )
            .await?;
        Ok(attachments.unwrap_or_default())
    }

    async fn download_attachment(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .context
            .execute_download("GET", url, &[], None, None)
            .await?;
        Ok(response.body)
    }

    async fn upload_attachment(
        &self,
        object_id: InsightObjectId,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<Vec<InsightAttachment>> {
        self.context
            .execute_upload(
                "POST",
                &format!("/rest/insight/1.0/attachments/object/{}", object_id),
                &[],
                guess_mime_type(filename),
                filename,
                bytes,
            )
            .await?;
        self.get_attachments(object_id).await
    }

    async fn delete_attachment(&self, attachment_id: AttachmentId) -> Result<()> {
        self.context
            .execute_rest_call(
                "DELETE",
                &format!("/rest/insight/1.0/attachments/{}", attachment_id),
                &[],
                None,
                None,
            )
            .await?;
        Ok(())
    }
}
