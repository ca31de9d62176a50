use super::{
    APPLICATION_JSON, HttpMethod, HttpRequest, HttpResponse, HttpTransport, UploadRequest,
    build_url, classify_bytes, classify_response,
};
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// ベースURLとトランスポートを束ね、REST呼び出しを組み立てる
#[derive(Clone)]
pub struct HttpClientContext {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
}

impl HttpClientContext {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(
        &self,
        method: &str,
        path: &str,
        params: &[(String, String)],
        body: Option<String>,
        content_type: Option<&str>,
    ) -> Result<HttpRequest> {
        let method = HttpMethod::parse(method)?;
        let url = build_url(&self.base_url, path, params);
        tracing::debug!("{} {}", method, url);

        Ok(HttpRequest {
            method,
            url,
            body,
            content_type: Some(content_type.unwrap_or(APPLICATION_JSON).to_string()),
            headers: Vec::new(),
        })
    }

    /// 生のボディを返すREST呼び出し。ステータス400以上はエラー
    pub async fn execute_rest_call(
        &self,
        method: &str,
        path: &str,
        params: &[(String, String)],
        body: Option<String>,
        content_type: Option<&str>,
    ) -> Result<HttpResponse<String>> {
        let request = self.request(method, path, params, body, content_type)?;
        let response = self.transport.execute(request).await?;
        classify_response(response)
    }

    /// ボディをJSONとしてデコードする。空ボディは `None`
    pub async fn execute_rest<T>(
        &self,
        method: &str,
        path: &str,
        params: &[(String, String)],
        body: Option<String>,
    ) -> Result<HttpResponse<Option<T>>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .execute_rest_call(method, path, params, body, Some(APPLICATION_JSON))
            .await?;
        let status_code = response.status_code;
        let body = if response.body.trim().is_empty() {
            None
        } else {
            Some(serde_json::from_str::<T>(&response.body)?)
        };

        Ok(HttpResponse { status_code, body })
    }

    pub async fn execute_get<T>(&self, path: &str, params: &[(String, String)]) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        Ok(self.execute_rest("GET", path, params, None).await?.body)
    }

    /// ボディ必須のGET。空ボディはエラー
    pub async fn execute_get_body<T>(&self, path: &str, params: &[(String, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.execute_get(path, params).await?.ok_or_else(|| {
            Error::JsonParsing(format!("Empty response body from {}", path))
        })
    }

    pub async fn execute_get_call(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<String> {
        Ok(self
            .execute_rest_call("GET", path, params, None, None)
            .await?
            .body)
    }

    pub async fn execute_download(
        &self,
        method: &str,
        path: &str,
        params: &[(String, String)],
        body: Option<String>,
        content_type: Option<&str>,
    ) -> Result<HttpResponse<Vec<u8>>> {
        let request = self.request(method, path, params, body, content_type)?;
        let response = self.transport.download(request).await?;
        classify_bytes(response)
    }

    pub async fn execute_upload(
        &self,
        method: &str,
        path: &str,
        params: &[(String, String)],
        mime_type: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<HttpResponse<Vec<u8>>> {
        let method = HttpMethod::parse(method)?;
        let url = build_url(&self.base_url, path, params);
        tracing::debug!("{} {} (upload {})", method, url, filename);

        let response = self
            .transport
            .upload(UploadRequest {
                method,
                url,
                mime_type: mime_type.to_string(),
                filename: filename.to_string(),
                bytes,
            })
            .await?;
        classify_bytes(response)
    }
}
