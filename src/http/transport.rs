use super::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, UploadRequest, APPLICATION_JSON};
use crate::client::{Auth, JiraConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, RequestBuilder, header, multipart};

/// reqwestによる `HttpTransport` 実装
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &JiraConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(APPLICATION_JSON),
        );

        // 認証ヘッダーを追加
        let authorization = match &config.auth {
            Auth::Basic { username, api_token } => {
                let auth_value = format!("{}:{}", username, api_token);
                let encoded =
                    base64::engine::general_purpose::STANDARD.encode(auth_value.as_bytes());
                format!("Basic {}", encoded)
            }
            Auth::Bearer { token } => format!("Bearer {}", token),
        };
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&authorization)
                .map_err(|_| Error::InvalidConfiguration("Invalid auth header".to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| {
                Error::InvalidConfiguration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn request(&self, method: HttpMethod, url: &str) -> RequestBuilder {
        match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Put => self.client.put(url),
            HttpMethod::Delete => self.client.delete(url),
        }
    }

    fn prepare(&self, request: HttpRequest) -> RequestBuilder {
        let content_type = request
            .content_type
            .unwrap_or_else(|| APPLICATION_JSON.to_string());

        let mut builder = self
            .request(request.method, &request.url)
            .header(header::CONTENT_TYPE, content_type);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        builder
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse<String>> {
        let response = self.prepare(request).send().await?;
        let status_code = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse { status_code, body })
    }

    async fn download(&self, request: HttpRequest) -> Result<HttpResponse<Vec<u8>>> {
        let response = self.prepare(request).send().await?;
        let status_code = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status_code, body })
    }

    async fn upload(&self, request: UploadRequest) -> Result<HttpResponse<Vec<u8>>> {
        let part = multipart::Part::bytes(request.bytes)
            .file_name(request.filename)
            .mime_str(&request.mime_type)
            .map_err(|e| Error::InvalidInput(format!("Invalid mime type: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .request(request.method, &request.url)
            .header(header::CONNECTION, "keep-alive")
            .header(header::CACHE_CONTROL, "no-cache")
            .multipart(form)
            .send()
            .await?;
        let status_code = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status_code, body })
    }
}
