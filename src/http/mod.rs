pub mod context;
pub mod paging;
pub mod transport;

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fmt;

pub use context::HttpClientContext;
pub use paging::{DEFAULT_PAGE_SIZE, DefaultHttpPage, HttpPage, collect_all, collect_all_pages};
pub use transport::ReqwestTransport;

pub const APPLICATION_JSON: &str = "application/json";

pub type QueryParams = Vec<(String, String)>;

/// このレイヤーが送信できるHTTPメソッド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// 未対応のメソッドは通信前に500エラーとして扱う
    pub fn parse(method: &str) -> Result<Self> {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(Error::unsupported_method(method)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub method: HttpMethod,
    pub url: String,
    pub mime_type: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse<T> {
    pub status_code: u16,
    pub body: T,
}

impl<T> HttpResponse<T> {
    pub fn map<U, F>(self, f: F) -> HttpResponse<U>
    where
        F: FnOnce(T) -> U,
    {
        HttpResponse {
            status_code: self.status_code,
            body: f(self.body),
        }
    }
}

/// HTTP通信を担うコラボレーター
///
/// ステータスが400以上でも `Ok` で返し、成否の判定は呼び出し側に任せる。
/// `Err` になるのは接続レベルの失敗のみ。
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse<String>>;

    async fn download(&self, request: HttpRequest) -> Result<HttpResponse<Vec<u8>>>;

    async fn upload(&self, request: UploadRequest) -> Result<HttpResponse<Vec<u8>>>;
}

/// ステータス400未満なら成功
pub fn is_success_status(status_code: u16) -> bool {
    status_code < 400
}

/// レスポンスを成功/失敗に振り分ける。失敗時はボディをメッセージにする
pub fn classify_response(response: HttpResponse<String>) -> Result<HttpResponse<String>> {
    if is_success_status(response.status_code) {
        Ok(response)
    } else {
        Err(Error::http(response.status_code, response.body))
    }
}

pub fn classify_bytes(response: HttpResponse<Vec<u8>>) -> Result<HttpResponse<Vec<u8>>> {
    if is_success_status(response.status_code) {
        Ok(response)
    } else {
        let message = String::from_utf8_lossy(&response.body).into_owned();
        Err(Error::http(response.status_code, message))
    }
}

/// ベースURLと相対パスからURLを組み立てる
///
/// 先頭の `/` は取り除く。絶対URLはそのまま使う。クエリは空でなければ付与する。
pub fn build_url(base_url: &str, path: &str, params: &[(String, String)]) -> String {
    let mut url = if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    };

    if !params.is_empty() {
        let separator = if url.contains('?') { '&' } else { '?' };
        url.push(separator);
        url.push_str(&encode_query(params));
    }

    url
}

pub fn encode_query(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// `[("jql", value)]` 形式からクエリパラメータを作る
pub fn query_params<const N: usize>(pairs: [(&str, String); N]) -> QueryParams {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
