use thiserror::Error;

pub const HTTP_ERROR: &str = "HTTP-ERROR";
pub const INTERNAL_ERROR: &str = "InternalError";
pub const NOT_FOUND: &str = "NotFound";
pub const IO_ERROR: &str = "IoError";

/// クライアント全体で共通のエラー値
///
/// どのバリアントも `category` / `message` / `trace` / `status_code` の4要素に正規化でき、
/// 等価性はこの4要素だけで判定する。
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("{error}: {message}")]
    Http {
        error: String,
        message: String,
        status_code: Option<u16>,
    },

    #[error("{error}: {message}")]
    Internal {
        error: String,
        message: String,
        stacktrace: String,
    },

    #[error("Not found: {message}")]
    NotFound { error: String, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON parsing failed: {0}")]
    JsonParsing(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTPステータスとレスポンスボディからエラーを作成
    pub fn http(status_code: u16, body: impl Into<String>) -> Self {
        Error::Http {
            error: HTTP_ERROR.to_string(),
            message: body.into(),
            status_code: Some(status_code),
        }
    }

    /// 未対応のHTTPメソッド。通信は行わない
    pub fn unsupported_method(method: &str) -> Self {
        Error::http(500, format!("Method '{}' not available", method))
    }

    /// ネイティブ側の失敗を変換する。カテゴリは失敗した型の名前になる
    pub fn native<E>(err: &E) -> Self
    where
        E: std::error::Error + 'static,
    {
        let type_name = std::any::type_name::<E>();
        let short_name = type_name
            .split('<')
            .next()
            .and_then(|path| path.rsplit("::").next())
            .filter(|name| !name.is_empty())
            .unwrap_or(INTERNAL_ERROR);

        Self::failure(short_name, err)
    }

    /// カテゴリを指定して失敗を変換する。原因の連鎖はトレースに積む
    fn failure(category: &str, err: &(dyn std::error::Error + 'static)) -> Self {
        let mut stacktrace = format!("{:?}", err);
        let mut source = err.source();
        while let Some(cause) = source {
            stacktrace.push_str("\nCaused by: ");
            stacktrace.push_str(&cause.to_string());
            source = cause.source();
        }

        Error::Internal {
            error: category.to_string(),
            message: err.to_string(),
            stacktrace,
        }
    }

    pub fn internal(error: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Internal {
            error: error.into(),
            message: message.into(),
            stacktrace: String::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound {
            error: NOT_FOUND.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> &str {
        match self {
            Error::Http { error, .. } => error,
            Error::Internal { error, .. } => error,
            Error::NotFound { error, .. } => error,
            Error::InvalidConfiguration(_) => "InvalidConfiguration",
            Error::ConfigurationMissing(_) => "ConfigurationMissing",
            Error::InvalidInput(_) => "InvalidInput",
            Error::JsonParsing(_) => "JsonParsing",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Error::Http { message, .. } => message,
            Error::Internal { message, .. } => message,
            Error::NotFound { message, .. } => message,
            Error::InvalidConfiguration(message)
            | Error::ConfigurationMissing(message)
            | Error::InvalidInput(message)
            | Error::JsonParsing(message) => message,
        }
    }

    pub fn trace(&self) -> &str {
        match self {
            Error::Internal { stacktrace, .. } => stacktrace,
            _ => "",
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Http { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// 「存在しない」ことを表すエラーかどうか
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. }) || self.status_code() == Some(404)
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.category() == other.category()
            && self.message() == other.message()
            && self.trace() == other.trace()
            && self.status_code() == other.status_code()
    }
}

impl Eq for Error {}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http {
            error: HTTP_ERROR.to_string(),
            message: err.to_string(),
            status_code: err.status().map(|status| status.as_u16()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonParsing(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::failure(IO_ERROR, &err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::InvalidConfiguration(format!("Invalid URL: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("field is broken")]
    struct BrokenFieldError;

    #[test]
    fn test_http_error_copies_status_and_body() {
        // Given: ステータス502とレスポンスボディ
        // When: HTTPエラーを作成
        let error = Error::http(502, "upstream unavailable");

        // Then: 4要素が正規化される
        assert_eq!(error.category(), "HTTP-ERROR");
        assert_eq!(error.message(), "upstream unavailable");
        assert_eq!(error.trace(), "");
        assert_eq!(error.status_code(), Some(502));
    }

    #[test]
    fn test_unsupported_method_is_synthesized_500() {
        let error = Error::unsupported_method("PATCH");

        assert_eq!(error.category(), "HTTP-ERROR");
        assert_eq!(error.status_code(), Some(500));
        assert_eq!(error.message(), "Method 'PATCH' not available");
    }

    #[test]
    fn test_native_error_uses_type_name_as_category() {
        // Given: ネイティブ側で発生した失敗
        let failure = BrokenFieldError;

        // When: ドメインエラーに変換
        let error = Error::native(&failure);

        // Then: 型名がカテゴリ、メッセージとトレースが埋まる
        assert_eq!(error.category(), "BrokenFieldError");
        assert_eq!(error.message(), "field is broken");
        assert!(error.trace().contains("BrokenFieldError"));
        assert_eq!(error.status_code(), None);
    }

    #[test]
    fn test_equality_is_structural() {
        let a = Error::http(404, "missing");
        let b = Error::http(404, "missing");
        let c = Error::http(400, "missing");

        assert_eq!(a, b);
        assert_ne!(a, c);

        // 同じ4要素なら別バリアントでも等しい
        let internal = Error::internal("NotFound", "gone");
        assert_eq!(internal, Error::not_found("gone"));
    }

    #[test]
    fn test_not_found_detection() {
        assert!(Error::not_found("no issue").is_not_found());
        assert!(Error::http(404, "").is_not_found());
        assert!(!Error::http(500, "").is_not_found());
        assert!(!Error::InvalidInput("x".to_string()).is_not_found());
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = parse_error.into();

        assert_eq!(error.category(), "JsonParsing");
    }

    #[test]
    fn test_io_error_has_fixed_category() {
        // Given: ファイル操作の失敗
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");

        // When: ドメインエラーに変換
        let error: Error = io_error.into();

        // Then: 型名ではなく固定のカテゴリになる
        assert_eq!(error.category(), IO_ERROR);
        assert_eq!(error.message(), "denied");
        assert!(error.trace().contains("PermissionDenied"));
    }
}
