use thiserror::Error;

/// Errors from the backend API adapter. The cached fetch wrappers convert
/// all of these into logged safe defaults; only direct `AdsClient` callers
/// see them.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("backend error: {0}")]
    Api(String),
}
