use thiserror::Error;

/// Errors surfaced by `CourseApi` implementations.
///
/// Everything here is transient from the caller's point of view except
/// `NotFound`; the state machine above never transitions on any of them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,

    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("malformed payload: {0}")]
    Decode(String),
}
