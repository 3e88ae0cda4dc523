use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngagementError {
    #[error("preference store error: {0}")]
    StoreError(String),
    #[error("content source unavailable: {0}")]
    ContentUnavailable(String),
    #[error("advice generation unavailable: {0}")]
    AdviceUnavailable(String),
}
