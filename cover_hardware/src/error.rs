use thiserror::Error;

/// Failures of a blaster backend.
#[derive(Debug, Error)]
pub enum HwError {
    #[error("device unreachable: {0}")]
    Unreachable(String),
    #[error("send timeout")]
    Timeout,
}
