use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum CoverError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("transport fault: {0}")]
    TransportFault(String),
    #[error("transport timeout")]
    Timeout,
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing transport")]
    MissingTransport,
    #[error("missing cover config")]
    MissingConfig,
    #[error("missing scheduler")]
    MissingScheduler,
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
