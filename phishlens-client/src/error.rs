use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid server URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    #[error("Could not decode response: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
