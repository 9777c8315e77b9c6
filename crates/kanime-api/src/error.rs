use thiserror::Error;

/// Transport-level failure from the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl CatalogError {
    /// HTTP status code, when the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
