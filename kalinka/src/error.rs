/// Errors produced by the synchronization core
#[derive(Debug, thiserror::Error)]
pub enum KalinkaError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server responded with status {0}")]
    Status(u16),

    #[error("Failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Server returned an empty response body")]
    EmptyResponse,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Session is closed")]
    SessionClosed,
}

impl From<url::ParseError> for KalinkaError {
    fn from(err: url::ParseError) -> Self {
        KalinkaError::InvalidUrl(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KalinkaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_parse_error_maps_to_invalid_url() {
        let err: KalinkaError = url::Url::parse("not a url").unwrap_err().into();
        match err {
            KalinkaError::InvalidUrl(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected InvalidUrl"),
        }
    }
}
