use url::Url;

use crate::error::{KalinkaError, Result};

/// Resolves endpoint paths and server-relative references against the base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlResolver {
    base: Url,
}

impl UrlResolver {
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base)?;
        match base.scheme() {
            "http" | "https" => {}
            other => {
                return Err(KalinkaError::InvalidUrl(format!(
                    "unsupported scheme '{}' in {}",
                    other, base
                )))
            }
        }
        if base.host_str().is_none() {
            return Err(KalinkaError::InvalidUrl(format!("missing host in {}", base)));
        }
        Ok(Self { base })
    }

    /// Build the URL of an absolute endpoint path such as `/queue/play`
    pub fn endpoint(&self, path_and_query: &str) -> Result<Url> {
        Ok(self.base.join(path_and_query)?)
    }

    /// Make a possibly relative reference absolute
    ///
    /// References already starting with `http` are returned unchanged; others
    /// are appended to the base with exactly one separating slash.
    pub fn abs(&self, path: &str) -> String {
        if path.starts_with("http") {
            return path.to_string();
        }
        let base = self.base_key().trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    /// Stable key identifying the server
    pub fn base_key(&self) -> &str {
        self.base.as_str()
    }
}
