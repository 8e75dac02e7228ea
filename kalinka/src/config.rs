use std::time::Duration;

use crate::url_resolver::UrlResolver;

/// Configuration for one remote-control session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Server root, e.g. `http://192.168.1.20:8000`
    pub base_url: String,
    /// Quiet period that closes a volume interaction window
    pub volume_window: Duration,
    /// Maximum rate of outbound volume commands
    pub volume_rate_hz: f64,
    /// Age after which an unconfirmed seek stops masking server positions
    pub seek_timeout: Option<Duration>,
    /// Reconnect attempts after the event stream drops
    pub retry_attempts: u32,
    /// Base duration for exponential reconnect backoff
    pub retry_backoff: Duration,
    /// Longest accepted event record in bytes
    pub max_line_length: usize,
    /// Per-command timeout; the event stream is never timed out
    pub request_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            volume_window: Duration::from_millis(250),
            volume_rate_hz: 5.0,
            seek_timeout: Some(Duration::from_secs(5)),
            retry_attempts: 3,
            retry_backoff: Duration::from_secs(1),
            max_line_length: 1024 * 1024,
            request_timeout: None,
        }
    }
}

impl SessionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Build a config for `http://{host}:{port}`
    pub fn for_host(host: &str, port: u16) -> Self {
        Self::new(format!("http://{}:{}", host, port))
    }

    /// Read `KALINKA_HOST`, `KALINKA_PORT` and the optional `KALINKA_RETRY_ATTEMPTS`
    pub fn from_env() -> Result<Self, String> {
        let host = std::env::var("KALINKA_HOST")
            .map_err(|_| "KALINKA_HOST is not set".to_string())?;
        let port = std::env::var("KALINKA_PORT")
            .map_err(|_| "KALINKA_PORT is not set".to_string())?
            .parse::<u16>()
            .map_err(|e| format!("KALINKA_PORT is not a valid port: {}", e))?;

        let mut config = Self::for_host(&host, port);
        if let Ok(attempts) = std::env::var("KALINKA_RETRY_ATTEMPTS") {
            let attempts = attempts
                .parse::<u32>()
                .map_err(|e| format!("KALINKA_RETRY_ATTEMPTS is not a number: {}", e))?;
            config = config.with_retry_attempts(attempts)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Set the volume interaction window with validation
    pub fn with_volume_window(mut self, window: Duration) -> Result<Self, String> {
        if window < Duration::from_millis(10) {
            return Err("Volume window must be at least 10ms".to_string());
        }
        if window > Duration::from_secs(5) {
            return Err("Volume window too long (max 5 seconds)".to_string());
        }
        self.volume_window = window;
        Ok(self)
    }

    /// Set the outbound volume rate with validation
    pub fn with_volume_rate(mut self, hz: f64) -> Result<Self, String> {
        if !(hz.is_finite() && hz > 0.0) {
            return Err("Volume rate must be a positive number".to_string());
        }
        if hz > 100.0 {
            return Err("Volume rate too high (max 100 Hz)".to_string());
        }
        self.volume_rate_hz = hz;
        Ok(self)
    }

    /// Set or disable the seek intent timeout
    pub fn with_seek_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.seek_timeout = timeout;
        self
    }

    /// Set the reconnect attempts with validation
    pub fn with_retry_attempts(mut self, attempts: u32) -> Result<Self, String> {
        if attempts > 10 {
            return Err("Too many retry attempts (max 10)".to_string());
        }
        self.retry_attempts = attempts;
        Ok(self)
    }

    /// Set the reconnect backoff base
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Set the maximum record length with validation
    pub fn with_max_line_length(mut self, length: usize) -> Result<Self, String> {
        if length == 0 {
            return Err("Max line length must be greater than 0".to_string());
        }
        self.max_line_length = length;
        Ok(self)
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Delay before reconnect attempt `attempt` (1-based), doubling up to 64x
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(6);
        self.retry_backoff.saturating_mul(1 << exponent)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), String> {
        UrlResolver::new(&self.base_url).map_err(|e| e.to_string())?;
        if self.volume_window < Duration::from_millis(10) || self.volume_window > Duration::from_secs(5)
        {
            return Err("Volume window must be between 10ms and 5 seconds".to_string());
        }
        if !(self.volume_rate_hz.is_finite() && self.volume_rate_hz > 0.0 && self.volume_rate_hz <= 100.0)
        {
            return Err("Volume rate must be in (0, 100] Hz".to_string());
        }
        if self.retry_attempts > 10 {
            return Err("Too many retry attempts (max 10)".to_string());
        }
        if self.max_line_length == 0 {
            return Err("Max line length must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.volume_window, Duration::from_millis(250));
        assert_eq!(config.volume_rate_hz, 5.0);
        assert_eq!(config.seek_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.retry_attempts, 3);
        assert!(config.request_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_for_host() {
        let config = SessionConfig::for_host("10.0.0.4", 8000);
        assert_eq!(config.base_url, "http://10.0.0.4:8000");
    }

    #[test]
    fn test_session_config_validation() {
        assert!(SessionConfig::new("not a url").validate().is_err());
        assert!(SessionConfig::default()
            .with_volume_window(Duration::from_millis(5))
            .is_err());
        assert!(SessionConfig::default()
            .with_volume_window(Duration::from_secs(6))
            .is_err());
        assert!(SessionConfig::default().with_volume_rate(0.0).is_err());
        assert!(SessionConfig::default().with_volume_rate(500.0).is_err());
        assert!(SessionConfig::default().with_retry_attempts(11).is_err());
        assert!(SessionConfig::default().with_max_line_length(0).is_err());

        let mut invalid = SessionConfig::default();
        invalid.volume_rate_hz = f64::INFINITY;
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = SessionConfig::default().with_retry_backoff(Duration::from_millis(100));
        assert_eq!(config.backoff_for(1), Duration::from_millis(100));
        assert_eq!(config.backoff_for(2), Duration::from_millis(200));
        assert_eq!(config.backoff_for(3), Duration::from_millis(400));
        assert_eq!(config.backoff_for(20), Duration::from_millis(6400));
    }
}
