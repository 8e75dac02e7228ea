use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;

use crate::error::{KalinkaError, Result};
use crate::model::{CommandOutcome, DeviceVolume};
use crate::url_resolver::UrlResolver;

/// Shared failure callback; it receives no error detail
pub type ErrorHandler = Arc<dyn Fn() + Send + Sync>;

/// Issues remote player commands over plain request/response HTTP
///
/// Every call is independent of the event stream and of other calls. Any
/// transport, status or decode failure invokes the shared error handler and
/// is also returned to the caller.
#[derive(Clone)]
pub struct PlayerProxy {
    http: Client,
    urls: UrlResolver,
    on_error: ErrorHandler,
}

impl std::fmt::Debug for PlayerProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerProxy")
            .field("base", &self.urls.base_key())
            .finish()
    }
}

impl PlayerProxy {
    pub fn new(
        urls: UrlResolver,
        on_error: ErrorHandler,
        request_timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, urls, on_error))
    }

    pub fn with_client(http: Client, urls: UrlResolver, on_error: ErrorHandler) -> Self {
        Self {
            http,
            urls,
            on_error,
        }
    }

    pub async fn play(&self) -> Result<CommandOutcome> {
        self.send(Method::PUT, "/queue/play").await
    }

    pub async fn pause(&self, paused: bool) -> Result<CommandOutcome> {
        self.send(Method::PUT, &format!("/queue/pause?paused={}", paused))
            .await
    }

    pub async fn stop(&self) -> Result<CommandOutcome> {
        self.send(Method::PUT, "/queue/stop").await
    }

    pub async fn skip_next(&self) -> Result<CommandOutcome> {
        self.send(Method::PUT, "/queue/next").await
    }

    pub async fn skip_prev(&self) -> Result<CommandOutcome> {
        self.send(Method::PUT, "/queue/prev").await
    }

    /// Seek within the current track; a confirmed seek echoes `position_ms`
    pub async fn seek_to(&self, position_ms: u64) -> Result<CommandOutcome> {
        self.send(
            Method::PUT,
            &format!("/queue/current_track/seek?position_ms={}", position_ms),
        )
        .await
    }

    pub async fn set_volume(&self, volume: u32) -> Result<CommandOutcome> {
        self.send(Method::PUT, &format!("/device/set_volume?volume={}", volume))
            .await
    }

    pub async fn get_volume(&self) -> Result<DeviceVolume> {
        self.send(Method::GET, "/device/get_volume").await
    }

    async fn send<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T> {
        match self.request(method.clone(), path).await {
            Ok(value) => Ok(value),
            Err(err) => {
                log::warn!("{} {} failed: {}", method, path, err);
                (self.on_error)();
                Err(err)
            }
        }
    }

    async fn request<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T> {
        let url = self.urls.endpoint(path)?;
        log::debug!("{} {}", method, url);

        let response = self.http.request(method, url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(KalinkaError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        decode_first_line(&body)
    }
}

/// Decode the first line of a response body
pub(crate) fn decode_first_line<T: DeserializeOwned>(body: &str) -> Result<T> {
    let line = body
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or(KalinkaError::EmptyResponse)?;
    Ok(serde_json::from_str(line)?)
}
