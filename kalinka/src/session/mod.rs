//! Owner of the synchronization core for one server
//!
//! A session wires the event stream, the command proxy, the reconciler and
//! the volume debouncer together. All state changes flow through a single
//! actor task, which is also the only place user handlers are called from.
//!
//! ```rust,no_run
//! use kalinka::{SessionBuilder, SessionConfig};
//!
//! # async fn demo() -> kalinka::Result<()> {
//! let session = SessionBuilder::new(SessionConfig::for_host("192.168.1.20", 8000))
//!     .with_state_handler(|state| println!("{:?} at {}ms", state.state, state.position))
//!     .with_volume_handler(|volume| println!("volume {}", volume))
//!     .start()?;
//!
//! session.handle().seek_to(5_000)?;
//! session.stop().await;
//! # Ok(())
//! # }
//! ```

mod actor;
mod handle;
mod handlers;
mod supervisor;

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::SessionConfig;
use crate::error::{KalinkaError, Result};
use crate::model::{PlaybackMode, PlaybackState, TrackList};
use crate::proxy::{ErrorHandler, PlayerProxy};
use crate::reconcile::Reconciler;
use crate::streaming::{EventStream, StreamHandlers};
use crate::url_resolver::UrlResolver;

use actor::{SessionActor, SessionMessage};
use handlers::SessionHandlers;
use supervisor::{lock_run, supervise};

pub use handle::SessionHandle;
pub use handlers::LifecycleHandlers;

/// Fluent builder for a [`ActiveSession`]
pub struct SessionBuilder {
    config: SessionConfig,
    handlers: SessionHandlers,
}

impl std::fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("config", &self.config)
            .field("has_state_handler", &self.handlers.on_state.is_some())
            .field("has_volume_handler", &self.handlers.on_volume.is_some())
            .finish()
    }
}

impl SessionBuilder {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            handlers: SessionHandlers::default(),
        }
    }

    /// Receive every exposed playback state
    pub fn with_state_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(PlaybackState) + Send + Sync + 'static,
    {
        self.handlers.on_state = Some(Box::new(handler));
        self
    }

    /// Receive every surfaced volume level
    pub fn with_volume_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.handlers.on_volume = Some(Box::new(handler));
        self
    }

    pub fn with_playback_mode_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(PlaybackMode) + Send + Sync + 'static,
    {
        self.handlers.on_playback_mode = Some(Box::new(handler));
        self
    }

    /// Receive the queue carried by each state replay
    pub fn with_track_list_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(TrackList) + Send + Sync + 'static,
    {
        self.handlers.on_track_list = Some(Box::new(handler));
        self
    }

    pub fn with_lifecycle_handlers(mut self, lifecycle: LifecycleHandlers) -> Self {
        self.handlers.lifecycle = lifecycle;
        self
    }

    /// Validate the configuration and spawn the session's tasks
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> Result<ActiveSession> {
        let Self { config, handlers } = self;
        config.validate().map_err(KalinkaError::Configuration)?;
        let urls = UrlResolver::new(&config.base_url)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let run_token = Arc::new(Mutex::new(shutdown.child_token()));

        let on_error: ErrorHandler = {
            let run_token = Arc::clone(&run_token);
            Arc::new(move || {
                log::warn!("Command failed, dropping the event stream connection");
                lock_run(&run_token).cancel();
            })
        };
        let proxy = PlayerProxy::new(urls.clone(), on_error, config.request_timeout)?;

        let stream_handlers = StreamHandlers::new()
            .with_event({
                let tx = tx.clone();
                move |event| {
                    let _ = tx.send(SessionMessage::Server(event));
                }
            })
            .with_connected({
                let tx = tx.clone();
                move |_| {
                    let _ = tx.send(SessionMessage::Connected);
                }
            })
            .with_disconnected({
                let tx = tx.clone();
                move |_| {
                    let _ = tx.send(SessionMessage::Disconnected);
                }
            });
        let stream = EventStream::new(urls, stream_handlers)?
            .with_max_line_length(config.max_line_length);

        let (state_tx, state_rx) = watch::channel(PlaybackState::default());
        let (volume_tx, volume_rx) = watch::channel(None);

        let actor = SessionActor {
            reconciler: Reconciler::new(config.seek_timeout),
            volume: None,
            proxy: proxy.clone(),
            tx: tx.clone(),
            handlers,
            state_tx,
            volume_tx,
            volume_window: config.volume_window,
            volume_rate_hz: config.volume_rate_hz,
        };
        log::info!("Starting session for {}", config.base_url);
        let actor = tokio::spawn(actor.run(rx));

        {
            let tx = tx.clone();
            tokio::spawn(async move {
                match proxy.get_volume().await {
                    Ok(device) => {
                        let _ = tx.send(SessionMessage::VolumeReady(device));
                    }
                    Err(e) => log::warn!("Device volume unavailable: {}", e),
                }
            });
        }

        let supervisor = tokio::spawn(supervise(
            stream,
            config,
            run_token,
            shutdown.clone(),
            tx.clone(),
        ));

        Ok(ActiveSession {
            handle: SessionHandle::new(tx, state_rx, volume_rx),
            shutdown,
            supervisor: Some(supervisor),
            actor: Some(actor),
        })
    }
}

/// A running session; dropping it cancels the event stream and ends the session
pub struct ActiveSession {
    handle: SessionHandle,
    shutdown: CancellationToken,
    supervisor: Option<JoinHandle<()>>,
    actor: Option<JoinHandle<()>>,
}

impl ActiveSession {
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> PlaybackState {
        self.handle.state()
    }

    /// True until the session ends by itself or through `stop`
    pub fn is_running(&self) -> bool {
        self.actor
            .as_ref()
            .map(|actor| !actor.is_finished())
            .unwrap_or(false)
    }

    /// Cancel the event stream and wait for the session to wind down
    ///
    /// The disconnect handler fires once for the cancelled run. Command
    /// outcomes arriving afterwards are discarded.
    pub async fn stop(mut self) {
        log::info!("Stopping session");
        self.shutdown.cancel();
        if let Some(supervisor) = self.supervisor.take() {
            let _ = supervisor.await;
        }
        if let Some(actor) = self.actor.take() {
            let _ = actor.await;
        }
    }

    /// Wait until the session ends on its own, e.g. after reconnects run out
    ///
    /// Safe to cancel; [`stop`](Self::stop) can still be called afterwards.
    pub async fn wait(&mut self) {
        if let Some(actor) = self.actor.as_mut() {
            let _ = actor.await;
            self.actor = None;
        }
        self.shutdown.cancel();
        if let Some(supervisor) = self.supervisor.as_mut() {
            let _ = supervisor.await;
            self.supervisor = None;
        }
    }
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        // The supervisor stops the actor after the last disconnect is queued
        self.shutdown.cancel();
    }
}

impl std::fmt::Debug for ActiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSession")
            .field("running", &self.is_running())
            .finish()
    }
}
