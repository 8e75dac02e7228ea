use crate::model::{PlaybackMode, PlaybackState, TrackList};

/// Session lifecycle callbacks
#[derive(Default)]
pub struct LifecycleHandlers {
    /// Called each time the event stream connects
    pub on_connected: Option<Box<dyn Fn() + Send + Sync>>,

    /// Called once for every event stream run that ends
    pub on_disconnected: Option<Box<dyn Fn() + Send + Sync>>,

    /// Called once when the session ends, either by `stop` or after
    /// reconnect attempts are exhausted
    pub on_stopped: Option<Box<dyn Fn() + Send + Sync>>,
}

impl LifecycleHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connected handler
    pub fn with_connected<F>(mut self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_connected = Some(Box::new(handler));
        self
    }

    /// Set the disconnected handler
    pub fn with_disconnected<F>(mut self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_disconnected = Some(Box::new(handler));
        self
    }

    /// Set the stopped handler
    pub fn with_stopped<F>(mut self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_stopped = Some(Box::new(handler));
        self
    }
}

/// Everything the session reports to the outside world
///
/// All handlers are invoked from the session's actor task, one at a time.
#[derive(Default)]
pub(crate) struct SessionHandlers {
    pub on_state: Option<Box<dyn Fn(PlaybackState) + Send + Sync>>,
    pub on_volume: Option<Box<dyn Fn(u32) + Send + Sync>>,
    pub on_playback_mode: Option<Box<dyn Fn(PlaybackMode) + Send + Sync>>,
    pub on_track_list: Option<Box<dyn Fn(TrackList) + Send + Sync>>,
    pub lifecycle: LifecycleHandlers,
}

impl SessionHandlers {
    pub fn state(&self, state: PlaybackState) {
        if let Some(handler) = &self.on_state {
            handler(state);
        }
    }

    pub fn volume(&self, volume: u32) {
        if let Some(handler) = &self.on_volume {
            handler(volume);
        }
    }

    pub fn playback_mode(&self, mode: PlaybackMode) {
        if let Some(handler) = &self.on_playback_mode {
            handler(mode);
        }
    }

    pub fn track_list(&self, tracks: TrackList) {
        if let Some(handler) = &self.on_track_list {
            handler(tracks);
        }
    }

    pub fn connected(&self) {
        if let Some(handler) = &self.lifecycle.on_connected {
            handler();
        }
    }

    pub fn disconnected(&self) {
        if let Some(handler) = &self.lifecycle.on_disconnected {
            handler();
        }
    }

    pub fn stopped(&self) {
        if let Some(handler) = &self.lifecycle.on_stopped {
            handler();
        }
    }
}
