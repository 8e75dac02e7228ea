use super::types::ConnectionId;
use crate::model::WireEvent;

/// Callbacks invoked by an [`EventStream`](super::EventStream) run
///
/// Handlers run on the stream's task and should hand work off quickly.
#[derive(Default)]
pub struct StreamHandlers {
    /// Called for every decoded event with a known `event_type`
    pub on_event: Option<Box<dyn Fn(WireEvent) + Send + Sync>>,

    /// Called once the events endpoint answered with a success status
    pub on_connected: Option<Box<dyn Fn(ConnectionId) + Send + Sync>>,

    /// Called exactly once when a run ends, however it ends
    pub on_disconnected: Option<Box<dyn Fn(ConnectionId) + Send + Sync>>,
}

impl StreamHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the event handler
    pub fn with_event<F>(mut self, handler: F) -> Self
    where
        F: Fn(WireEvent) + Send + Sync + 'static,
    {
        self.on_event = Some(Box::new(handler));
        self
    }

    /// Set the connected handler
    pub fn with_connected<F>(mut self, handler: F) -> Self
    where
        F: Fn(ConnectionId) + Send + Sync + 'static,
    {
        self.on_connected = Some(Box::new(handler));
        self
    }

    /// Set the disconnected handler
    pub fn with_disconnected<F>(mut self, handler: F) -> Self
    where
        F: Fn(ConnectionId) + Send + Sync + 'static,
    {
        self.on_disconnected = Some(Box::new(handler));
        self
    }
}

impl std::fmt::Debug for StreamHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandlers")
            .field("on_event", &self.on_event.is_some())
            .field("on_connected", &self.on_connected.is_some())
            .field("on_disconnected", &self.on_disconnected.is_some())
            .finish()
    }
}
