use uuid::Uuid;

/// Identifier for one connect-read cycle, used to correlate log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The short form is enough to tell runs apart in logs
        let id = self.0.simple().to_string();
        write!(f, "{}", &id[..8])
    }
}

/// Why a stream run returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// The owner cancelled the run
    Cancelled,
    /// The server closed the body
    Closed,
    /// Connect error, non-success status or I/O error
    Failed(String),
}

/// Counters for a single stream run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStats {
    pub connection_id: ConnectionId,
    /// Known events handed to the event handler
    pub events_dispatched: u64,
    /// Records that could not be decoded and were skipped
    pub decode_errors: u64,
    /// Well-formed records with an unhandled `event_type`
    pub unknown_events: u64,
    pub end: StreamEnd,
}

impl StreamStats {
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            events_dispatched: 0,
            decode_errors: 0,
            unknown_events: 0,
            end: StreamEnd::Closed,
        }
    }

    /// True when the run delivered at least one event to the handler
    pub fn had_traffic(&self) -> bool {
        self.events_dispatched > 0
    }

    pub fn was_cancelled(&self) -> bool {
        self.end == StreamEnd::Cancelled
    }
}
