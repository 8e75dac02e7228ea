//! Long-lived event stream reading newline-delimited server notifications

mod event_stream;
mod handlers;
mod types;

pub use event_stream::{EventStream, EVENTS_PATH};
pub use handlers::StreamHandlers;
pub use types::{ConnectionId, StreamEnd, StreamStats};
