use bytes::BytesMut;
use futures_util::StreamExt;
use reqwest::Client;
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};
use tokio_util::sync::CancellationToken;

use super::handlers::StreamHandlers;
use super::types::{ConnectionId, StreamEnd, StreamStats};
use crate::error::Result;
use crate::model::WireEvent;
use crate::url_resolver::UrlResolver;

/// Path of the push notification endpoint
pub const EVENTS_PATH: &str = "/queue/events";

const DEFAULT_MAX_LINE_LENGTH: usize = 1024 * 1024;
const READ_BUFFER_CAPACITY: usize = 8 * 1024;

/// Reader for the server's NDJSON event stream
///
/// Each call to [`run_once`](EventStream::run_once) performs one
/// connect-read-until-failure cycle. Reconnection is the owner's decision;
/// the method can be called again after it returns.
pub struct EventStream {
    http: Client,
    urls: UrlResolver,
    handlers: StreamHandlers,
    max_line_length: usize,
}

impl EventStream {
    pub fn new(urls: UrlResolver, handlers: StreamHandlers) -> Result<Self> {
        // No request timeout: the body stays open for the life of the connection
        let http = Client::builder().build()?;
        Ok(Self::with_client(http, urls, handlers))
    }

    pub fn with_client(http: Client, urls: UrlResolver, handlers: StreamHandlers) -> Self {
        Self {
            http,
            urls,
            handlers,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }

    /// Records longer than `length` bytes are discarded as decode errors
    pub fn with_max_line_length(mut self, length: usize) -> Self {
        self.max_line_length = length.max(1);
        self
    }

    /// Connect and dispatch events until the link fails or `cancel` fires
    ///
    /// The disconnect handler fires exactly once before this returns, and
    /// also if the returned future is dropped mid-run.
    pub async fn run_once(&self, cancel: &CancellationToken) -> StreamStats {
        let mut stats = StreamStats::new(ConnectionId::new());
        let _guard = DisconnectGuard {
            handlers: &self.handlers,
            connection_id: stats.connection_id,
        };

        let end = tokio::select! {
            biased;
            _ = cancel.cancelled() => StreamEnd::Cancelled,
            end = self.read_events(&mut stats) => end,
        };

        log::info!(
            "[{}] Event stream ended ({:?}): {} events, {} decode errors, {} unknown",
            stats.connection_id,
            end,
            stats.events_dispatched,
            stats.decode_errors,
            stats.unknown_events
        );
        stats.end = end;
        stats
    }

    async fn read_events(&self, stats: &mut StreamStats) -> StreamEnd {
        let id = stats.connection_id;
        let url = match self.urls.endpoint(EVENTS_PATH) {
            Ok(url) => url,
            Err(e) => return StreamEnd::Failed(e.to_string()),
        };

        log::info!("[{}] Connecting to {}", id, url);
        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("[{}] Failed to connect: {}", id, e);
                return StreamEnd::Failed(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            log::warn!("[{}] Event stream rejected with status {}", id, status);
            return StreamEnd::Failed(format!("status {}", status.as_u16()));
        }

        log::info!("[{}] Event stream connected", id);
        if let Some(handler) = &self.handlers.on_connected {
            handler(id);
        }

        let mut body = response.bytes_stream();
        let mut codec = LinesCodec::new_with_max_length(self.max_line_length);
        let mut buffer = BytesMut::with_capacity(READ_BUFFER_CAPACITY);

        loop {
            match body.next().await {
                Some(Ok(chunk)) => {
                    buffer.extend_from_slice(&chunk);
                    self.drain(&mut codec, &mut buffer, stats, false);
                }
                Some(Err(e)) => {
                    log::warn!("[{}] Event stream read failed: {}", id, e);
                    return StreamEnd::Failed(e.to_string());
                }
                None => {
                    // A final record may lack its newline
                    self.drain(&mut codec, &mut buffer, stats, true);
                    return StreamEnd::Closed;
                }
            }
        }
    }

    fn drain(
        &self,
        codec: &mut LinesCodec,
        buffer: &mut BytesMut,
        stats: &mut StreamStats,
        at_eof: bool,
    ) {
        loop {
            let decoded = if at_eof {
                codec.decode_eof(buffer)
            } else {
                codec.decode(buffer)
            };
            match decoded {
                Ok(Some(line)) => self.handle_line(&line, stats),
                Ok(None) => break,
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    stats.decode_errors += 1;
                    log::warn!(
                        "[{}] Discarding record longer than {} bytes",
                        stats.connection_id,
                        self.max_line_length
                    );
                }
                Err(LinesCodecError::Io(e)) => {
                    stats.decode_errors += 1;
                    log::warn!("[{}] Discarding unreadable record: {}", stats.connection_id, e);
                }
            }
        }
    }

    fn handle_line(&self, line: &str, stats: &mut StreamStats) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        match WireEvent::decode(line) {
            Ok(event) if event.is_unknown() => {
                stats.unknown_events += 1;
                log::debug!(
                    "[{}] Ignoring unknown event type '{}'",
                    stats.connection_id,
                    event.event_type()
                );
            }
            Ok(event) => {
                stats.events_dispatched += 1;
                log::debug!("[{}] Received {}", stats.connection_id, event.event_type());
                if let Some(handler) = &self.handlers.on_event {
                    handler(event);
                }
            }
            Err(e) => {
                stats.decode_errors += 1;
                log::warn!(
                    "[{}] Failed to decode event: {} (line: {})",
                    stats.connection_id,
                    e,
                    line
                );
            }
        }
    }
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("base", &self.urls.base_key())
            .field("max_line_length", &self.max_line_length)
            .field("handlers", &self.handlers)
            .finish()
    }
}

/// Fires the disconnect handler when a run ends or is dropped
struct DisconnectGuard<'a> {
    handlers: &'a StreamHandlers,
    connection_id: ConnectionId,
}

impl Drop for DisconnectGuard<'_> {
    fn drop(&mut self) {
        if let Some(handler) = &self.handlers.on_disconnected {
            handler(self.connection_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlayState;
    use std::sync::{Arc, Mutex};

    fn stream_with_sink() -> (EventStream, Arc<Mutex<Vec<WireEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let handlers = StreamHandlers::new().with_event(move |e| sink.lock().unwrap().push(e));
        let urls = UrlResolver::new("http://127.0.0.1:9").unwrap();
        let stream = EventStream::with_client(Client::new(), urls, handlers);
        (stream, events)
    }

    fn feed(stream: &EventStream, chunks: &[&str]) -> StreamStats {
        let mut stats = StreamStats::new(ConnectionId::new());
        let mut codec = LinesCodec::new_with_max_length(stream.max_line_length);
        let mut buffer = BytesMut::new();
        for chunk in chunks {
            buffer.extend_from_slice(chunk.as_bytes());
            stream.drain(&mut codec, &mut buffer, &mut stats, false);
        }
        stream.drain(&mut codec, &mut buffer, &mut stats, true);
        stats
    }

    #[test]
    fn test_records_split_across_chunks() {
        let (stream, events) = stream_with_sink();
        let stats = feed(
            &stream,
            &[
                r#"{"event_type":"volume_ch"#,
                "anged\",\"payload\":{\"volume\":7}}\n{\"event_type\":\"volume_changed\",",
                r#""payload":{"volume":8}}"#,
            ],
        );

        assert_eq!(stats.events_dispatched, 2);
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                WireEvent::VolumeChanged { volume: 7 },
                WireEvent::VolumeChanged { volume: 8 }
            ]
        );
    }

    #[test]
    fn test_blank_lines_and_crlf_are_tolerated() {
        let (stream, events) = stream_with_sink();
        let stats = feed(
            &stream,
            &["\n\r\n{\"event_type\":\"state_changed\",\"payload\":{\"state\":{\"state\":\"PAUSED\"}}}\r\n\n"],
        );

        assert_eq!(stats.events_dispatched, 1);
        assert_eq!(stats.decode_errors, 0);
        match &events.lock().unwrap()[0] {
            WireEvent::StateChanged { state } => assert_eq!(state.state, PlayState::Paused),
            other => panic!("Expected StateChanged, got {:?}", other),
        };
    }

    #[test]
    fn test_oversized_record_is_skipped() {
        let (stream, events) = stream_with_sink();
        let stream = stream.with_max_line_length(64);
        let long = format!("{{\"event_type\":\"x\",\"payload\":\"{}\"}}\n", "a".repeat(100));
        let stats = feed(
            &stream,
            &[long.as_str(), "{\"event_type\":\"volume_changed\",\"payload\":{\"volume\":3}}\n"],
        );

        assert_eq!(stats.decode_errors, 1);
        assert_eq!(*events.lock().unwrap(), vec![WireEvent::VolumeChanged { volume: 3 }]);
    }
}
