//! Merges server pushes with in-flight local intents into one exposed state
//!
//! The [`Reconciler`] is a plain state machine: every input returns the state
//! to publish (or `None` when nothing visible changed). It holds no timers and
//! takes the current instant as an argument, so the owner decides when inputs
//! happen and the machine stays deterministic under test.

use std::time::Duration;

use tokio::time::Instant;

use crate::model::{CommandOutcome, PlayState, PlaybackState};

/// A seek the user requested that the server has not corroborated yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekIntent {
    pub target_ms: u64,
    pub issued_at: Instant,
    /// Matches outcomes to the seek that produced them
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipDirection {
    Next,
    Prev,
}

/// Remote command that satisfies a local "play" request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayAction {
    /// `play` on the queue
    Play,
    /// `pause(false)` on a paused player
    Resume,
    /// `pause(true)`
    Pause,
}

#[derive(Debug)]
pub struct Reconciler {
    exposed: PlaybackState,
    intent: Option<SeekIntent>,
    last_server: Option<PlaybackState>,
    seek_timeout: Option<Duration>,
    next_seq: u64,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Reconciler {
    /// `seek_timeout` of `None` lets an intent live until the server corroborates it
    pub fn new(seek_timeout: Option<Duration>) -> Self {
        Self {
            exposed: PlaybackState::default(),
            intent: None,
            last_server: None,
            seek_timeout,
            next_seq: 0,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.exposed
    }

    pub fn seek_intent(&self) -> Option<&SeekIntent> {
        self.intent.as_ref()
    }

    /// Apply a `state_changed` or `state_replay` payload
    pub fn on_server_state(&mut self, mut server: PlaybackState, now: Instant) -> PlaybackState {
        server.clamp_position();
        self.drop_stale_intent(now);

        if server.state == PlayState::Playing && self.intent.take().is_some() {
            log::debug!("Seek corroborated by playing state at {}ms", server.position);
        }

        let exposed = match &self.intent {
            Some(intent) => server.clone().with_position(intent.target_ms),
            None => server.clone(),
        };
        self.last_server = Some(server);
        self.expose(exposed)
    }

    /// Record a local seek and expose it immediately
    ///
    /// Returns the sequence number to hand back with the command's outcome.
    pub fn on_local_seek(&mut self, target_ms: u64, now: Instant) -> (u64, PlaybackState) {
        self.next_seq += 1;
        let seq = self.next_seq;
        if let Some(previous) = self.intent.replace(SeekIntent {
            target_ms,
            issued_at: now,
            seq,
        }) {
            log::debug!("Seek to {}ms replaces seek to {}ms", target_ms, previous.target_ms);
        }

        let exposed = self
            .exposed
            .clone()
            .with_state(PlayState::Seeking)
            .with_position(target_ms);
        (seq, self.expose(exposed))
    }

    /// Apply the decoded reply to seek `seq`
    ///
    /// A confirmed position leaves the intent in place. Anything else clears
    /// it and falls back to what the server last reported.
    pub fn on_seek_outcome(&mut self, seq: u64, outcome: &CommandOutcome) -> Option<PlaybackState> {
        match self.intent {
            Some(intent) if intent.seq == seq => {}
            _ => {
                log::debug!("Ignoring outcome of superseded seek #{}", seq);
                return None;
            }
        }

        if outcome.is_confirmed_seek() {
            return None;
        }

        log::debug!("Seek #{} not confirmed by server, clearing intent", seq);
        self.intent = None;
        self.fall_back()
    }

    /// Expose a skip immediately; the server's next state settles the track
    pub fn on_local_skip(&mut self, direction: SkipDirection) -> PlaybackState {
        // The old target means nothing on another track
        self.intent = None;
        let state = match direction {
            SkipDirection::Next => PlayState::SkipNext,
            SkipDirection::Prev => PlayState::SkipPrev,
        };
        let mut exposed = self.exposed.clone().with_state(state);
        exposed.position = 0;
        self.expose(exposed)
    }

    /// Drop an intent older than the seek timeout
    pub fn expire(&mut self, now: Instant) -> Option<PlaybackState> {
        if self.drop_stale_intent(now) {
            self.fall_back()
        } else {
            None
        }
    }

    /// The replay after reconnecting is authoritative; forget local intents
    pub fn on_link_lost(&mut self) {
        if self.intent.take().is_some() {
            log::debug!("Link lost, clearing seek intent");
        }
    }

    /// Resolve a local "play" request against the exposed state
    pub fn resolve_play(&self) -> PlayAction {
        if self.exposed.state == PlayState::Paused {
            PlayAction::Resume
        } else {
            PlayAction::Play
        }
    }

    /// Resolve a play/pause toggle against the exposed state
    pub fn resolve_toggle(&self) -> PlayAction {
        match self.exposed.state {
            PlayState::Playing | PlayState::Buffering => PlayAction::Pause,
            _ => self.resolve_play(),
        }
    }

    fn drop_stale_intent(&mut self, now: Instant) -> bool {
        let (Some(intent), Some(timeout)) = (self.intent, self.seek_timeout) else {
            return false;
        };
        if now.saturating_duration_since(intent.issued_at) < timeout {
            return false;
        }
        log::debug!(
            "Seek to {}ms not corroborated within {:?}, dropping",
            intent.target_ms,
            timeout
        );
        self.intent = None;
        true
    }

    fn fall_back(&mut self) -> Option<PlaybackState> {
        let server = self.last_server.clone()?;
        if server == self.exposed {
            return None;
        }
        Some(self.expose(server))
    }

    fn expose(&mut self, state: PlaybackState) -> PlaybackState {
        if state.state != self.exposed.state {
            log::debug!("Exposed state {:?} -> {:?}", self.exposed.state, state.state);
        }
        self.exposed = state;
        self.exposed.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Track;

    fn server(state: PlayState, position: u64) -> PlaybackState {
        PlaybackState::new(state, 0, position)
    }

    fn confirmed(position_ms: u64) -> CommandOutcome {
        CommandOutcome {
            message: None,
            position_ms: Some(position_ms),
        }
    }

    #[test]
    fn test_server_positions_pass_through_without_intent() {
        let mut engine = Reconciler::default();
        let now = Instant::now();
        for position in [0, 250, 1000, 1001, 4000] {
            let exposed = engine.on_server_state(server(PlayState::Playing, position), now);
            assert_eq!(exposed.position, position);
        }
        assert_eq!(engine.state().position, 4000);
    }

    #[test]
    fn test_server_position_clamped_to_track_duration() {
        let mut engine = Reconciler::default();
        let now = Instant::now();
        let json = r#"{"state":"PLAYING","current_track":{"id":"t1","title":"Song","duration":180},"index":0,"position":200000}"#;
        let state: PlaybackState = serde_json::from_str(json).unwrap();

        let exposed = engine.on_server_state(state, now);
        assert_eq!(exposed.duration_ms(), Some(180_000));
        assert_eq!(exposed.position, 180_000);

        // Fallback after a dropped seek uses the clamped state too
        let (seq, _) = engine.on_local_seek(10_000, now);
        let exposed = engine.on_seek_outcome(seq, &CommandOutcome::default()).unwrap();
        assert_eq!(exposed.position, 180_000);
    }

    #[test]
    fn test_seek_target_clamped_to_track_duration() {
        let mut engine = Reconciler::default();
        let now = Instant::now();
        let track = Track {
            id: "t1".to_string(),
            title: "Song".to_string(),
            duration: Some(60),
            performer: None,
            album: None,
        };
        engine.on_server_state(server(PlayState::Paused, 0).with_track(track), now);

        let (_, exposed) = engine.on_local_seek(90_000, now);
        assert_eq!(exposed.position, 60_000);
    }

    #[test]
    fn test_seek_intent_masks_paused_positions() {
        let mut engine = Reconciler::default();
        let now = Instant::now();
        engine.on_server_state(server(PlayState::Paused, 1000), now);

        let (_, exposed) = engine.on_local_seek(5000, now);
        assert_eq!(exposed.state, PlayState::Seeking);
        assert_eq!(exposed.position, 5000);

        let exposed = engine.on_server_state(server(PlayState::Paused, 1200), now);
        assert_eq!(exposed.state, PlayState::Paused);
        assert_eq!(exposed.position, 5000);

        let exposed = engine.on_server_state(server(PlayState::Buffering, 0), now);
        assert_eq!(exposed.position, 5000);
        assert!(engine.seek_intent().is_some());
    }

    #[test]
    fn test_playing_state_clears_intent() {
        let mut engine = Reconciler::default();
        let now = Instant::now();
        engine.on_local_seek(5000, now);

        let exposed = engine.on_server_state(server(PlayState::Playing, 4990), now);
        assert_eq!(exposed.position, 4990);
        assert!(engine.seek_intent().is_none());
    }

    #[test]
    fn test_confirming_outcome_keeps_intent() {
        let mut engine = Reconciler::default();
        let now = Instant::now();
        engine.on_server_state(server(PlayState::Paused, 0), now);
        let (seq, seeking) = engine.on_local_seek(5000, now);

        assert_eq!(engine.on_seek_outcome(seq, &confirmed(5000)), None);
        assert_eq!(engine.on_seek_outcome(seq, &confirmed(5000)), None);
        assert_eq!(engine.state(), &seeking);
        assert_eq!(engine.seek_intent().map(|i| i.target_ms), Some(5000));

        let exposed = engine.on_server_state(server(PlayState::Paused, 80), now);
        assert_eq!(exposed.position, 5000);
    }

    #[test]
    fn test_non_confirming_outcome_clears_intent() {
        let mut engine = Reconciler::default();
        let now = Instant::now();
        engine.on_server_state(server(PlayState::Paused, 700), now);
        let (seq, _) = engine.on_local_seek(5000, now);

        let exposed = engine.on_seek_outcome(seq, &CommandOutcome::default());
        assert!(engine.seek_intent().is_none());
        assert_eq!(exposed, Some(server(PlayState::Paused, 700)));

        let exposed = engine.on_server_state(server(PlayState::Paused, 720), now);
        assert_eq!(exposed.position, 720);
    }

    #[test]
    fn test_outcome_of_superseded_seek_is_ignored() {
        let mut engine = Reconciler::default();
        let now = Instant::now();
        let (first, _) = engine.on_local_seek(1000, now);
        let (second, _) = engine.on_local_seek(9000, now);
        assert_ne!(first, second);

        assert_eq!(engine.on_seek_outcome(first, &CommandOutcome::default()), None);
        assert_eq!(engine.seek_intent().map(|i| i.target_ms), Some(9000));
    }

    #[test]
    fn test_seek_intent_times_out() {
        let mut engine = Reconciler::new(Some(Duration::from_secs(5)));
        let start = Instant::now();
        engine.on_server_state(server(PlayState::Paused, 300), start);
        engine.on_local_seek(5000, start);

        assert_eq!(engine.expire(start + Duration::from_secs(4)), None);
        assert!(engine.seek_intent().is_some());

        let exposed = engine.expire(start + Duration::from_secs(5));
        assert_eq!(exposed, Some(server(PlayState::Paused, 300)));
        assert!(engine.seek_intent().is_none());
    }

    #[test]
    fn test_stale_intent_does_not_mask_late_server_state() {
        let mut engine = Reconciler::new(Some(Duration::from_secs(5)));
        let start = Instant::now();
        engine.on_local_seek(5000, start);

        let exposed =
            engine.on_server_state(server(PlayState::Paused, 10), start + Duration::from_secs(6));
        assert_eq!(exposed.position, 10);
    }

    #[test]
    fn test_without_timeout_intent_persists() {
        let mut engine = Reconciler::new(None);
        let start = Instant::now();
        engine.on_local_seek(5000, start);
        assert_eq!(engine.expire(start + Duration::from_secs(3600)), None);
        assert!(engine.seek_intent().is_some());
    }

    #[test]
    fn test_link_loss_clears_intent() {
        let mut engine = Reconciler::default();
        let now = Instant::now();
        engine.on_local_seek(5000, now);
        engine.on_link_lost();

        let exposed = engine.on_server_state(server(PlayState::Paused, 0), now);
        assert_eq!(exposed.position, 0);
    }

    #[test]
    fn test_local_skip_exposes_transition_at_zero() {
        let mut engine = Reconciler::default();
        let now = Instant::now();
        engine.on_server_state(server(PlayState::Playing, 42_000), now);
        engine.on_local_seek(50_000, now);

        let exposed = engine.on_local_skip(SkipDirection::Next);
        assert_eq!(exposed.state, PlayState::SkipNext);
        assert_eq!(exposed.position, 0);
        assert!(engine.seek_intent().is_none());

        let exposed = engine.on_local_skip(SkipDirection::Prev);
        assert_eq!(exposed.state, PlayState::SkipPrev);
    }

    #[test]
    fn test_play_resolution() {
        let mut engine = Reconciler::default();
        let now = Instant::now();
        assert_eq!(engine.resolve_play(), PlayAction::Play);

        engine.on_server_state(server(PlayState::Paused, 0), now);
        assert_eq!(engine.resolve_play(), PlayAction::Resume);
        assert_eq!(engine.resolve_toggle(), PlayAction::Resume);

        engine.on_server_state(server(PlayState::Playing, 0), now);
        assert_eq!(engine.resolve_play(), PlayAction::Play);
        assert_eq!(engine.resolve_toggle(), PlayAction::Pause);

        engine.on_server_state(server(PlayState::Stopped, 0), now);
        assert_eq!(engine.resolve_toggle(), PlayAction::Play);
    }

    #[test]
    fn test_replay_then_seek_then_playing() {
        let mut engine = Reconciler::default();
        let now = Instant::now();

        let exposed = engine.on_server_state(server(PlayState::Paused, 0), now);
        assert_eq!((exposed.state, exposed.index, exposed.position), (PlayState::Paused, 0, 0));

        let (_, exposed) = engine.on_local_seek(5000, now);
        assert_eq!((exposed.state, exposed.position), (PlayState::Seeking, 5000));

        let exposed = engine.on_server_state(server(PlayState::Playing, 5010), now);
        assert_eq!((exposed.state, exposed.position), (PlayState::Playing, 5010));
        assert!(engine.seek_intent().is_none());
    }
}
