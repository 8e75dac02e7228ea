use serde::Deserialize;
use serde_json::Value;

use super::{PlaybackMode, PlaybackState, TrackList};

/// One server push notification, selected by the envelope's `event_type`
#[derive(Debug, Clone, PartialEq)]
pub enum WireEvent {
    VolumeChanged {
        volume: u32,
    },
    StateChanged {
        state: PlaybackState,
    },
    /// Full resync sent once per connection
    StateReplay {
        state: PlaybackState,
        track_list: TrackList,
        playback_mode: PlaybackMode,
    },
    PlaybackModeChanged {
        mode: PlaybackMode,
    },
    /// Recognized envelope with a discriminator this client does not handle
    Unknown {
        event_type: String,
    },
}

#[derive(Deserialize)]
struct Envelope {
    event_type: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Deserialize)]
struct VolumePayload {
    volume: u32,
}

#[derive(Deserialize)]
struct StatePayload {
    state: PlaybackState,
}

#[derive(Deserialize)]
struct ReplayPayload {
    state: PlaybackState,
    #[serde(default, rename = "trackList", alias = "track_list")]
    track_list: TrackList,
    #[serde(default, rename = "playbackMode", alias = "playback_mode")]
    playback_mode: PlaybackMode,
}

#[derive(Deserialize)]
struct ModePayload {
    mode: PlaybackMode,
}

impl WireEvent {
    pub const VOLUME_CHANGED: &'static str = "volume_changed";
    pub const STATE_CHANGED: &'static str = "state_changed";
    pub const STATE_REPLAY: &'static str = "state_replay";
    pub const PLAYBACK_MODE_CHANGED: &'static str = "playback_mode_changed";

    /// Decode one NDJSON record
    ///
    /// Unknown discriminators decode to [`WireEvent::Unknown`]. A malformed
    /// envelope or a payload that does not fit its tag is an error.
    pub fn decode(line: &str) -> Result<Self, serde_json::Error> {
        let envelope: Envelope = serde_json::from_str(line)?;
        let event = match envelope.event_type.as_str() {
            Self::VOLUME_CHANGED => {
                let payload: VolumePayload = serde_json::from_value(envelope.payload)?;
                WireEvent::VolumeChanged {
                    volume: payload.volume,
                }
            }
            Self::STATE_CHANGED => {
                let payload: StatePayload = serde_json::from_value(envelope.payload)?;
                WireEvent::StateChanged {
                    state: payload.state,
                }
            }
            Self::STATE_REPLAY => {
                let payload: ReplayPayload = serde_json::from_value(envelope.payload)?;
                WireEvent::StateReplay {
                    state: payload.state,
                    track_list: payload.track_list,
                    playback_mode: payload.playback_mode,
                }
            }
            Self::PLAYBACK_MODE_CHANGED => {
                let payload: ModePayload = serde_json::from_value(envelope.payload)?;
                WireEvent::PlaybackModeChanged { mode: payload.mode }
            }
            _ => WireEvent::Unknown {
                event_type: envelope.event_type,
            },
        };
        Ok(event)
    }

    pub fn event_type(&self) -> &str {
        match self {
            WireEvent::VolumeChanged { .. } => Self::VOLUME_CHANGED,
            WireEvent::StateChanged { .. } => Self::STATE_CHANGED,
            WireEvent::StateReplay { .. } => Self::STATE_REPLAY,
            WireEvent::PlaybackModeChanged { .. } => Self::PLAYBACK_MODE_CHANGED,
            WireEvent::Unknown { event_type } => event_type,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, WireEvent::Unknown { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlayState;

    #[test]
    fn test_decode_state_changed() {
        let line = r#"{"event_type":"state_changed","payload":{"state":{"state":"PLAYING","index":3,"position":5010}}}"#;
        match WireEvent::decode(line).unwrap() {
            WireEvent::StateChanged { state } => {
                assert_eq!(state.state, PlayState::Playing);
                assert_eq!(state.index, 3);
                assert_eq!(state.position, 5010);
            }
            other => panic!("Expected StateChanged, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_state_replay_with_queue() {
        let line = r#"{"event_type":"state_replay","payload":{
            "state":{"state":"PAUSED","index":0,"position":0},
            "trackList":{"offset":0,"limit":10,"total":1,"items":[{"id":"a","title":"Intro","duration":61}]},
            "playbackMode":{"repeat_one":false,"repeat_all":true,"shuffle":false}}}"#
            .replace('\n', "");
        match WireEvent::decode(&line).unwrap() {
            WireEvent::StateReplay {
                state,
                track_list,
                playback_mode,
            } => {
                assert_eq!(state.state, PlayState::Paused);
                assert_eq!(track_list.total, 1);
                assert_eq!(track_list.items[0].title, "Intro");
                assert!(playback_mode.repeat_all);
            }
            other => panic!("Expected StateReplay, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_replay_without_optional_sections() {
        let line = r#"{"event_type":"state_replay","payload":{"state":{"state":"STOPPED","index":0,"position":0}}}"#;
        match WireEvent::decode(line).unwrap() {
            WireEvent::StateReplay {
                track_list,
                playback_mode,
                ..
            } => {
                assert!(track_list.items.is_empty());
                assert_eq!(playback_mode, PlaybackMode::default());
            }
            other => panic!("Expected StateReplay, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_volume_and_mode() {
        let volume = WireEvent::decode(r#"{"event_type":"volume_changed","payload":{"volume":42}}"#);
        assert_eq!(volume.unwrap(), WireEvent::VolumeChanged { volume: 42 });

        let mode = WireEvent::decode(
            r#"{"event_type":"playback_mode_changed","payload":{"mode":{"shuffle":true}}}"#,
        )
        .unwrap();
        assert_eq!(
            mode,
            WireEvent::PlaybackModeChanged {
                mode: PlaybackMode {
                    shuffle: true,
                    ..PlaybackMode::default()
                }
            }
        );
    }

    #[test]
    fn test_unknown_event_type_is_not_an_error() {
        let event = WireEvent::decode(r#"{"event_type":"favorite_added","payload":{"id":"x"}}"#)
            .unwrap();
        assert!(event.is_unknown());
        assert_eq!(event.event_type(), "favorite_added");
    }

    #[test]
    fn test_unknown_event_without_payload() {
        let event = WireEvent::decode(r#"{"event_type":"ping"}"#).unwrap();
        assert_eq!(
            event,
            WireEvent::Unknown {
                event_type: "ping".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_records_fail() {
        assert!(WireEvent::decode("{not json").is_err());
        assert!(WireEvent::decode(r#"{"payload":{}}"#).is_err());
        assert!(WireEvent::decode(r#"{"event_type":"volume_changed","payload":{}}"#).is_err());
    }
}
