use serde::{Deserialize, Deserializer, Serialize};

use super::{AudioInfo, PlayState, Track};

/// Snapshot of the remote player as exposed to the UI
///
/// `position` is milliseconds into the current track. It is never negative
/// and never exceeds the track duration when the duration is known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub state: PlayState,
    #[serde(default)]
    pub current_track: Option<Track>,
    #[serde(default)]
    pub index: u32,
    #[serde(default, deserialize_with = "non_negative_ms")]
    pub position: u64,
    #[serde(default)]
    pub audio_info: Option<AudioInfo>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub timestamp: Option<u64>,
}

impl PlaybackState {
    pub fn new(state: PlayState, index: u32, position: u64) -> Self {
        Self {
            state,
            index,
            position,
            ..Self::default()
        }
    }

    pub fn with_track(mut self, track: Track) -> Self {
        self.current_track = Some(track);
        self.clamp_position();
        self
    }

    pub fn with_state(mut self, state: PlayState) -> Self {
        self.state = state;
        self
    }

    pub fn with_position(mut self, position: u64) -> Self {
        self.position = position;
        self.clamp_position();
        self
    }

    /// Track duration, preferring the decoder's figure over the catalogue's
    pub fn duration_ms(&self) -> Option<u64> {
        self.audio_info
            .as_ref()
            .map(|info| info.duration_ms)
            .filter(|ms| *ms > 0)
            .or_else(|| self.current_track.as_ref().and_then(Track::duration_ms))
    }

    pub fn clamp_position(&mut self) {
        if let Some(duration) = self.duration_ms() {
            self.position = self.position.min(duration);
        }
    }
}

fn non_negative_ms<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.max(0) as u64)
}
