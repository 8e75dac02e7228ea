use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayState {
    #[serde(rename = "PLAYING")]
    Playing,
    #[serde(rename = "PAUSED")]
    Paused,
    #[default]
    #[serde(rename = "STOPPED")]
    Stopped,
    #[serde(rename = "BUFFERING")]
    Buffering,
    #[serde(rename = "ERROR")]
    Error,
    #[serde(rename = "SKIP_TO_NEXT")]
    SkipNext,
    #[serde(rename = "SKIP_TO_PREV")]
    SkipPrev,
    #[serde(rename = "SEEK_IN_PROGRESS")]
    Seeking,
}

impl PlayState {
    /// States shown while a command or the decoder has not settled yet
    pub fn is_transitional(&self) -> bool {
        matches!(
            self,
            PlayState::Buffering | PlayState::SkipNext | PlayState::SkipPrev | PlayState::Seeking
        )
    }
}
