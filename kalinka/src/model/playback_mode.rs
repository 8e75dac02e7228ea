use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackMode {
    #[serde(default)]
    pub repeat_one: bool,
    #[serde(default)]
    pub repeat_all: bool,
    #[serde(default)]
    pub shuffle: bool,
}
