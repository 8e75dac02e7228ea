use serde::{Deserialize, Serialize};

use super::Track;

/// Queue snapshot carried by a replay event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackList {
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub items: Vec<Track>,
}
