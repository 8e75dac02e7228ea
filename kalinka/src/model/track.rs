use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumImage {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

impl AlbumImage {
    /// Largest available artwork reference
    pub fn best(&self) -> Option<&str> {
        self.large
            .as_deref()
            .or(self.thumbnail.as_deref())
            .or(self.small.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist: Option<Artist>,
    #[serde(default)]
    pub image: Option<AlbumImage>,
}

/// Track reference carried by state events. Duration is in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub performer: Option<Artist>,
    #[serde(default)]
    pub album: Option<Album>,
}

impl Track {
    pub fn duration_ms(&self) -> Option<u64> {
        self.duration.map(|secs| u64::from(secs) * 1000)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub bits_per_sample: u32,
    pub channels: u32,
    pub duration_ms: u64,
}
