use super::Track;

const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Display metadata derived from a track for media-session style consumers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// 0 when the track does not report a duration
    pub duration_ms: u64,
    /// Artwork reference as sent by the server, possibly relative
    pub artwork: Option<String>,
}

impl Metadata {
    pub fn from_track(track: &Track) -> Self {
        Self {
            title: track.title.clone(),
            artist: track
                .performer
                .as_ref()
                .map(|artist| artist.name.clone())
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            album: track
                .album
                .as_ref()
                .map(|album| album.title.clone())
                .unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
            duration_ms: track.duration_ms().unwrap_or(0),
            artwork: track
                .album
                .as_ref()
                .and_then(|album| album.image.as_ref())
                .and_then(|image| image.best())
                .map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Album, AlbumImage, Artist};

    #[test]
    fn test_fallbacks_for_bare_track() {
        let track = Track {
            id: "1".to_string(),
            title: "Untitled".to_string(),
            duration: None,
            performer: None,
            album: None,
        };
        let metadata = Metadata::from_track(&track);
        assert_eq!(metadata.title, "Untitled");
        assert_eq!(metadata.artist, "Unknown Artist");
        assert_eq!(metadata.album, "Unknown Album");
        assert_eq!(metadata.duration_ms, 0);
        assert!(metadata.artwork.is_none());
    }

    #[test]
    fn test_artwork_prefers_large_then_thumbnail() {
        let mut track = Track {
            id: "2".to_string(),
            title: "Blue".to_string(),
            duration: Some(240),
            performer: Some(Artist {
                id: "a".to_string(),
                name: "Joni".to_string(),
            }),
            album: Some(Album {
                id: "b".to_string(),
                title: "Blue".to_string(),
                artist: None,
                image: Some(AlbumImage {
                    small: Some("/img/s.jpg".to_string()),
                    thumbnail: Some("/img/t.jpg".to_string()),
                    large: None,
                }),
            }),
        };
        let metadata = Metadata::from_track(&track);
        assert_eq!(metadata.artist, "Joni");
        assert_eq!(metadata.duration_ms, 240_000);
        assert_eq!(metadata.artwork.as_deref(), Some("/img/t.jpg"));

        if let Some(image) = track.album.as_mut().and_then(|a| a.image.as_mut()) {
            image.large = Some("/img/l.jpg".to_string());
        }
        assert_eq!(
            Metadata::from_track(&track).artwork.as_deref(),
            Some("/img/l.jpg")
        );
    }
}
