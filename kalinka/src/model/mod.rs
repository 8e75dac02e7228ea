mod command_outcome;
mod device_volume;
mod metadata;
mod play_state;
mod playback_mode;
mod playback_state;
mod track;
mod track_list;
mod wire_event;

pub use command_outcome::CommandOutcome;
pub use device_volume::DeviceVolume;
pub use metadata::Metadata;
pub use play_state::PlayState;
pub use playback_mode::PlaybackMode;
pub use playback_state::PlaybackState;
pub use track::{Album, AlbumImage, Artist, AudioInfo, Track};
pub use track_list::TrackList;
pub use wire_event::WireEvent;
