pub mod config;
pub mod error;
pub mod model;
pub mod proxy;
pub mod reconcile;
pub mod session;
pub mod streaming;
pub mod throttle;
pub mod url_resolver;
pub mod volume;

// Re-export key types for easier access
pub use config::SessionConfig;
pub use error::{KalinkaError, Result};
pub use model::{
    CommandOutcome, DeviceVolume, Metadata, PlayState, PlaybackMode, PlaybackState, Track,
    TrackList, WireEvent,
};
pub use proxy::PlayerProxy;
pub use reconcile::{PlayAction, Reconciler, SeekIntent, SkipDirection};
pub use session::{ActiveSession, LifecycleHandlers, SessionBuilder, SessionHandle};
pub use streaming::{ConnectionId, EventStream, StreamEnd, StreamHandlers, StreamStats};
pub use throttle::Throttler;
pub use url_resolver::UrlResolver;
pub use volume::VolumeController;
