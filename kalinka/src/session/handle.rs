use tokio::sync::{mpsc, watch};

use super::actor::{LocalCommand, SessionMessage};
use crate::error::{KalinkaError, Result};
use crate::model::PlaybackState;

/// Cheap, cloneable front door to a running session
///
/// Commands are queued without blocking, so a handle can be used from
/// threads outside the Tokio runtime. Every method fails with
/// [`KalinkaError::SessionClosed`] once the session has ended.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionMessage>,
    state: watch::Receiver<PlaybackState>,
    volume: watch::Receiver<Option<u32>>,
}

impl SessionHandle {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<SessionMessage>,
        state: watch::Receiver<PlaybackState>,
        volume: watch::Receiver<Option<u32>>,
    ) -> Self {
        Self { tx, state, volume }
    }

    /// Start playback, resuming if the player is paused
    pub fn play(&self) -> Result<()> {
        self.command(LocalCommand::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.command(LocalCommand::Pause)
    }

    pub fn toggle_play_pause(&self) -> Result<()> {
        self.command(LocalCommand::TogglePlayPause)
    }

    pub fn stop(&self) -> Result<()> {
        self.command(LocalCommand::Stop)
    }

    pub fn skip_next(&self) -> Result<()> {
        self.command(LocalCommand::SkipNext)
    }

    pub fn skip_prev(&self) -> Result<()> {
        self.command(LocalCommand::SkipPrev)
    }

    pub fn seek_to(&self, position_ms: u64) -> Result<()> {
        self.command(LocalCommand::SeekTo(position_ms))
    }

    /// Step the volume; ignored until the device reports volume support
    pub fn adjust_volume(&self, delta: i64) -> Result<()> {
        self.command(LocalCommand::AdjustVolume(delta))
    }

    pub fn set_volume(&self, level: i64) -> Result<()> {
        self.command(LocalCommand::SetVolume(level))
    }

    /// Latest exposed playback state
    pub fn state(&self) -> PlaybackState {
        self.state.borrow().clone()
    }

    /// Latest surfaced volume, if any has been seen
    pub fn volume(&self) -> Option<u32> {
        *self.volume.borrow()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn command(&self, command: LocalCommand) -> Result<()> {
        self.tx
            .send(SessionMessage::Command(command))
            .map_err(|_| KalinkaError::SessionClosed)
    }
}
