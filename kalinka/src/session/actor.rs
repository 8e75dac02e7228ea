use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};

use super::handlers::SessionHandlers;
use crate::error::Result;
use crate::model::{CommandOutcome, DeviceVolume, PlaybackState, WireEvent};
use crate::proxy::PlayerProxy;
use crate::reconcile::{PlayAction, Reconciler, SkipDirection};
use crate::volume::{VolumeController, VolumeSink};

const EXPIRY_TICK: Duration = Duration::from_millis(250);

/// Local user intents queued on the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LocalCommand {
    Play,
    Pause,
    TogglePlayPause,
    Stop,
    SkipNext,
    SkipPrev,
    SeekTo(u64),
    AdjustVolume(i64),
    SetVolume(i64),
}

/// Inputs of the session actor; the actor is their only consumer
#[derive(Debug)]
pub(crate) enum SessionMessage {
    Server(WireEvent),
    SeekOutcome { seq: u64, outcome: CommandOutcome },
    Command(LocalCommand),
    VolumeReady(DeviceVolume),
    VolumeSurfaced(u32),
    Connected,
    Disconnected,
    Shutdown,
}

/// Single writer of the reconciler and owner of the volume debouncer
pub(crate) struct SessionActor {
    pub reconciler: Reconciler,
    pub volume: Option<VolumeController>,
    pub proxy: PlayerProxy,
    pub tx: mpsc::UnboundedSender<SessionMessage>,
    pub handlers: SessionHandlers,
    pub state_tx: watch::Sender<PlaybackState>,
    pub volume_tx: watch::Sender<Option<u32>>,
    pub volume_window: Duration,
    pub volume_rate_hz: f64,
}

impl SessionActor {
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<SessionMessage>) {
        let mut expiry = tokio::time::interval(EXPIRY_TICK);
        expiry.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                message = rx.recv() => match message {
                    Some(SessionMessage::Shutdown) | None => break,
                    Some(message) => self.handle(message),
                },
                _ = expiry.tick() => {
                    if let Some(state) = self.reconciler.expire(Instant::now()) {
                        self.publish(state);
                    }
                }
            }
        }

        // Dropping the controller cancels its window timer
        self.volume = None;
        log::info!("Session stopped");
        self.handlers.stopped();
    }

    fn handle(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Server(event) => self.on_server_event(event),
            SessionMessage::SeekOutcome { seq, outcome } => {
                if let Some(state) = self.reconciler.on_seek_outcome(seq, &outcome) {
                    self.publish(state);
                }
            }
            SessionMessage::Command(command) => self.on_command(command),
            SessionMessage::VolumeReady(device) => self.on_volume_ready(device),
            SessionMessage::VolumeSurfaced(volume) => self.surface_volume(volume),
            SessionMessage::Connected => self.handlers.connected(),
            SessionMessage::Disconnected => {
                self.reconciler.on_link_lost();
                self.handlers.disconnected();
            }
            SessionMessage::Shutdown => {}
        }
    }

    fn on_server_event(&mut self, event: WireEvent) {
        match event {
            WireEvent::VolumeChanged { volume } => match &self.volume {
                Some(controller) => controller.on_server_volume(volume),
                None => self.surface_volume(volume),
            },
            WireEvent::StateChanged { state } => {
                let exposed = self.reconciler.on_server_state(state, Instant::now());
                self.publish(exposed);
            }
            WireEvent::StateReplay {
                state,
                track_list,
                playback_mode,
            } => {
                log::debug!("State replay with {} queued tracks", track_list.total);
                let exposed = self.reconciler.on_server_state(state, Instant::now());
                self.publish(exposed);
                self.handlers.track_list(track_list);
                self.handlers.playback_mode(playback_mode);
            }
            WireEvent::PlaybackModeChanged { mode } => self.handlers.playback_mode(mode),
            WireEvent::Unknown { event_type } => {
                log::debug!("Dropping unknown event '{}'", event_type);
            }
        }
    }

    fn on_command(&mut self, command: LocalCommand) {
        log::debug!("Local command {:?}", command);
        match command {
            LocalCommand::Play => self.play(self.reconciler.resolve_play()),
            LocalCommand::TogglePlayPause => self.play(self.reconciler.resolve_toggle()),
            LocalCommand::Pause => self.play(PlayAction::Pause),
            LocalCommand::Stop => self.dispatch("stop", |proxy| async move { proxy.stop().await }),
            LocalCommand::SkipNext => {
                let exposed = self.reconciler.on_local_skip(SkipDirection::Next);
                self.publish(exposed);
                self.dispatch("next", |proxy| async move { proxy.skip_next().await });
            }
            LocalCommand::SkipPrev => {
                let exposed = self.reconciler.on_local_skip(SkipDirection::Prev);
                self.publish(exposed);
                self.dispatch("prev", |proxy| async move { proxy.skip_prev().await });
            }
            LocalCommand::SeekTo(target_ms) => self.seek(target_ms),
            LocalCommand::AdjustVolume(delta) => match &self.volume {
                Some(controller) => {
                    controller.adjust(delta);
                }
                None => log::debug!("Volume control not available"),
            },
            LocalCommand::SetVolume(level) => match &self.volume {
                Some(controller) => {
                    controller.set_absolute(level);
                }
                None => log::debug!("Volume control not available"),
            },
        }
    }

    fn play(&self, action: PlayAction) {
        match action {
            PlayAction::Play => self.dispatch("play", |proxy| async move { proxy.play().await }),
            PlayAction::Resume => {
                self.dispatch("resume", |proxy| async move { proxy.pause(false).await })
            }
            PlayAction::Pause => {
                self.dispatch("pause", |proxy| async move { proxy.pause(true).await })
            }
        }
    }

    fn seek(&mut self, target_ms: u64) {
        let (seq, exposed) = self.reconciler.on_local_seek(target_ms, Instant::now());
        self.publish(exposed);

        let proxy = self.proxy.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            // A failed seek is as good as an unconfirmed one
            let outcome = proxy.seek_to(target_ms).await.unwrap_or_default();
            let _ = tx.send(SessionMessage::SeekOutcome { seq, outcome });
        });
    }

    fn on_volume_ready(&mut self, device: DeviceVolume) {
        if !device.supported {
            log::info!("Device does not support volume control");
            return;
        }
        log::info!(
            "Device volume {}/{} (gain {})",
            device.current_volume,
            device.max_volume,
            device.volume_gain
        );

        let proxy = self.proxy.clone();
        let outbound: VolumeSink = Arc::new(move |volume| {
            let proxy = proxy.clone();
            tokio::spawn(async move {
                let _ = proxy.set_volume(volume).await;
            });
        });
        let tx = self.tx.clone();
        let surface: VolumeSink = Arc::new(move |volume| {
            let _ = tx.send(SessionMessage::VolumeSurfaced(volume));
        });

        let controller = VolumeController::new(
            device.max_volume,
            device.current_volume,
            self.volume_window,
            self.volume_rate_hz,
            outbound,
            surface,
        );
        let current = controller.current();
        self.volume = Some(controller);
        self.surface_volume(current);
    }

    fn dispatch<F, Fut>(&self, name: &'static str, call: F)
    where
        F: FnOnce(PlayerProxy) -> Fut,
        Fut: Future<Output = Result<CommandOutcome>> + Send + 'static,
    {
        let request = call(self.proxy.clone());
        tokio::spawn(async move {
            if let Ok(outcome) = request.await {
                log::debug!("{} acknowledged: {:?}", name, outcome.message);
            }
        });
    }

    fn publish(&self, state: PlaybackState) {
        self.state_tx.send_replace(state.clone());
        self.handlers.state(state);
    }

    fn surface_volume(&self, volume: u32) {
        self.volume_tx.send_replace(Some(volume));
        self.handlers.volume(volume);
    }
}
