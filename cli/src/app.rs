use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{DefaultTerminal, Frame};

use kalinka::{
  ActiveSession, KalinkaError, LifecycleHandlers, PlaybackMode, PlaybackState, SessionBuilder,
  SessionConfig, SessionHandle,
};

use crate::view::{now_playing, startup};

const SEEK_STEP_MS: u64 = 10_000;
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Everything the session reports, forwarded onto the UI thread
#[derive(Debug)]
pub enum AppEvent {
  State(PlaybackState),
  Volume(u32),
  Mode(PlaybackMode),
  Connected,
  Disconnected,
  Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
  Connecting,
  Connected,
  Reconnecting,
  Ended,
}

#[derive(Debug)]
enum Page {
  Startup,
  NowPlaying,
}

pub struct App {
  exit: bool,
  page: Page,
  base_url: String,
  pub link: Link,
  pub state: PlaybackState,
  pub volume: Option<u32>,
  pub mode: PlaybackMode,
  session: Option<ActiveSession>,
  handle: SessionHandle,
  events: Receiver<AppEvent>,
}

impl App {
  /// Start a session; must be called inside the Tokio runtime
  pub fn connect(config: SessionConfig) -> Result<Self, KalinkaError> {
    let (tx, events) = mpsc::channel();
    let base_url = config.base_url.clone();
    let session = SessionBuilder::new(config)
      .with_state_handler(forward(&tx, AppEvent::State))
      .with_volume_handler(forward(&tx, AppEvent::Volume))
      .with_playback_mode_handler(forward(&tx, AppEvent::Mode))
      .with_lifecycle_handlers(
        LifecycleHandlers::new()
          .with_connected(signal(&tx, || AppEvent::Connected))
          .with_disconnected(signal(&tx, || AppEvent::Disconnected))
          .with_stopped(signal(&tx, || AppEvent::Stopped)),
      )
      .start()?;

    Ok(Self {
      exit: false,
      page: Page::Startup,
      base_url,
      link: Link::Connecting,
      state: PlaybackState::default(),
      volume: None,
      mode: PlaybackMode::default(),
      handle: session.handle(),
      session: Some(session),
      events,
    })
  }

  pub fn run(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
    while !self.exit {
      self.drain_events();
      terminal.draw(|frame| self.draw(frame))?;
      self.handle_events()?;
    }
    Ok(())
  }

  pub async fn shutdown(&mut self) {
    if let Some(session) = self.session.take() {
      session.stop().await;
    }
  }

  fn drain_events(&mut self) {
    while let Ok(event) = self.events.try_recv() {
      match event {
        AppEvent::State(state) => {
          self.state = state;
          self.page = Page::NowPlaying;
        }
        AppEvent::Volume(volume) => self.volume = Some(volume),
        AppEvent::Mode(mode) => self.mode = mode,
        AppEvent::Connected => self.link = Link::Connected,
        AppEvent::Disconnected => {
          if self.link != Link::Ended {
            self.link = Link::Reconnecting;
          }
        }
        AppEvent::Stopped => {
          self.link = Link::Ended;
          self.page = Page::Startup;
        }
      }
    }
  }

  fn draw(&self, frame: &mut Frame) {
    match self.page {
      Page::Startup => startup::draw(frame, &self.base_url, self.link),
      Page::NowPlaying => now_playing::draw(frame, self),
    }
  }

  fn handle_events(&mut self) -> io::Result<()> {
    if !event::poll(POLL_INTERVAL)? {
      return Ok(());
    }
    if let Event::Key(key_event) = event::read()? {
      if key_event.kind != KeyEventKind::Press || self.handle_shared_event(key_event) {
        return Ok(());
      }
      if let Page::NowPlaying = self.page {
        if let Err(e) = self.handle_player_event(key_event) {
          log::warn!("Command not sent: {}", e);
        }
      }
    }
    Ok(())
  }

  fn handle_shared_event(&mut self, key_event: KeyEvent) -> bool {
    match key_event.code {
      KeyCode::Char('q') | KeyCode::Esc => {
        self.exit = true;
        true
      }
      _ => false,
    }
  }

  fn handle_player_event(&self, key_event: KeyEvent) -> Result<(), KalinkaError> {
    let handle = &self.handle;
    match key_event.code {
      KeyCode::Char(' ') => handle.toggle_play_pause(),
      KeyCode::Char('s') => handle.stop(),
      KeyCode::Char('n') => handle.skip_next(),
      KeyCode::Char('p') => handle.skip_prev(),
      KeyCode::Right => handle.seek_to(self.seek_target(SEEK_STEP_MS as i64)),
      KeyCode::Left => handle.seek_to(self.seek_target(-(SEEK_STEP_MS as i64))),
      KeyCode::Char('+') | KeyCode::Char('=') => handle.adjust_volume(1),
      KeyCode::Char('-') => handle.adjust_volume(-1),
      _ => Ok(()),
    }
  }

  fn seek_target(&self, delta_ms: i64) -> u64 {
    let target = (self.state.position as i64).saturating_add(delta_ms).max(0) as u64;
    match self.state.duration_ms() {
      Some(duration) => target.min(duration),
      None => target,
    }
  }
}

fn forward<T: 'static>(
  tx: &Sender<AppEvent>,
  wrap: fn(T) -> AppEvent,
) -> impl Fn(T) + Send + Sync + 'static {
  let tx = tx.clone();
  move |value| {
    let _ = tx.send(wrap(value));
  }
}

fn signal(tx: &Sender<AppEvent>, make: fn() -> AppEvent) -> impl Fn() + Send + Sync + 'static {
  let tx = tx.clone();
  move || {
    let _ = tx.send(make());
  }
}
