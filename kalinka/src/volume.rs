use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::throttle::Throttler;

/// Callback receiving a volume level
pub type VolumeSink = Arc<dyn Fn(u32) + Send + Sync>;

/// Turns bursts of local volume gestures into throttled commands and keeps
/// server echoes from fighting the gesture while it is in progress
///
/// Every local change is surfaced immediately and forwarded to the outbound
/// sink through a [`Throttler`]. Each change opens or extends an interaction
/// window. While the window is open, server-reported volumes are cached
/// instead of surfaced. When no change arrives for the window duration, the
/// throttler is flushed and the latest cached server value, if any, is
/// surfaced and adopted.
///
/// Must be used from within a Tokio runtime; the window deadline is a spawned
/// timer task. The sinks must not call back into the controller.
pub struct VolumeController {
    inner: Arc<Mutex<VolumeWindow>>,
    window: Duration,
    surface: VolumeSink,
}

struct VolumeWindow {
    max: u32,
    current: u32,
    interacting: bool,
    cached_server: Option<u32>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
    throttler: Throttler,
    outbound: VolumeSink,
}

impl VolumeController {
    pub fn new(
        max: u32,
        current: u32,
        window: Duration,
        max_frequency_hz: f64,
        outbound: VolumeSink,
        surface: VolumeSink,
    ) -> Self {
        let inner = VolumeWindow {
            max,
            current: current.min(max),
            interacting: false,
            cached_server: None,
            generation: 0,
            timer: None,
            throttler: Throttler::new(max_frequency_hz),
            outbound,
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
            window,
            surface,
        }
    }

    /// Step the volume by `delta`, returning the new visible value
    pub fn adjust(&self, delta: i64) -> u32 {
        let inner = self.lock();
        let target = i64::from(inner.current).saturating_add(delta);
        self.apply_local(inner, target)
    }

    /// Jump to an absolute level, returning the new visible value
    pub fn set_absolute(&self, value: i64) -> u32 {
        let inner = self.lock();
        self.apply_local(inner, value)
    }

    /// Intake for volumes pushed by the server
    pub fn on_server_volume(&self, volume: u32) {
        let mut inner = self.lock();
        if inner.interacting {
            log::debug!("Caching server volume {} during interaction", volume);
            inner.cached_server = Some(volume);
            return;
        }
        let volume = volume.min(inner.max);
        inner.current = volume;
        drop(inner);
        (self.surface)(volume);
    }

    pub fn current(&self) -> u32 {
        self.lock().current
    }

    pub fn is_interacting(&self) -> bool {
        self.lock().interacting
    }

    fn lock(&self) -> MutexGuard<'_, VolumeWindow> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply_local(&self, mut inner: MutexGuard<'_, VolumeWindow>, target: i64) -> u32 {
        self.touch(&mut inner);
        let clamped = target.clamp(0, i64::from(inner.max)) as u32;
        if clamped == inner.current {
            return clamped;
        }

        inner.current = clamped;
        let outbound = Arc::clone(&inner.outbound);
        inner
            .throttler
            .execute_with_throttle(move || outbound(clamped));
        drop(inner);

        (self.surface)(clamped);
        clamped
    }

    /// Open the window or push its deadline out
    fn touch(&self, inner: &mut VolumeWindow) {
        if !inner.interacting {
            log::debug!("Volume interaction started");
            inner.interacting = true;
            inner.cached_server = None;
        }

        inner.generation = inner.generation.wrapping_add(1);
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }

        let generation = inner.generation;
        let window = self.window;
        let weak = Arc::downgrade(&self.inner);
        let surface = Arc::clone(&self.surface);
        inner.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            close_window(weak, generation, surface);
        }));
    }
}

fn close_window(weak: Weak<Mutex<VolumeWindow>>, generation: u64, surface: VolumeSink) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
    if !inner.interacting || inner.generation != generation {
        return;
    }

    inner.interacting = false;
    inner.timer = None;
    inner.throttler.flush();

    let reconciled = inner
        .cached_server
        .take()
        .map(|volume| volume.min(inner.max))
        .filter(|volume| *volume != inner.current);
    if let Some(volume) = reconciled {
        inner.current = volume;
    }
    drop(inner);

    log::debug!("Volume interaction ended");
    if let Some(volume) = reconciled {
        surface(volume);
    }
}

impl Drop for VolumeController {
    fn drop(&mut self) {
        if let Some(timer) = self.lock().timer.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorded {
        sent: Arc<Mutex<Vec<u32>>>,
        shown: Arc<Mutex<Vec<u32>>>,
    }

    fn controller(max: u32, current: u32) -> (VolumeController, Recorded) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let shown = Arc::new(Mutex::new(Vec::new()));
        let sent_sink = Arc::clone(&sent);
        let shown_sink = Arc::clone(&shown);
        let controller = VolumeController::new(
            max,
            current,
            Duration::from_millis(250),
            5.0,
            Arc::new(move |v| sent_sink.lock().unwrap().push(v)),
            Arc::new(move |v| shown_sink.lock().unwrap().push(v)),
        );
        (controller, Recorded { sent, shown })
    }

    async fn settle(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_adjust_clamps_and_surfaces_immediately() {
        let (volume, recorded) = controller(10, 9);

        assert_eq!(volume.adjust(5), 10);
        assert_eq!(volume.current(), 10);
        assert_eq!(*recorded.shown.lock().unwrap(), vec![10]);
        assert_eq!(*recorded.sent.lock().unwrap(), vec![10]);

        // Already at max: no new command
        assert_eq!(volume.adjust(1), 10);
        assert_eq!(*recorded.sent.lock().unwrap(), vec![10]);

        assert_eq!(volume.set_absolute(-4), 0);
        assert!(volume.is_interacting());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_suppresses_server_echo_until_quiet() {
        let (volume, recorded) = controller(100, 20);

        volume.adjust(1); // t0
        settle(100).await;
        volume.adjust(1); // t0 + 100ms

        settle(100).await;
        volume.on_server_volume(30);
        settle(149).await; // t0 + 349ms
        assert!(volume.is_interacting());
        assert_eq!(*recorded.shown.lock().unwrap(), vec![21, 22]);

        settle(2).await; // past t0 + 350ms
        assert!(!volume.is_interacting());
        assert_eq!(volume.current(), 30);
        assert_eq!(*recorded.shown.lock().unwrap(), vec![21, 22, 30]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_close_flushes_final_gesture_value() {
        let (volume, recorded) = controller(100, 50);

        volume.adjust(1);
        volume.adjust(1);
        volume.adjust(1);
        assert_eq!(*recorded.sent.lock().unwrap(), vec![51]);

        settle(260).await;
        assert_eq!(*recorded.sent.lock().unwrap(), vec![51, 53]);
        assert_eq!(volume.current(), 53);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_volume_surfaces_when_idle() {
        let (volume, recorded) = controller(100, 10);

        volume.on_server_volume(44);
        assert_eq!(volume.current(), 44);
        assert_eq!(*recorded.shown.lock().unwrap(), vec![44]);

        // Clamped to the device maximum
        volume.on_server_volume(250);
        assert_eq!(volume.current(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_echo_matching_local_value_is_not_resurfaced() {
        let (volume, recorded) = controller(100, 10);

        volume.set_absolute(40);
        volume.on_server_volume(40);
        settle(300).await;

        assert!(!volume.is_interacting());
        assert_eq!(*recorded.shown.lock().unwrap(), vec![40]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_resets_when_new_window_opens() {
        let (volume, recorded) = controller(100, 10);

        volume.adjust(1);
        volume.on_server_volume(70);
        settle(300).await;
        assert_eq!(volume.current(), 70);

        volume.adjust(-1);
        settle(300).await;
        assert_eq!(volume.current(), 69);
        assert_eq!(*recorded.shown.lock().unwrap(), vec![11, 70, 69]);
    }
}
