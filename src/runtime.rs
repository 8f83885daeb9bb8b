use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::fetch::Resolved;
use crate::profile::ProfileStats;

/// How often the input thread re-checks its stop flag
const INPUT_POLL: Duration = Duration::from_millis(50);

/// Unified event type consumed by the zone
#[derive(Clone, Debug)]
pub enum ZoneEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
    Visitors(u64),
    Profile(Resolved<ProfileStats>),
}

/// Source of zone events (keyboard, resize, loader results)
pub trait ZoneEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<ZoneEvent, RecvTimeoutError>;
    /// Sender that background loaders post their results through
    fn sender(&self) -> Sender<ZoneEvent>;
}

/// Production event source using crossterm. Dropping it stops the input thread.
pub struct CrosstermEventSource {
    tx: Sender<ZoneEvent>,
    rx: Receiver<ZoneEvent>,
    stop: Arc<AtomicBool>,
    input: Option<JoinHandle<()>>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));

        let input_tx = tx.clone();
        let input_stop = Arc::clone(&stop);
        let input = std::thread::spawn(move || {
            while !input_stop.load(Ordering::Relaxed) {
                match event::poll(INPUT_POLL) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(_) => break,
                }
                let ev = match event::read() {
                    Ok(CtEvent::Key(key)) => ZoneEvent::Key(key),
                    Ok(CtEvent::Resize(w, h)) => ZoneEvent::Resize(w, h),
                    Ok(_) => continue,
                    Err(_) => break,
                };
                if input_tx.send(ev).is_err() {
                    break;
                }
            }
        });

        Self {
            tx,
            rx,
            stop,
            input: Some(input),
        }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CrosstermEventSource {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.input.take() {
            let _ = handle.join();
        }
    }
}

impl ZoneEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ZoneEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<ZoneEvent> {
        self.tx.clone()
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-backed event source for headless runs and tests
pub struct TestEventSource {
    tx: Sender<ZoneEvent>,
    rx: Receiver<ZoneEvent>,
}

impl TestEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for TestEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ZoneEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<ZoneEvent> {
        self.tx.clone()
    }
}

/// Runner that advances the zone one event/tick at a time
pub struct Runner<E: ZoneEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: ZoneEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    pub fn sender(&self) -> Sender<ZoneEvent> {
        self.event_source.sender()
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> ZoneEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => ZoneEvent::Tick,
        }
    }
}
