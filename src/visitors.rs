use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// Length of one counting window. Once a window is this old the next request
/// starts a new one at zero.
pub const RESET_WINDOW_MS: i64 = 86_400_000;

/// Source of "now" for the counter, swappable in tests
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitCounterState {
    pub count: u64,
    pub window_start: DateTime<Utc>,
}

impl VisitCounterState {
    fn roll_window(&mut self, now: DateTime<Utc>) -> bool {
        if now - self.window_start >= Duration::milliseconds(RESET_WINDOW_MS) {
            self.count = 0;
            self.window_start = now;
            true
        } else {
            false
        }
    }
}

/// Process-wide visit tally. Not persisted: a restart begins a fresh window.
///
/// Both operations run the whole check-reset-(increment) sequence under one
/// lock so concurrent visitors never lose an update.
#[derive(Debug)]
pub struct VisitorStore {
    state: Mutex<VisitCounterState>,
}

impl VisitorStore {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new(VisitCounterState {
                count: 0,
                window_start: now,
            }),
        }
    }

    pub fn read_and_maybe_reset(&self, now: DateTime<Utc>) -> VisitCounterState {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.roll_window(now) {
            tracing::info!(window_start = %now, "visitor window reset");
        }
        *state
    }

    pub fn increment_and_maybe_reset(&self, now: DateTime<Utc>) -> VisitCounterState {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.roll_window(now) {
            tracing::info!(window_start = %now, "visitor window reset");
        }
        state.count += 1;
        *state
    }
}

/// Wire shape of `/api/visitors`, shared by the service and the zone client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub last_reset: Option<DateTime<Utc>>,
}

impl From<VisitCounterState> for VisitorsResponse {
    fn from(state: VisitCounterState) -> Self {
        Self {
            success: true,
            count: state.count,
            last_reset: Some(state.window_start),
        }
    }
}
