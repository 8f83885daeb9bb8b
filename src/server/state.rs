use std::sync::Arc;

use crate::visitors::{Clock, SystemClock, VisitorStore};

/// Shared state handed to every handler
pub struct State {
    pub visitors: VisitorStore,
    pub clock: Arc<dyn Clock>,
}

impl State {
    pub fn new() -> Arc<Self> {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Arc<Self> {
        let visitors = VisitorStore::new(clock.now());

        Arc::new(Self { visitors, clock })
    }
}
