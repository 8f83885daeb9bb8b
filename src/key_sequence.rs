use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

/// ↑ ↑ ↓ ↓ ← → ← → B A, in key-code naming
pub const KONAMI_CODE: [&str; 10] = [
    "ArrowUp",
    "ArrowUp",
    "ArrowDown",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "ArrowLeft",
    "ArrowRight",
    "KeyB",
    "KeyA",
];

/// Map a terminal key onto physical key-code naming (`ArrowUp`, `KeyB`, `Digit7`, ...)
pub fn key_code_name(code: &KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) if c.is_ascii_alphabetic() => format!("Key{}", c.to_ascii_uppercase()),
        KeyCode::Char(c) if c.is_ascii_digit() => format!("Digit{c}"),
        _ => return None,
    };
    Some(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Idle,
    Triggered { since: Instant },
}

/// Watches every key press for one fixed sequence
#[derive(Debug)]
pub struct KeySequenceDetector {
    target: Vec<String>,
    recent: VecDeque<String>,
    state: DetectorState,
    dwell: Duration,
    activations: u32,
}

impl KeySequenceDetector {
    pub fn new(target: &[&str], dwell: Duration) -> Self {
        Self {
            target: target.iter().map(|s| s.to_string()).collect(),
            recent: VecDeque::with_capacity(target.len()),
            state: DetectorState::Idle,
            dwell,
            activations: 0,
        }
    }

    pub fn konami(dwell: Duration) -> Self {
        Self::new(&KONAMI_CODE, dwell)
    }

    /// Feed one key code. Returns true when this key completed the sequence.
    pub fn on_key(&mut self, code: &str, now: Instant) -> bool {
        if self.target.is_empty() {
            return false;
        }
        if self.recent.len() == self.target.len() {
            self.recent.pop_front();
        }
        self.recent.push_back(code.to_string());

        if self.recent.iter().eq(self.target.iter()) {
            self.recent.clear();
            self.state = DetectorState::Triggered { since: now };
            self.activations += 1;
            return true;
        }
        false
    }

    /// Advance the dwell deadline. Returns true on the Triggered -> Idle edge.
    pub fn on_tick(&mut self, now: Instant) -> bool {
        match self.state {
            DetectorState::Triggered { since } if now.duration_since(since) >= self.dwell => {
                self.state = DetectorState::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn is_triggered(&self) -> bool {
        matches!(self.state, DetectorState::Triggered { .. })
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn recent_keys(&self) -> Vec<&str> {
        self.recent.iter().map(String::as_str).collect()
    }

    pub fn activations(&self) -> u32 {
        self.activations
    }

    /// Time left on the overlay, if showing
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match self.state {
            DetectorState::Triggered { since } => {
                Some(self.dwell.saturating_sub(now.duration_since(since)))
            }
            DetectorState::Idle => None,
        }
    }

    pub fn teardown(&mut self) {
        self.recent.clear();
        self.state = DetectorState::Idle;
    }
}
