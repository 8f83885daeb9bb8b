use std::time::{Duration, Instant};

use crate::util::mean;

pub const REFERENCE_TEXT: &str =
    "The quick brown fox jumps over the lazy dog. This pangram contains every letter of the alphabet.";

/// Characters per "word" when converting to words per minute
const CHARS_PER_WORD: f64 = 5.0;
/// Elapsed time never counts as less than one second, so the first keystrokes
/// don't report absurd speeds
const MIN_ELAPSED_MINUTES: f64 = 1.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TypingState {
    Inactive,
    Active,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub correct_chars: usize,
    pub accuracy: f64,
    pub wpm: f64,
}

/// Position-by-position comparison of `typed` against `reference`
pub fn correct_chars(reference: &str, typed: &str) -> usize {
    reference
        .chars()
        .zip(typed.chars())
        .filter(|(expected, got)| expected == got)
        .count()
}

pub fn compute_metrics(reference: &str, typed: &str, elapsed: Duration) -> Metrics {
    let correct = correct_chars(reference, typed);
    let typed_len = typed.chars().count();

    let accuracy = if typed_len == 0 {
        100.0
    } else {
        (correct as f64 / typed_len as f64 * 100.0).round()
    };

    let elapsed_minutes = (elapsed.as_millis() as f64 / 60_000.0).max(MIN_ELAPSED_MINUTES);
    let wpm = ((correct as f64 / CHARS_PER_WORD) / elapsed_minutes).round();

    Metrics {
        correct_chars: correct,
        accuracy,
        wpm,
    }
}

/// One timed typing attempt against a fixed sentence
#[derive(Debug)]
pub struct TypingSession {
    pub reference: String,
    pub typed: String,
    pub started_at: Option<Instant>,
    pub duration: Duration,
    pub remaining_secs: u64,
    pub wpm: f64,
    pub accuracy: f64,
    pub correct_chars: usize,
    state: TypingState,
}

impl TypingSession {
    pub fn new(reference: &str, duration: Duration) -> Self {
        Self {
            reference: reference.to_string(),
            typed: String::new(),
            started_at: None,
            duration,
            remaining_secs: duration.as_secs(),
            wpm: 0.0,
            accuracy: 100.0,
            correct_chars: 0,
            state: TypingState::Inactive,
        }
    }

    pub fn state(&self) -> TypingState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TypingState::Active
    }

    /// Begin (or restart) an attempt, wiping the previous one
    pub fn start(&mut self, now: Instant) {
        self.typed.clear();
        self.started_at = Some(now);
        self.remaining_secs = self.duration.as_secs();
        self.wpm = 0.0;
        self.accuracy = 100.0;
        self.correct_chars = 0;
        self.state = TypingState::Active;
    }

    /// Freeze the attempt. Returns true if it was running.
    pub fn stop(&mut self) -> bool {
        if self.state != TypingState::Active {
            return false;
        }
        self.state = TypingState::Finished;
        true
    }

    /// Replace the whole typed text, as a text area change would
    pub fn set_typed(&mut self, text: &str, now: Instant) {
        if !self.is_active() {
            return;
        }
        self.typed = text.to_string();
        self.recalc(now);
    }

    pub fn write(&mut self, c: char, now: Instant) {
        if !self.is_active() {
            return;
        }
        self.typed.push(c);
        self.recalc(now);
    }

    pub fn backspace(&mut self, now: Instant) {
        if !self.is_active() {
            return;
        }
        if self.typed.pop().is_some() {
            self.recalc(now);
        }
    }

    /// Advance the countdown. Returns true when this tick ended the attempt.
    pub fn on_tick(&mut self, now: Instant) -> bool {
        let Some(started_at) = self.started_at else {
            return false;
        };
        if !self.is_active() {
            return false;
        }

        let elapsed = now.saturating_duration_since(started_at);
        let remaining_ms = self.duration.saturating_sub(elapsed).as_millis() as u64;
        self.remaining_secs = remaining_ms.div_ceil(1000);
        if elapsed >= self.duration {
            self.remaining_secs = 0;
            self.state = TypingState::Finished;
            return true;
        }
        false
    }

    fn recalc(&mut self, now: Instant) {
        let elapsed = self
            .started_at
            .map(|s| now.saturating_duration_since(s))
            .unwrap_or_default();
        let metrics = compute_metrics(&self.reference, &self.typed, elapsed);

        self.correct_chars = metrics.correct_chars;
        self.accuracy = metrics.accuracy;
        self.wpm = metrics.wpm;
    }

    pub fn progress_percent(&self) -> u32 {
        let total = self.reference.chars().count();
        if total == 0 {
            return 0;
        }
        let typed = self.typed.chars().count().min(total);
        (typed as f64 / total as f64 * 100.0).round() as u32
    }

    /// Drop any running attempt
    pub fn teardown(&mut self) {
        self.typed.clear();
        self.started_at = None;
        self.remaining_secs = self.duration.as_secs();
        self.state = TypingState::Inactive;
    }
}

/// Finished attempts for this run of the zone
#[derive(Debug, Default, Clone)]
pub struct TypingHistory {
    attempts: Vec<f64>,
}

impl TypingHistory {
    pub fn record(&mut self, wpm: f64) {
        self.attempts.push(wpm);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.len()
    }

    pub fn last(&self) -> Option<f64> {
        self.attempts.last().copied()
    }

    pub fn best(&self) -> Option<f64> {
        self.attempts.iter().copied().reduce(f64::max)
    }

    pub fn average(&self) -> Option<f64> {
        mean(&self.attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn correct_chars_compares_by_position() {
        assert_eq!(correct_chars(REFERENCE_TEXT, "The quickX brown"), 9);
        assert_eq!(correct_chars(REFERENCE_TEXT, "The quick"), 9);
        assert_eq!(correct_chars(REFERENCE_TEXT, "he quick"), 0);
        assert_eq!(correct_chars("abc", "abcdef"), 3);
    }

    #[test]
    fn accuracy_of_misaligned_input() {
        let metrics = compute_metrics(REFERENCE_TEXT, "The quickX brown", MINUTE);
        assert_eq!(metrics.correct_chars, 9);
        assert_eq!(metrics.accuracy, 56.0);
    }

    #[test]
    fn empty_input_is_fully_accurate() {
        let metrics = compute_metrics(REFERENCE_TEXT, "", MINUTE);
        assert_eq!(metrics.accuracy, 100.0);
        assert_eq!(metrics.wpm, 0.0);
    }

    #[test]
    fn wpm_uses_five_chars_per_word() {
        // 50 correct chars in one minute = 10 words
        let typed: String = REFERENCE_TEXT.chars().take(50).collect();
        let metrics = compute_metrics(REFERENCE_TEXT, &typed, MINUTE);
        assert_eq!(metrics.wpm, 10.0);

        let metrics = compute_metrics(REFERENCE_TEXT, &typed, MINUTE / 2);
        assert_eq!(metrics.wpm, 20.0);
    }

    #[test]
    fn zero_elapsed_does_not_divide_by_zero() {
        let metrics = compute_metrics(REFERENCE_TEXT, "The q", Duration::ZERO);
        // 1 word over the one second floor
        assert_eq!(metrics.wpm, 60.0);
        assert!(metrics.wpm.is_finite());
    }

    #[test]
    fn new_session_is_inactive() {
        let session = TypingSession::new(REFERENCE_TEXT, MINUTE);
        assert_eq!(session.state(), TypingState::Inactive);
        assert_eq!(session.remaining_secs, 60);
        assert_eq!(session.progress_percent(), 0);
    }

    #[test]
    fn input_ignored_until_started() {
        let now = Instant::now();
        let mut session = TypingSession::new(REFERENCE_TEXT, MINUTE);

        session.write('T', now);
        session.set_typed("The", now);

        assert!(session.typed.is_empty());
    }

    #[test]
    fn keystrokes_update_metrics() {
        let start = Instant::now();
        let mut session = TypingSession::new(REFERENCE_TEXT, MINUTE);
        session.start(start);

        for c in "The qu".chars() {
            session.write(c, start + Duration::from_secs(30));
        }
        session.write('x', start + Duration::from_secs(30));

        assert_eq!(session.correct_chars, 6);
        assert_eq!(session.accuracy, 86.0);
        // 6 chars / 5 = 1.2 words over half a minute
        assert_eq!(session.wpm, 2.0);

        session.backspace(start + Duration::from_secs(30));
        assert_eq!(session.typed, "The qu");
        assert_eq!(session.accuracy, 100.0);
    }

    #[test]
    fn exact_full_match_does_not_finish() {
        let start = Instant::now();
        let mut session = TypingSession::new(REFERENCE_TEXT, MINUTE);
        session.start(start);

        session.set_typed(REFERENCE_TEXT, start + Duration::from_secs(20));

        assert_eq!(session.state(), TypingState::Active);
        assert_eq!(session.progress_percent(), 100);
        assert_eq!(session.accuracy, 100.0);
    }

    #[test]
    fn countdown_finishes_session() {
        let start = Instant::now();
        let mut session = TypingSession::new(REFERENCE_TEXT, MINUTE);
        session.start(start);

        assert!(!session.on_tick(start + Duration::from_millis(1500)));
        assert_eq!(session.remaining_secs, 59);

        assert!(!session.on_tick(start + Duration::from_millis(59_999)));
        assert_eq!(session.remaining_secs, 1);
        assert!(session.is_active());

        assert!(session.on_tick(start + MINUTE));
        assert_eq!(session.state(), TypingState::Finished);
        assert!(!session.on_tick(start + MINUTE * 2));
    }

    #[test]
    fn finished_session_ignores_input() {
        let start = Instant::now();
        let mut session = TypingSession::new(REFERENCE_TEXT, MINUTE);
        session.start(start);
        session.write('T', start);
        assert!(session.stop());
        assert!(!session.stop());

        session.write('h', start);
        session.backspace(start);

        assert_eq!(session.typed, "T");
        assert_eq!(session.state(), TypingState::Finished);
    }

    #[test]
    fn restart_resets_everything() {
        let start = Instant::now();
        let mut session = TypingSession::new(REFERENCE_TEXT, MINUTE);
        session.start(start);
        session.set_typed("Thx", start + Duration::from_secs(10));
        session.on_tick(start + MINUTE);

        let again = start + MINUTE * 2;
        session.start(again);

        assert!(session.is_active());
        assert!(session.typed.is_empty());
        assert_eq!(session.remaining_secs, 60);
        assert_eq!(session.wpm, 0.0);
        assert_eq!(session.accuracy, 100.0);
        assert_eq!(session.started_at, Some(again));
    }

    #[test]
    fn progress_caps_at_reference_length() {
        let start = Instant::now();
        let mut session = TypingSession::new("abcd", MINUTE);
        session.start(start);

        session.set_typed("ab", start);
        assert_eq!(session.progress_percent(), 50);

        session.set_typed("abcdefgh", start);
        assert_eq!(session.progress_percent(), 100);
    }

    #[test]
    fn teardown_returns_to_inactive() {
        let start = Instant::now();
        let mut session = TypingSession::new(REFERENCE_TEXT, MINUTE);
        session.start(start);
        session.write('T', start);

        session.teardown();

        assert_eq!(session.state(), TypingState::Inactive);
        assert!(session.started_at.is_none());
        assert!(!session.on_tick(start + MINUTE));
    }

    #[test]
    fn history_tracks_best_and_last() {
        let mut history = TypingHistory::default();
        assert_eq!(history.best(), None);
        assert_eq!(history.average(), None);

        history.record(40.0);
        history.record(55.0);
        history.record(48.0);

        assert_eq!(history.attempts(), 3);
        assert_eq!(history.best(), Some(55.0));
        assert_eq!(history.last(), Some(48.0));
        assert_eq!(history.average(), Some(47.666666666666664));
    }
}
