use std::time::Instant;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info};
use webbrowser::Browser;

use crate::celebration::Celebration;
use crate::config::Config;
use crate::contributions::{self, ContributionDay};
use crate::fetch::Resolved;
use crate::key_sequence::{key_code_name, KeySequenceDetector};
use crate::profile::{ProfileStats, XpScore};
use crate::runtime::ZoneEvent;
use crate::typing::{TypingHistory, TypingSession, TypingState, REFERENCE_TEXT};

/// Everything the interactive zone shows, driven one [`ZoneEvent`] at a time
#[derive(Debug)]
pub struct App {
    pub config: Config,
    /// `None` until the visitor call settles
    pub visitors: Option<u64>,
    pub profile: Resolved<ProfileStats>,
    pub profile_loading: bool,
    pub contributions: Vec<ContributionDay>,
    pub typing: TypingSession,
    pub history: TypingHistory,
    pub detector: KeySequenceDetector,
    pub celebration: Celebration,
    pub size: (u16, u16),
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, profile: Resolved<ProfileStats>, today: NaiveDate) -> Self {
        let contributions = contributions::generate(today, &mut rand::thread_rng());

        Self {
            typing: TypingSession::new(REFERENCE_TEXT, config.typing_duration()),
            detector: KeySequenceDetector::konami(config.easter_egg_dwell()),
            celebration: Celebration::new(config.easter_egg_dwell()),
            config,
            visitors: None,
            profile,
            profile_loading: true,
            contributions,
            history: TypingHistory::default(),
            size: (80, 24),
            should_quit: false,
        }
    }

    /// Nothing will arrive from the network; show what is known right away
    pub fn go_offline(&mut self) {
        self.visitors = Some(crate::visitor_client::FALLBACK_COUNT);
        self.profile_loading = false;
    }

    pub fn xp(&self) -> XpScore {
        self.profile.value.xp()
    }

    pub fn handle_event(&mut self, event: ZoneEvent, now: Instant) {
        match event {
            ZoneEvent::Key(key) => self.on_key(key, now),
            ZoneEvent::Tick => self.on_tick(now),
            ZoneEvent::Resize(w, h) => self.size = (w, h),
            ZoneEvent::Visitors(count) => {
                debug!(count, "visitor count arrived");
                self.visitors = Some(count);
            }
            ZoneEvent::Profile(resolved) => {
                debug!(source = %resolved.source, "profile stats arrived");
                self.profile = resolved;
                self.profile_loading = false;
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind == KeyEventKind::Release {
            return;
        }

        if let Some(name) = key_code_name(&key.code) {
            if self.detector.on_key(&name, now) {
                info!(activations = self.detector.activations(), "key sequence matched");
                self.celebration.start(now, self.size.0, self.size.1);
            }
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.typing.is_active() {
            match key.code {
                KeyCode::Esc => {
                    if self.typing.stop() {
                        self.finish_typing();
                    }
                }
                KeyCode::Backspace => self.typing.backspace(now),
                KeyCode::Char(c) if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() => {
                    self.typing.write(c, now)
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Enter | KeyCode::Char('s') => {
                self.typing.start(now);
                self.typing.on_tick(now);
            }
            KeyCode::Char('g') => {
                let url = self.profile.value.profile_url.clone();
                open_link(&url);
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if let Some(link) = self.config.social_links.get(index) {
                    open_link(&link.url);
                }
            }
            _ => {}
        }
    }

    fn on_tick(&mut self, now: Instant) {
        if self.typing.on_tick(now) {
            self.finish_typing();
        }
        if self.detector.on_tick(now) {
            self.celebration.stop();
        }
        self.celebration.update(now);
    }

    fn finish_typing(&mut self) {
        debug_assert_eq!(self.typing.state(), TypingState::Finished);
        if self.typing.typed.is_empty() {
            return;
        }
        self.history.record(self.typing.wpm);
        info!(
            wpm = self.typing.wpm,
            accuracy = self.typing.accuracy,
            attempts = self.history.attempts(),
            "typing attempt finished"
        );
    }

    /// Stop timers and drop transient state before the zone goes away
    pub fn teardown(&mut self) {
        self.typing.teardown();
        self.detector.teardown();
        self.celebration.stop();
    }
}

fn open_link(url: &str) {
    if !Browser::is_available() {
        debug!(url, "no browser available");
        return;
    }
    if let Err(e) = webbrowser::open(url) {
        debug!(url, error = %e, "failed to open link");
    }
}
