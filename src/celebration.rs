use rand::seq::SliceRandom;
use rand::Rng;
use std::time::{Duration, Instant};

const SPARKS: [char; 7] = ['✨', '🎉', '⭐', '💫', '🌟', '🏆', '🎊'];
const BANNERS: [&str; 3] = ["CODE MASTER!", "EASTER EGG!", "UNLOCKED!"];
/// Simulation step per update, in seconds
const STEP: f64 = 0.1;
const GRAVITY: f64 = 15.0;

/// One glyph in the overlay animation
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
    /// Banner letters fly to a fixed slot and stay; sparks fall
    pub target: Option<(f64, f64)>,
}

impl Particle {
    fn spark<R: Rng + ?Sized>(x: f64, y: f64, rng: &mut R) -> Self {
        Self {
            x,
            y,
            vel_x: rng.gen_range(-3.0..3.0),
            vel_y: rng.gen_range(-4.0..-1.0),
            symbol: *SPARKS.choose(rng).unwrap_or(&'✨'),
            color_index: rng.gen_range(0..SPARKS.len()),
            age: 0.0,
            max_age: rng.gen_range(2.0..4.0),
            target: None,
        }
    }

    fn letter(from: (f64, f64), to: (f64, f64), symbol: char, color_index: usize, max_age: f64) -> Self {
        Self {
            x: from.0,
            y: from.1,
            vel_x: to.0 - from.0,
            vel_y: to.1 - from.1,
            symbol,
            color_index,
            age: 0.0,
            max_age,
            target: Some(to),
        }
    }

    fn step(&mut self, dt: f64) -> bool {
        match self.target {
            Some((tx, ty)) => {
                let dist = ((tx - self.x).powi(2) + (ty - self.y).powi(2)).sqrt();
                if dist > 1.0 {
                    self.x += self.vel_x * dt;
                    self.y += self.vel_y * dt;
                    self.vel_x *= 0.95;
                    self.vel_y *= 0.95;
                } else {
                    self.x = tx;
                    self.y = ty;
                    self.vel_x = 0.0;
                    self.vel_y = 0.0;
                }
            }
            None => {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
                self.vel_y += GRAVITY * dt;
            }
        }

        self.age += dt;
        self.age < self.max_age
    }

    pub fn is_letter(&self) -> bool {
        self.target.is_some()
    }
}

/// Overlay shown while the key sequence detector is triggered
#[derive(Debug)]
pub struct Celebration {
    pub particles: Vec<Particle>,
    pub banner: &'static str,
    started_at: Option<Instant>,
    duration: Duration,
    width: f64,
    height: f64,
}

impl Celebration {
    pub fn new(duration: Duration) -> Self {
        Self {
            particles: Vec::new(),
            banner: BANNERS[0],
            started_at: None,
            duration,
            width: 80.0,
            height: 24.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn start(&mut self, now: Instant, width: u16, height: u16) {
        let mut rng = rand::thread_rng();

        self.particles.clear();
        self.started_at = Some(now);
        self.width = width as f64;
        self.height = height as f64;
        self.banner = BANNERS.choose(&mut rng).copied().unwrap_or(BANNERS[0]);

        let banner = self.banner;
        let center = (self.width / 2.0, self.height / 2.0);
        let spacing = 2.0;
        let left = center.0 - (banner.chars().count() as f64 - 1.0) * spacing / 2.0;
        let lifetime = self.duration.as_secs_f64();

        for (i, ch) in banner.chars().enumerate().filter(|(_, ch)| *ch != ' ') {
            let from = (
                center.0 + rng.gen_range(-10.0..10.0),
                center.1 + rng.gen_range(-5.0..5.0),
            );
            let to = (left + i as f64 * spacing, center.1 - 2.0);
            let color = rng.gen_range(0..SPARKS.len());
            self.particles.push(Particle::letter(from, to, ch, color, lifetime));
        }

        for _ in 0..25 {
            let x = center.0 + rng.gen_range(-15.0..15.0);
            let y = center.1 + rng.gen_range(-8.0..8.0);
            self.particles.push(Particle::spark(x, y, &mut rng));
        }
    }

    pub fn update(&mut self, now: Instant) {
        let Some(started_at) = self.started_at else {
            return;
        };
        if now.saturating_duration_since(started_at) >= self.duration {
            self.stop();
            return;
        }

        let (width, height) = (self.width, self.height);
        let margin = 5.0;
        self.particles.retain_mut(|p| {
            let alive = p.step(STEP);
            if p.is_letter() {
                return alive;
            }
            let off_screen = p.y > height + margin || p.x < -margin || p.x > width + margin;
            alive && !off_screen
        });
    }

    pub fn stop(&mut self) {
        self.started_at = None;
        self.particles.clear();
    }
}
