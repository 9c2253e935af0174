use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Instant;
use unicode_width::UnicodeWidthStr;

const WIN_WORDS: [&str; 6] = [
    "GENIUS!",
    "SPLENDID!",
    "BRAVO!",
    "IMPRESSIVE!",
    "NICE ONE!",
    "PHEW!",
];

const SPARKS: [char; 5] = ['*', '+', '.', 'o', '\''];

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
    /// Letters of the banner glide to a fixed slot instead of falling.
    pub target: Option<(f64, f64)>,
}

impl Particle {
    fn spark<R: Rng>(x: f64, y: f64, rng: &mut R) -> Self {
        Self {
            x,
            y,
            vel_x: rng.gen_range(-3.0..3.0),
            vel_y: rng.gen_range(-4.0..-1.0),
            symbol: *SPARKS.choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..3),
            age: 0.0,
            max_age: rng.gen_range(2.0..4.0),
            target: None,
        }
    }

    fn letter(x: f64, y: f64, target: (f64, f64), symbol: char, color_index: usize) -> Self {
        Self {
            x,
            y,
            vel_x: target.0 - x,
            vel_y: target.1 - y,
            symbol,
            color_index,
            age: 0.0,
            max_age: f64::INFINITY,
            target: Some(target),
        }
    }

    pub fn is_letter(&self) -> bool {
        self.target.is_some()
    }

    fn update(&mut self, dt: f64) -> bool {
        match self.target {
            Some((tx, ty)) => {
                if ((tx - self.x).powi(2) + (ty - self.y).powi(2)).sqrt() > 1.0 {
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
                self.vel_y += 15.0 * dt;
            }
        }
        self.age += dt;
        self.age < self.max_age
    }
}

/// Short burst shown over the board after a win.
#[derive(Debug)]
pub struct Celebration {
    pub particles: Vec<Particle>,
    pub banner: &'static str,
    started: Instant,
    duration: f64,
    active: bool,
    width: f64,
    height: f64,
}

impl Celebration {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            banner: WIN_WORDS[0],
            started: Instant::now(),
            duration: 3.0,
            active: false,
            width: 80.0,
            height: 24.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Pick a banner by how many rows the win took; quicker wins get louder words.
    pub fn start(&mut self, width: u16, height: u16, attempts_used: usize) {
        let mut rng = rand::thread_rng();

        self.particles.clear();
        self.started = Instant::now();
        self.active = true;
        self.width = width as f64;
        self.height = height as f64;
        self.banner = WIN_WORDS[attempts_used.saturating_sub(1).min(WIN_WORDS.len() - 1)];

        let cx = self.width / 2.0;
        let cy = self.height / 2.0;
        let spacing = 2.0;
        let left = cx - (self.banner.width() as f64 - 1.0) * spacing / 2.0;

        for (i, ch) in self.banner.chars().enumerate().filter(|(_, c)| *c != ' ') {
            let target = (left + i as f64 * spacing, cy - 2.0);
            let from_x = cx + rng.gen_range(-10.0..10.0);
            let from_y = cy + rng.gen_range(-5.0..5.0);
            self.particles
                .push(Particle::letter(from_x, from_y, target, ch, rng.gen_range(0..3)));
        }

        for _ in 0..25 {
            let x = cx + rng.gen_range(-15.0..15.0);
            let y = cy + rng.gen_range(-8.0..8.0);
            self.particles.push(Particle::spark(x, y, &mut rng));
        }
    }

    /// Advance one frame. Sparks that leave the screen are dropped.
    pub fn update(&mut self) {
        if !self.active {
            return;
        }
        if self.started.elapsed().as_secs_f64() >= self.duration {
            self.active = false;
            self.particles.clear();
            return;
        }

        let (width, height) = (self.width, self.height);
        let margin = 5.0;
        self.particles.retain_mut(|p| {
            let alive = p.update(0.1);
            let off_screen = !p.is_letter()
                && (p.y > height + margin || p.x < -margin || p.x > width + margin);
            alive && !off_screen
        });
    }
}

impl Default for Celebration {
    fn default() -> Self {
        Self::new()
    }
}
