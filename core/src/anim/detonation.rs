use core::ops::Range;
use rand::Rng;
use rand::distr::Uniform;
use rand::distr::uniform::SampleUniform;
use smallvec::SmallVec;

use super::*;

/// Downward acceleration applied to every particle, in pixels per second squared.
const GRAVITY: f32 = 320.0;
/// Edge length of an ember square, in pixels.
const EMBER_SIZE: f32 = 6.0;
/// Shortest allowed gap between batches, in seconds.
const MIN_INTERVAL: f64 = 1e-3;

/// Emission parameters of a [`DetonationAnim`].
#[derive(Clone, Debug, PartialEq)]
pub struct Emitter {
    /// Seconds after start during which batches are spawned.
    pub window: f64,
    /// Seconds between batches.
    pub interval: f64,
    pub batch: usize,
    /// Probability that a spawned particle is a polygon piece rather than an ember.
    pub piece_chance: f64,
    /// Probability that a particle bounces off the field edges.
    pub bounce_chance: f64,
    pub speed: Range<f32>,
    pub lifetime: Range<f64>,
}

impl Emitter {
    /// Clamps the chances to `0..=1` and keeps batches at least [`MIN_INTERVAL`] apart.
    fn sanitized(self) -> Self {
        let chance = |p: f64| if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        Self {
            interval: self.interval.max(MIN_INTERVAL),
            piece_chance: chance(self.piece_chance),
            bounce_chance: chance(self.bounce_chance),
            ..self
        }
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            window: 0.4,
            interval: 0.05,
            batch: 10,
            piece_chance: 0.35,
            bounce_chance: 0.5,
            speed: 60.0..260.0,
            lifetime: 0.5..1.4,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParticleKind {
    Ember,
    Piece {
        /// Outline relative to the particle position.
        outline: SmallVec<[Point; 6]>,
        angle: f32,
        spin: f32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Point,
    pub vel: Point,
    pub life: f64,
    pub lifetime: f64,
    pub bounce: bool,
}

impl Particle {
    fn spawn(center: Point, emitter: &Emitter, rng: &mut GameRng) -> Self {
        let heading = rng.random_range(0.0..core::f32::consts::TAU);
        let speed = sample(rng, &emitter.speed);
        let lifetime = sample(rng, &emitter.lifetime);
        let kind = if rng.random_bool(emitter.piece_chance) {
            ParticleKind::Piece {
                outline: random_outline(rng),
                angle: 0.0,
                spin: rng.random_range(-360.0..360.0),
            }
        } else {
            ParticleKind::Ember
        };
        Self {
            kind,
            pos: center,
            vel: Point::new(heading.cos() * speed, heading.sin() * speed),
            life: lifetime,
            lifetime,
            bounce: rng.random_bool(emitter.bounce_chance),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    pub fn alpha(&self) -> f32 {
        (self.life / self.lifetime).clamp(0.0, 1.0) as f32
    }

    fn step(&mut self, dt: f64, field: Rect) {
        if !self.is_alive() {
            return;
        }
        let dt32 = dt as f32;
        self.life -= dt;
        self.vel.y += GRAVITY * dt32;
        self.pos.x += self.vel.x * dt32;
        self.pos.y += self.vel.y * dt32;

        if let ParticleKind::Piece { angle, spin, .. } = &mut self.kind {
            *angle += *spin * dt32;
        }

        if self.bounce {
            if self.pos.x < field.x || self.pos.x > field.right() {
                self.vel.x = -self.vel.x;
                self.pos.x = self.pos.x.clamp(field.x, field.right());
            }
            if self.pos.y < field.y || self.pos.y > field.bottom() {
                self.vel.y = -self.vel.y;
                self.pos.y = self.pos.y.clamp(field.y, field.bottom());
            }
        }
    }

    fn render(&self, sink: &mut dyn RenderSink) {
        match &self.kind {
            ParticleKind::Ember => {
                let sprite = Sprite::new(
                    TextureId::DetonationParticle,
                    self.pos.x - EMBER_SIZE / 2.0,
                    self.pos.y - EMBER_SIZE / 2.0,
                    EMBER_SIZE,
                );
                sink.draw(&sprite.with_alpha(self.alpha()));
            }
            ParticleKind::Piece { outline, angle, .. } => {
                let (sin, cos) = angle.to_radians().sin_cos();
                let points: SmallVec<[Point; 6]> = outline
                    .iter()
                    .map(|p| {
                        Point::new(
                            self.pos.x + p.x * cos - p.y * sin,
                            self.pos.y + p.x * sin + p.y * cos,
                        )
                    })
                    .collect();
                sink.fill_polygon(&points, self.alpha());
            }
        }
    }
}

/// Uniform pick from `range`, or its start when the range is empty or unbounded.
fn sample<T: SampleUniform + Copy>(rng: &mut GameRng, range: &Range<T>) -> T {
    match Uniform::<T>::new(range.start, range.end) {
        Ok(dist) => rng.sample(dist),
        Err(_) => range.start,
    }
}

/// Convex-ish fragment: vertices at jittered, evenly spaced angles.
fn random_outline(rng: &mut GameRng) -> SmallVec<[Point; 6]> {
    let corners = rng.random_range(3..=6);
    let step = core::f32::consts::TAU / corners as f32;
    (0..corners)
        .map(|i| {
            let theta = step * i as f32 + rng.random_range(0.0..step * 0.5);
            let radius = rng.random_range(2.0..7.0);
            Point::new(theta.cos() * radius, theta.sin() * radius)
        })
        .collect()
}

/// Particle burst played where a mine went off.
#[derive(Clone, Debug, PartialEq)]
pub struct DetonationAnim {
    emitter: Emitter,
    center: Point,
    field: Rect,
    elapsed: f64,
    next_batch: f64,
    particles: Vec<Particle>,
}

impl DetonationAnim {
    pub fn new(center: Point, field: Rect) -> Self {
        Self::with_emitter(center, field, Emitter::default())
    }

    pub fn with_emitter(center: Point, field: Rect, emitter: Emitter) -> Self {
        Self {
            emitter: emitter.sanitized(),
            center,
            field,
            elapsed: 0.0,
            next_batch: 0.0,
            particles: Vec::new(),
        }
    }

    pub fn is_emitting(&self) -> bool {
        self.elapsed < self.emitter.window
    }

    /// Every pooled particle, dead ones included.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn live_particles(&self) -> usize {
        self.particles.iter().filter(|p| p.is_alive()).count()
    }

    fn emit(&mut self, rng: &mut GameRng) {
        for _ in 0..self.emitter.batch {
            let particle = Particle::spawn(self.center, &self.emitter, rng);
            match self.particles.iter_mut().find(|p| !p.is_alive()) {
                Some(dead) => *dead = particle,
                None => self.particles.push(particle),
            }
        }
    }

    pub fn render(&self, sink: &mut dyn RenderSink) {
        for particle in self.particles.iter().filter(|p| p.is_alive()) {
            particle.render(sink);
        }
    }
}

impl Animate for DetonationAnim {
    fn on_start(&mut self, _rng: &mut GameRng) {
        self.elapsed = 0.0;
        self.next_batch = 0.0;
    }

    fn on_update(&mut self, dt: f64, rng: &mut GameRng) -> bool {
        self.elapsed += dt;
        while self.next_batch < self.emitter.window && self.next_batch <= self.elapsed {
            self.emit(rng);
            self.next_batch += self.emitter.interval;
        }

        let field = self.field;
        for particle in &mut self.particles {
            particle.step(dt, field);
        }

        self.is_emitting() || self.particles.iter().any(Particle::is_alive)
    }
}
