//! Particle primitive for crit/fumble celebrations.

use glam::Vec2;

/// How the host should draw a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleShape {
    /// Filled dot.
    #[default]
    Circle,
    /// Elongated streak along the velocity direction.
    Spark,
    /// Small triangle shard rotated to the velocity direction.
    Shard,
}

/// A single particle with position, velocity, color, and lifetime.
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// RGBA base color; the host multiplies alpha by `alpha()`.
    pub color: [u8; 4],
    pub lifetime: f32,
    pub age: f32,
    /// Downward acceleration in px/s².
    pub gravity: f32,
    /// Velocity multiplier applied per tick.
    pub drag: f32,
    pub shape: ParticleShape,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, size: f32, color: [u8; 4], lifetime: f32) -> Self {
        Particle {
            pos,
            vel,
            size,
            color,
            lifetime,
            age: 0.0,
            gravity: 200.0,
            drag: 0.98,
            shape: ParticleShape::Circle,
        }
    }

    pub fn alive(&self) -> bool {
        self.age < self.lifetime
    }

    /// Opacity fading out over the particle's lifetime, in [0, 1].
    pub fn alpha(&self) -> f32 {
        (1.0 - self.age / self.lifetime).clamp(0.0, 1.0)
    }

    /// Advance particle physics. Returns false when expired.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.age += dt;
        if !self.alive() {
            return false;
        }
        self.vel.y += self.gravity * dt;
        self.vel *= self.drag;
        self.pos += self.vel * dt;
        true
    }
}
