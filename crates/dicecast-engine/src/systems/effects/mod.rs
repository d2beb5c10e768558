//! Visual effects system: particles, result flashes, and screen shake.
//!
//! This module provides the `EffectsState` facade the overlay drives,
//! plus the individual primitives the host paints.

mod flash;
mod particle;
mod rng;
mod shake;

// Re-export public types
pub use flash::{FlashPhase, ResultFlash};
pub use particle::{Particle, ParticleShape};
pub use rng::Rng;
pub use shake::ScreenShake;

use glam::Vec2;
use std::f32::consts::{PI, TAU};

/// Container for all visual effects spawned by crit/fumble resolution.
pub struct EffectsState {
    pub particles: Vec<Particle>,
    pub flash: Option<ResultFlash>,
    pub shake: ScreenShake,
    pub rng: Rng,
}

impl EffectsState {
    const GOLD: [u8; 4] = [255, 215, 0, 255];
    const WHITE: [u8; 4] = [255, 255, 240, 255];
    const RED: [u8; 4] = [200, 40, 40, 255];
    const DARK_RED: [u8; 4] = [120, 20, 20, 255];

    /// Create a new EffectsState with the given RNG seed.
    pub fn new(seed: u64) -> Self {
        EffectsState {
            particles: Vec::new(),
            flash: None,
            shake: ScreenShake::new(),
            rng: Rng::new(seed.wrapping_add(7919)),
        }
    }

    /// Advance particles, the flash, and the shake by one tick.
    pub fn tick(&mut self, dt: f32) {
        self.particles.retain_mut(|p| p.tick(dt));
        if let Some(flash) = &mut self.flash {
            if !flash.update(dt) {
                self.flash = None;
            }
        }
        self.shake.update(dt, &mut self.rng);
    }

    /// Emit a burst of particles radially from a point, biased upward.
    pub fn burst(
        &mut self,
        center: Vec2,
        count: usize,
        color: [u8; 4],
        spread: f32,
        lifetime: f32,
        gravity: f32,
    ) {
        for _ in 0..count {
            let angle = self.rng.range(0.0, TAU);
            let speed = self.rng.range(spread * 0.3, spread);
            let jitter = Vec2::new(self.rng.range(-5.0, 5.0), self.rng.range(-5.0, 5.0));
            let lift = self.rng.range(50.0, 150.0);
            let mut p = Particle::new(
                center + jitter,
                Vec2::new(angle.cos() * speed, angle.sin() * speed - lift),
                self.rng.range(2.0, 6.0),
                jitter_color(color, &mut self.rng, 20),
                lifetime * self.rng.range(0.6, 1.0),
            );
            p.gravity = gravity;
            self.particles.push(p);
        }
    }

    /// Emit particles upward like a firework fountain.
    pub fn fountain(&mut self, center: Vec2, count: usize, color: [u8; 4]) {
        for _ in 0..count {
            let angle = self.rng.range(-PI * 0.8, -PI * 0.2);
            let speed = self.rng.range(100.0, 400.0);
            let mut p = Particle::new(
                center,
                Vec2::new(angle.cos() * speed, angle.sin() * speed),
                self.rng.range(2.0, 5.0),
                color,
                self.rng.range(0.8, 1.5),
            );
            p.gravity = 300.0;
            p.shape = ParticleShape::Spark;
            self.particles.push(p);
        }
    }

    /// Emit shard particles for a shatter.
    pub fn shatter_burst(&mut self, center: Vec2, count: usize, color: [u8; 4]) {
        for _ in 0..count {
            let angle = self.rng.range(0.0, TAU);
            let speed = self.rng.range(80.0, 250.0);
            let sink = self.rng.range(30.0, 80.0);
            let mut p = Particle::new(
                center,
                Vec2::new(angle.cos() * speed, angle.sin() * speed + sink),
                self.rng.range(4.0, 10.0),
                color,
                self.rng.range(0.5, 1.0),
            );
            p.gravity = 400.0;
            p.drag = 0.95;
            p.shape = ParticleShape::Shard;
            self.particles.push(p);
        }
    }

    /// Slow floaty gold dust.
    pub fn shimmer(&mut self, center: Vec2, count: usize) {
        for _ in 0..count {
            let offset = Vec2::new(self.rng.range(-80.0, 80.0), self.rng.range(-40.0, 40.0));
            let mut p = Particle::new(
                center + offset,
                Vec2::new(self.rng.range(-30.0, 30.0), self.rng.range(-80.0, -20.0)),
                self.rng.range(1.0, 3.0),
                [
                    255,
                    180 + self.rng.next_int(76) as u8,
                    50 + self.rng.next_int(101) as u8,
                    200,
                ],
                self.rng.range(1.5, 2.5),
            );
            p.gravity = 20.0;
            p.drag = 0.995;
            self.particles.push(p);
        }
    }

    /// Full natural-maximum celebration: gold burst, spark fountain,
    /// shimmer dust, and the number flash.
    pub fn crit_celebration(&mut self, center: Vec2, natural_roll: u16) {
        self.burst(center, 40, Self::GOLD, 350.0, 1.5, 200.0);
        self.fountain(center, 20, Self::WHITE);
        self.shimmer(center, 15);
        self.flash = Some(ResultFlash::crit(natural_roll, center));
    }

    /// Natural-minimum despair: red shards, falling dust, screen shake,
    /// and the number flash.
    pub fn fumble_despair(&mut self, center: Vec2, natural_roll: u16) {
        self.shatter_burst(center, 12, Self::RED);
        for _ in 0..10 {
            let offset = Vec2::new(self.rng.range(-60.0, 60.0), self.rng.range(-20.0, 20.0));
            let mut p = Particle::new(
                center + offset,
                Vec2::new(self.rng.range(-20.0, 20.0), self.rng.range(10.0, 60.0)),
                self.rng.range(2.0, 4.0),
                Self::DARK_RED,
                self.rng.range(1.0, 2.0),
            );
            p.gravity = 50.0;
            p.drag = 0.99;
            self.particles.push(p);
        }
        self.shake.trigger(Some(10.0));
        self.flash = Some(ResultFlash::fumble(natural_roll, center));
    }

    /// Whether anything is still animating.
    pub fn is_active(&self) -> bool {
        !self.particles.is_empty() || self.flash.is_some() || self.shake.is_active()
    }

    /// Clear all effects.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.flash = None;
        self.shake = ScreenShake::new();
    }
}

fn jitter_color(base: [u8; 4], rng: &mut Rng, amount: i32) -> [u8; 4] {
    let mut jittered = base;
    for channel in &mut jittered[..3] {
        let delta = rng.next_int(amount as u32 * 2 + 1) as i32 - amount;
        *channel = (*channel as i32 + delta).clamp(0, 255) as u8;
    }
    jittered
}
