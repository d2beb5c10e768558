//! Screen shake offsets for the overlay window.

use glam::Vec2;

use super::rng::Rng;

/// Decaying random window offset. Call `update()` each tick and apply
/// `offset()` to the window position.
#[derive(Debug, Clone)]
pub struct ScreenShake {
    pub intensity: f32,
    pub duration: f32,
    offset: Vec2,
    elapsed: f32,
    active: bool,
}

impl ScreenShake {
    pub fn new() -> Self {
        ScreenShake {
            intensity: 8.0,
            duration: 0.4,
            offset: Vec2::ZERO,
            elapsed: 0.0,
            active: false,
        }
    }

    /// Start (or restart) shaking, optionally overriding the intensity.
    pub fn trigger(&mut self, intensity: Option<f32>) {
        self.elapsed = 0.0;
        self.active = true;
        if let Some(intensity) = intensity {
            self.intensity = intensity;
        }
    }

    pub fn update(&mut self, dt: f32, rng: &mut Rng) {
        if !self.active {
            self.offset = Vec2::ZERO;
            return;
        }

        self.elapsed += dt;
        if self.elapsed > self.duration {
            self.active = false;
            self.offset = Vec2::ZERO;
            return;
        }

        let remaining = 1.0 - self.elapsed / self.duration;
        let magnitude = self.intensity * remaining;
        self.offset = Vec2::new(
            rng.range(-magnitude, magnitude),
            rng.range(-magnitude, magnitude),
        );
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Default for ScreenShake {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_shake_has_no_offset() {
        let mut shake = ScreenShake::new();
        let mut rng = Rng::new(1);
        shake.update(0.1, &mut rng);
        assert_eq!(shake.offset(), Vec2::ZERO);
        assert!(!shake.is_active());
    }

    #[test]
    fn trigger_produces_offsets_then_expires() {
        let mut shake = ScreenShake::new();
        let mut rng = Rng::new(1);
        shake.trigger(Some(10.0));
        assert!(shake.is_active());

        shake.update(0.1, &mut rng);
        let moved = shake.offset() != Vec2::ZERO;
        assert!(moved, "active shake should offset the window");

        shake.update(1.0, &mut rng);
        assert!(!shake.is_active());
        assert_eq!(shake.offset(), Vec2::ZERO);
    }

    #[test]
    fn magnitude_decays_over_time() {
        let mut shake = ScreenShake::new();
        let mut rng = Rng::new(1);
        shake.trigger(Some(100.0));

        shake.update(0.05, &mut rng);
        let early = shake.offset();
        shake.update(0.3, &mut rng);
        let late = shake.offset();
        // Bounds, not exact values: offsets are random within a per-axis
        // envelope that shrinks as the shake plays out.
        assert!(early.x.abs() <= 100.0 && early.y.abs() <= 100.0);
        assert!(late.x.abs() <= 20.0 && late.y.abs() <= 20.0);
    }
}
