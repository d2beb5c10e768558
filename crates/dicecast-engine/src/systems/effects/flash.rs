//! Big natural-roll number that pops over a resolving die.
//!
//! Timeline: grow with overshoot (0.2s), settle (0.1s), hold (0.3s),
//! shrink + fade (0.2s).

use glam::Vec2;

use crate::extensions::Easing;

/// Flash lifecycle phase, exposed for the paint layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashPhase {
    Grow,
    Hold,
    Shrink,
    Done,
}

/// A natural-roll flash: the face value scaling up and back down.
#[derive(Debug, Clone)]
pub struct ResultFlash {
    pub natural_roll: u16,
    pub pos: Vec2,
    pub color: [u8; 4],
    pub is_crit: bool,
    pub is_fumble: bool,
    age: f32,
    scale: f32,
    opacity: f32,
    phase: FlashPhase,
}

impl ResultFlash {
    pub const GOLD: [u8; 4] = [255, 215, 0, 255];
    pub const RED: [u8; 4] = [255, 60, 60, 255];

    pub fn crit(natural_roll: u16, pos: Vec2) -> Self {
        Self::new(natural_roll, pos, Self::GOLD, true, false)
    }

    pub fn fumble(natural_roll: u16, pos: Vec2) -> Self {
        Self::new(natural_roll, pos, Self::RED, false, true)
    }

    fn new(natural_roll: u16, pos: Vec2, color: [u8; 4], is_crit: bool, is_fumble: bool) -> Self {
        ResultFlash {
            natural_roll,
            pos,
            color,
            is_crit,
            is_fumble,
            age: 0.0,
            scale: 0.0,
            opacity: 0.0,
            phase: FlashPhase::Grow,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn phase(&self) -> FlashPhase {
        self.phase
    }

    /// Advance the flash. Returns false once it has finished.
    pub fn update(&mut self, dt: f32) -> bool {
        self.age += dt;
        let age = self.age;

        if age < 0.2 {
            let t = age / 0.2;
            self.scale = 1.2 * Easing::BackOut.apply(t);
            self.opacity = (t * 2.0).min(1.0);
            self.phase = FlashPhase::Grow;
        } else if age < 0.3 {
            let t = (age - 0.2) / 0.1;
            self.scale = 1.2 - 0.2 * t;
            self.opacity = 1.0;
            self.phase = FlashPhase::Grow;
        } else if age < 0.6 {
            self.scale = 1.0;
            self.opacity = 1.0;
            self.phase = FlashPhase::Hold;
        } else if age < 0.8 {
            let t = (age - 0.6) / 0.2;
            self.scale = 1.0 - t;
            self.opacity = 1.0 - t;
            self.phase = FlashPhase::Shrink;
        } else {
            self.phase = FlashPhase::Done;
        }

        self.phase != FlashPhase::Done
    }
}
