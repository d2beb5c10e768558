//! Roll cards: the delayed companion visualization to the dice.
//!
//! A card slides in, holds while the viewer reads it, and fades out. In
//! combined display mode its entry is delayed so the die resolves on screen
//! first; while waiting the card is invisible and its animation clock has
//! not started.

use crate::api::types::Side;

/// Card lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CardPhase {
    /// Entry delay; invisible, clock not started.
    Waiting,
    Enter,
    Hold,
    Exit,
    Done,
}

const ENTER_DURATION: f32 = 0.4;
const EXIT_DURATION: f32 = 0.5;
/// Crits and fumbles hold at most this long before their exit.
const SPECIAL_HOLD_CAP: f32 = 2.5;
/// Horizontal distance a card slides in over.
const SLIDE_DISTANCE: f32 = 400.0;

/// Data and animation state for one dice-roll card.
#[derive(Debug, Clone)]
pub struct RollCard {
    pub character: String,
    pub result: u16,
    pub crit: bool,
    pub fumble: bool,
    /// Accent color for per-character theming.
    pub accent: [u8; 4],

    phase: CardPhase,
    delay: f32,
    waited: f32,
    /// Seconds since the card became visible (starts at zero after the delay).
    clock: f32,
    start_x: f32,
    slide_x: f32,
    opacity: f32,
}

impl RollCard {
    pub fn new(
        character: String,
        result: u16,
        crit: bool,
        fumble: bool,
        accent: [u8; 4],
        slide_from: Side,
        delay: f32,
    ) -> Self {
        let start_x = match slide_from {
            Side::Left => -SLIDE_DISTANCE,
            Side::Right => SLIDE_DISTANCE,
        };
        RollCard {
            character,
            result,
            crit,
            fumble,
            accent,
            phase: if delay > 0.0 {
                CardPhase::Waiting
            } else {
                CardPhase::Enter
            },
            delay,
            waited: 0.0,
            clock: 0.0,
            start_x,
            slide_x: start_x,
            opacity: 0.0,
        }
    }

    /// Advance the card animation. `display_time` is how long a normal
    /// result holds before exiting.
    pub fn update(&mut self, dt: f32, display_time: f32) {
        use crate::extensions::{ease, Easing};

        if self.phase == CardPhase::Waiting {
            self.waited += dt;
            if self.waited < self.delay {
                return;
            }
            self.phase = CardPhase::Enter;
        }
        if self.phase == CardPhase::Done {
            return;
        }

        self.clock += dt;
        let hold = if self.crit || self.fumble {
            display_time.min(SPECIAL_HOLD_CAP)
        } else {
            display_time
        };

        if self.clock < ENTER_DURATION {
            let t = self.clock / ENTER_DURATION;
            self.slide_x = ease(self.start_x, 0.0, t, Easing::CubicOut);
            self.opacity = Easing::CubicOut.apply(t);
            self.phase = CardPhase::Enter;
        } else if self.clock < ENTER_DURATION + hold {
            self.slide_x = 0.0;
            self.opacity = 1.0;
            self.phase = CardPhase::Hold;
        } else {
            let t = (self.clock - ENTER_DURATION - hold) / EXIT_DURATION;
            if t >= 1.0 {
                self.opacity = 0.0;
                self.phase = CardPhase::Done;
            } else {
                // Drift back toward the entry side while fading.
                self.opacity = 1.0 - t;
                self.slide_x = -self.start_x * 0.25 * t;
                self.phase = CardPhase::Exit;
            }
        }
    }

    pub fn phase(&self) -> CardPhase {
        self.phase
    }

    /// Horizontal slide offset from the card's resting position.
    pub fn slide_x(&self) -> f32 {
        self.slide_x
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Whether the card currently contributes to the paint list.
    pub fn visible(&self) -> bool {
        !matches!(self.phase, CardPhase::Waiting | CardPhase::Done)
    }

    pub fn finished(&self) -> bool {
        self.phase == CardPhase::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn card(delay: f32) -> RollCard {
        RollCard::new("Nyx".into(), 17, false, false, [0, 204, 102, 255], Side::Left, delay)
    }

    fn advance(card: &mut RollCard, seconds: f32, display_time: f32) {
        let mut elapsed = 0.0;
        while elapsed < seconds {
            card.update(DT, display_time);
            elapsed += DT;
        }
    }

    #[test]
    fn delayed_card_is_invisible_until_delay_elapses() {
        let mut card = card(1.8);
        assert_eq!(card.phase(), CardPhase::Waiting);
        assert!(!card.visible());

        advance(&mut card, 1.7, 6.0);
        assert_eq!(card.phase(), CardPhase::Waiting);
        assert_eq!(card.opacity(), 0.0);

        advance(&mut card, 0.2, 6.0);
        assert_eq!(card.phase(), CardPhase::Enter);
        assert!(card.visible());
        // The animation clock started from zero at entry, not at creation.
        assert!(card.opacity() < 0.6, "entry should have just begun");
    }

    #[test]
    fn undelayed_card_enters_immediately() {
        let mut card = card(0.0);
        card.update(DT, 6.0);
        assert_eq!(card.phase(), CardPhase::Enter);
        assert!(card.opacity() > 0.0);
    }

    #[test]
    fn slides_in_then_holds() {
        let mut card = card(0.0);
        advance(&mut card, 0.5, 6.0);
        assert_eq!(card.phase(), CardPhase::Hold);
        assert_eq!(card.slide_x(), 0.0);
        assert_eq!(card.opacity(), 1.0);
    }

    #[test]
    fn exits_after_display_time() {
        let mut card = card(0.0);
        advance(&mut card, 0.4 + 1.0 + 0.1, 1.0);
        assert_eq!(card.phase(), CardPhase::Exit);
        assert!(card.opacity() < 1.0);

        advance(&mut card, 0.6, 1.0);
        assert!(card.finished());
    }

    #[test]
    fn crit_card_holds_at_most_the_cap() {
        let mut crit_card = RollCard::new(
            "Nyx".into(),
            20,
            true,
            false,
            [255, 215, 0, 255],
            Side::Left,
            0.0,
        );
        // With a 6s display time a crit card leaves after ~2.5s of hold.
        advance(&mut crit_card, 0.4 + 2.6, 6.0);
        assert!(crit_card.phase() >= CardPhase::Exit);
    }
}
