use glam::Vec2;

use crate::api::types::{DisplayMode, Side};

/// Configuration for the overlay engine, provided by the host.
///
/// Every physics and timing constant lives here so the host can tune the
/// feel of the animation without touching engine code.
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    // -- Dice physics --
    /// Downward acceleration in px/s².
    pub gravity: f32,
    /// Vertical velocity retained on each ground contact.
    pub restitution: f32,
    /// Horizontal velocity retained per bounce.
    pub bounce_friction: f32,
    /// Angular velocity retained per bounce.
    pub spin_decay: f32,
    /// Hard cap on ground contacts before a die is forced to settle.
    pub max_bounces: u32,
    /// Rebound speed below which a die settles instead of bouncing again (px/s).
    pub min_bounce_speed: f32,

    // -- Timing --
    /// Seconds a resolved die (and card) stays visible before exiting.
    pub display_time: f32,
    /// Crits and fumbles hold at most this long before their special exit.
    pub crit_hold_cap: f32,
    /// Duration of the settle-into-place animation.
    pub settle_duration: f32,
    /// Duration of the exit fade (also paces explode/shatter exits).
    pub exit_fade: f32,
    /// Card entry delay when dice are shown alongside cards.
    pub card_delay: f32,

    // -- Dice presentation --
    /// Rendered die size in px (placeholder frames are generated square).
    pub die_size: f32,
    /// Tumble animation rate at spawn; decays with each bounce.
    pub tumble_fps: f32,
    /// Hold-phase opacity for the dropped die in adv/disadv pairs.
    pub secondary_opacity: f32,
    /// Hold-phase scale for the dropped die in adv/disadv pairs.
    pub secondary_scale: f32,

    // -- Capacity --
    /// Maximum concurrent dice sprites; oldest are evicted beyond this.
    pub max_dice: usize,
    /// Maximum concurrent cards; oldest are evicted beyond this.
    pub max_cards: usize,

    // -- Layout --
    pub display_mode: DisplayMode,
    /// Size of the dice region in px.
    pub dice_region: Vec2,
    /// Ground plane y-coordinate inside the dice region.
    pub ground_y: f32,
    /// Horizontal margin before the first landing slot.
    pub slot_margin: f32,
    /// Card dimensions in px.
    pub card_size: Vec2,
    /// Vertical gap between stacked cards.
    pub card_spacing: f32,
    /// Extra vertical gap between the dice region and the card stack.
    pub card_offset_y: f32,
    /// Which side cards slide in from.
    pub card_side: Side,
    /// Headroom around the card stack for particles that fly past it.
    pub effects_headroom: f32,

    // -- Assets --
    /// Pack used when a roll event has no pack preference.
    pub default_pack: String,
    /// Color variant used when a roll event has no color preference.
    pub default_color: String,

    /// Seed for spawn/effect randomness. Fixed seed gives reproducible runs.
    pub rng_seed: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            gravity: 1200.0,
            restitution: 0.45,
            bounce_friction: 0.7,
            spin_decay: 0.92,
            max_bounces: 3,
            min_bounce_speed: 60.0,

            display_time: 6.0,
            crit_hold_cap: 2.5,
            settle_duration: 0.25,
            exit_fade: 0.5,
            card_delay: 1.8,

            die_size: 128.0,
            tumble_fps: 18.0,
            secondary_opacity: 0.5,
            secondary_scale: 0.85,

            max_dice: 6,
            max_cards: 4,

            display_mode: DisplayMode::default(),
            dice_region: Vec2::new(860.0, 420.0),
            ground_y: 320.0,
            slot_margin: 60.0,
            card_size: Vec2::new(380.0, 100.0),
            card_spacing: 8.0,
            card_offset_y: 16.0,
            card_side: Side::default(),
            effects_headroom: 200.0,

            default_pack: "classic".into(),
            default_color: "red".into(),

            rng_seed: 42,
        }
    }
}

impl OverlayConfig {
    /// Height of the card stack region (cards plus particle headroom).
    pub fn card_stack_height(&self) -> f32 {
        self.max_cards as f32 * (self.card_size.y + self.card_spacing) + self.effects_headroom
    }

    /// Window size implied by the current display mode.
    pub fn window_size(&self) -> Vec2 {
        let card_width = self.card_size.x + 120.0;
        match self.display_mode {
            DisplayMode::DiceOnly => self.dice_region,
            DisplayMode::CardOnly => Vec2::new(card_width, self.card_stack_height()),
            DisplayMode::DiceAndCard => Vec2::new(
                self.dice_region.x.max(card_width),
                self.dice_region.y + self.card_offset_y + self.card_stack_height(),
            ),
        }
    }

    /// Top of the card stack for the current display mode.
    pub fn card_stack_top(&self) -> f32 {
        match self.display_mode {
            DisplayMode::DiceAndCard => self.dice_region.y + self.card_offset_y,
            _ => 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_constants() {
        let config = OverlayConfig::default();
        assert_eq!(config.gravity, 1200.0);
        assert_eq!(config.restitution, 0.45);
        assert_eq!(config.max_bounces, 3);
        assert_eq!(config.max_dice, 6);
        assert_eq!(config.card_delay, 1.8);
    }

    #[test]
    fn combined_window_stacks_cards_below_dice() {
        let config = OverlayConfig {
            display_mode: DisplayMode::DiceAndCard,
            ..Default::default()
        };
        let size = config.window_size();
        assert!(size.y > config.dice_region.y);
        assert!(config.card_stack_top() >= config.dice_region.y);
    }

    #[test]
    fn dice_only_window_is_dice_region() {
        let config = OverlayConfig {
            display_mode: DisplayMode::DiceOnly,
            ..Default::default()
        };
        assert_eq!(config.window_size(), config.dice_region);
    }
}
