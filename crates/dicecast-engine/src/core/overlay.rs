//! The overlay orchestrator.
//!
//! Owns the active dice and cards, advances them once per external tick,
//! lays them out by display mode, and bridges sprite-internal phase
//! completion to the cross-cutting effects a sprite must not know about.
//!
//! Crit/fumble interception happens on the Hold→Exit edge: the phase is
//! recorded before each sprite's `update`, and when a sprite that was
//! holding comes back in Exit, that tick — and only that tick — evaluates
//! the outcome and fires the explode/shatter presentation plus particles
//! and screen shake. The edge guard makes the trigger fire exactly once
//! per sprite.

use std::collections::HashMap;

use glam::Vec2;

use crate::api::config::OverlayConfig;
use crate::api::types::{DieKind, DisplayMode, RollEvent, RollEventError, Side};
use crate::assets::cache::FrameCache;
use crate::components::card::RollCard;
use crate::components::die::{DieParams, DiePhase, DieSprite};
use crate::renderer::paint::{CardPaint, PaintBuffer, SpritePaint};
use crate::systems::effects::{EffectsState, ResultFlash, Rng};

/// Default card accent when no per-character color is registered.
const DEFAULT_ACCENT: [u8; 4] = [0, 204, 102, 255];

/// The dice overlay engine. A host owns one of these, feeds it roll
/// events, calls `tick(dt)` from its frame clock, and paints the result.
pub struct Overlay {
    config: OverlayConfig,
    cache: FrameCache,
    dice: Vec<DieSprite>,
    cards: Vec<RollCard>,
    effects: EffectsState,
    rng: Rng,
    paint: PaintBuffer,
    character_colors: HashMap<String, [u8; 4]>,
    slot_cursor: usize,
}

impl Overlay {
    pub fn new(config: OverlayConfig, cache: FrameCache) -> Self {
        let seed = config.rng_seed;
        Overlay {
            config,
            cache,
            dice: Vec::new(),
            cards: Vec::new(),
            effects: EffectsState::new(seed),
            rng: Rng::new(seed),
            paint: PaintBuffer::new(),
            character_colors: HashMap::new(),
            slot_cursor: 0,
        }
    }

    /// Register a per-character card accent color.
    pub fn set_character_color(&mut self, name: impl Into<String>, color: [u8; 4]) {
        self.character_colors.insert(name.into(), color);
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.config.display_mode
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.config.display_mode = mode;
    }

    /// Change how long resolved dice stay visible. Takes effect from the
    /// next tick, including for dice already holding.
    pub fn set_display_time(&mut self, seconds: f32) {
        self.config.display_time = seconds.max(1.0);
    }

    /// Window size implied by the current display mode.
    pub fn window_size(&self) -> Vec2 {
        self.config.window_size()
    }

    /// Accept a roll event, constructing sprites and/or a card per the
    /// display mode. Invalid events are rejected here — nothing downstream
    /// ever sees them.
    pub fn add_roll(&mut self, event: &RollEvent) -> Result<(), RollEventError> {
        let die = event.validate()?;
        let pack = event
            .pack_preference
            .clone()
            .unwrap_or_else(|| self.config.default_pack.clone());
        let color = event
            .color_preference
            .clone()
            .unwrap_or_else(|| self.config.default_color.clone());

        if self.config.display_mode.shows_dice() {
            self.spawn_die(die, event.result_face, &pack, &color, false);
            if event.is_paired() {
                self.spawn_die(die, event.secondary_roll, &pack, &color, true);
            }
            while self.dice.len() > self.config.max_dice {
                self.dice.remove(0);
                log::debug!("dice capacity reached, evicted oldest sprite");
            }
        }

        if self.config.display_mode.shows_cards() {
            let delay = match self.config.display_mode {
                DisplayMode::DiceAndCard => self.config.card_delay,
                _ => 0.0,
            };
            let accent = self
                .lookup_accent(&event.character_name)
                .unwrap_or(DEFAULT_ACCENT);
            let crit = die.is_check_die() && event.result_face == die.faces();
            let fumble = die.is_check_die() && event.result_face == 1;
            self.cards.push(RollCard::new(
                event.character_name.clone(),
                event.result_face,
                crit,
                fumble,
                accent,
                self.config.card_side,
                delay,
            ));
            while self.cards.len() > self.config.max_cards {
                self.cards.remove(0);
                log::debug!("card capacity reached, evicted oldest card");
            }
        }

        Ok(())
    }

    fn spawn_die(&mut self, die: DieKind, face: u16, pack: &str, color: &str, secondary: bool) {
        let landing = self.cache.landing_frame(pack, die, face, color);
        let tumble = self.cache.tumble_frames(pack, die, color);
        let rest = self.slot_position(self.slot_cursor);
        self.slot_cursor = (self.slot_cursor + 1) % self.config.max_dice.max(1);

        self.dice.push(DieSprite::new(
            die,
            face,
            color.to_string(),
            secondary,
            rest,
            landing,
            tumble,
            DieParams::from(&self.config),
            &mut self.rng,
        ));
    }

    fn slot_position(&self, slot: usize) -> Vec2 {
        let usable = self.config.dice_region.x - 2.0 * self.config.slot_margin;
        let width = usable / self.config.max_dice.max(1) as f32;
        Vec2::new(
            self.config.slot_margin + (slot as f32 + 0.5) * width,
            self.config.ground_y,
        )
    }

    fn lookup_accent(&self, character: &str) -> Option<[u8; 4]> {
        // Loose matching as players often roll under nicknames.
        let lower = character.to_lowercase();
        self.character_colors.iter().find_map(|(key, color)| {
            let key = key.to_lowercase();
            (key.contains(&lower) || lower.contains(&key)).then_some(*color)
        })
    }

    /// Advance the whole overlay by one tick. Updates are per-sprite and
    /// independent; cross-cutting effects for a sprite are applied only
    /// after its own `update` returns and never mutate other sprites.
    pub fn tick(&mut self, dt: f32) {
        for i in 0..self.dice.len() {
            let hold = self.hold_duration_for(i);
            let was_holding = self.dice[i].phase() == DiePhase::Hold;
            self.dice[i].update(dt, hold);
            if was_holding && self.dice[i].phase() == DiePhase::Exit {
                // The single authoritative "die just resolved" point.
                self.resolve_outcome(i);
            }
        }

        let display_time = self.config.display_time;
        for card in &mut self.cards {
            card.update(dt, display_time);
        }

        self.effects.tick(dt);

        self.dice.retain(|die| !die.finished());
        self.cards.retain(|card| !card.finished());
    }

    fn hold_duration_for(&self, i: usize) -> f32 {
        let die = &self.dice[i];
        let special = !die.is_secondary()
            && die.die().is_check_die()
            && (die.result_face() == die.die().faces() || die.result_face() == 1);
        if special {
            self.config.display_time.min(self.config.crit_hold_cap)
        } else {
            self.config.display_time
        }
    }

    /// Evaluate the outcome of a die that just finished holding. Only the
    /// kept (primary) die of a check roll can crit or fumble; the dropped
    /// secondary is never evaluated.
    fn resolve_outcome(&mut self, i: usize) {
        let (pos, face, die) = {
            let sprite = &self.dice[i];
            if sprite.is_secondary() || !sprite.die().is_check_die() {
                return;
            }
            (sprite.pos(), sprite.result_face(), sprite.die())
        };

        if face == die.faces() {
            log::debug!("natural {face} on {die}: explode");
            self.dice[i].trigger_explode();
            self.effects.crit_celebration(pos, face);
        } else if face == 1 {
            log::debug!("natural 1 on {die}: shatter");
            self.dice[i].trigger_shatter();
            self.effects.fumble_despair(pos, face);
        }
    }

    /// Rebuild the paint buffer for this tick. Draw order is fixed:
    /// `dice`, then `cards`, then the effect primitives on top.
    pub fn paint(&mut self) -> &PaintBuffer {
        self.paint.clear();

        for die in &self.dice {
            self.paint.dice.push(SpritePaint {
                frame: die.current_frame(),
                pos: die.pos(),
                rotation: die.rotation(),
                scale: die.scale(),
                opacity: die.opacity(),
                shadow: die.shadow_visible(),
                crack_progress: die.crack_progress(),
            });
        }

        let stack_top = self.config.card_stack_top();
        let card_size = self.config.card_size;
        let base_x = match self.config.card_side {
            Side::Left => 10.0,
            Side::Right => self.config.window_size().x - card_size.x - 10.0,
        };
        for (idx, card) in self.cards.iter().filter(|c| c.visible()).enumerate() {
            let y = stack_top + idx as f32 * (card_size.y + self.config.card_spacing);
            self.paint.cards.push(CardPaint {
                pos: Vec2::new(base_x + card.slide_x(), y),
                size: card_size,
                opacity: card.opacity(),
                accent: card.accent,
                character: card.character.clone(),
                result: card.result,
                crit: card.crit,
                fumble: card.fumble,
            });
        }

        &self.paint
    }

    // -- Read access for the host --

    pub fn dice(&self) -> &[DieSprite] {
        &self.dice
    }

    pub fn cards(&self) -> &[RollCard] {
        &self.cards
    }

    pub fn effects(&self) -> &EffectsState {
        &self.effects
    }

    pub fn flash(&self) -> Option<&ResultFlash> {
        self.effects.flash.as_ref()
    }

    /// Window offset from the active screen shake, if any.
    pub fn shake_offset(&self) -> Vec2 {
        self.effects.shake.offset()
    }

    /// The frame cache, e.g. for `rescan()` after installing packs.
    pub fn cache_mut(&mut self) -> &mut FrameCache {
        &mut self.cache
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }
}
