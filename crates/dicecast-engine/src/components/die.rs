//! The dice sprite: physics and phase state machine for one thrown die.
//!
//! A sprite simulates its own trajectory — fly in from a screen edge,
//! bounce with decaying energy, settle onto the rolled face, hold, exit —
//! and exposes read-only state for the paint layer. It knows nothing about
//! other sprites, effects, or the overlay that owns it; crit/fumble
//! consequences are injected from outside via `trigger_explode()` /
//! `trigger_shatter()`.

use std::f32::consts::{PI, TAU};
use std::sync::Arc;

use glam::Vec2;

use crate::api::config::OverlayConfig;
use crate::api::types::DieKind;
use crate::assets::cache::SpriteFrame;
use crate::extensions::{ease, ease_vec2, Easing};
use crate::systems::effects::Rng;

/// Animation phase. Transitions are strictly forward; Bounce self-loops
/// through repeated ground contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiePhase {
    Enter,
    Bounce,
    Settle,
    Hold,
    Exit,
}

/// Exit presentation. Chosen by the orchestrator when the die resolves;
/// the default fade applies when nothing special happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitStyle {
    #[default]
    Fade,
    /// Rapid scale-up while fading (natural maximum).
    Explode,
    /// Crack overlay, then tumble off the bottom of the screen (natural 1).
    Shatter,
}

/// Physics and timing constants for one sprite, copied from the config at
/// spawn so the sprite never references the orchestrator.
#[derive(Debug, Clone, Copy)]
pub struct DieParams {
    pub gravity: f32,
    pub restitution: f32,
    pub bounce_friction: f32,
    pub spin_decay: f32,
    pub max_bounces: u32,
    pub min_bounce_speed: f32,
    pub ground_y: f32,
    pub region_width: f32,
    pub settle_duration: f32,
    pub exit_fade: f32,
    pub die_size: f32,
    pub tumble_fps: f32,
    pub secondary_opacity: f32,
    pub secondary_scale: f32,
}

impl From<&OverlayConfig> for DieParams {
    fn from(config: &OverlayConfig) -> Self {
        DieParams {
            gravity: config.gravity,
            restitution: config.restitution,
            bounce_friction: config.bounce_friction,
            spin_decay: config.spin_decay,
            max_bounces: config.max_bounces,
            min_bounce_speed: config.min_bounce_speed,
            ground_y: config.ground_y,
            region_width: config.dice_region.x,
            settle_duration: config.settle_duration,
            exit_fade: config.exit_fade,
            die_size: config.die_size,
            tumble_fps: config.tumble_fps,
            secondary_opacity: config.secondary_opacity,
            secondary_scale: config.secondary_scale,
        }
    }
}

// Shatter exit timings (crack spread, then fall while fading).
const CRACK_DURATION: f32 = 0.4;
const SHATTER_FADE: f32 = 1.0;
const SHATTER_SPIN: f32 = 15.0 * PI / 180.0;
const FALL_OFF_MARGIN: f32 = 400.0;
// Explode exit: brief flash-bright before the fade starts.
const EXPLODE_FLASH: f32 = 0.08;

/// Per-roll animated die.
pub struct DieSprite {
    // identity
    die: DieKind,
    result_face: u16,
    color: String,
    secondary: bool,

    // kinematics
    pos: Vec2,
    vel: Vec2,
    rotation: f32,
    angular_vel: f32,
    scale: f32,

    // phase state
    phase: DiePhase,
    bounce_count: u32,
    target_bounces: u32,
    age: f32,
    elapsed_in_phase: f32,

    // frames
    landing: Arc<SpriteFrame>,
    tumble: Arc<Vec<Arc<SpriteFrame>>>,
    frame_timer: f32,
    frame_index: usize,

    // settle interpolation endpoints, captured on entering Settle
    rest_pos: Vec2,
    settle_from_pos: Vec2,
    settle_from_rot: f32,

    // exit state
    exit_style: ExitStyle,
    opacity: f32,
    crack_progress: f32,
    fall_velocity: f32,
    done: bool,

    params: DieParams,
}

impl DieSprite {
    /// Spawn a die at a random screen edge, aimed at `rest_pos` on the
    /// ground plane.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        die: DieKind,
        result_face: u16,
        color: String,
        secondary: bool,
        rest_pos: Vec2,
        landing: Arc<SpriteFrame>,
        tumble: Arc<Vec<Arc<SpriteFrame>>>,
        params: DieParams,
        rng: &mut Rng,
    ) -> Self {
        let flight_time = rng.range(0.65, 0.9);
        let start = match rng.next_int(3) {
            0 => Vec2::new(
                -params.die_size,
                rng.range(params.ground_y * 0.15, params.ground_y * 0.55),
            ),
            1 => Vec2::new(
                params.region_width + params.die_size,
                rng.range(params.ground_y * 0.15, params.ground_y * 0.55),
            ),
            _ => Vec2::new(
                rest_pos.x + rng.range(-160.0, 160.0),
                -params.die_size,
            ),
        };

        // Aim so the die reaches the ground plane over rest_pos after
        // flight_time, moving downward on arrival.
        let vel = Vec2::new(
            (rest_pos.x - start.x) / flight_time,
            (params.ground_y - start.y - 0.5 * params.gravity * flight_time * flight_time)
                / flight_time,
        );

        let target_bounces = (2 + rng.next_int(2)).min(params.max_bounces);

        DieSprite {
            die,
            result_face,
            color,
            secondary,
            pos: start,
            vel,
            rotation: rng.range(0.0, TAU),
            angular_vel: rng.sign() * rng.range(6.0, 12.0),
            scale: 1.0,
            phase: DiePhase::Enter,
            bounce_count: 0,
            target_bounces,
            age: 0.0,
            elapsed_in_phase: 0.0,
            landing,
            tumble,
            frame_timer: 0.0,
            frame_index: 0,
            rest_pos,
            settle_from_pos: Vec2::ZERO,
            settle_from_rot: 0.0,
            exit_style: ExitStyle::default(),
            opacity: 1.0,
            crack_progress: 0.0,
            fall_velocity: 0.0,
            done: false,
            params,
        }
    }

    /// Advance the simulation by one variable-length tick.
    /// `hold_duration` is how long the resolved pose stays before exiting.
    pub fn update(&mut self, dt: f32, hold_duration: f32) {
        if dt <= 0.0 || self.done {
            return;
        }
        self.age += dt;
        self.elapsed_in_phase += dt;

        match self.phase {
            DiePhase::Enter | DiePhase::Bounce => self.update_flight(dt),
            DiePhase::Settle => self.update_settle(),
            DiePhase::Hold => {
                if self.elapsed_in_phase >= hold_duration {
                    self.advance_to(DiePhase::Exit);
                }
            }
            DiePhase::Exit => self.update_exit(dt),
        }
    }

    fn update_flight(&mut self, dt: f32) {
        // Semi-implicit Euler: velocity first, then position from the new
        // velocity.
        self.vel.y += self.params.gravity * dt;
        self.pos += self.vel * dt;
        self.rotation += self.angular_vel * dt;
        self.advance_tumble(dt);

        if self.pos.y >= self.params.ground_y && self.vel.y > 0.0 {
            if self.phase == DiePhase::Enter {
                self.advance_to(DiePhase::Bounce);
            }
            self.ground_contact();
        }
    }

    fn ground_contact(&mut self) {
        self.pos.y = self.params.ground_y;
        self.bounce_count = (self.bounce_count + 1).min(self.params.max_bounces);

        let rebound = self.vel.y * self.params.restitution;
        if self.bounce_count >= self.target_bounces || rebound < self.params.min_bounce_speed {
            self.begin_settle();
            return;
        }

        self.vel.y = -rebound;
        self.vel.x *= self.params.bounce_friction;
        self.angular_vel *= self.params.spin_decay;
    }

    fn begin_settle(&mut self) {
        self.vel = Vec2::ZERO;
        self.angular_vel = 0.0;
        self.settle_from_pos = self.pos;
        // Shortest rotation path to the upright rest pose.
        let wrapped = self.rotation.rem_euclid(TAU);
        self.settle_from_rot = if wrapped > PI { wrapped - TAU } else { wrapped };
        self.rotation = self.settle_from_rot;
        self.advance_to(DiePhase::Settle);
    }

    fn update_settle(&mut self) {
        let t = (self.elapsed_in_phase / self.params.settle_duration).min(1.0);
        self.pos = ease_vec2(self.settle_from_pos, self.rest_pos, t, Easing::SineInOut);
        self.rotation = ease(self.settle_from_rot, 0.0, t, Easing::SineOut);
        self.scale = 1.0 + 0.08 * (PI * t).sin();

        if t >= 1.0 {
            self.pos = self.rest_pos;
            self.rotation = 0.0;
            self.scale = 1.0;
            self.advance_to(DiePhase::Hold);
        }
    }

    fn update_exit(&mut self, dt: f32) {
        let t = self.elapsed_in_phase;
        match self.exit_style {
            ExitStyle::Fade => {
                self.opacity = 1.0 - t / self.params.exit_fade;
                if self.opacity <= 0.0 {
                    self.finish();
                }
            }
            ExitStyle::Explode => {
                self.scale = 1.0 + 2.2 * (t / self.params.exit_fade);
                self.opacity = if t < EXPLODE_FLASH {
                    1.0
                } else {
                    1.0 - (t - EXPLODE_FLASH) / (self.params.exit_fade - EXPLODE_FLASH)
                };
                if self.opacity <= 0.0 {
                    self.finish();
                }
            }
            ExitStyle::Shatter => {
                if t < CRACK_DURATION {
                    self.crack_progress = t / CRACK_DURATION;
                } else {
                    self.crack_progress = 1.0;
                    self.fall_velocity += self.params.gravity * dt;
                    self.pos.y += self.fall_velocity * dt;
                    self.rotation += SHATTER_SPIN * dt;
                    self.opacity = 1.0 - (t - CRACK_DURATION) / SHATTER_FADE;
                    if self.opacity <= 0.0 || self.pos.y > self.params.ground_y + FALL_OFF_MARGIN
                    {
                        self.finish();
                    }
                }
            }
        }
    }

    fn finish(&mut self) {
        self.opacity = 0.0;
        self.done = true;
    }

    fn advance_to(&mut self, phase: DiePhase) {
        debug_assert!(phase > self.phase, "phase must move forward");
        self.phase = phase;
        self.elapsed_in_phase = 0.0;
    }

    fn advance_tumble(&mut self, dt: f32) {
        if self.tumble.is_empty() {
            return;
        }
        // Tumbling slows as bounces bleed energy; the index is monotonic
        // and never resets mid-flight.
        let fps = self.params.tumble_fps * self.params.bounce_friction.powi(self.bounce_count as i32);
        let step = 1.0 / fps.max(1.0);
        self.frame_timer += dt;
        while self.frame_timer >= step {
            self.frame_timer -= step;
            self.frame_index += 1;
        }
    }

    /// Switch the exit to the explode presentation. Side-effect only — the
    /// phase machine is untouched. First trigger wins.
    pub fn trigger_explode(&mut self) {
        if self.exit_style == ExitStyle::Fade {
            self.exit_style = ExitStyle::Explode;
        }
    }

    /// Switch the exit to the shatter presentation. Same contract as
    /// `trigger_explode`.
    pub fn trigger_shatter(&mut self) {
        if self.exit_style == ExitStyle::Fade {
            self.exit_style = ExitStyle::Shatter;
        }
    }

    // -- Read-only accessors for the paint layer --

    pub fn die(&self) -> DieKind {
        self.die
    }

    pub fn result_face(&self) -> u16 {
        self.result_face
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn is_secondary(&self) -> bool {
        self.secondary
    }

    pub fn phase(&self) -> DiePhase {
        self.phase
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Current uniform scale, including the secondary shrink during Hold.
    pub fn scale(&self) -> f32 {
        if self.secondary && self.phase == DiePhase::Hold {
            self.scale * self.params.secondary_scale
        } else {
            self.scale
        }
    }

    /// Current opacity, including the secondary dim during Hold.
    pub fn opacity(&self) -> f32 {
        if self.secondary && self.phase == DiePhase::Hold {
            self.opacity * self.params.secondary_opacity
        } else {
            self.opacity
        }
    }

    pub fn bounce_count(&self) -> u32 {
        self.bounce_count
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn exit_style(&self) -> ExitStyle {
        self.exit_style
    }

    pub fn crack_progress(&self) -> f32 {
        self.crack_progress
    }

    /// Ground shadow is drawn only under a resting die.
    pub fn shadow_visible(&self) -> bool {
        self.phase == DiePhase::Hold
    }

    /// Index into the tumble set while airborne (already wrapped).
    pub fn frame_index(&self) -> usize {
        if self.tumble.is_empty() {
            0
        } else {
            self.frame_index % self.tumble.len()
        }
    }

    /// The frame to paint this tick: a tumble frame while airborne, the
    /// landing frame from Settle onward.
    pub fn current_frame(&self) -> Arc<SpriteFrame> {
        match self.phase {
            DiePhase::Enter | DiePhase::Bounce if !self.tumble.is_empty() => {
                Arc::clone(&self.tumble[self.frame_index()])
            }
            _ => Arc::clone(&self.landing),
        }
    }

    /// Whether the exit animation has fully played out.
    pub fn finished(&self) -> bool {
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::cache::FrameCache;

    const DT: f32 = 1.0 / 60.0;

    fn sprite(face: u16, secondary: bool, seed: u64) -> DieSprite {
        let mut cache = FrameCache::new("/nonexistent", 1);
        let landing = cache.landing_frame("classic", DieKind::D20, face, "red");
        let tumble = cache.tumble_frames("classic", DieKind::D20, "red");
        let config = OverlayConfig::default();
        let mut rng = Rng::new(seed);
        DieSprite::new(
            DieKind::D20,
            face,
            "red".into(),
            secondary,
            Vec2::new(300.0, config.ground_y),
            landing,
            tumble,
            DieParams::from(&config),
            &mut rng,
        )
    }

    fn run_until<F: Fn(&DieSprite) -> bool>(die: &mut DieSprite, hold: f32, stop: F) -> bool {
        for _ in 0..3000 {
            die.update(DT, hold);
            if stop(die) {
                return true;
            }
        }
        false
    }

    #[test]
    fn phase_sequence_is_forward_only() {
        for seed in 1..=20 {
            let mut die = sprite(12, false, seed);
            let mut last = die.phase();
            let reached_exit = run_until(&mut die, 0.3, |d| {
                d.phase() == DiePhase::Exit && d.finished()
            });
            assert!(reached_exit, "seed {seed}: die never finished");

            let mut die = sprite(12, false, seed);
            for _ in 0..3000 {
                die.update(DT, 0.3);
                let phase = die.phase();
                assert!(phase >= last, "seed {seed}: {last:?} -> {phase:?}");
                last = phase;
                if die.finished() {
                    break;
                }
            }
        }
    }

    #[test]
    fn bounces_between_two_and_max() {
        for seed in 1..=20 {
            let mut die = sprite(12, false, seed);
            assert!(run_until(&mut die, 0.3, |d| d.phase() >= DiePhase::Settle));
            let bounces = die.bounce_count();
            assert!(
                (2..=3).contains(&bounces),
                "seed {seed}: {bounces} bounces"
            );
        }
    }

    #[test]
    fn settles_onto_rest_pose() {
        let mut die = sprite(12, false, 7);
        assert!(run_until(&mut die, 10.0, |d| d.phase() == DiePhase::Hold));
        assert!((die.pos() - Vec2::new(300.0, 320.0)).length() < 0.5);
        assert_eq!(die.rotation(), 0.0);
        assert!(die.shadow_visible());
    }

    #[test]
    fn hold_respects_duration_then_exits() {
        let mut die = sprite(12, false, 7);
        assert!(run_until(&mut die, 0.5, |d| d.phase() == DiePhase::Hold));
        let hold_start = die.age();
        assert!(run_until(&mut die, 0.5, |d| d.phase() == DiePhase::Exit));
        let held = die.age() - hold_start;
        assert!((held - 0.5).abs() < 0.05, "held for {held}s");
    }

    #[test]
    fn default_exit_fades_out() {
        let mut die = sprite(12, false, 7);
        assert!(run_until(&mut die, 0.2, |d| d.finished()));
        assert_eq!(die.exit_style(), ExitStyle::Fade);
        assert_eq!(die.opacity(), 0.0);
    }

    #[test]
    fn trigger_explode_changes_style_not_phase() {
        let mut die = sprite(20, false, 7);
        assert!(run_until(&mut die, 5.0, |d| d.phase() == DiePhase::Hold));
        die.trigger_explode();
        assert_eq!(die.phase(), DiePhase::Hold, "trigger must not touch phase");
        assert_eq!(die.exit_style(), ExitStyle::Explode);

        assert!(run_until(&mut die, 0.1, |d| d.finished()));
        assert!(die.scale() > 2.0, "explode should have scaled up");
    }

    #[test]
    fn first_trigger_wins() {
        let mut die = sprite(20, false, 7);
        die.trigger_explode();
        die.trigger_shatter();
        assert_eq!(die.exit_style(), ExitStyle::Explode);
    }

    #[test]
    fn shatter_cracks_then_falls_off() {
        let mut die = sprite(1, false, 7);
        assert!(run_until(&mut die, 0.2, |d| d.phase() == DiePhase::Hold));
        die.trigger_shatter();

        assert!(run_until(&mut die, 0.2, |d| d.crack_progress() > 0.0));
        let ground = die.pos().y;
        assert!(run_until(&mut die, 0.2, |d| d.finished()));
        assert!(die.crack_progress() >= 1.0);
        assert!(die.pos().y > ground, "shattered die should fall");
    }

    #[test]
    fn secondary_dims_and_shrinks_only_during_hold() {
        let mut die = sprite(8, true, 7);
        assert!(run_until(&mut die, 5.0, |d| d.phase() == DiePhase::Settle));
        assert_eq!(die.opacity(), 1.0);

        assert!(run_until(&mut die, 5.0, |d| d.phase() == DiePhase::Hold));
        assert!((die.opacity() - 0.5).abs() < 1e-6);
        assert!((die.scale() - 0.85).abs() < 1e-6);
    }

    #[test]
    fn tumble_index_is_monotonic_in_flight() {
        let mut die = sprite(12, false, 3);
        let mut last_raw = 0;
        while die.phase() < DiePhase::Settle {
            die.update(DT, 1.0);
            assert!(die.frame_index >= last_raw, "tumble index went backward");
            last_raw = die.frame_index;
        }
        assert!(last_raw > 0, "tumble should have advanced");
    }

    #[test]
    fn airborne_frames_come_from_tumble_set() {
        let mut die = sprite(12, false, 3);
        die.update(DT, 1.0);
        assert_eq!(die.phase(), DiePhase::Enter);
        let airborne = die.current_frame();
        let from_set = die
            .tumble
            .iter()
            .any(|frame| Arc::ptr_eq(frame, &airborne));
        assert!(from_set, "airborne frame must come from the tumble set");

        // From Settle on, the landing frame shows the rolled face.
        assert!(run_until(&mut die, 5.0, |d| d.phase() == DiePhase::Settle));
        assert_eq!(die.current_frame().key.face, Some(12));
    }

    #[test]
    fn survives_variable_timesteps() {
        let mut die = sprite(12, false, 9);
        let steps = [0.001, 0.05, 0.016, 0.1, 0.008, 0.033];
        for i in 0..2000 {
            die.update(steps[i % steps.len()], 0.3);
            if die.finished() {
                return;
            }
        }
        panic!("die never finished under variable dt");
    }

    #[test]
    fn zero_dt_is_a_no_op() {
        let mut die = sprite(12, false, 9);
        let pos = die.pos();
        die.update(0.0, 1.0);
        assert_eq!(die.pos(), pos);
        assert_eq!(die.age(), 0.0);
    }
}
