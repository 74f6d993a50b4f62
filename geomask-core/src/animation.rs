//! Interaction state blending and the autonomous micro-animations
use std::f32::consts::{PI, TAU};

use nalgebra::Vector2;
use rand::Rng;

use crate::clock::{decay_factor, smoothing_factor};
use crate::config::Settings;
use crate::input::{InputTracker, InteractionState};
use crate::transform::RotationState;

/// How much each interaction state contributes to the current frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    pub idle: f32,
    pub hover: f32,
    pub drag: f32,
}

impl BlendWeights {
    /// One-hot weights for `state`
    pub fn target(state: InteractionState) -> Self {
        let mut weights = Self {
            idle: 0.0,
            hover: 0.0,
            drag: 0.0,
        };
        *weights.get_mut(state) = 1.0;
        weights
    }

    fn get_mut(&mut self, state: InteractionState) -> &mut f32 {
        match state {
            InteractionState::Idle => &mut self.idle,
            InteractionState::Hover => &mut self.hover,
            InteractionState::Dragging => &mut self.drag,
        }
    }

    /// Move every weight towards the one-hot target of `state`
    pub fn step(&mut self, state: InteractionState, rate: f32) {
        let target = Self::target(state);
        self.idle += (target.idle - self.idle) * rate;
        self.hover += (target.hover - self.hover) * rate;
        self.drag += (target.drag - self.drag) * rate;
    }

    pub fn sum(&self) -> f32 {
        self.idle + self.hover + self.drag
    }
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self::target(InteractionState::Idle)
    }
}

/// Eyelid state. Phase 0 is open, 1 is fully closed.
#[derive(Debug, Clone, PartialEq)]
pub struct BlinkState {
    phase: f32,
    next_deadline: f64,
    started_at: f64,
    in_progress: bool,
}

impl BlinkState {
    pub fn new<R: Rng>(now: f64, settings: &Settings, rng: &mut R) -> Self {
        Self {
            phase: 0.0,
            next_deadline: Self::schedule(now, settings, rng),
            started_at: 0.0,
            in_progress: false,
        }
    }

    /// A deadline drawn uniformly from the blink interval after `from`
    fn schedule<R: Rng>(from: f64, settings: &Settings, rng: &mut R) -> f64 {
        let [min, max] = settings.blink_interval;
        let wait = if max > min { rng.gen_range(min..=max) } else { min };
        from + wait
    }

    /// Advance the blink at wall-clock `now` and return the current phase
    pub fn update<R: Rng>(&mut self, now: f64, settings: &Settings, rng: &mut R) -> f32 {
        if !self.in_progress && now > self.next_deadline {
            self.in_progress = true;
            self.started_at = now;
        }

        if self.in_progress {
            let elapsed = now - self.started_at;
            if elapsed > settings.blink_duration {
                self.in_progress = false;
                self.phase = 0.0;
                self.next_deadline = Self::schedule(now, settings, rng);
            } else {
                // Half sine: open, closed at the midpoint, open again
                self.phase = ((elapsed / settings.blink_duration) as f32 * PI).sin().max(0.0);
            }
        }
        self.phase
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn next_deadline(&self) -> f64 {
        self.next_deadline
    }

    pub fn is_blinking(&self) -> bool {
        self.in_progress
    }
}

/// Blended output of one animation tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// Animation time in seconds
    pub time: f32,
    pub rotation: RotationState,
    pub breath_scale: f32,
    pub breath_offset: f32,
    /// Shared glow pulse in [0, 1]
    pub glow: f32,
    pub activity: f32,
    pub fade: f32,
    /// activity × fade
    pub intensity: f32,
    pub eye_offset: Vector2<f32>,
    pub blink: f32,
}

impl FrameState {
    /// 1 - blink phase
    pub fn eye_openness(&self) -> f32 {
        1.0 - self.blink
    }
}

/// Interaction state machine plus breathing, tilt, eye and blink layers.
///
/// This is the only writer of smoothed values; the tracker only supplies
/// targets.
#[derive(Debug, Clone)]
pub struct Animator {
    blend: BlendWeights,
    activity: f32,
    pointer: Vector2<f32>,
    eye_offset: Vector2<f32>,
    drag_rotation: RotationState,
    blink: BlinkState,
}

impl Animator {
    pub fn new<R: Rng>(now: f64, settings: &Settings, rng: &mut R) -> Self {
        Self {
            blend: BlendWeights::default(),
            activity: 1.0,
            pointer: Vector2::zeros(),
            eye_offset: Vector2::zeros(),
            drag_rotation: RotationState::zero(),
            blink: BlinkState::new(now, settings, rng),
        }
    }

    /// Advance one frame.
    ///
    /// `time` and `dt` are animation seconds, `now` is the host clock in
    /// milliseconds used for activity and blink deadlines.
    pub fn tick<R: Rng>(
        &mut self,
        input: &mut InputTracker,
        time: f32,
        dt: f32,
        now: f64,
        settings: &Settings,
        rng: &mut R,
    ) -> FrameState {
        let state = input.requested_state();
        self.blend
            .step(state, smoothing_factor(settings.state_blend, dt));

        // Inactivity relaxes towards the floor and recovers on input
        let inactive = now - input.last_activity() > settings.inactive_delay;
        let target_activity = if inactive {
            settings.inactive_level
        } else {
            1.0
        };
        self.activity +=
            (target_activity - self.activity) * smoothing_factor(settings.inactive_smooth, dt);

        let fade = input.fade();
        let intensity = fade * self.activity;

        self.pointer += (input.pointer() - self.pointer) * smoothing_factor(settings.mouse_smooth, dt);

        let eye_target = if state == InteractionState::Idle && inactive {
            Vector2::new((time * 0.2).sin() * 2.0, (time * 0.15).cos() * 1.5)
        } else {
            input.eye_target()
        };
        self.eye_offset += (eye_target - self.eye_offset) * smoothing_factor(settings.eye_smooth, dt);

        self.drag_rotation.approach(
            &input.rotation_target(),
            smoothing_factor(settings.drag_smooth, dt),
        );
        input.decay_rotation_target(decay_factor(settings.drag_decay, dt));

        let breath = (time * settings.breath_speed * TAU).sin();
        let breath_offset = breath * settings.breath_amp * intensity;
        let breath_scale = 1.0 + breath * settings.breath_scale * intensity;

        let idle_amp = settings.idle_tilt_amp.to_radians() * self.blend.idle * intensity;
        let idle_tilt = RotationState::new(
            (time * settings.idle_tilt_speed).sin() * idle_amp,
            (time * settings.idle_tilt_speed * 0.7).cos() * idle_amp,
        );

        let hover_amp = settings.max_mouse_tilt.to_radians()
            * (self.blend.hover + self.blend.drag * 0.3)
            * intensity;
        let hover_tilt = RotationState::new(self.pointer.y * hover_amp, self.pointer.x * hover_amp);

        let rotation = RotationState::new(
            hover_tilt.x + idle_tilt.x + self.drag_rotation.x,
            hover_tilt.y + idle_tilt.y + self.drag_rotation.y,
        );

        let blink = self.blink.update(now, settings, rng);
        let glow = 0.5 + 0.5 * (time * settings.glow_pulse_speed * PI).sin();

        FrameState {
            time,
            rotation,
            breath_scale,
            breath_offset,
            glow,
            activity: self.activity,
            fade,
            intensity,
            eye_offset: self.eye_offset,
            blink,
        }
    }

    pub fn blend(&self) -> &BlendWeights {
        &self.blend
    }

    pub fn activity(&self) -> f32 {
        self.activity
    }

    pub fn eye_offset(&self) -> Vector2<f32> {
        self.eye_offset
    }

    pub fn drag_rotation(&self) -> RotationState {
        self.drag_rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const FRAME: f32 = 1.0 / 60.0;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_blend_weights_stay_bounded() {
        let mut weights = BlendWeights::default();
        let states = [
            InteractionState::Hover,
            InteractionState::Dragging,
            InteractionState::Idle,
        ];
        for (i, dt) in [0.001_f32, 0.05, 0.016, 0.033, 0.0, 0.05].iter().cycle().take(300).enumerate() {
            weights.step(states[(i / 20) % 3], smoothing_factor(0.1, *dt));
            for w in [weights.idle, weights.hover, weights.drag] {
                assert!((0.0..=1.0).contains(&w));
            }
        }
    }

    #[test]
    fn test_blend_converges_to_one_hot() {
        let mut weights = BlendWeights::default();
        for _ in 0..200 {
            weights.step(InteractionState::Hover, smoothing_factor(0.1, FRAME));
        }
        assert!((weights.sum() - 1.0).abs() < 1e-4);
        assert!(weights.hover > 0.999);
        assert!(weights.idle < 1e-3);
    }

    #[test]
    fn test_blink_follows_half_sine() {
        let settings = Settings::default();
        let mut rng = rng();
        let mut blink = BlinkState::new(0.0, &settings, &mut rng);
        let start = blink.next_deadline() + 1.0;

        assert_eq!(blink.update(start, &settings, &mut rng), 0.0);
        assert!(blink.is_blinking());

        let mid = blink.update(start + settings.blink_duration / 2.0, &settings, &mut rng);
        assert!((mid - 1.0).abs() < 1e-6);

        let quarter = blink.update(start + settings.blink_duration / 4.0, &settings, &mut rng);
        assert!((quarter - (PI / 4.0).sin()).abs() < 1e-5);

        let end = blink.update(start + settings.blink_duration, &settings, &mut rng);
        assert!(end.abs() < 1e-5);
        assert!(blink.is_blinking());
    }

    #[test]
    fn test_blink_reschedules_after_completion() {
        let settings = Settings::default();
        let mut rng = rng();
        let mut blink = BlinkState::new(0.0, &settings, &mut rng);
        for _ in 0..20 {
            let start = blink.next_deadline() + 1.0;
            blink.update(start, &settings, &mut rng);
            let done = start + settings.blink_duration + 1.0;
            assert_eq!(blink.update(done, &settings, &mut rng), 0.0);
            assert!(!blink.is_blinking());

            let wait = blink.next_deadline() - done;
            assert!(wait >= settings.blink_interval[0] && wait <= settings.blink_interval[1]);
            assert!(blink.next_deadline() > done);
        }
    }

    #[test]
    fn test_no_blink_starts_while_blinking() {
        let settings = Settings::default();
        let mut rng = rng();
        let mut blink = BlinkState::new(0.0, &settings, &mut rng);
        let start = blink.next_deadline() + 1.0;
        blink.update(start, &settings, &mut rng);
        let deadline = blink.next_deadline();
        blink.update(start + 10.0, &settings, &mut rng);
        // Still the same blink: the deadline is untouched until it completes
        assert_eq!(blink.next_deadline(), deadline);
        assert!(blink.phase() > 0.0);
    }

    #[test]
    fn test_activity_relaxes_to_floor() {
        let settings = Settings::default();
        let mut rng = rng();
        let mut input = InputTracker::new(0.0);
        let mut animator = Animator::new(0.0, &settings, &mut rng);

        let mut now = settings.inactive_delay + 1.0;
        let mut previous = animator.activity();
        for _ in 0..600 {
            now += 16.0;
            animator.tick(&mut input, 0.0, FRAME, now, &settings, &mut rng);
            let activity = animator.activity();
            assert!(activity <= previous);
            assert!(activity >= settings.inactive_level);
            previous = activity;
        }
        assert!((previous - settings.inactive_level).abs() < 1e-3);
    }

    #[test]
    fn test_activity_recovers_on_input() {
        let settings = Settings::default();
        let mut rng = rng();
        let mut input = InputTracker::new(0.0);
        input.set_surface_size(100.0, 100.0);
        let mut animator = Animator::new(0.0, &settings, &mut rng);

        let mut now = settings.inactive_delay + 1.0;
        for _ in 0..120 {
            now += 16.0;
            animator.tick(&mut input, 0.0, FRAME, now, &settings, &mut rng);
        }
        let rested = animator.activity();
        input.pointer_move(Point2::new(50.0, 50.0), now, &settings);
        animator.tick(&mut input, 0.0, FRAME, now + 16.0, &settings, &mut rng);
        assert!(animator.activity() > rested);
    }

    #[test]
    fn test_rotation_target_decays_after_release() {
        let settings = Settings::default();
        let mut rng = rng();
        let mut input = InputTracker::new(0.0);
        input.set_surface_size(100.0, 100.0);
        let mut animator = Animator::new(0.0, &settings, &mut rng);

        input.pointer_down(Point2::new(0.0, 0.0), 0.0);
        input.pointer_move(Point2::new(40.0, 20.0), 1.0, &settings);
        input.pointer_up(&settings);

        let mut previous = input.rotation_target();
        for _ in 0..30 {
            animator.tick(&mut input, 0.0, FRAME, 2.0, &settings, &mut rng);
            let target = input.rotation_target();
            assert!((target.y - previous.y * 0.97).abs() < 1e-6);
            assert!((target.x - previous.x * 0.97).abs() < 1e-6);
            assert!(target.magnitude() < previous.magnitude());
            previous = target;
        }
    }

    #[test]
    fn test_rotation_target_held_while_dragging() {
        let settings = Settings::default();
        let mut rng = rng();
        let mut input = InputTracker::new(0.0);
        let mut animator = Animator::new(0.0, &settings, &mut rng);

        input.pointer_down(Point2::new(0.0, 0.0), 0.0);
        input.pointer_move(Point2::new(40.0, 0.0), 1.0, &settings);
        let target = input.rotation_target();
        for _ in 0..10 {
            animator.tick(&mut input, 0.0, FRAME, 2.0, &settings, &mut rng);
        }
        assert_eq!(input.rotation_target(), target);
        assert!(animator.drag_rotation().y > 0.0);
    }

    #[test]
    fn test_eyes_wander_when_idle_and_inactive() {
        let settings = Settings::default();
        let mut rng = rng();
        let mut input = InputTracker::new(0.0);
        let mut animator = Animator::new(0.0, &settings, &mut rng);
        let now = settings.inactive_delay + 100.0;

        for _ in 0..600 {
            animator.tick(&mut input, 0.0, FRAME, now, &settings, &mut rng);
        }
        // At t = 0 the wander target is (sin 0 * 2, cos 0 * 1.5)
        assert!((animator.eye_offset() - Vector2::new(0.0, 1.5)).norm() < 1e-3);
    }

    /// Settings and tracker scrolled far enough that intensity is zero
    fn faded() -> (Settings, InputTracker) {
        let settings = Settings {
            scroll_fade_min: 0.0,
            ..Settings::default()
        };
        let mut input = InputTracker::new(0.0);
        input.scroll(1000.0, &settings);
        (settings, input)
    }

    fn settle(
        animator: &mut Animator,
        input: &mut InputTracker,
        settings: &Settings,
        time: f32,
    ) -> FrameState {
        let mut rng = rng();
        let mut frame = animator.tick(input, time, FRAME, 0.0, settings, &mut rng);
        for _ in 0..300 {
            frame = animator.tick(input, time, FRAME, 0.0, settings, &mut rng);
        }
        frame
    }

    #[test]
    fn test_breathing_peaks_at_quarter_period() {
        let settings = Settings::default();
        let mut rng = rng();
        let mut input = InputTracker::new(0.0);
        let mut animator = Animator::new(0.0, &settings, &mut rng);

        let time = 0.25 / settings.breath_speed;
        let frame = animator.tick(&mut input, time, FRAME, 0.0, &settings, &mut rng);
        assert!((frame.intensity - 1.0).abs() < 1e-6);
        assert!((frame.breath_offset - settings.breath_amp).abs() < 1e-4);
        assert!((frame.breath_scale - (1.0 + settings.breath_scale)).abs() < 1e-6);

        let trough = animator.tick(&mut input, 3.0 * time, FRAME, 0.0, &settings, &mut rng);
        assert!((trough.breath_offset + settings.breath_amp).abs() < 1e-4);
        assert!((trough.breath_scale - (1.0 - settings.breath_scale)).abs() < 1e-6);
    }

    #[test]
    fn test_zero_intensity_stills_breathing_and_tilt() {
        let (settings, mut input) = faded();
        let mut rng = rng();
        let mut animator = Animator::new(0.0, &settings, &mut rng);

        let time = 0.25 / settings.breath_speed;
        let frame = animator.tick(&mut input, time, FRAME, 0.0, &settings, &mut rng);
        assert_eq!(frame.intensity, 0.0);
        assert_eq!(frame.breath_offset, 0.0);
        assert_eq!(frame.breath_scale, 1.0);
        assert_eq!(frame.rotation, RotationState::zero());
    }

    #[test]
    fn test_idle_tilt_follows_offset_sinusoids() {
        let settings = Settings::default();
        let mut rng = rng();
        let mut input = InputTracker::new(0.0);
        let mut animator = Animator::new(0.0, &settings, &mut rng);

        let time = 3.0;
        let frame = animator.tick(&mut input, time, FRAME, 0.0, &settings, &mut rng);
        let amp = settings.idle_tilt_amp.to_radians();
        let phase = time * settings.idle_tilt_speed;
        assert!((frame.rotation.x - phase.sin() * amp).abs() < 1e-6);
        assert!((frame.rotation.y - (phase * 0.7).cos() * amp).abs() < 1e-6);
    }

    #[test]
    fn test_hover_tilt_replaces_idle_tilt() {
        let settings = Settings::default();
        let mut rng = rng();
        let mut input = InputTracker::new(0.0);
        input.set_surface_size(100.0, 100.0);
        let mut animator = Animator::new(0.0, &settings, &mut rng);

        // Top-right corner: pointer (1, -1)
        input.pointer_move(Point2::new(100.0, 0.0), 0.0, &settings);
        let frame = settle(&mut animator, &mut input, &settings, 0.0);

        let max = settings.max_mouse_tilt.to_radians();
        assert!(animator.blend().idle < 1e-6);
        assert!((frame.rotation.x + max).abs() < 1e-4);
        assert!((frame.rotation.y - max).abs() < 1e-4);
    }

    #[test]
    fn test_drag_keeps_a_fraction_of_hover_tilt() {
        let settings = Settings::default();
        let mut rng = rng();
        let mut input = InputTracker::new(0.0);
        input.set_surface_size(100.0, 100.0);
        let mut animator = Animator::new(0.0, &settings, &mut rng);

        input.pointer_down(Point2::new(50.0, 50.0), 0.0);
        input.pointer_move(Point2::new(100.0, 0.0), 0.0, &settings);
        let drag = 50.0 * settings.rot_sensitivity;
        let frame = settle(&mut animator, &mut input, &settings, 0.0);

        let tilt = settings.max_mouse_tilt.to_radians() * 0.3;
        assert!(animator.blend().drag > 0.999);
        assert!((frame.rotation.x - (drag - tilt)).abs() < 1e-4);
        assert!((frame.rotation.y - (drag + tilt)).abs() < 1e-4);
    }

    #[test]
    fn test_hover_tilt_vanishes_at_zero_intensity() {
        let (settings, mut input) = faded();
        let mut rng = rng();
        input.set_surface_size(100.0, 100.0);
        let mut animator = Animator::new(0.0, &settings, &mut rng);

        input.pointer_move(Point2::new(100.0, 0.0), 0.0, &settings);
        let frame = settle(&mut animator, &mut input, &settings, 0.0);
        assert!(animator.blend().hover > 0.999);
        assert_eq!(frame.rotation, RotationState::zero());
    }
}
