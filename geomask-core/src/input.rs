//! Pointer, touch, scroll and visibility handling.
//!
//! Handlers only write *target* values. The frame tick reads them and owns
//! every smoothed value derived from them.
use nalgebra::{Point2, Vector2};

use crate::config::Settings;
use crate::transform::RotationState;

/// Interaction state requested by the most recent input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum InteractionState {
    #[default]
    Idle,
    Hover,
    Dragging,
}

/// Host-agnostic input. Positions are in surface pixels relative to the
/// top-left corner of the drawing surface. Touch start/move/end map onto
/// pointer down/move/up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove { position: Point2<f32> },
    PointerLeave,
    PointerDown { position: Point2<f32> },
    PointerUp,
    /// Page scroll offset in pixels
    Scroll { offset: f32 },
    Visibility { visible: bool },
}

/// Target signals written by input handlers
#[derive(Debug, Clone)]
pub struct InputTracker {
    surface: Vector2<f32>,
    pointer: Vector2<f32>,
    eye_target: Vector2<f32>,
    requested: InteractionState,
    dragging: bool,
    drag_origin: Point2<f32>,
    last_position: Point2<f32>,
    momentum: Vector2<f32>,
    rotation_target: RotationState,
    last_activity: f64,
    fade: f32,
    visible: bool,
}

impl InputTracker {
    pub fn new(now: f64) -> Self {
        Self {
            surface: Vector2::zeros(),
            pointer: Vector2::zeros(),
            eye_target: Vector2::zeros(),
            requested: InteractionState::Idle,
            dragging: false,
            drag_origin: Point2::origin(),
            last_position: Point2::origin(),
            momentum: Vector2::zeros(),
            rotation_target: RotationState::zero(),
            last_activity: now,
            fade: 1.0,
            visible: true,
        }
    }

    pub fn set_surface_size(&mut self, width: f32, height: f32) {
        self.surface = Vector2::new(width, height);
    }

    /// Dispatch a host event
    pub fn apply(&mut self, event: InputEvent, now: f64, settings: &Settings) {
        match event {
            InputEvent::PointerMove { position } => self.pointer_move(position, now, settings),
            InputEvent::PointerLeave => self.pointer_leave(),
            InputEvent::PointerDown { position } => self.pointer_down(position, now),
            InputEvent::PointerUp => self.pointer_up(settings),
            InputEvent::Scroll { offset } => self.scroll(offset, settings),
            InputEvent::Visibility { visible } => self.visible = visible,
        }
    }

    /// Map a surface position into [-1, 1]² around the surface center
    pub fn normalize(&self, position: Point2<f32>) -> Vector2<f32> {
        let half = self.surface / 2.0;
        if half.x <= 0.0 || half.y <= 0.0 {
            return Vector2::zeros();
        }
        Vector2::new(
            ((position.x - half.x) / half.x).clamp(-1.0, 1.0),
            ((position.y - half.y) / half.y).clamp(-1.0, 1.0),
        )
    }

    pub fn pointer_move(&mut self, position: Point2<f32>, now: f64, settings: &Settings) {
        self.pointer = self.normalize(position);
        self.eye_target = self.pointer * settings.eye_track_range;
        self.last_activity = now;

        if self.dragging {
            self.momentum = position - self.last_position;
            self.last_position = position;
            self.rotation_target = RotationState::new(
                -(position.y - self.drag_origin.y) * settings.rot_sensitivity,
                (position.x - self.drag_origin.x) * settings.rot_sensitivity,
            );
        } else {
            self.requested = InteractionState::Hover;
        }
    }

    pub fn pointer_leave(&mut self) {
        if !self.dragging {
            self.requested = InteractionState::Idle;
        }
    }

    pub fn pointer_down(&mut self, position: Point2<f32>, now: f64) {
        self.dragging = true;
        self.requested = InteractionState::Dragging;
        self.drag_origin = position;
        self.last_position = position;
        self.momentum = Vector2::zeros();
        self.last_activity = now;
    }

    /// End a drag and kick the rotation target along the release momentum
    pub fn pointer_up(&mut self, settings: &Settings) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        self.requested = InteractionState::Idle;

        let kick = settings.rot_sensitivity * 2.0;
        self.rotation_target
            .rotate(-self.momentum.y * kick, self.momentum.x * kick);
    }

    pub fn scroll(&mut self, offset: f32, settings: &Settings) {
        self.fade = scroll_fade(offset, settings);
    }

    /// Geometric spin-down of the rotation target, applied by the frame tick
    pub(crate) fn decay_rotation_target(&mut self, factor: f32) {
        if !self.dragging {
            self.rotation_target.scale(factor);
        }
    }

    pub fn requested_state(&self) -> InteractionState {
        self.requested
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Normalized pointer position in [-1, 1]²
    pub fn pointer(&self) -> Vector2<f32> {
        self.pointer
    }

    /// Pupil offset in pixels the eyes should follow
    pub fn eye_target(&self) -> Vector2<f32> {
        self.eye_target
    }

    /// Displacement of the most recent drag move
    pub fn momentum(&self) -> Vector2<f32> {
        self.momentum
    }

    pub fn rotation_target(&self) -> RotationState {
        self.rotation_target
    }

    pub fn last_activity(&self) -> f64 {
        self.last_activity
    }

    /// Scroll-driven fade in [scroll_fade_min, 1]
    pub fn fade(&self) -> f32 {
        self.fade
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// 1 above the fold, `scroll_fade_min` past the end threshold, linear between
pub fn scroll_fade(offset: f32, settings: &Settings) -> f32 {
    let (start, end, min) = (
        settings.scroll_fade_start,
        settings.scroll_fade_end,
        settings.scroll_fade_min,
    );
    if offset < start {
        1.0
    } else if offset > end {
        min
    } else {
        1.0 - (1.0 - min) * ((offset - start) / (end - start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> InputTracker {
        let mut tracker = InputTracker::new(0.0);
        tracker.set_surface_size(400.0, 200.0);
        tracker
    }

    #[test]
    fn test_hover_sets_eye_target() {
        let settings = Settings::default();
        let mut input = tracker();
        input.pointer_move(Point2::new(300.0, 70.0), 42.0, &settings);

        assert_eq!(input.requested_state(), InteractionState::Hover);
        assert!((input.pointer() - Vector2::new(0.5, -0.3)).norm() < 1e-6);
        assert!((input.eye_target() - Vector2::new(3.5, -2.1)).norm() < 1e-5);
        assert_eq!(input.last_activity(), 42.0);
    }

    #[test]
    fn test_leave_returns_to_idle_unless_dragging() {
        let settings = Settings::default();
        let mut input = tracker();
        input.pointer_move(Point2::new(10.0, 10.0), 1.0, &settings);
        input.pointer_leave();
        assert_eq!(input.requested_state(), InteractionState::Idle);

        input.pointer_down(Point2::new(10.0, 10.0), 2.0);
        input.pointer_leave();
        assert_eq!(input.requested_state(), InteractionState::Dragging);
    }

    #[test]
    fn test_drag_targets_follow_displacement() {
        let settings = Settings::default();
        let mut input = tracker();
        input.pointer_down(Point2::new(100.0, 100.0), 0.0);
        input.pointer_move(Point2::new(130.0, 90.0), 16.0, &settings);
        input.pointer_move(Point2::new(150.0, 80.0), 32.0, &settings);

        let target = input.rotation_target();
        assert!((target.y - 50.0 * 0.003).abs() < 1e-6);
        assert!((target.x - 20.0 * 0.003).abs() < 1e-6);
        assert_eq!(input.momentum(), Vector2::new(20.0, -10.0));
        assert_eq!(input.requested_state(), InteractionState::Dragging);
    }

    #[test]
    fn test_release_adds_momentum_kick() {
        let settings = Settings::default();
        let mut input = tracker();
        input.pointer_down(Point2::new(100.0, 100.0), 0.0);
        input.pointer_move(Point2::new(110.0, 104.0), 16.0, &settings);
        let before = input.rotation_target();
        input.pointer_up(&settings);

        let after = input.rotation_target();
        assert!((after.y - (before.y + 10.0 * 0.006)).abs() < 1e-6);
        assert!((after.x - (before.x - 4.0 * 0.006)).abs() < 1e-6);
        assert_eq!(input.requested_state(), InteractionState::Idle);
        assert!(!input.is_dragging());
    }

    #[test]
    fn test_release_without_drag_is_ignored() {
        let settings = Settings::default();
        let mut input = tracker();
        input.pointer_move(Point2::new(10.0, 10.0), 1.0, &settings);
        input.pointer_up(&settings);
        assert_eq!(input.requested_state(), InteractionState::Hover);
        assert_eq!(input.rotation_target(), RotationState::zero());
    }

    #[test]
    fn test_press_resets_momentum() {
        let settings = Settings::default();
        let mut input = tracker();
        input.pointer_down(Point2::new(0.0, 0.0), 0.0);
        input.pointer_move(Point2::new(5.0, 5.0), 1.0, &settings);
        input.pointer_up(&settings);
        input.pointer_down(Point2::new(50.0, 50.0), 2.0);
        assert_eq!(input.momentum(), Vector2::zeros());
    }

    #[test]
    fn test_scroll_fade_thresholds() {
        let settings = Settings::default();
        assert_eq!(scroll_fade(0.0, &settings), 1.0);
        assert_eq!(scroll_fade(199.0, &settings), 1.0);
        assert!((scroll_fade(400.0, &settings) - 0.575).abs() < 1e-6);
        assert!((scroll_fade(600.0, &settings) - 0.15).abs() < 1e-6);
        assert_eq!(scroll_fade(5000.0, &settings), 0.15);
    }

    #[test]
    fn test_normalize_clamps_outside_surface() {
        let input = tracker();
        assert_eq!(
            input.normalize(Point2::new(-400.0, 1000.0)),
            Vector2::new(-1.0, 1.0)
        );
        let empty = InputTracker::new(0.0);
        assert_eq!(empty.normalize(Point2::new(5.0, 5.0)), Vector2::zeros());
    }
}
