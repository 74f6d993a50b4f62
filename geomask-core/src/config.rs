//! Tunable constants for the silhouette renderer
use crate::error::ConfigError;
use crate::surface::Rgb;

/// Every knob the renderer reads. Distances are in surface pixels,
/// durations in milliseconds, speeds per second unless noted.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    // Accent colors
    pub cyan: Rgb,
    pub blue: Rgb,
    pub violet: Rgb,

    // Wireframe & fill
    pub wire_alpha: f32,
    pub fill_dark: Rgb,
    pub fill_mid: Rgb,
    pub fill_light: Rgb,

    // Mouse follow
    pub mouse_smooth: f32,
    /// Degrees
    pub max_mouse_tilt: f32,

    // Drag
    pub drag_smooth: f32,
    /// Radians per pixel of drag
    pub rot_sensitivity: f32,
    /// Fraction of the rotation target kept per 1/60s after release
    pub drag_decay: f32,

    // Eye tracking
    pub eye_track_range: f32,
    pub eye_smooth: f32,
    pub pupil_size: f32,
    pub iris_size: f32,

    // Blink
    pub blink_interval: [f64; 2],
    pub blink_duration: f64,

    // Breathing
    pub breath_amp: f32,
    /// Cycles per second
    pub breath_speed: f32,
    pub breath_scale: f32,

    // Idle tilt
    /// Degrees
    pub idle_tilt_amp: f32,
    pub idle_tilt_speed: f32,

    pub glow_pulse_speed: f32,

    // Inactivity
    pub inactive_delay: f64,
    pub inactive_level: f32,
    pub inactive_smooth: f32,

    // Scroll fade
    pub scroll_fade_start: f32,
    pub scroll_fade_end: f32,
    pub scroll_fade_min: f32,

    // Particles
    pub particle_count: usize,
    /// Pixels per 1/60s
    pub particle_speed: f32,

    // Scanlines
    pub scanline_alpha: f32,
    pub scanline_speed: f32,

    /// Per-1/60s blend step between interaction states
    pub state_blend: f32,
    pub fov: f32,
    /// Surface extent at which the mesh is drawn at unit scale
    pub reference_size: f32,
    /// Seconds; longer gaps between frames are clamped
    pub max_frame_delta: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cyan: Rgb::new(0, 220, 255),
            blue: Rgb::new(99, 102, 241),
            violet: Rgb::new(139, 92, 246),
            wire_alpha: 0.16,
            fill_dark: Rgb::new(8, 8, 20),
            fill_mid: Rgb::new(15, 15, 35),
            fill_light: Rgb::new(25, 25, 55),
            mouse_smooth: 0.10,
            max_mouse_tilt: 14.0,
            drag_smooth: 0.07,
            rot_sensitivity: 0.003,
            drag_decay: 0.97,
            eye_track_range: 7.0,
            eye_smooth: 0.14,
            pupil_size: 2.5,
            iris_size: 5.0,
            blink_interval: [2500.0, 6000.0],
            blink_duration: 130.0,
            breath_amp: 3.5,
            breath_speed: 0.7,
            breath_scale: 0.004,
            idle_tilt_amp: 2.2,
            idle_tilt_speed: 0.25,
            glow_pulse_speed: 1.0,
            inactive_delay: 3500.0,
            inactive_level: 0.35,
            inactive_smooth: 0.035,
            scroll_fade_start: 200.0,
            scroll_fade_end: 600.0,
            scroll_fade_min: 0.15,
            particle_count: 30,
            particle_speed: 0.35,
            scanline_alpha: 0.012,
            scanline_speed: 35.0,
            state_blend: 0.10,
            fov: 500.0,
            reference_size: 700.0,
            max_frame_delta: 0.05,
        }
    }
}

impl Settings {
    /// Reject combinations the renderer cannot animate sensibly
    pub fn validate(&self) -> Result<(), ConfigError> {
        let [min, max] = self.blink_interval;
        if min > max || min <= 0.0 {
            return Err(ConfigError::BlinkInterval { min, max });
        }
        if self.blink_duration <= 0.0 {
            return Err(ConfigError::BlinkDuration(self.blink_duration));
        }
        if self.scroll_fade_start >= self.scroll_fade_end {
            return Err(ConfigError::ScrollFade {
                start: self.scroll_fade_start,
                end: self.scroll_fade_end,
            });
        }

        let smoothing = [
            ("mouse_smooth", self.mouse_smooth),
            ("drag_smooth", self.drag_smooth),
            ("eye_smooth", self.eye_smooth),
            ("inactive_smooth", self.inactive_smooth),
            ("state_blend", self.state_blend),
            ("drag_decay", self.drag_decay),
        ];
        for (name, value) in smoothing {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::Smoothing { name, value });
            }
        }

        let positive = [
            ("fov", self.fov),
            ("reference_size", self.reference_size),
            ("max_frame_delta", self.max_frame_delta),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        Ok(())
    }
}
