//! Frame timing and frame-rate independent smoothing

/// Updates per second the smoothing constants are tuned against
pub const REFERENCE_RATE: f32 = 60.0;

/// Delta used for the very first frame, when there is no previous timestamp
const FIRST_FRAME_DELTA: f32 = 1.0 / REFERENCE_RATE;

/// Per-tick interpolation factor for an exponential approach.
///
/// `base` is the fraction of the remaining distance covered per 1/60s, so
/// `value += (target - value) * smoothing_factor(base, dt)` converges at the
/// same wall-clock speed at any frame rate.
pub fn smoothing_factor(base: f32, dt: f32) -> f32 {
    1.0 - (1.0 - base).powf(dt * REFERENCE_RATE)
}

/// Per-tick multiplier for a geometric decay tuned per 1/60s
pub fn decay_factor(base: f32, dt: f32) -> f32 {
    base.powf(dt * REFERENCE_RATE)
}

/// Monotonic animation time driven by host timestamps in milliseconds
#[derive(Debug, Clone)]
pub struct AnimationClock {
    elapsed: f32,
    dt: f32,
    last: Option<f64>,
    max_delta: f32,
}

impl AnimationClock {
    pub fn new(max_delta: f32) -> Self {
        Self {
            elapsed: 0.0,
            dt: 0.0,
            last: None,
            max_delta,
        }
    }

    /// Advance to `now` and return the clamped delta in seconds
    pub fn tick(&mut self, now: f64) -> f32 {
        let dt = match self.last {
            Some(last) => (((now - last) / 1000.0) as f32).clamp(0.0, self.max_delta),
            None => FIRST_FRAME_DELTA.min(self.max_delta),
        };
        self.last = Some(now);
        self.dt = dt;
        self.elapsed += dt;
        dt
    }

    /// Seconds of animation time since the first tick
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// The most recent tick expressed in 1/60s steps
    pub fn steps(&self) -> f32 {
        self.dt * REFERENCE_RATE
    }
}
