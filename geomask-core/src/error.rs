//! Error types
use thiserror::Error;

/// The hosting environment cannot provide a drawing surface.
///
/// Hosts treat this as a capability-detection outcome: the component stays
/// disabled for its whole lifetime and is never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("no drawing surface is available")]
    NoSurface,
    #[error("could not obtain a 2D drawing context: {0}")]
    NoContext(String),
}

/// Settings that cannot drive the renderer
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("blink interval {min}..{max}ms must be positive and ordered")]
    BlinkInterval { min: f64, max: f64 },
    #[error("blink duration must be positive, got {0}ms")]
    BlinkDuration(f64),
    #[error("scroll fade start {start} must be below end {end}")]
    ScrollFade { start: f32, end: f32 },
    #[error("smoothing constant `{name}` must lie in (0, 1], got {value}")]
    Smoothing { name: &'static str, value: f32 },
    #[error("`{name}` must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
}
