//! GeoMask Core Library - Interactive 3D silhouette rendering
//!
//! This library holds the host-independent parts of the silhouette: the
//! authored mesh, input targets, the animation state machine, projection,
//! lighting, particles and the layer compositor. Hosts provide a
//! [`Surface`] and a frame callback.

pub mod animation;
pub mod clock;
pub mod compositor;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod lighting;
pub mod particles;
pub mod projection;
pub mod renderer;
pub mod scheduler;
pub mod surface;
pub mod transform;

// Re-export commonly used types
pub use animation::{BlendWeights, BlinkState, FrameState};
pub use config::Settings;
pub use error::{ConfigError, EnvironmentError};
pub use geometry::{Edge, Face, Mesh, Vertex};
pub use input::{InputEvent, InteractionState};
pub use projection::{Camera, Viewport};
pub use renderer::SilhouetteRenderer;
pub use scheduler::{FrameTicket, RenderTask};
pub use surface::{Layer, Paint, Rgb, Rgba, Surface};
pub use transform::{RotationState, Transform};
