//! The renderer context: one owner for all silhouette state
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::animation::{Animator, FrameState};
use crate::clock::AnimationClock;
use crate::compositor::{Compositor, Scene};
use crate::config::Settings;
use crate::error::ConfigError;
use crate::geometry::Mesh;
use crate::input::{InputEvent, InputTracker};
use crate::lighting::Light;
use crate::particles::ParticleField;
use crate::projection::{Camera, Pose, ProjectedMesh, Viewport};
use crate::scheduler::{FrameTicket, RenderTask};
use crate::surface::Surface;

/// Owns the mesh, input targets, animation, particles and render task.
///
/// Hosts forward events to [`handle_event`](Self::handle_event) and frame
/// callbacks to [`render_frame`](Self::render_frame); nothing else mutates
/// renderer state.
pub struct SilhouetteRenderer {
    settings: Settings,
    mesh: Mesh,
    camera: Camera,
    viewport: Viewport,
    input: InputTracker,
    animator: Animator,
    clock: AnimationClock,
    particles: ParticleField,
    projected: ProjectedMesh,
    compositor: Compositor,
    task: RenderTask,
    rng: StdRng,
}

impl SilhouetteRenderer {
    pub fn new(settings: Settings, now: f64) -> Result<Self, ConfigError> {
        Self::with_rng(settings, now, StdRng::from_entropy())
    }

    /// Deterministic blink schedule and particle layout
    pub fn with_seed(settings: Settings, now: f64, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(settings, now, StdRng::seed_from_u64(seed))
    }

    fn with_rng(settings: Settings, now: f64, mut rng: StdRng) -> Result<Self, ConfigError> {
        if let Err(err) = settings.validate() {
            log::error!("invalid silhouette settings: {err}");
            return Err(err);
        }

        let animator = Animator::new(now, &settings, &mut rng);
        Ok(Self {
            camera: Camera::new(settings.fov),
            clock: AnimationClock::new(settings.max_frame_delta),
            mesh: Mesh::silhouette(),
            viewport: Viewport::new(0.0, 0.0),
            input: InputTracker::new(now),
            animator,
            particles: ParticleField::new(),
            projected: ProjectedMesh::new(),
            compositor: Compositor::new(Light::default()),
            task: RenderTask::new(),
            rng,
            settings,
        })
    }

    /// Schedule the first frame
    pub fn start(&mut self) -> Option<FrameTicket> {
        log::info!(
            "silhouette renderer started: {} faces, {} edges",
            self.mesh.faces().len(),
            self.mesh.edges().len()
        );
        self.task.request()
    }

    /// Adopt a new surface size and regenerate the particles
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
        self.input.set_surface_size(self.viewport.width, self.viewport.height);
        self.particles.reseed(
            &self.viewport,
            self.settings.particle_count,
            self.settings.particle_speed,
            &mut self.rng,
        );
        log::debug!(
            "resized to {}x{} (scale {:.3})",
            self.viewport.width,
            self.viewport.height,
            self.scale()
        );
    }

    /// Record an input event. Returns a ticket when the event resumes rendering.
    pub fn handle_event(&mut self, event: InputEvent, now: f64) -> Option<FrameTicket> {
        self.input.apply(event, now, &self.settings);
        match event {
            InputEvent::Visibility { visible } => self.task.set_visible(visible),
            _ => None,
        }
    }

    /// Advance animation and projection to `now` without drawing
    pub fn update(&mut self, now: f64) -> FrameState {
        let dt = self.clock.tick(now);
        self.particles.step(self.clock.steps());

        let frame = self.animator.tick(
            &mut self.input,
            self.clock.elapsed(),
            dt,
            now,
            &self.settings,
            &mut self.rng,
        );
        let pose = Pose {
            rotation: frame.rotation,
            scale: self.scale() * frame.breath_scale,
            offset_y: frame.breath_offset,
        };
        self.projected
            .update(&self.mesh, &pose, &self.viewport, &self.camera);
        frame
    }

    /// Run the frame for `ticket` and return the next ticket to schedule.
    ///
    /// Stale or unexpected tickets draw nothing.
    pub fn render_frame<S: Surface + ?Sized>(
        &mut self,
        ticket: FrameTicket,
        surface: &mut S,
        now: f64,
    ) -> Option<FrameTicket> {
        if !self.task.begin_frame(ticket) {
            return None;
        }

        let frame = self.update(now);
        let scene = Scene {
            mesh: &self.mesh,
            projected: &self.projected,
            frame: &frame,
            viewport: &self.viewport,
            particles: &self.particles,
            settings: &self.settings,
            scale: self.viewport.scale(self.settings.reference_size),
        };
        self.compositor.draw(surface, &scene);

        self.task.end_frame(self.input.is_visible())
    }

    /// Global mesh scale for the current surface
    pub fn scale(&self) -> f32 {
        self.viewport.scale(self.settings.reference_size)
    }

    /// Stop rendering for good, e.g. when the host surface is torn down
    pub fn shutdown(&mut self) {
        self.task.disable();
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn input(&self) -> &InputTracker {
        &self.input
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn projected(&self) -> &ProjectedMesh {
        &self.projected
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn task(&self) -> &RenderTask {
        &self.task
    }
}
