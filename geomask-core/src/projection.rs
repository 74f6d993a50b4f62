//! Camera, viewport and the per-frame vertex pipeline
use nalgebra::{Point2, Point3};

use crate::geometry::Mesh;
use crate::transform::{RotationState, Transform};

/// Fixed perspective divide about the surface center.
///
/// Points shrink as Z grows; the authored mesh stays within a few dozen
/// units of Z = 0, so the effect is a gentle foreshortening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub fov: f32,
}

impl Camera {
    pub fn new(fov: f32) -> Self {
        Self { fov }
    }

    /// Perspective scale for a point at depth `z`.
    ///
    /// The denominator is clamped to 1 so points at or behind the eye never
    /// divide by zero or flip sign.
    pub fn projection_scale(&self, z: f32) -> f32 {
        self.fov / (z + self.fov).max(1.0)
    }

    /// Project a rotated point to center-relative screen space
    pub fn project(&self, point: &Point3<f32>) -> (Point2<f32>, f32) {
        let scale = self.projection_scale(point.z);
        (Point2::new(point.x * scale, point.y * scale), scale)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(500.0)
    }
}

/// Pixel extent of the drawing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn center(&self) -> Point2<f32> {
        Point2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Global mesh scale: the shorter side relative to `reference_size`
    pub fn scale(&self, reference_size: f32) -> f32 {
        self.width.min(self.height) / reference_size
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Everything the pipeline needs from the animation for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub rotation: RotationState,
    /// Global scale multiplied by the breathing pulse
    pub scale: f32,
    /// Vertical screen offset added after projection
    pub offset_y: f32,
}

/// A vertex after projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub position: Point2<f32>,
    /// Rotated model-space Z; grows towards the front of the authored face
    pub depth: f32,
    /// Perspective scale used for sizing point features
    pub scale: f32,
}

/// Per-frame output of the transform pipeline, indexed by vertex id
#[derive(Debug, Clone, Default)]
pub struct ProjectedMesh {
    rotated: Vec<Point3<f32>>,
    screen: Vec<ScreenVertex>,
}

impl ProjectedMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scale, rotate and project every vertex of `mesh`
    pub fn update(&mut self, mesh: &Mesh, pose: &Pose, viewport: &Viewport, camera: &Camera) {
        let rotation = Transform::rotation_matrix(&pose.rotation);
        let center = viewport.center();

        self.rotated.clear();
        self.screen.clear();
        for vertex in mesh.vertices() {
            let rotated = Transform::apply(&vertex.position, pose.scale, &rotation);
            let (projected, scale) = camera.project(&rotated);

            self.rotated.push(rotated);
            self.screen.push(ScreenVertex {
                position: Point2::new(
                    projected.x + center.x,
                    projected.y + center.y + pose.offset_y,
                ),
                depth: rotated.z,
                scale,
            });
        }
    }

    /// Rotated, pre-projection positions
    pub fn rotated(&self) -> &[Point3<f32>] {
        &self.rotated
    }

    pub fn screen(&self) -> &[ScreenVertex] {
        &self.screen
    }

    /// The projected vertex `id`, if the mesh has one
    pub fn vertex(&self, id: usize) -> Option<&ScreenVertex> {
        self.screen.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Face, Vertex};

    fn pose(x: f32, y: f32) -> Pose {
        Pose {
            rotation: RotationState::new(x, y),
            scale: 1.0,
            offset_y: 0.0,
        }
    }

    #[test]
    fn test_projection_formula() {
        let camera = Camera::new(500.0);
        let (p, s) = camera.project(&Point3::new(100.0, -50.0, 0.0));
        assert_eq!(s, 1.0);
        assert_eq!(p, Point2::new(100.0, -50.0));

        let (p, s) = camera.project(&Point3::new(100.0, 0.0, 500.0));
        assert!((s - 0.5).abs() < 1e-6);
        assert!((p.x - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_projection_denominator_clamped() {
        let camera = Camera::new(500.0);
        assert_eq!(camera.projection_scale(-500.0), 500.0);
        assert_eq!(camera.projection_scale(-10_000.0), 500.0);
    }

    #[test]
    fn test_viewport_scale() {
        let viewport = Viewport::new(1400.0, 700.0);
        assert!((viewport.scale(700.0) - 1.0).abs() < 1e-6);
        assert_eq!(viewport.center(), Point2::new(700.0, 350.0));
    }

    #[test]
    fn test_pipeline_translates_to_center() {
        let mesh = Mesh::new(
            vec![
                Vertex::new(0, 0.0, 0.0, 0.0),
                Vertex::new(1, 10.0, 0.0, 0.0),
                Vertex::new(2, 0.0, 10.0, 0.0),
            ],
            vec![Face::new(0, 1, 2, 0)],
        );
        let mut projected = ProjectedMesh::new();
        let mut p = pose(0.0, 0.0);
        p.scale = 2.0;
        p.offset_y = 3.0;
        projected.update(&mesh, &p, &Viewport::new(200.0, 100.0), &Camera::default());

        assert_eq!(projected.vertex(0).unwrap().position, Point2::new(100.0, 53.0));
        assert_eq!(projected.vertex(1).unwrap().position, Point2::new(120.0, 53.0));
        assert_eq!(projected.rotated()[2], Point3::new(0.0, 20.0, 0.0));
        assert_eq!(projected.vertex(3), None);
    }

    #[test]
    fn test_yaw_changes_depth() {
        let mesh = Mesh::new(
            vec![
                Vertex::new(0, 10.0, 0.0, 0.0),
                Vertex::new(1, 0.0, 0.0, 0.0),
                Vertex::new(2, 0.0, 1.0, 0.0),
            ],
            vec![Face::new(0, 1, 2, 0)],
        );
        let mut projected = ProjectedMesh::new();
        projected.update(
            &mesh,
            &pose(0.0, std::f32::consts::FRAC_PI_2),
            &Viewport::new(100.0, 100.0),
            &Camera::default(),
        );
        // +X swings to -Z under positive yaw
        assert!((projected.vertex(0).unwrap().depth + 10.0).abs() < 1e-4);
    }
}
