//! Rotation state and the model transform applied to every vertex
use nalgebra::{Point3, Rotation3, Vector3};

/// Pitch (about X) and yaw (about Y), in radians
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// Multiply both angles, used for geometric decay
    pub fn scale(&mut self, factor: f32) {
        self.x *= factor;
        self.y *= factor;
    }

    /// Move towards `target` by `factor` of the remaining distance
    pub fn approach(&mut self, target: &RotationState, factor: f32) {
        self.x += (target.x - self.x) * factor;
        self.y += (target.y - self.y) * factor;
    }

    pub fn magnitude(&self) -> f32 {
        self.x.hypot(self.y)
    }
}

/// Transform builder for the model transform
pub struct Transform;

impl Transform {
    /// Rotation about X by pitch, then about Y by yaw (right-handed)
    pub fn rotation_matrix(rotation: &RotationState) -> Rotation3<f32> {
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), rotation.x);
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), rotation.y);

        // Apply rotations in order: X, Y
        ry * rx
    }

    /// Uniformly scale a model-space point, then rotate it
    pub fn apply(
        point: &Point3<f32>,
        scale: f32,
        rotation: &Rotation3<f32>,
    ) -> Point3<f32> {
        rotation * Point3::from(point.coords * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_rotation_state() {
        let mut state = RotationState::zero();
        assert_eq!(state.x, 0.0);
        assert_eq!(state.y, 0.0);

        state.rotate(0.1, 0.2);
        assert!((state.x - 0.1).abs() < 1e-6);
        assert!((state.y - 0.2).abs() < 1e-6);

        state.scale(0.5);
        assert!((state.x - 0.05).abs() < 1e-6);
        assert!((state.y - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_identity_rotation() {
        let rotation = Transform::rotation_matrix(&RotationState::zero());
        assert!((rotation.matrix() - nalgebra::Matrix3::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_pitch_follows_right_hand_rule() {
        // +90 degrees about X takes +Y to +Z
        let rotation = Transform::rotation_matrix(&RotationState::new(FRAC_PI_2, 0.0));
        let p = rotation * Point3::new(0.0, 1.0, 0.0);
        assert!((p - Point3::new(0.0, 0.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_yaw_follows_right_hand_rule() {
        // +90 degrees about Y takes +Z to +X
        let rotation = Transform::rotation_matrix(&RotationState::new(0.0, FRAC_PI_2));
        let p = rotation * Point3::new(0.0, 0.0, 1.0);
        assert!((p - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_pitch_applies_before_yaw() {
        let rotation = Transform::rotation_matrix(&RotationState::new(FRAC_PI_2, FRAC_PI_2));
        // Y -> Z under pitch, then Z -> X under yaw
        let p = Transform::apply(&Point3::new(0.0, 2.0, 0.0), 0.5, &rotation);
        assert!((p - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }
}
