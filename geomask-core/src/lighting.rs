//! Flat per-face lighting and painter's-algorithm ordering
use nalgebra::{Unit, Vector3};

use crate::config::Settings;
use crate::geometry::Face;
use crate::projection::ScreenVertex;
use crate::surface::{Rgb, Rgba};

/// Directional light fixed in view space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub direction: Unit<Vector3<f32>>,
}

impl Light {
    pub fn new(direction: Vector3<f32>) -> Self {
        Self {
            direction: Unit::new_normalize(direction),
        }
    }

    /// Lambert term for a unit normal, clamped at zero
    pub fn diffuse(&self, normal: &Vector3<f32>) -> f32 {
        normal.dot(self.direction.as_ref()).max(0.0)
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new(Vector3::new(0.3, -0.5, 0.8))
    }
}

/// Fill tone for a face shade level: 3+ light, 1-2 mid, 0 dark
pub fn base_tone(shade: u8, settings: &Settings) -> Rgb {
    match shade {
        0 => settings.fill_dark,
        1 | 2 => settings.fill_mid,
        _ => settings.fill_light,
    }
}

/// Brighten a base tone by the diffuse term and the shared glow pulse.
///
/// Alpha drops slightly as the face turns into the light so highlights
/// stay translucent.
pub fn lit_color(base: Rgb, diffuse: f32, glow: f32) -> Rgba {
    let channel = |value: u8, light: f32, pulse: f32| {
        (value as f32 + diffuse * light + glow * pulse).min(255.0) as u8
    };
    Rgba::new(
        channel(base.r, 40.0, 5.0),
        channel(base.g, 35.0, 5.0),
        channel(base.b, 60.0, 10.0),
        0.92 - diffuse * 0.1,
    )
}

/// Average depth of a face's three projected vertices
pub fn face_depth(face: &Face, screen: &[ScreenVertex]) -> f32 {
    face.vertices.iter().map(|&v| screen[v].depth).sum::<f32>() / 3.0
}

/// Fill `order` with face indices sorted back to front.
///
/// Depth grows towards the front of the authored face (the nose sits at
/// the largest Z), so ascending depth draws the back of the head first. The sort is stable: equal depths keep their authored order.
/// The order is rebuilt from scratch on every call.
pub fn depth_order(faces: &[Face], screen: &[ScreenVertex], order: &mut Vec<(usize, f32)>) {
    order.clear();
    order.extend(
        faces
            .iter()
            .enumerate()
            .map(|(index, face)| (index, face_depth(face, screen))),
    );
    order.sort_by(|a, b| a.1.total_cmp(&b.1));
}
