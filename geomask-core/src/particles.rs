//! Ambient dust drifting behind the silhouette
use nalgebra::{Point2, Vector2};
use rand::Rng;
use std::f32::consts::TAU;

use crate::projection::Viewport;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Point2<f32>,
    /// Pixels per 1/60s
    pub velocity: Vector2<f32>,
    /// Unscaled radius; multiplied by the global scale when drawn
    pub radius: f32,
    pub alpha: f32,
    pub phase: f32,
}

impl Particle {
    /// Alpha after flicker, activity and scroll fade
    pub fn alpha_at(&self, time: f32, activity: f32, fade: f32) -> f32 {
        let flicker = 0.6 + 0.4 * (time * 1.5 + self.phase).sin();
        self.alpha * flicker * activity * fade
    }
}

/// A fixed-size particle set that wraps around the surface edges
#[derive(Debug, Clone, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
    bounds: Vector2<f32>,
}

impl ParticleField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Throw away every particle and scatter `count` new ones over `viewport`
    pub fn reseed<R: Rng>(&mut self, viewport: &Viewport, count: usize, speed: f32, rng: &mut R) {
        self.bounds = Vector2::new(viewport.width, viewport.height);
        self.particles.clear();
        self.particles.extend((0..count).map(|_| Particle {
            position: Point2::new(
                rng.gen::<f32>() * viewport.width,
                rng.gen::<f32>() * viewport.height,
            ),
            velocity: Vector2::new(
                (rng.gen::<f32>() - 0.5) * speed,
                (rng.gen::<f32>() - 0.5) * speed,
            ),
            radius: rng.gen_range(0.5..2.0),
            alpha: rng.gen_range(0.05..0.35),
            phase: rng.gen::<f32>() * TAU,
        }));
    }

    /// Move every particle by `steps` 1/60s increments, wrapping at the edges
    pub fn step(&mut self, steps: f32) {
        let (width, height) = (self.bounds.x, self.bounds.y);
        for particle in &mut self.particles {
            particle.position += particle.velocity * steps;
            let p = &mut particle.position;
            if p.x < 0.0 {
                p.x = width;
            } else if p.x > width {
                p.x = 0.0;
            }
            if p.y < 0.0 {
                p.y = height;
            } else if p.y > height {
                p.y = 0.0;
            }
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_reseed_fills_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut field = ParticleField::new();
        let viewport = Viewport::new(320.0, 180.0);
        field.reseed(&viewport, 30, 0.35, &mut rng);

        assert_eq!(field.len(), 30);
        for p in field.particles() {
            assert!((0.0..=320.0).contains(&p.position.x));
            assert!((0.0..=180.0).contains(&p.position.y));
            assert!(p.velocity.x.abs() <= 0.175 && p.velocity.y.abs() <= 0.175);
            assert!((0.5..2.0).contains(&p.radius));
        }

        field.reseed(&Viewport::new(10.0, 10.0), 5, 0.35, &mut rng);
        assert_eq!(field.len(), 5);
        assert!(field.particles().iter().all(|p| p.position.x <= 10.0));
    }

    #[test]
    fn test_step_wraps_edges() {
        let mut field = ParticleField::new();
        field.bounds = Vector2::new(100.0, 50.0);
        field.particles.push(Particle {
            position: Point2::new(99.9, 0.1),
            velocity: Vector2::new(0.5, -0.5),
            radius: 1.0,
            alpha: 0.2,
            phase: 0.0,
        });
        field.step(1.0);
        assert_eq!(field.particles()[0].position, Point2::new(0.0, 50.0));
    }

    #[test]
    fn test_alpha_scales_with_activity_and_fade() {
        let particle = Particle {
            position: Point2::origin(),
            velocity: Vector2::zeros(),
            radius: 1.0,
            alpha: 0.2,
            phase: 0.0,
        };
        // sin(0) = 0 leaves the flicker at 0.6
        assert!((particle.alpha_at(0.0, 1.0, 1.0) - 0.12).abs() < 1e-6);
        assert!((particle.alpha_at(0.0, 0.5, 0.5) - 0.03).abs() < 1e-6);
    }
}
