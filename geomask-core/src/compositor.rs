//! Draws the fixed layer stack for one frame
use nalgebra::Point2;

use crate::animation::FrameState;
use crate::config::Settings;
use crate::geometry::{Mesh, GLOW_VERTICES, LEFT_EYE, NOSE_BRIDGE, NOSE_TIP, RIGHT_EYE};
use crate::lighting::{base_tone, depth_order, lit_color, Light};
use crate::particles::ParticleField;
use crate::projection::{ProjectedMesh, Viewport};
use crate::surface::{GradientStop, Layer, Paint, Rgb, Rgba, Surface};

const AMBIENT_RADIUS: f32 = 250.0;
const WIRE_COLOR: Rgb = Rgb::new(100, 140, 220);
const WIRE_WIDTH: f32 = 0.6;
const RIM_WIDTH: f32 = 0.9;
/// Edges whose average depth lies behind this (× scale) get a rim stroke
const RIM_THRESHOLD: f32 = -15.0;
/// Depth (× scale) at which the rim reaches full strength
const RIM_FALLOFF: f32 = 100.0;
const EYE_GLOW_RADIUS: f32 = 14.0;
const PUPIL_CORE: Rgb = Rgb::new(200, 245, 255);
const IRIS_MIN_OPENNESS: f32 = 0.1;
const PUPIL_MIN_OPENNESS: f32 = 0.2;
const LID_MIN_PHASE: f32 = 0.05;
const LID_COLOR: Rgb = Rgb::new(5, 5, 15);
const LID_WIDTH: f32 = 16.0;
const LID_HEIGHT: f32 = 18.0;
const NOSE_WIDTH: f32 = 1.2;
const GLOW_DOT_RADIUS: f32 = 2.0;
const SCANLINE_BAND: f32 = 60.0;
const STATIC_LINE_SPACING: usize = 6;
const STATIC_LINE_MIN_INTENSITY: f32 = 0.2;

/// Everything one frame of compositing reads
pub struct Scene<'a> {
    pub mesh: &'a Mesh,
    pub projected: &'a ProjectedMesh,
    pub frame: &'a FrameState,
    pub viewport: &'a Viewport,
    pub particles: &'a ParticleField,
    pub settings: &'a Settings,
    /// Global scale derived from the surface size
    pub scale: f32,
}

impl Scene<'_> {
    fn center(&self) -> Point2<f32> {
        let c = self.viewport.center();
        Point2::new(c.x, c.y + self.frame.breath_offset)
    }
}

#[derive(Debug, Default)]
pub struct Compositor {
    light: Light,
    order: Vec<(usize, f32)>,
}

impl Compositor {
    pub fn new(light: Light) -> Self {
        Self {
            light,
            order: Vec::new(),
        }
    }

    /// Clear `surface` and draw every layer, back to front
    pub fn draw<S: Surface + ?Sized>(&mut self, surface: &mut S, scene: &Scene) {
        surface.clear();
        if scene.viewport.is_empty() {
            return;
        }

        surface.begin_layer(Layer::AmbientGlow);
        self.ambient_glow(surface, scene);
        surface.begin_layer(Layer::Particles);
        self.particles(surface, scene);
        surface.begin_layer(Layer::Faces);
        self.faces(surface, scene);
        surface.begin_layer(Layer::Wireframe);
        self.wireframe(surface, scene);
        surface.begin_layer(Layer::RimLight);
        self.rim_light(surface, scene);
        surface.begin_layer(Layer::Eyes);
        self.eyes(surface, scene);
        surface.begin_layer(Layer::NoseAccent);
        self.nose_accent(surface, scene);
        surface.begin_layer(Layer::KeyVertices);
        self.key_vertices(surface, scene);
        surface.begin_layer(Layer::Scanlines);
        self.scanlines(surface, scene);
    }

    /// Face indices in the order the last frame painted them
    pub fn face_order(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().map(|(index, _)| *index)
    }

    fn ambient_glow<S: Surface + ?Sized>(&self, surface: &mut S, scene: &Scene) {
        let s = scene.settings;
        let alpha = (0.03 + scene.frame.glow * 0.04) * scene.frame.intensity;
        let paint = Paint::Radial {
            center: scene.center(),
            radius: AMBIENT_RADIUS * scene.scale,
            stops: vec![
                GradientStop::new(0.0, s.blue.with_alpha(alpha)),
                GradientStop::new(0.5, s.violet.with_alpha(alpha * 0.4)),
                GradientStop::new(1.0, Rgba::TRANSPARENT),
            ],
        };
        surface.fill_rect(
            Point2::origin(),
            scene.viewport.width,
            scene.viewport.height,
            &paint,
        );
    }

    fn particles<S: Surface + ?Sized>(&self, surface: &mut S, scene: &Scene) {
        let frame = scene.frame;
        for particle in scene.particles.particles() {
            let alpha = particle.alpha_at(frame.time, frame.activity, frame.fade);
            surface.fill_circle(
                particle.position,
                particle.radius * scene.scale,
                &Paint::Solid(scene.settings.cyan.with_alpha(alpha)),
            );
        }
    }

    fn faces<S: Surface + ?Sized>(&mut self, surface: &mut S, scene: &Scene) {
        let faces = scene.mesh.faces();
        let screen = scene.projected.screen();
        let rotated = scene.projected.rotated();

        depth_order(faces, screen, &mut self.order);
        for &(index, _) in &self.order {
            let face = &faces[index];
            let diffuse = self.light.diffuse(&face.normal(rotated));
            let color = lit_color(base_tone(face.shade, scene.settings), diffuse, scene.frame.glow);
            let [a, b, c] = face.vertices;
            surface.fill_triangle(
                [screen[a].position, screen[b].position, screen[c].position],
                color,
            );
        }
    }

    fn wireframe<S: Surface + ?Sized>(&self, surface: &mut S, scene: &Scene) {
        let screen = scene.projected.screen();
        let paint = Paint::Solid(
            WIRE_COLOR.with_alpha(scene.settings.wire_alpha * scene.frame.intensity),
        );
        for edge in scene.mesh.edges() {
            surface.stroke_line(screen[edge.a].position, screen[edge.b].position, WIRE_WIDTH, &paint);
        }
    }

    fn rim_light<S: Surface + ?Sized>(&self, surface: &mut S, scene: &Scene) {
        let screen = scene.projected.screen();
        let threshold = RIM_THRESHOLD * scene.scale;
        let falloff = RIM_FALLOFF * scene.scale;
        for edge in scene.mesh.edges() {
            let (a, b) = (&screen[edge.a], &screen[edge.b]);
            let depth = (a.depth + b.depth) / 2.0;
            if depth >= threshold {
                continue;
            }
            let alpha = (depth.abs() / falloff).min(1.0) * 0.3 * scene.frame.intensity;
            surface.stroke_line(
                a.position,
                b.position,
                RIM_WIDTH,
                &Paint::Solid(scene.settings.cyan.with_alpha(alpha)),
            );
        }
    }

    fn eyes<S: Surface + ?Sized>(&self, surface: &mut S, scene: &Scene) {
        let s = scene.settings;
        let frame = scene.frame;
        let sc = scene.scale;
        let openness = frame.eye_openness();

        for id in [LEFT_EYE, RIGHT_EYE] {
            let Some(socket) = scene.projected.vertex(id) else {
                continue;
            };
            let size = sc * socket.scale;
            let pupil = socket.position + frame.eye_offset * sc;

            // Outer glow dims with the lid but never vanishes
            let glow_radius = EYE_GLOW_RADIUS * size * (0.6 + frame.glow * 0.4);
            let glow_alpha = (0.4 + frame.glow * 0.25) * frame.intensity * (0.3 + openness * 0.7);
            surface.fill_circle(
                pupil,
                glow_radius,
                &Paint::Radial {
                    center: pupil,
                    radius: glow_radius,
                    stops: vec![
                        GradientStop::new(0.0, s.cyan.with_alpha(glow_alpha)),
                        GradientStop::new(0.3, s.blue.with_alpha(glow_alpha * 0.5)),
                        GradientStop::new(1.0, Rgba::TRANSPARENT),
                    ],
                },
            );

            if openness > IRIS_MIN_OPENNESS {
                surface.stroke_circle(
                    pupil,
                    s.iris_size * size * openness,
                    sc,
                    s.cyan.with_alpha(0.6 * frame.intensity * openness),
                );
            }

            if openness > PUPIL_MIN_OPENNESS {
                let alpha = (0.7 + frame.glow * 0.3) * frame.intensity * openness;
                surface.fill_circle(
                    pupil,
                    s.pupil_size * size * openness,
                    &Paint::Solid(PUPIL_CORE.with_alpha(alpha)),
                );
            }

            // The lid goes last so it covers glow, iris and pupil
            if frame.blink > LID_MIN_PHASE {
                surface.fill_ellipse(
                    socket.position,
                    LID_WIDTH * sc,
                    LID_HEIGHT * sc * frame.blink,
                    LID_COLOR.with_alpha(frame.blink * 0.9),
                );
            }
        }
    }

    fn nose_accent<S: Surface + ?Sized>(&self, surface: &mut S, scene: &Scene) {
        let (Some(bridge), Some(tip)) = (
            scene.projected.vertex(NOSE_BRIDGE),
            scene.projected.vertex(NOSE_TIP),
        ) else {
            return;
        };
        let (bridge, tip) = (bridge.position, tip.position);
        let paint = Paint::Linear {
            from: bridge,
            to: tip,
            stops: vec![
                GradientStop::new(0.0, scene.settings.cyan.with_alpha(0.08 * scene.frame.intensity)),
                GradientStop::new(1.0, Rgba::TRANSPARENT),
            ],
        };
        surface.stroke_line(bridge, tip, NOSE_WIDTH, &paint);
    }

    fn key_vertices<S: Surface + ?Sized>(&self, surface: &mut S, scene: &Scene) {
        let alpha = (0.12 + scene.frame.glow * 0.08) * scene.frame.intensity;
        let paint = Paint::Solid(scene.settings.cyan.with_alpha(alpha));
        for id in GLOW_VERTICES {
            let Some(vertex) = scene.projected.vertex(id) else {
                continue;
            };
            surface.fill_circle(
                vertex.position,
                GLOW_DOT_RADIUS * scene.scale * vertex.scale,
                &paint,
            );
        }
    }

    fn scanlines<S: Surface + ?Sized>(&self, surface: &mut S, scene: &Scene) {
        let (width, height) = (scene.viewport.width, scene.viewport.height);
        let intensity = scene.frame.intensity;
        let half = SCANLINE_BAND / 2.0;

        let y = (scene.frame.time * scene.settings.scanline_speed).rem_euclid(height);
        let band = Paint::Linear {
            from: Point2::new(0.0, y - half),
            to: Point2::new(0.0, y + half),
            stops: vec![
                GradientStop::new(0.0, Rgba::TRANSPARENT),
                GradientStop::new(
                    0.5,
                    scene.settings.cyan.with_alpha(scene.settings.scanline_alpha * intensity),
                ),
                GradientStop::new(1.0, Rgba::TRANSPARENT),
            ],
        };
        surface.fill_rect(Point2::new(0.0, y - half), width, SCANLINE_BAND, &band);

        if intensity > STATIC_LINE_MIN_INTENSITY {
            let paint = Paint::Solid(Rgba::new(255, 255, 255, 0.006 * intensity));
            for line in (0..height.ceil() as usize).step_by(STATIC_LINE_SPACING) {
                surface.fill_rect(Point2::new(0.0, line as f32), width, 1.0, &paint);
            }
        }
    }
}
