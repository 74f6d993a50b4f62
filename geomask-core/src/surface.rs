//! Drawing surface abstraction shared by every host
use nalgebra::Point2;
use std::fmt;

/// An opaque 8-bit color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn with_alpha(self, a: f32) -> Rgba {
        Rgba::new(self.r, self.g, self.b, a)
    }
}

/// An 8-bit color with a floating point alpha in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

/// Formats as a CSS `rgba()` color
impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({}, {}, {}, {:.4})",
            self.r,
            self.g,
            self.b,
            self.a.clamp(0.0, 1.0)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgba,
}

impl GradientStop {
    pub fn new(offset: f32, color: Rgba) -> Self {
        Self { offset, color }
    }
}

/// How a fill or stroke is colored
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    Radial {
        center: Point2<f32>,
        radius: f32,
        stops: Vec<GradientStop>,
    },
    Linear {
        from: Point2<f32>,
        to: Point2<f32>,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    /// Resolve the paint at a point, interpolating gradient stops linearly
    pub fn sample(&self, point: Point2<f32>) -> Rgba {
        match self {
            Paint::Solid(color) => *color,
            Paint::Radial {
                center,
                radius,
                stops,
            } => {
                let t = if *radius > 0.0 {
                    (point - center).norm() / radius
                } else {
                    1.0
                };
                interpolate(stops, t)
            }
            Paint::Linear { from, to, stops } => {
                let axis = to - from;
                let length_sq = axis.norm_squared();
                let t = if length_sq > 0.0 {
                    (point - from).dot(&axis) / length_sq
                } else {
                    0.0
                };
                interpolate(stops, t)
            }
        }
    }
}

fn interpolate(stops: &[GradientStop], t: f32) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Rgba::TRANSPARENT,
    };
    if t <= first.offset {
        return first.color;
    }
    if t >= last.offset {
        return last.color;
    }

    for pair in stops.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if t >= lo.offset && t <= hi.offset {
            let span = (hi.offset - lo.offset).max(f32::EPSILON);
            let k = (t - lo.offset) / span;
            let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * k).round() as u8;
            return Rgba::new(
                lerp(lo.color.r, hi.color.r),
                lerp(lo.color.g, hi.color.g),
                lerp(lo.color.b, hi.color.b),
                lo.color.a + (hi.color.a - lo.color.a) * k,
            );
        }
    }
    last.color
}

/// Visual layers in the order the compositor draws them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    AmbientGlow,
    Particles,
    Faces,
    Wireframe,
    RimLight,
    Eyes,
    NoseAccent,
    KeyVertices,
    Scanlines,
}

/// A 2D immediate-mode drawing target
pub trait Surface {
    /// Called before the first draw call of each layer
    fn begin_layer(&mut self, _layer: Layer) {}

    fn clear(&mut self);

    fn fill_rect(&mut self, origin: Point2<f32>, width: f32, height: f32, paint: &Paint);

    fn fill_triangle(&mut self, points: [Point2<f32>; 3], color: Rgba);

    fn stroke_line(&mut self, from: Point2<f32>, to: Point2<f32>, width: f32, paint: &Paint);

    fn fill_circle(&mut self, center: Point2<f32>, radius: f32, paint: &Paint);

    fn stroke_circle(&mut self, center: Point2<f32>, radius: f32, width: f32, color: Rgba);

    fn fill_ellipse(&mut self, center: Point2<f32>, radius_x: f32, radius_y: f32, color: Rgba);
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Layer(Layer),
    Clear,
    FillRect {
        origin: Point2<f32>,
        width: f32,
        height: f32,
        paint: Paint,
    },
    FillTriangle {
        points: [Point2<f32>; 3],
        color: Rgba,
    },
    StrokeLine {
        from: Point2<f32>,
        to: Point2<f32>,
        width: f32,
        paint: Paint,
    },
    FillCircle {
        center: Point2<f32>,
        radius: f32,
        paint: Paint,
    },
    StrokeCircle {
        center: Point2<f32>,
        radius: f32,
        width: f32,
        color: Rgba,
    },
    FillEllipse {
        center: Point2<f32>,
        radius_x: f32,
        radius_y: f32,
        color: Rgba,
    },
}

/// Surface that records every call instead of rasterizing
#[derive(Debug, Default)]
pub struct Recorder {
    pub commands: Vec<DrawCommand>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands issued between the start of `layer` and the next layer marker
    pub fn layer(&self, layer: Layer) -> &[DrawCommand] {
        let start = match self
            .commands
            .iter()
            .position(|c| *c == DrawCommand::Layer(layer))
        {
            Some(index) => index + 1,
            None => return &[],
        };
        let end = self.commands[start..]
            .iter()
            .position(|c| matches!(c, DrawCommand::Layer(_)))
            .map_or(self.commands.len(), |offset| start + offset);
        &self.commands[start..end]
    }

    /// Layer markers in the order they were issued
    pub fn layers(&self) -> Vec<Layer> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Layer(layer) => Some(*layer),
                _ => None,
            })
            .collect()
    }
}

impl Surface for Recorder {
    fn begin_layer(&mut self, layer: Layer) {
        self.commands.push(DrawCommand::Layer(layer));
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_rect(&mut self, origin: Point2<f32>, width: f32, height: f32, paint: &Paint) {
        self.commands.push(DrawCommand::FillRect {
            origin,
            width,
            height,
            paint: paint.clone(),
        });
    }

    fn fill_triangle(&mut self, points: [Point2<f32>; 3], color: Rgba) {
        self.commands.push(DrawCommand::FillTriangle { points, color });
    }

    fn stroke_line(&mut self, from: Point2<f32>, to: Point2<f32>, width: f32, paint: &Paint) {
        self.commands.push(DrawCommand::StrokeLine {
            from,
            to,
            width,
            paint: paint.clone(),
        });
    }

    fn fill_circle(&mut self, center: Point2<f32>, radius: f32, paint: &Paint) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            paint: paint.clone(),
        });
    }

    fn stroke_circle(&mut self, center: Point2<f32>, radius: f32, width: f32, color: Rgba) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            width,
            color,
        });
    }

    fn fill_ellipse(&mut self, center: Point2<f32>, radius_x: f32, radius_y: f32, color: Rgba) {
        self.commands.push(DrawCommand::FillEllipse {
            center,
            radius_x,
            radius_y,
            color,
        });
    }
}
