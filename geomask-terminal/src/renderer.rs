//! Truecolor half-block rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use geomask_core::{Paint, Rgb, Rgba, Surface};
use nalgebra::Point2;
use std::io::Write;

/// Logical surface pixels covered by one sample along each axis
pub const PX_PER_SAMPLE: f32 = 8.0;

/// Page background the silhouette is composited over
pub const BACKGROUND: Rgb = Rgb::new(6, 6, 14);

/// Upper half block: foreground paints the top sample, background the bottom
const HALF_BLOCK: char = '▀';

/// Lowest coverage a sub-sample stroke or dot is drawn with
const MIN_COVERAGE: f32 = 0.35;

/// A grid of color samples, two per terminal cell, drawn through [`Surface`].
///
/// The surface is exposed in logical pixels so the compositor's constants
/// (line widths, eye radii, scanline spacing) keep their proportions.
pub struct CellCanvas {
    columns: usize,
    rows: usize,
    samples: Vec<[f32; 3]>,
}

impl CellCanvas {
    pub fn new(columns: u16, rows: u16) -> Self {
        let mut canvas = Self {
            columns: 0,
            rows: 0,
            samples: Vec::new(),
        };
        canvas.resize(columns, rows);
        canvas
    }

    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.columns = columns as usize;
        self.rows = rows as usize;
        self.samples = vec![to_linear(BACKGROUND); self.columns * self.rows * 2];
    }

    /// Size in logical pixels
    pub fn logical_size(&self) -> (f32, f32) {
        (
            self.columns as f32 * PX_PER_SAMPLE,
            (self.rows * 2) as f32 * PX_PER_SAMPLE,
        )
    }

    /// Logical position of the center of a terminal cell
    pub fn cell_center(&self, column: u16, row: u16) -> Point2<f32> {
        Point2::new(
            (column as f32 + 0.5) * PX_PER_SAMPLE,
            (row as f32 + 0.5) * 2.0 * PX_PER_SAMPLE,
        )
    }

    /// Color of the sample at grid position (x, y)
    pub fn sample(&self, x: usize, y: usize) -> Option<Rgb> {
        self.index(x as i64, y as i64)
            .map(|i| from_linear(self.samples[i]))
    }

    fn sample_height(&self) -> usize {
        self.rows * 2
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.columns || y as usize >= self.sample_height() {
            return None;
        }
        Some(y as usize * self.columns + x as usize)
    }

    /// Logical position of the center of sample (x, y)
    fn sample_center(x: i64, y: i64) -> Point2<f32> {
        Point2::new(
            (x as f32 + 0.5) * PX_PER_SAMPLE,
            (y as f32 + 0.5) * PX_PER_SAMPLE,
        )
    }

    /// Composite `color` over the sample with the given coverage
    fn blend(&mut self, x: i64, y: i64, color: Rgba, coverage: f32) {
        let Some(index) = self.index(x, y) else {
            return;
        };
        let alpha = (color.a * coverage).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let src = to_linear(color.rgb());
        let dst = &mut self.samples[index];
        for channel in 0..3 {
            dst[channel] += (src[channel] - dst[channel]) * alpha;
        }
    }

    /// Sample-space bounding box of a logical-space rectangle, clipped
    fn bounds(&self, min: Point2<f32>, max: Point2<f32>) -> (i64, i64, i64, i64) {
        let min_x = ((min.x / PX_PER_SAMPLE).floor() as i64).max(0);
        let min_y = ((min.y / PX_PER_SAMPLE).floor() as i64).max(0);
        let max_x = ((max.x / PX_PER_SAMPLE).ceil() as i64).min(self.columns as i64 - 1);
        let max_y = ((max.y / PX_PER_SAMPLE).ceil() as i64).min(self.sample_height() as i64 - 1);
        (min_x, min_y, max_x, max_y)
    }

    /// Fill every sample whose center satisfies `inside`, or the nearest
    /// sample when the shape is smaller than one sample
    fn fill_shape<F>(&mut self, center: Point2<f32>, extent: (f32, f32), paint: &Paint, inside: F)
    where
        F: Fn(Point2<f32>) -> bool,
    {
        let (rx, ry) = extent;
        let (min_x, min_y, max_x, max_y) = self.bounds(
            Point2::new(center.x - rx, center.y - ry),
            Point2::new(center.x + rx, center.y + ry),
        );
        let mut hit = false;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let point = Self::sample_center(x, y);
                if inside(point) {
                    hit = true;
                    self.blend(x, y, paint.sample(point), 1.0);
                }
            }
        }
        if !hit {
            let area = std::f32::consts::PI * rx * ry / (PX_PER_SAMPLE * PX_PER_SAMPLE);
            let (x, y) = (
                (center.x / PX_PER_SAMPLE).floor() as i64,
                (center.y / PX_PER_SAMPLE).floor() as i64,
            );
            self.blend(x, y, paint.sample(center), area.clamp(MIN_COVERAGE, 1.0));
        }
    }

    /// Write the canvas to the terminal, one cell per two samples
    pub fn present<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current: Option<(Rgb, Rgb)> = None;
        for row in 0..self.rows {
            writer.queue(cursor::MoveTo(0, row as u16))?;
            for column in 0..self.columns {
                let top = from_linear(self.samples[row * 2 * self.columns + column]);
                let bottom = from_linear(self.samples[(row * 2 + 1) * self.columns + column]);
                if current != Some((top, bottom)) {
                    writer.queue(SetForegroundColor(color(top)))?;
                    writer.queue(SetBackgroundColor(color(bottom)))?;
                    current = Some((top, bottom));
                }
                writer.queue(Print(HALF_BLOCK))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Surface for CellCanvas {
    fn clear(&mut self) {
        let background = to_linear(BACKGROUND);
        self.samples.fill(background);
    }

    fn fill_rect(&mut self, origin: Point2<f32>, width: f32, height: f32, paint: &Paint) {
        let (min_x, min_y, max_x, max_y) =
            self.bounds(origin, Point2::new(origin.x + width, origin.y + height));
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let point = Self::sample_center(x, y);
                // Rects thinner than a sample still cover it partially
                let covered_x = overlap(origin.x, width, x);
                let covered_y = overlap(origin.y, height, y);
                if covered_x > 0.0 && covered_y > 0.0 {
                    self.blend(x, y, paint.sample(point), covered_x * covered_y);
                }
            }
        }
    }

    fn fill_triangle(&mut self, points: [Point2<f32>; 3], color: Rgba) {
        let [v0, v1, v2] = points;
        let (min_x, min_y, max_x, max_y) = self.bounds(
            Point2::new(v0.x.min(v1.x).min(v2.x), v0.y.min(v1.y).min(v2.y)),
            Point2::new(v0.x.max(v1.x).max(v2.x), v0.y.max(v1.y).max(v2.y)),
        );

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Self::sample_center(x, y);
                if let Some((w0, w1, w2)) = barycentric(v0, v1, v2, p) {
                    // Faces arrive in either winding once the head turns
                    let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                        || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
                    if inside {
                        self.blend(x, y, color, 1.0);
                    }
                }
            }
        }
    }

    fn stroke_line(&mut self, from: Point2<f32>, to: Point2<f32>, width: f32, paint: &Paint) {
        let coverage = (width / PX_PER_SAMPLE).clamp(MIN_COVERAGE, 1.0);
        let delta = (to - from) / PX_PER_SAMPLE;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as usize;

        // DDA walk, one plot per sample step
        let mut last = None;
        for step in 0..=steps {
            let point = from + (to - from) * (step as f32 / steps as f32);
            let cell = (
                (point.x / PX_PER_SAMPLE).floor() as i64,
                (point.y / PX_PER_SAMPLE).floor() as i64,
            );
            if last == Some(cell) {
                continue;
            }
            last = Some(cell);
            self.blend(cell.0, cell.1, paint.sample(point), coverage);
        }
    }

    fn fill_circle(&mut self, center: Point2<f32>, radius: f32, paint: &Paint) {
        if radius <= 0.0 {
            return;
        }
        let radius_sq = radius * radius;
        self.fill_shape(center, (radius, radius), paint, |p| {
            (p - center).norm_squared() <= radius_sq
        });
    }

    fn stroke_circle(&mut self, center: Point2<f32>, radius: f32, width: f32, color: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let half = (width / 2.0).max(PX_PER_SAMPLE / 2.0);
        let reach = radius + half;
        let (min_x, min_y, max_x, max_y) = self.bounds(
            Point2::new(center.x - reach, center.y - reach),
            Point2::new(center.x + reach, center.y + reach),
        );
        let coverage = (width / PX_PER_SAMPLE).clamp(MIN_COVERAGE, 1.0);
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let distance = (Self::sample_center(x, y) - center).norm();
                if (distance - radius).abs() <= half {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    fn fill_ellipse(&mut self, center: Point2<f32>, radius_x: f32, radius_y: f32, color: Rgba) {
        if radius_x <= 0.0 || radius_y <= 0.0 {
            return;
        }
        self.fill_shape(center, (radius_x, radius_y), &Paint::Solid(color), |p| {
            let dx = (p.x - center.x) / radius_x;
            let dy = (p.y - center.y) / radius_y;
            dx * dx + dy * dy <= 1.0
        });
    }
}

/// Fraction of sample `index` covered by the span [start, start + length]
fn overlap(start: f32, length: f32, index: i64) -> f32 {
    let lo = index as f32 * PX_PER_SAMPLE;
    let hi = lo + PX_PER_SAMPLE;
    ((start + length).min(hi) - start.max(lo)).max(0.0) / PX_PER_SAMPLE
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: Point2<f32>,
    v1: Point2<f32>,
    v2: Point2<f32>,
    p: Point2<f32>,
) -> Option<(f32, f32, f32)> {
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.y - v2.y) * (p.x - v2.x) + (v2.x - v1.x) * (p.y - v2.y)) / denom;
    let w1 = ((v2.y - v0.y) * (p.x - v2.x) + (v0.x - v2.x) * (p.y - v2.y)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

fn to_linear(color: Rgb) -> [f32; 3] {
    [color.r as f32, color.g as f32, color.b as f32]
}

fn from_linear(channels: [f32; 3]) -> Rgb {
    let [r, g, b] = channels.map(|c| c.round().clamp(0.0, 255.0) as u8);
    Rgb::new(r, g, b)
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}
