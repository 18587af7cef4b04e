use blobsync_rendering::{flatten_quadratic, Color, DrawSurface, ShapeStyle};
use glam::Vec2;
use macroquad::math::Vec2 as MacroquadVec2;

/// Collects the vertices of the current shape and rasterises it on `end_shape`.
///
/// Fills are drawn as a triangle fan around the vertex centroid, which is
/// exact for the star-shaped outlines the engine produces.
#[derive(Debug)]
pub(crate) struct MacroquadSurface {
    curve_segments: u32,
    style: Option<ShapeStyle>,
    points: Vec<Vec2>,
}

impl MacroquadSurface {
    pub(crate) fn new(curve_segments: u32) -> Self {
        Self {
            curve_segments: curve_segments.max(1),
            style: None,
            points: Vec::new(),
        }
    }
}

impl DrawSurface for MacroquadSurface {
    fn begin_shape(&mut self, style: &ShapeStyle) {
        self.style = Some(*style);
        self.points.clear();
    }

    fn vertex(&mut self, point: Vec2) {
        self.points.push(point);
    }

    fn quadratic_vertex(&mut self, control: Vec2, end: Vec2) {
        let start = self.points.last().copied().unwrap_or(control);
        self.points
            .extend(flatten_quadratic(start, control, end, self.curve_segments));
    }

    fn end_shape(&mut self, close: bool) {
        let Some(style) = self.style.take() else {
            return;
        };
        // Malformed outlines carry NaN coordinates; they are dropped, never drawn.
        self.points.retain(|point| point.is_finite());
        if self.points.len() < 2 {
            return;
        }

        if let Some(fill) = style.fill.filter(|_| self.points.len() >= 3) {
            let color = to_macroquad_color(fill);
            let centroid = self.points.iter().copied().sum::<Vec2>() / self.points.len() as f32;
            for (index, a) in self.points.iter().enumerate() {
                let b = self.points[(index + 1) % self.points.len()];
                macroquad::shapes::draw_triangle(
                    to_macroquad_vec(centroid),
                    to_macroquad_vec(*a),
                    to_macroquad_vec(b),
                    color,
                );
            }
        }

        if let Some(stroke) = style.stroke {
            let color = to_macroquad_color(stroke);
            let segments = if close {
                self.points.len()
            } else {
                self.points.len() - 1
            };
            for index in 0..segments {
                let a = self.points[index];
                let b = self.points[(index + 1) % self.points.len()];
                macroquad::shapes::draw_line(a.x, a.y, b.x, b.y, style.stroke_weight, color);
            }
        }
    }

    fn rect(&mut self, center: Vec2, size: Vec2, color: Color) {
        macroquad::shapes::draw_rectangle(
            center.x - size.x / 2.0,
            center.y - size.y / 2.0,
            size.x,
            size.y,
            to_macroquad_color(color),
        );
    }
}

fn to_macroquad_vec(point: Vec2) -> MacroquadVec2 {
    MacroquadVec2::new(point.x, point.y)
}

pub(crate) fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
