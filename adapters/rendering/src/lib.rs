#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Blobsync adapters.

use anyhow::Result as AnyResult;
use blobsync_core::{Canvas, Hsba, PathCommand};
use glam::{Affine2, Vec2};
use std::time::Duration;

/// Straight-alpha RGBA color handed to draw surfaces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Converts a hue/saturation/brightness color into RGB.
    #[must_use]
    pub fn from_hsba(color: Hsba) -> Self {
        let hue = color.hue.rem_euclid(360.0) / 60.0;
        let saturation = (color.saturation / 100.0).clamp(0.0, 1.0);
        let value = (color.brightness / 100.0).clamp(0.0, 1.0);

        let chroma = value * saturation;
        let secondary = chroma * (1.0 - (hue % 2.0 - 1.0).abs());
        let (red, green, blue) = match hue as u32 {
            0 => (chroma, secondary, 0.0),
            1 => (secondary, chroma, 0.0),
            2 => (0.0, chroma, secondary),
            3 => (0.0, secondary, chroma),
            4 => (secondary, 0.0, chroma),
            _ => (chroma, 0.0, secondary),
        };
        let offset = value - chroma;

        Self {
            red: red + offset,
            green: green + offset,
            blue: blue + offset,
            alpha: color.alpha.clamp(0.0, 1.0),
        }
    }
}

impl From<Hsba> for Color {
    fn from(color: Hsba) -> Self {
        Self::from_hsba(color)
    }
}

/// Input the adapter observed during one frame.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Whether the adapter detected a play/pause request on this frame.
    pub toggle_playback: bool,
    /// New canvas dimensions when the window was resized on this frame.
    pub resize: Option<Canvas>,
}

/// Fill and stroke applied to a shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeStyle {
    /// Fill color, `None` leaves the interior empty.
    pub fill: Option<Color>,
    /// Stroke color, `None` leaves the outline undrawn.
    pub stroke: Option<Color>,
    /// Stroke width in pixels.
    pub stroke_weight: f32,
}

/// Outline path placed on the canvas with a transform.
#[derive(Clone, Debug, PartialEq)]
pub struct OutlinePresentation {
    /// Path commands in the outline's own coordinates.
    pub path: Vec<PathCommand>,
    /// Maps outline coordinates onto the canvas.
    pub transform: Affine2,
    /// Styling of the outline.
    pub style: ShapeStyle,
}

/// Axis-aligned rectangle drawn for a revealed wall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallPresentation {
    /// Centre of the rectangle in canvas coordinates.
    pub center: Vec2,
    /// Width and height of the rectangle.
    pub size: Vec2,
    /// Fill color of the rectangle.
    pub color: Color,
}

/// Everything drawn on a single frame, in painter's order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    /// Revealed wall rectangles, drawn first.
    pub walls: Vec<WallPresentation>,
    /// Outlines drawn over the walls in order.
    pub outlines: Vec<OutlinePresentation>,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(walls: Vec<WallPresentation>, outlines: Vec<OutlinePresentation>) -> Self {
        Self { walls, outlines }
    }

    /// Removes every drawable while keeping allocations.
    pub fn clear(&mut self) {
        self.walls.clear();
        self.outlines.clear();
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Initial canvas dimensions.
    pub canvas: Canvas,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Whether the backend overlays a frame-rate counter.
    pub show_fps: bool,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, canvas: Canvas, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            canvas,
            clear_color,
            show_fps: false,
            scene,
        }
    }
}

/// Immediate-mode drawing primitives a backend provides.
pub trait DrawSurface {
    /// Starts a new shape drawn with `style`.
    fn begin_shape(&mut self, style: &ShapeStyle);

    /// Appends a straight-line vertex to the current shape.
    fn vertex(&mut self, point: Vec2);

    /// Appends a quadratic curve from the previous vertex to `end`.
    fn quadratic_vertex(&mut self, control: Vec2, end: Vec2);

    /// Finishes the current shape, closing it back to its first vertex when `close` is set.
    fn end_shape(&mut self, close: bool);

    /// Draws a filled axis-aligned rectangle.
    fn rect(&mut self, center: Vec2, size: Vec2, color: Color);
}

/// Paints every wall and outline of `scene` onto `surface`.
pub fn paint_scene<S>(scene: &Scene, surface: &mut S)
where
    S: DrawSurface + ?Sized,
{
    for wall in &scene.walls {
        surface.rect(wall.center, wall.size, wall.color);
    }
    for outline in &scene.outlines {
        paint_outline(outline, surface);
    }
}

/// Paints a single closed outline. Unsupported commands are skipped.
pub fn paint_outline<S>(outline: &OutlinePresentation, surface: &mut S)
where
    S: DrawSurface + ?Sized,
{
    let map = |x: f32, y: f32| outline.transform.transform_point2(Vec2::new(x, y));

    surface.begin_shape(&outline.style);
    for command in &outline.path {
        match *command {
            PathCommand::Move { x, y } => surface.vertex(map(x, y)),
            PathCommand::QuadraticCurve { cx, cy, x, y } => {
                surface.quadratic_vertex(map(cx, cy), map(x, y));
            }
            PathCommand::Unsupported { .. } => {}
        }
    }
    surface.end_shape(true);
}

/// Samples a quadratic Bézier curve, yielding `segments` points after `start` and ending at `end`.
pub fn flatten_quadratic(
    start: Vec2,
    control: Vec2,
    end: Vec2,
    segments: u32,
) -> impl Iterator<Item = Vec2> {
    let segments = segments.max(1);
    (1..=segments).map(move |step| {
        let t = step as f32 / segments as f32;
        let inverse = 1.0 - t;
        start * (inverse * inverse) + control * (2.0 * inverse * t) + end * (t * t)
    })
}

/// Rendering backend capable of presenting Blobsync scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// per-frame input captured by the adapter, and rebuilds the scene before
    /// it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}
