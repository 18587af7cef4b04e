#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Draws Blobsync scenes in a macroquad window.
//!
//! macroquad is built without its `audio` feature, which needs ALSA headers
//! at build time. This adapter never plays the soundtrack; playback time
//! comes from the simulated transport.

mod surface;

use anyhow::Result;
use blobsync_core::Canvas;
use blobsync_rendering::{paint_scene, FrameInput, Presentation, RenderingBackend, Scene};
use macroquad::input::{is_key_pressed, is_mouse_button_pressed, KeyCode, MouseButton};
use std::time::Duration;

use self::surface::{to_macroquad_color, MacroquadSurface};

const DEFAULT_CURVE_SEGMENTS: u32 = 8;

/// Rendering backend that draws scenes with macroquad.
#[derive(Clone, Copy, Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    curve_segments: u32,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            curve_segments: DEFAULT_CURVE_SEGMENTS,
        }
    }
}

impl MacroquadBackend {
    /// Backend with platform swap interval, no FPS output and eight segments per curve.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the swap interval requested when the window opens.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Requests vsync (interval 1) or unthrottled presentation (interval 0).
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        self.with_swap_interval(Some(i32::from(enabled)))
    }

    /// Configures whether the backend prints the frame rate once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures how many line segments approximate each quadratic curve.
    #[must_use]
    pub fn with_curve_segments(mut self, segments: u32) -> Self {
        self.curve_segments = segments.max(1);
        self
    }
}

/// Detects changes of the window size between frames.
#[doc(hidden)]
#[derive(Clone, Copy, Debug)]
pub struct ResizeTracker {
    last: Canvas,
}

impl ResizeTracker {
    /// Starts tracking from the canvas the window was requested with.
    #[must_use]
    pub fn new(initial: Canvas) -> Self {
        Self { last: initial }
    }

    /// Records the observed window size, returning it when it differs from the previous one.
    pub fn observe(&mut self, width: f32, height: f32) -> Option<Canvas> {
        let observed = Canvas::new(width, height);
        if observed == self.last {
            None
        } else {
            self.last = observed;
            Some(observed)
        }
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the frame rate once a second elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            curve_segments,
        } = self;

        let Presentation {
            window_title,
            canvas,
            clear_color,
            show_fps: presentation_fps,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: canvas.width.round() as i32,
            window_height: canvas.height.round() as i32,
            window_resizable: true,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }
        let show_fps = show_fps || presentation_fps;

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let mut surface = MacroquadSurface::new(curve_segments);
            let mut resize = ResizeTracker::new(canvas);
            let mut fps_counter = FpsCounter::default();
            let background = to_macroquad_color(clear_color);

            loop {
                if is_key_pressed(KeyCode::Escape) {
                    break;
                }

                let frame_dt =
                    Duration::from_secs_f32(macroquad::time::get_frame_time().max(0.0));
                let frame_input = FrameInput {
                    toggle_playback: is_mouse_button_pressed(MouseButton::Left)
                        || is_key_pressed(KeyCode::Space),
                    resize: resize.observe(
                        macroquad::window::screen_width(),
                        macroquad::window::screen_height(),
                    ),
                };

                update_scene(frame_dt, frame_input, &mut scene);

                macroquad::window::clear_background(background);
                paint_scene(&scene, &mut surface);

                if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                    if show_fps {
                        println!("FPS: {per_second:.2}");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}
