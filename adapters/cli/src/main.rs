#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a MIDI-driven Blobsync animation.

mod config;
mod scene;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use blobsync_physics::ArenaPhysics;
use blobsync_playback::Transport;
use blobsync_rendering::{Color, Presentation, RenderingBackend, Scene};
use blobsync_rendering_macroquad::MacroquadBackend;
use blobsync_system_director::{KinematicSketch, PhysicsSketch};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Config, SketchKind},
    scene::populate_scene,
    session::{schedule_tracks, Director, Session},
};

/// Silence kept after the last note when no duration is given.
const TAIL_SECONDS: f64 = 2.0;

const WINDOW_TITLE: &str = "Blobsync";

/// Animates blobs in sync with the notes of a MIDI file.
#[derive(Debug, Parser)]
#[command(name = "blobsync", version)]
struct CliArgs {
    /// Standard MIDI file whose tracks drive the animation.
    midi: PathBuf,
    /// Configuration file, defaults to `blobsync.toml` when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Animation variant.
    #[arg(long, value_enum)]
    sketch: Option<SketchKind>,
    /// Session seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
    /// Playback length in seconds.
    #[arg(long)]
    duration: Option<f64>,
    /// Window width in pixels.
    #[arg(long, requires = "height")]
    width: Option<f32>,
    /// Window height in pixels.
    #[arg(long, requires = "width")]
    height: Option<f32>,
    /// Print the frame rate once per second.
    #[arg(long)]
    show_fps: bool,
}

impl CliArgs {
    /// Lets command-line flags take precedence over the configuration file.
    fn apply_to(&self, config: &mut Config) {
        if let Some(sketch) = self.sketch {
            config.sketch = sketch;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let (Some(width), Some(height)) = (self.width, self.height) {
            config.width = width;
            config.height = height;
        }
        config.show_fps |= self.show_fps;
    }
}

fn init_tracing(default_level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)
            .with_context(|| format!("invalid log level {default_level:?}"))?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

/// Entry point for the Blobsync command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    let mut config = Config::load(args.config.as_deref())?;
    args.apply_to(&mut config);
    init_tracing(&config.log_level)?;

    let seed = config.seed.unwrap_or_else(rand::random);
    let canvas = config.canvas();
    let bindings = config.track_bindings()?;
    info!(sketch = %config.sketch, seed, "starting session");

    let timeline = blobsync_midi::load(&args.midi)?;
    let duration = args
        .duration
        .unwrap_or_else(|| timeline.end_time() + TAIL_SECONDS);

    let mut transport = Transport::new(duration);
    if schedule_tracks(&timeline, &bindings, &mut transport) == 0 {
        warn!(path = %args.midi.display(), "no cues scheduled, the animation will stay empty");
    }

    let director = match config.sketch {
        SketchKind::Physics => {
            Director::Physics(PhysicsSketch::new(config.physics_sketch_tuning(), seed))
        }
        SketchKind::Kinematic => {
            Director::Kinematic(KinematicSketch::new(config.kinematic_sketch_tuning(), seed))
        }
    };

    let mut session = Session::new(
        Box::new(ArenaPhysics::new(config.physics_tuning())),
        config.world_tuning(),
        canvas,
        transport,
        director,
    );

    let mut presentation = Presentation::new(WINDOW_TITLE, canvas, Color::BLACK, Scene::default());
    presentation.show_fps = config.show_fps;

    MacroquadBackend::new()
        .with_vsync(config.vsync)
        .run(presentation, move |dt, input, scene| {
            session.frame(dt, &input);
            populate_scene(session.world(), scene);
        })
        .context("rendering backend failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_the_config_file() {
        let args = CliArgs::try_parse_from([
            "blobsync",
            "song.mid",
            "--sketch",
            "kinematic",
            "--seed",
            "9",
            "--width",
            "1280",
            "--height",
            "720",
        ])
        .expect("valid flags");

        let mut config = Config::default();
        args.apply_to(&mut config);

        assert_eq!(args.midi, PathBuf::from("song.mid"));
        assert_eq!(config.sketch, SketchKind::Kinematic);
        assert_eq!(config.seed, Some(9));
        assert_eq!((config.width, config.height), (1280.0, 720.0));
        assert!(!config.show_fps);
    }

    #[test]
    fn width_without_height_is_rejected() {
        assert!(CliArgs::try_parse_from(["blobsync", "song.mid", "--width", "640"]).is_err());
    }

    #[test]
    fn midi_path_is_required() {
        assert!(CliArgs::try_parse_from(["blobsync"]).is_err());
    }
}
