use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use blobsync_core::{Canvas, CueSetId};
use blobsync_physics::PhysicsTuning;
use blobsync_system_director::{KinematicSketchTuning, PhysicsSketchTuning};
use blobsync_world::WorldTuning;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File looked up in the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "blobsync.toml";

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read config file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The configuration file is not valid TOML for [`Config`].
    #[error("invalid config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// A track binding names a cue set the selected sketch never handles.
    #[error("cue set {cue_set} is not handled by the {sketch} sketch")]
    UnhandledCueSet { cue_set: CueSetId, sketch: SketchKind },
}

/// Animation variant driven by the soundtrack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum SketchKind {
    /// Falling blobs inside a periodically rebuilt arena.
    #[default]
    Physics,
    /// Non-overlapping outlines alongside a growing batch.
    Kinematic,
}

impl SketchKind {
    fn handles(self, cue_set: CueSetId) -> bool {
        match self {
            Self::Physics => cue_set.theme_range_index().is_some(),
            Self::Kinematic => cue_set.theme_range_index().is_none(),
        }
    }

    /// Track routing used when the config file does not list any.
    pub(crate) fn default_tracks(self) -> Vec<TrackBinding> {
        match self {
            Self::Physics => vec![
                TrackBinding::new(8, CueSetId::PhysicsPrimary),
                TrackBinding::new(2, CueSetId::PhysicsSecondary),
                TrackBinding::new(1, CueSetId::PhysicsTertiary),
            ],
            Self::Kinematic => vec![
                TrackBinding::new(1, CueSetId::OutlineBatch),
                TrackBinding::new(2, CueSetId::AnimatedBatch),
            ],
        }
    }
}

impl std::fmt::Display for SketchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Physics => "physics",
            Self::Kinematic => "kinematic",
        })
    }
}

/// Routes the notes of one MIDI track to a cue set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TrackBinding {
    /// Zero-based index of the track inside the MIDI file.
    pub(crate) track: usize,
    /// Cue set fed by the track.
    pub(crate) cue_set: CueSetId,
    /// Keep every voice of a chord instead of collapsing it into one cue.
    #[serde(default)]
    pub(crate) polyphony: bool,
}

impl TrackBinding {
    const fn new(track: usize, cue_set: CueSetId) -> Self {
        Self {
            track,
            cue_set,
            polyphony: false,
        }
    }
}

/// Overrides for the arena simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PhysicsSection {
    pub(crate) gravity: f32,
    pub(crate) max_substeps: u32,
    pub(crate) solver_iterations: u32,
}

impl Default for PhysicsSection {
    fn default() -> Self {
        let tuning = PhysicsTuning::default();
        Self {
            gravity: tuning.gravity.y,
            max_substeps: tuning.max_substeps,
            solver_iterations: tuning.solver_iterations,
        }
    }
}

/// Overrides for both director variants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DirectorSection {
    pub(crate) reset_period: u32,
    pub(crate) reset_ordinal_limit: u32,
    pub(crate) reset_delay_ms: u64,
    pub(crate) initial_max_count: u32,
    pub(crate) min_count: u32,
    pub(crate) ramp_ordinal: u32,
    pub(crate) clear_period: u32,
    pub(crate) placement_tries: u32,
}

impl Default for DirectorSection {
    fn default() -> Self {
        let physics = PhysicsSketchTuning::default();
        let kinematic = KinematicSketchTuning::default();
        Self {
            reset_period: physics.reset_period,
            reset_ordinal_limit: physics.ordinal_limit,
            reset_delay_ms: physics.reset_delay.as_millis() as u64,
            initial_max_count: physics.initial_max_count,
            min_count: physics.min_count,
            ramp_ordinal: kinematic.ramp_ordinal,
            clear_period: kinematic.clear_period,
            placement_tries: kinematic.max_tries,
        }
    }
}

/// Overrides for the per-frame world constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WorldSection {
    pub(crate) restitution: f32,
    pub(crate) reveal_increment: f32,
    pub(crate) stroke_weight: f32,
}

impl Default for WorldSection {
    fn default() -> Self {
        let tuning = WorldTuning::default();
        Self {
            restitution: tuning.restitution,
            reveal_increment: tuning.reveal_increment,
            stroke_weight: tuning.stroke_weight,
        }
    }
}

/// Complete runtime configuration, every field defaulted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub(crate) sketch: SketchKind,
    /// Session seed; a fresh one is drawn when absent.
    pub(crate) seed: Option<u64>,
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) log_level: String,
    pub(crate) show_fps: bool,
    pub(crate) vsync: bool,
    /// Track routing; each sketch has its own routing when absent.
    pub(crate) tracks: Option<Vec<TrackBinding>>,
    pub(crate) physics: PhysicsSection,
    pub(crate) director: DirectorSection,
    pub(crate) world: WorldSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sketch: SketchKind::default(),
            seed: None,
            width: 800.0,
            height: 600.0,
            log_level: "info".to_owned(),
            show_fps: false,
            vsync: true,
            tracks: None,
            physics: PhysicsSection::default(),
            director: DirectorSection::default(),
            world: WorldSection::default(),
        }
    }
}

impl Config {
    /// Reads `path`, or `blobsync.toml` when no path was given.
    ///
    /// A missing default file yields the defaults; a missing explicit file is an error.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(source) if !explicit && source.kind() == io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        Self::from_toml(&text).map_err(|source| ConfigError::Parse { path, source })
    }

    pub(crate) fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Track routing for the configured sketch, checked against what it handles.
    pub(crate) fn track_bindings(&self) -> Result<Vec<TrackBinding>, ConfigError> {
        let bindings = self
            .tracks
            .clone()
            .unwrap_or_else(|| self.sketch.default_tracks());
        for binding in &bindings {
            if !self.sketch.handles(binding.cue_set) {
                return Err(ConfigError::UnhandledCueSet {
                    cue_set: binding.cue_set,
                    sketch: self.sketch,
                });
            }
        }
        Ok(bindings)
    }

    pub(crate) fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }

    pub(crate) fn physics_tuning(&self) -> PhysicsTuning {
        PhysicsTuning {
            gravity: Vec2::new(0.0, self.physics.gravity),
            max_substeps: self.physics.max_substeps,
            solver_iterations: self.physics.solver_iterations,
            ..PhysicsTuning::default()
        }
    }

    pub(crate) fn physics_sketch_tuning(&self) -> PhysicsSketchTuning {
        PhysicsSketchTuning {
            ordinal_limit: self.director.reset_ordinal_limit,
            reset_period: self.director.reset_period,
            reset_delay: Duration::from_millis(self.director.reset_delay_ms),
            initial_max_count: self.director.initial_max_count,
            min_count: self.director.min_count,
            ..PhysicsSketchTuning::default()
        }
    }

    pub(crate) fn kinematic_sketch_tuning(&self) -> KinematicSketchTuning {
        KinematicSketchTuning {
            ramp_ordinal: self.director.ramp_ordinal,
            clear_period: self.director.clear_period,
            max_tries: self.director.placement_tries,
            ..KinematicSketchTuning::default()
        }
    }

    pub(crate) fn world_tuning(&self) -> WorldTuning {
        WorldTuning {
            restitution: self.world.restitution,
            reveal_increment: self.world.reveal_increment,
            stroke_weight: self.world.stroke_weight,
            ..WorldTuning::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_toml("").expect("empty config");
        assert_eq!(config, Config::default());
        assert_eq!(config.physics_tuning(), PhysicsTuning::default());
        assert_eq!(config.physics_sketch_tuning(), PhysicsSketchTuning::default());
        assert_eq!(config.kinematic_sketch_tuning(), KinematicSketchTuning::default());
        assert_eq!(config.world_tuning(), WorldTuning::default());
    }

    #[test]
    fn sections_override_tuning() {
        let config = Config::from_toml(
            r#"
            sketch = "kinematic"
            seed = 7
            width = 1024.0

            [director]
            ramp_ordinal = 10
            reset_delay_ms = 250

            [physics]
            gravity = 100.0
            "#,
        )
        .expect("valid config");

        assert_eq!(config.sketch, SketchKind::Kinematic);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.canvas(), Canvas::new(1024.0, 600.0));
        assert_eq!(config.kinematic_sketch_tuning().ramp_ordinal, 10);
        assert_eq!(
            config.physics_sketch_tuning().reset_delay,
            Duration::from_millis(250)
        );
        assert_eq!(config.physics_tuning().gravity, Vec2::new(0.0, 100.0));
    }

    #[test]
    fn default_tracks_follow_the_sketch() {
        let physics = Config::default().track_bindings().expect("physics routing");
        assert_eq!(
            physics.iter().map(|b| (b.track, b.cue_set)).collect::<Vec<_>>(),
            vec![
                (8, CueSetId::PhysicsPrimary),
                (2, CueSetId::PhysicsSecondary),
                (1, CueSetId::PhysicsTertiary),
            ]
        );

        let kinematic = Config {
            sketch: SketchKind::Kinematic,
            ..Config::default()
        };
        assert_eq!(kinematic.track_bindings().expect("kinematic routing").len(), 2);
    }

    #[test]
    fn explicit_tracks_are_checked_against_the_sketch() {
        let config = Config::from_toml(
            r#"
            [[tracks]]
            track = 3
            cue_set = "outline-batch"
            polyphony = true
            "#,
        )
        .expect("valid config");

        let error = config.track_bindings().expect_err("physics ignores outlines");
        assert!(matches!(
            error,
            ConfigError::UnhandledCueSet {
                cue_set: CueSetId::OutlineBatch,
                sketch: SketchKind::Physics,
            }
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml("colour = \"red\"").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let error = Config::load(Some(Path::new("/nonexistent/blobsync.toml")))
            .expect_err("missing file");
        assert!(matches!(error, ConfigError::Io { .. }));
    }
}
