use std::{f32::consts::TAU, time::Duration};

use blobsync_core::{
    Canvas, Command, CuePayload, CueSetId, DeferredAction, Event, Hsba, PhysicsBlobSpec,
    SessionState, Theme, FAVOURED_THEME_INDEX, FAVOURED_THEME_PROBABILITY, THEMES,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::{streams, uniform, uniform_count};

/// Saturation, brightness and alpha intervals a physics cue set draws from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColourPolicy {
    /// Saturation percentage interval.
    pub saturation: (f32, f32),
    /// Brightness percentage interval.
    pub brightness: (f32, f32),
    /// Alpha interval.
    pub alpha: (f32, f32),
}

impl ColourPolicy {
    const fn new(saturation: (f32, f32), brightness: (f32, f32)) -> Self {
        Self {
            saturation,
            brightness,
            alpha: (0.6, 0.9),
        }
    }
}

/// Tuning parameters for the physics sketch director.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsSketchTuning {
    /// Arena resets only happen on ordinals strictly below this limit.
    pub ordinal_limit: u32,
    /// Ordinals congruent to one modulo this period trigger a reset.
    pub reset_period: u32,
    /// Delay between tearing the walls down and completing the reset.
    pub reset_delay: Duration,
    /// Exclusive upper bound on the spawn count at session start.
    pub initial_max_count: u32,
    /// Smallest number of blobs spawned per cue.
    pub min_count: u32,
    /// Base blob size as a fraction of the canvas width.
    pub base_size_ratio: f32,
    /// Multipliers applied to the base size, one picked per blob.
    pub radius_multipliers: Vec<f32>,
    /// Height of the spawn band as a fraction of the canvas height.
    pub spawn_band_ratio: f32,
    /// Half-open interval of outline edge counts.
    pub edges: (u32, u32),
    /// Inner-radius factor handed to the outline generator.
    pub outline_growth: u32,
    /// Colour policies for the three physics cue sets.
    pub colour_policies: [ColourPolicy; 3],
}

impl Default for PhysicsSketchTuning {
    fn default() -> Self {
        Self {
            ordinal_limit: 162,
            reset_period: 18,
            reset_delay: Duration::from_millis(500),
            initial_max_count: 4,
            min_count: 3,
            base_size_ratio: 0.03,
            radius_multipliers: vec![0.4, 0.8, 1.2],
            spawn_band_ratio: 0.1,
            edges: (5, 9),
            outline_growth: 7,
            colour_policies: [
                ColourPolicy::new((80.0, 100.0), (60.0, 80.0)),
                ColourPolicy::new((70.0, 90.0), (60.0, 80.0)),
                ColourPolicy::new((60.0, 100.0), (80.0, 100.0)),
            ],
        }
    }
}

impl PhysicsSketchTuning {
    /// Reports whether a primary cue with `ordinal` triggers an arena reset.
    #[must_use]
    pub fn resets_at(&self, ordinal: u32) -> bool {
        ordinal > 1
            && ordinal < self.ordinal_limit
            && ordinal.checked_rem(self.reset_period) == Some(1)
    }
}

/// Director that fills a walled arena with falling blobs.
#[derive(Debug)]
pub struct PhysicsSketch {
    tuning: PhysicsSketchTuning,
    rng: ChaCha8Rng,
    theme: Theme,
    max_count: u32,
}

impl PhysicsSketch {
    /// Creates the director and picks the session theme from `seed`.
    ///
    /// The favoured theme wins with a fixed probability, otherwise every theme
    /// in the catalogue is equally likely.
    #[must_use]
    pub fn new(tuning: PhysicsSketchTuning, seed: u64) -> Self {
        let mut rng = streams::stream_rng(seed, streams::PHYSICS_STREAM);
        let index = if rng.gen_bool(FAVOURED_THEME_PROBABILITY) {
            FAVOURED_THEME_INDEX
        } else {
            rng.gen_range(0..THEMES.len())
        };
        Self::from_parts(tuning, rng, THEMES[index])
    }

    /// Creates the director with an explicitly chosen theme.
    #[must_use]
    pub fn with_theme(tuning: PhysicsSketchTuning, seed: u64, theme: Theme) -> Self {
        let rng = streams::stream_rng(seed, streams::PHYSICS_STREAM);
        Self::from_parts(tuning, rng, theme)
    }

    fn from_parts(tuning: PhysicsSketchTuning, rng: ChaCha8Rng, theme: Theme) -> Self {
        let max_count = tuning.initial_max_count;
        info!(theme = theme.name, "physics sketch theme selected");
        Self {
            tuning,
            rng,
            theme,
            max_count,
        }
    }

    /// Theme selected for the session.
    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Current exclusive upper bound on the number of blobs spawned per cue.
    #[must_use]
    pub fn max_count(&self) -> u32 {
        self.max_count
    }

    /// Tuning applied by the director.
    #[must_use]
    pub fn tuning(&self) -> &PhysicsSketchTuning {
        &self.tuning
    }

    /// Emits the commands that prepare the arena at session start.
    pub fn start(&self, out: &mut Vec<Command>) {
        out.push(Command::BuildWalls);
    }

    /// Consumes fired cues and world events, emitting the resulting commands.
    ///
    /// Due deferred actions are always completed; cues are only acted upon
    /// while the session is running.
    pub fn handle(
        &mut self,
        cues: &[CuePayload],
        events: &[Event],
        session: SessionState,
        canvas: Canvas,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if let Event::DeferredActionDue {
                action: DeferredAction::CompleteArenaReset,
            } = event
            {
                out.push(Command::ClearPhysicsBlobs);
                out.push(Command::BuildWalls);
                self.max_count = self.max_count.saturating_add(1);
                info!(max_count = self.max_count, "arena reset completed");
            }
        }

        if session != SessionState::Running {
            if !cues.is_empty() {
                debug!(?session, dropped = cues.len(), "ignoring cues outside a running session");
            }
            return;
        }

        for cue in cues {
            let Some(range_index) = cue.cue_set.theme_range_index() else {
                continue;
            };

            if cue.cue_set == CueSetId::PhysicsPrimary && self.tuning.resets_at(cue.ordinal) {
                info!(ordinal = cue.ordinal, "arena reset started");
                out.push(Command::TeardownWalls);
                out.push(Command::ScheduleDeferred {
                    delay: self.tuning.reset_delay,
                    action: DeferredAction::CompleteArenaReset,
                });
            }

            self.spawn_batch(range_index, canvas, out);
        }
    }

    fn spawn_batch(&mut self, range_index: usize, canvas: Canvas, out: &mut Vec<Command>) {
        let count = uniform_count(&mut self.rng, self.tuning.min_count, self.max_count);
        let hues = self.theme.ranges[range_index];
        let policy = self.tuning.colour_policies[range_index];
        let base_size = canvas.width * self.tuning.base_size_ratio;
        // One colour for the whole batch.
        let color = Hsba::new(
            uniform(&mut self.rng, hues.min, hues.max),
            uniform(&mut self.rng, policy.saturation.0, policy.saturation.1),
            uniform(&mut self.rng, policy.brightness.0, policy.brightness.1),
            uniform(&mut self.rng, policy.alpha.0, policy.alpha.1),
        );

        for index in 0..count {
            let multiplier = if self.tuning.radius_multipliers.is_empty() {
                1.0
            } else {
                let pick = self.rng.gen_range(0..self.tuning.radius_multipliers.len());
                self.tuning.radius_multipliers[pick]
            };
            let spec = PhysicsBlobSpec {
                x: uniform(&mut self.rng, 0.0, canvas.width),
                y: uniform(
                    &mut self.rng,
                    0.0,
                    canvas.height * self.tuning.spawn_band_ratio,
                ),
                radius: base_size * multiplier,
                angle: uniform(&mut self.rng, 0.0, TAU),
                color,
                filled: self.rng.gen_bool(0.5),
                layered: index == 0,
                growth: self.tuning.outline_growth,
                edges: uniform_count(&mut self.rng, self.tuning.edges.0, self.tuning.edges.1),
                seed: uniform(&mut self.rng, 1.0, 100.0),
            };
            out.push(Command::SpawnPhysicsBlob { spec });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_ordinals_follow_the_period_below_the_limit() {
        let tuning = PhysicsSketchTuning::default();
        let resets: Vec<u32> = (1..=200).filter(|ordinal| tuning.resets_at(*ordinal)).collect();
        assert_eq!(resets, vec![19, 37, 55, 73, 91, 109, 127, 145]);
    }

    #[test]
    fn zero_period_never_resets() {
        let tuning = PhysicsSketchTuning {
            reset_period: 0,
            ..PhysicsSketchTuning::default()
        };
        assert!(!(1..200).any(|ordinal| tuning.resets_at(ordinal)));
    }
}
