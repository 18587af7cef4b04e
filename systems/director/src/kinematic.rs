use blobsync_core::{
    Bounds, Canvas, Command, CuePayload, CueSetId, Footprint, Hsba, KinematicBlobSpec,
    SessionState,
};
use blobsync_system_placement::{place, DEFAULT_MAX_TRIES};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::{streams, uniform, uniform_count};

/// Tuning parameters for the kinematic sketch director.
#[derive(Clone, Debug, PartialEq)]
pub struct KinematicSketchTuning {
    /// Outline ordinal at which the batch empties and switches to the ramped pool.
    /// An outline cue with ordinal one switches back to the initial pool.
    pub ramp_ordinal: u32,
    /// Canvas-width divisors used to size outlines before the ramp.
    pub initial_divisors: Vec<f32>,
    /// Canvas-width divisors used to size outlines after the ramp.
    pub ramped_divisors: Vec<f32>,
    /// Smallest outline edge count.
    pub min_edges: u32,
    /// Exclusive edge-count bound before the ramp.
    pub initial_max_edges: u32,
    /// Exclusive edge-count bound after the ramp.
    pub ramped_max_edges: u32,
    /// Candidates tried per outline placement.
    pub max_tries: u32,
    /// Animated ordinals congruent to one modulo this period clear the growing batch.
    pub clear_period: u32,
    /// Initial growing-outline size as a fraction of the canvas width.
    pub growing_size_ratio: f32,
    /// Size added to a growing outline on every update.
    pub growing_speed: f32,
    /// Half-open interval of inner-radius factors.
    pub growth: (u32, u32),
    /// Half-open interval of growing-outline edge counts.
    pub growing_edges: (u32, u32),
}

impl Default for KinematicSketchTuning {
    fn default() -> Self {
        Self {
            ramp_ordinal: 37,
            initial_divisors: vec![3.0, 4.0, 5.0, 6.0],
            ramped_divisors: vec![5.0, 6.0],
            min_edges: 6,
            initial_max_edges: 12,
            ramped_max_edges: 24,
            max_tries: DEFAULT_MAX_TRIES,
            clear_period: 12,
            growing_size_ratio: 0.125,
            growing_speed: 8.0,
            growth: (3, 9),
            growing_edges: (16, 32),
        }
    }
}

/// Director that lays out fixed outlines and grows animated ones.
#[derive(Debug)]
pub struct KinematicSketch {
    tuning: KinematicSketchTuning,
    rng: ChaCha8Rng,
    ramped: bool,
}

impl KinematicSketch {
    /// Creates the director with its random stream derived from `seed`.
    #[must_use]
    pub fn new(tuning: KinematicSketchTuning, seed: u64) -> Self {
        Self {
            tuning,
            rng: streams::stream_rng(seed, streams::KINEMATIC_STREAM),
            ramped: false,
        }
    }

    /// Reports whether the outline batch switched to the ramped pool.
    #[must_use]
    pub fn is_ramped(&self) -> bool {
        self.ramped
    }

    /// Tuning applied by the director.
    #[must_use]
    pub fn tuning(&self) -> &KinematicSketchTuning {
        &self.tuning
    }

    /// Consumes fired cues and emits the resulting outline commands.
    ///
    /// `outline_footprints` is the world's view of the current outline batch.
    /// Outlines accepted earlier in the same call are taken into account when
    /// placing later ones.
    pub fn handle(
        &mut self,
        cues: &[CuePayload],
        session: SessionState,
        canvas: Canvas,
        outline_footprints: &[Footprint],
        out: &mut Vec<Command>,
    ) {
        if session != SessionState::Running {
            return;
        }

        let mut occupied = outline_footprints.to_vec();
        for cue in cues {
            match cue.cue_set {
                CueSetId::OutlineBatch => self.place_outline(cue, canvas, &mut occupied, out),
                CueSetId::AnimatedBatch => self.add_growing(cue, canvas, out),
                CueSetId::PhysicsPrimary
                | CueSetId::PhysicsSecondary
                | CueSetId::PhysicsTertiary => {}
            }
        }
    }

    fn place_outline(
        &mut self,
        cue: &CuePayload,
        canvas: Canvas,
        occupied: &mut Vec<Footprint>,
        out: &mut Vec<Command>,
    ) {
        if cue.ordinal == 1 && self.ramped {
            self.ramped = false;
            debug!("outline ordinals restarted, ramp cleared");
        }
        if cue.ordinal == self.tuning.ramp_ordinal {
            self.ramped = true;
            occupied.clear();
            out.push(Command::ClearOutlineBlobs);
            info!(ordinal = cue.ordinal, "outline batch ramped");
        }

        let (divisors, max_edges) = if self.ramped {
            (&self.tuning.ramped_divisors, self.tuning.ramped_max_edges)
        } else {
            (&self.tuning.initial_divisors, self.tuning.initial_max_edges)
        };
        let divisor = if divisors.is_empty() {
            1.0
        } else {
            divisors[self.rng.gen_range(0..divisors.len())]
        };
        let size = canvas.width / divisor;
        let radius = size / 2.0;
        let bounds = Bounds::new(
            radius,
            radius,
            canvas.width - radius,
            canvas.height - radius,
        );

        match place(occupied.as_slice(), bounds, radius, self.tuning.max_tries, &mut self.rng) {
            Ok(footprint) => {
                let (fill, stroke) = outline_colours(&mut self.rng);
                let spec = KinematicBlobSpec {
                    x: footprint.x,
                    y: footprint.y,
                    size,
                    growth_speed: 0.0,
                    growth: uniform_count(
                        &mut self.rng,
                        self.tuning.growth.0,
                        self.tuning.growth.1,
                    ),
                    edges: uniform_count(&mut self.rng, self.tuning.min_edges, max_edges),
                    seed: uniform(&mut self.rng, 1.0, 100.0),
                    fill,
                    stroke,
                };
                occupied.push(footprint);
                out.push(Command::AddOutlineBlob { spec });
            }
            Err(error) => {
                warn!(ordinal = cue.ordinal, %error, "skipping outline spawn");
            }
        }
    }

    fn add_growing(&mut self, cue: &CuePayload, canvas: Canvas, out: &mut Vec<Command>) {
        if cue.ordinal.checked_rem(self.tuning.clear_period) == Some(1) {
            out.push(Command::ClearGrowingBlobs);
        }

        let (fill, stroke) = outline_colours(&mut self.rng);
        let spec = KinematicBlobSpec {
            x: uniform(&mut self.rng, 0.0, canvas.width),
            y: uniform(&mut self.rng, 0.0, canvas.height),
            size: canvas.width * self.tuning.growing_size_ratio,
            growth_speed: self.tuning.growing_speed,
            growth: uniform_count(&mut self.rng, self.tuning.growth.0, self.tuning.growth.1),
            edges: uniform_count(
                &mut self.rng,
                self.tuning.growing_edges.0,
                self.tuning.growing_edges.1,
            ),
            seed: uniform(&mut self.rng, 1.0, 100.0),
            fill,
            stroke,
        };
        out.push(Command::AddGrowingBlob { spec });
    }
}

/// Translucent random fill with either a white or a random-hue stroke.
fn outline_colours<R>(rng: &mut R) -> (Hsba, Hsba)
where
    R: Rng + ?Sized,
{
    let fill = Hsba::new(uniform(rng, 0.0, 360.0), 100.0, 100.0, 0.33);
    let stroke = if rng.gen_bool(0.5) {
        Hsba::WHITE
    } else {
        Hsba::new(uniform(rng, 0.0, 360.0), 100.0, 100.0, 0.66)
    };
    (fill, stroke)
}
