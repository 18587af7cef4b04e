use blobsync_core::{
    BodyHandle, BodyPose, Footprint, Hsba, KinematicBlobSpec, PathCommand, PhysicsBlobSpec,
    RenderPass, ShapeId,
};
use blobsync_outline::OutlineSpec;
use blobsync_path::VertexPerturbation;
use glam::{Affine2, Vec2};

const LAYERED_SCALES: [f32; 3] = [1.5, 1.2, 0.9];
const SINGLE_PASS_SCALE: f32 = 0.75;
const HIGHLIGHT_ALPHA: f32 = 0.88;

fn outline_commands(size: f32, growth: u32, edges: u32, seed: f32) -> Vec<PathCommand> {
    blobsync_path::parse(&blobsync_outline::generate(&OutlineSpec {
        size,
        growth,
        edges,
        seed,
    }))
}

/// Physics-backed blob drawn around the live pose of its rigid body.
///
/// The outline is generated once in a box of side `2 * radius` and only the
/// wobble phase changes afterwards. The phase starts at the spec seed so
/// neighbouring blobs do not wobble in unison.
#[derive(Clone, Debug)]
pub struct StaticLayeredBlob {
    id: ShapeId,
    body: BodyHandle,
    spec: PhysicsBlobSpec,
    pose: BodyPose,
    outline: Vec<PathCommand>,
    wobble: VertexPerturbation,
    wobble_time: f32,
    stroke_weight: f32,
}

impl StaticLayeredBlob {
    pub(crate) fn new(
        id: ShapeId,
        body: BodyHandle,
        spec: PhysicsBlobSpec,
        wobble: VertexPerturbation,
        stroke_weight: f32,
    ) -> Self {
        Self {
            id,
            body,
            outline: outline_commands(spec.radius * 2.0, spec.growth, spec.edges, spec.seed),
            pose: BodyPose {
                x: spec.x,
                y: spec.y,
                angle: spec.angle,
            },
            wobble_time: spec.seed,
            spec,
            wobble,
            stroke_weight,
        }
    }

    /// Identifier assigned by the world.
    #[must_use]
    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Body exclusively owned by the blob.
    #[must_use]
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Parameters the blob was spawned with.
    #[must_use]
    pub fn spec(&self) -> &PhysicsBlobSpec {
        &self.spec
    }

    /// Pose of the body at the last synchronisation.
    #[must_use]
    pub fn pose(&self) -> BodyPose {
        self.pose
    }

    /// Current wobble phase.
    #[must_use]
    pub fn wobble_time(&self) -> f32 {
        self.wobble_time
    }

    pub(crate) fn sync_pose(&mut self, pose: BodyPose) {
        self.pose = pose;
    }

    pub(crate) fn advance_wobble(&mut self, step: f32) {
        self.wobble_time += step;
    }

    /// Outline in box coordinates with the current wobble applied.
    #[must_use]
    pub fn path(&self) -> Vec<PathCommand> {
        self.wobble.apply(&self.outline, self.wobble_time)
    }

    /// Styling for every pass, in drawing order.
    #[must_use]
    pub fn render_passes(&self) -> Vec<RenderPass> {
        let color = self.spec.color;
        if self.spec.layered {
            let highlight = Hsba {
                alpha: HIGHLIGHT_ALPHA,
                ..Hsba::WHITE
            };
            let styles = [
                (Some(highlight), Some(color)),
                (Some(color), Some(color)),
                (Some(color), Some(Hsba::WHITE)),
            ];
            LAYERED_SCALES
                .iter()
                .zip(styles)
                .map(|(scale, (fill, stroke))| RenderPass {
                    scale: *scale,
                    fill,
                    stroke,
                    stroke_weight: self.stroke_weight,
                })
                .collect()
        } else {
            vec![RenderPass {
                scale: SINGLE_PASS_SCALE,
                fill: self.spec.filled.then_some(color),
                stroke: Some(color),
                stroke_weight: self.stroke_weight,
            }]
        }
    }

    /// Maps box coordinates of [`Self::path`] onto the canvas for a pass drawn at `scale`.
    #[must_use]
    pub fn pass_transform(&self, scale: f32) -> Affine2 {
        Affine2::from_scale_angle_translation(
            Vec2::splat(scale),
            self.pose.angle,
            Vec2::new(self.pose.x, self.pose.y),
        ) * Affine2::from_translation(Vec2::splat(-self.spec.radius))
    }

    /// Circle covered by the body.
    #[must_use]
    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.pose.x, self.pose.y, self.spec.radius)
    }
}

/// Kinematic blob whose outline is re-derived from its own size and time.
///
/// Growing blobs add `growth_speed` to their size on every update; a zero
/// speed keeps the outline at its initial size.
#[derive(Clone, Debug)]
pub struct KinematicGrowingBlob {
    id: ShapeId,
    spec: KinematicBlobSpec,
    size: f32,
    time: f32,
    perturbation: VertexPerturbation,
}

impl KinematicGrowingBlob {
    pub(crate) fn new(id: ShapeId, spec: KinematicBlobSpec, perturbation: VertexPerturbation) -> Self {
        Self {
            id,
            size: spec.size,
            spec,
            time: 0.0,
            perturbation,
        }
    }

    /// Identifier assigned by the world.
    #[must_use]
    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Parameters the blob was created with.
    #[must_use]
    pub fn spec(&self) -> &KinematicBlobSpec {
        &self.spec
    }

    /// Current outline size.
    #[must_use]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Current perturbation phase.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    pub(crate) fn update(&mut self, time_step: f32) {
        self.size += self.spec.growth_speed;
        self.time += time_step;
    }

    /// Outline regenerated at the current size, in box coordinates.
    #[must_use]
    pub fn path(&self) -> Vec<PathCommand> {
        let outline = outline_commands(self.size, self.spec.growth, self.spec.edges, self.spec.seed);
        self.perturbation.apply(&outline, self.time)
    }

    /// Maps box coordinates of [`Self::path`] so the outline is centred on the blob.
    #[must_use]
    pub fn transform(&self) -> Affine2 {
        Affine2::from_translation(Vec2::new(
            self.spec.x - self.size / 2.0,
            self.spec.y - self.size / 2.0,
        ))
    }

    /// Fill colour.
    #[must_use]
    pub fn fill(&self) -> Hsba {
        self.spec.fill
    }

    /// Stroke colour.
    #[must_use]
    pub fn stroke(&self) -> Hsba {
        self.spec.stroke
    }

    /// Circle covered by the initial outline.
    #[must_use]
    pub fn footprint(&self) -> Footprint {
        self.spec.footprint()
    }
}
