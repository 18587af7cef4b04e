#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Blobsync engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The playback adapter fires
//! [`CuePayload`] values at their scheduled timestamps, director systems turn
//! them into [`Command`] batches, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that systems react
//! to on the next pass.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Canonical line logged once playback reaches the end of the track.
pub const CREDITS_LINE: &str = "Music By: http://labcat.nz/ | Animation By: https://github.com/LABCAT/";

/// Lifecycle of a playback session.
///
/// Transitions are driven by the playback adapter. Directors only react to
/// fired cues while the session is [`SessionState::Running`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Playback has not been started yet.
    #[default]
    Idle,
    /// The playback clock is advancing and cues fire.
    Running,
    /// The playback clock is halted; pending cues stay armed.
    Paused,
    /// Playback reached the end of the track.
    Ended,
}

/// Single note onset supplied by the note-timeline provider.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Absolute tick position of the onset within its track.
    pub tick: u64,
    /// Onset time measured in seconds from the start of the track.
    pub time: f64,
    /// Length of the note in seconds, zero when no release was found.
    pub duration: f64,
    /// MIDI key number of the note.
    pub pitch: u8,
    /// MIDI velocity of the onset.
    pub velocity: u8,
}

impl NoteEvent {
    /// Creates a note with the provided tick and onset time and neutral metadata.
    #[must_use]
    pub const fn at(tick: u64, time: f64) -> Self {
        Self {
            tick,
            time,
            duration: 0.0,
            pitch: 60,
            velocity: 100,
        }
    }
}

/// Identifies which handler a scheduled cue set is routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CueSetId {
    /// Physics-backed set that also drives the periodic arena reset.
    PhysicsPrimary,
    /// Second physics-backed set, drawing hues from the second theme range.
    PhysicsSecondary,
    /// Third physics-backed set, drawing hues from the third theme range.
    PhysicsTertiary,
    /// Kinematic set placing one non-overlapping outline per cue.
    OutlineBatch,
    /// Kinematic set appending one growing outline per cue.
    AnimatedBatch,
}

impl CueSetId {
    /// Index of the theme hue range used by physics-backed cue sets.
    #[must_use]
    pub const fn theme_range_index(self) -> Option<usize> {
        match self {
            Self::PhysicsPrimary => Some(0),
            Self::PhysicsSecondary => Some(1),
            Self::PhysicsTertiary => Some(2),
            Self::OutlineBatch | Self::AnimatedBatch => None,
        }
    }
}

impl fmt::Display for CueSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::PhysicsPrimary => "physics-primary",
            Self::PhysicsSecondary => "physics-secondary",
            Self::PhysicsTertiary => "physics-tertiary",
            Self::OutlineBatch => "outline-batch",
            Self::AnimatedBatch => "animated-batch",
        };
        f.write_str(label)
    }
}

/// Payload delivered to a handler when a scheduled cue fires.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CuePayload {
    /// Cue set the payload was scheduled for.
    pub cue_set: CueSetId,
    /// One-based position of the cue within its scheduling pass.
    pub ordinal: u32,
    /// Playback time in seconds at which the cue fires.
    pub source_time: f64,
    /// Note that produced the cue, when one is attached.
    pub note: Option<NoteEvent>,
}

/// Single command decoded from an outline description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    /// Moves the pen to an absolute position.
    Move {
        /// Horizontal coordinate.
        x: f32,
        /// Vertical coordinate.
        y: f32,
    },
    /// Draws a quadratic curve from the pen through a control point.
    QuadraticCurve {
        /// Horizontal coordinate of the control point.
        cx: f32,
        /// Vertical coordinate of the control point.
        cy: f32,
        /// Horizontal coordinate of the end point.
        x: f32,
        /// Vertical coordinate of the end point.
        y: f32,
    },
    /// Command letter that is carried through but never drawn.
    Unsupported {
        /// Letter that introduced the command.
        command: char,
        /// Numeric parameters that followed the letter.
        params: Vec<f32>,
    },
}

/// Circle approximation of a shape used while searching for free space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    /// Horizontal coordinate of the centre.
    pub x: f32,
    /// Vertical coordinate of the centre.
    pub y: f32,
    /// Radius of the circle.
    pub radius: f32,
}

impl Footprint {
    /// Creates a new footprint.
    #[must_use]
    pub const fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }

    /// Reports whether two footprints keep at least the sum of their radii apart.
    #[must_use]
    pub fn clears(&self, other: &Footprint) -> bool {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt() >= self.radius + other.radius
    }
}

/// Axis-aligned rectangle that bounds random placement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Smallest horizontal coordinate.
    pub min_x: f32,
    /// Smallest vertical coordinate.
    pub min_y: f32,
    /// Largest horizontal coordinate.
    pub max_x: f32,
    /// Largest vertical coordinate.
    pub max_y: f32,
}

impl Bounds {
    /// Creates bounds from two corners.
    #[must_use]
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Reports whether the point lies within the bounds, edges included.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Dimensions of the drawing canvas in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    /// Width of the canvas.
    pub width: f32,
    /// Height of the canvas.
    pub height: f32,
}

impl Canvas {
    /// Creates a new canvas descriptor.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Bounds covering the whole canvas.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        Bounds::new(0.0, 0.0, self.width, self.height)
    }

    /// Thickness of the arena walls for this canvas size.
    #[must_use]
    pub fn wall_thickness(&self) -> f32 {
        self.width * 0.02
    }
}

/// Colour in hue/saturation/brightness space with alpha.
///
/// Hue spans `0..360`, saturation and brightness span `0..100` and alpha spans
/// `0..1`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hsba {
    /// Hue angle in degrees.
    pub hue: f32,
    /// Saturation percentage.
    pub saturation: f32,
    /// Brightness percentage.
    pub brightness: f32,
    /// Opacity between zero and one.
    pub alpha: f32,
}

impl Hsba {
    /// Opaque white.
    pub const WHITE: Hsba = Hsba::new(0.0, 0.0, 100.0, 1.0);

    /// Creates a new colour.
    #[must_use]
    pub const fn new(hue: f32, saturation: f32, brightness: f32, alpha: f32) -> Self {
        Self {
            hue,
            saturation,
            brightness,
            alpha,
        }
    }
}

/// Closed interval of hues a cue set may draw from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HueRange {
    /// Lowest hue in degrees.
    pub min: f32,
    /// Highest hue in degrees.
    pub max: f32,
}

impl HueRange {
    /// Creates a new hue range.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Reports whether the hue falls inside the range.
    #[must_use]
    pub fn contains(&self, hue: f32) -> bool {
        hue >= self.min && hue <= self.max
    }
}

/// Named palette selected once per session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    /// Human readable theme name.
    pub name: &'static str,
    /// Hue ranges used by the three physics-backed cue sets.
    pub ranges: [HueRange; 3],
}

/// Index into [`THEMES`] of the theme favoured by session theme selection.
pub const FAVOURED_THEME_INDEX: usize = 6;

/// Probability of picking [`FAVOURED_THEME_INDEX`] before falling back to a uniform draw.
pub const FAVOURED_THEME_PROBABILITY: f64 = 0.4;

/// Catalogue of every palette a session may use.
pub const THEMES: [Theme; 8] = [
    theme("Cool Contrast", [(230.0, 260.0), (10.0, 50.0), (120.0, 150.0)]),
    theme("Warm Spectrum", [(0.0, 40.0), (180.0, 220.0), (300.0, 340.0)]),
    theme("Vibrant Mix", [(60.0, 90.0), (240.0, 270.0), (330.0, 360.0)]),
    theme("Ocean Depths", [(180.0, 210.0), (30.0, 60.0), (300.0, 330.0)]),
    theme("Sunset Journey", [(10.0, 40.0), (240.0, 270.0), (120.0, 150.0)]),
    theme("Original Blue", [(230.0, 260.0), (60.0, 120.0), (0.0, 40.0)]),
    theme("Original Green", [(60.0, 120.0), (0.0, 40.0), (230.0, 260.0)]),
    theme("Original Warm", [(0.0, 40.0), (230.0, 260.0), (60.0, 120.0)]),
];

const fn theme(name: &'static str, ranges: [(f32, f32); 3]) -> Theme {
    Theme {
        name,
        ranges: [
            HueRange::new(ranges[0].0, ranges[0].1),
            HueRange::new(ranges[1].0, ranges[1].1),
            HueRange::new(ranges[2].0, ranges[2].1),
        ],
    }
}

/// Styling for a single outline pass drawn around a shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderPass {
    /// Scale applied to the shape's outline for this pass.
    pub scale: f32,
    /// Fill colour, `None` leaves the outline unfilled.
    pub fill: Option<Hsba>,
    /// Stroke colour, `None` leaves the outline unstroked.
    pub stroke: Option<Hsba>,
    /// Width of the stroke in pixels.
    pub stroke_weight: f32,
}

/// Opaque handle to a body registered with a physics backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(u32);

impl BodyHandle {
    /// Creates a handle from its numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Numeric value of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Live position and rotation of a physics body.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BodyPose {
    /// Horizontal coordinate of the body centre.
    pub x: f32,
    /// Vertical coordinate of the body centre.
    pub y: f32,
    /// Rotation in radians.
    pub angle: f32,
}

/// Parameters for a dynamic circular body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleBody {
    /// Initial horizontal coordinate of the centre.
    pub x: f32,
    /// Initial vertical coordinate of the centre.
    pub y: f32,
    /// Radius of the collision circle.
    pub radius: f32,
    /// Initial rotation in radians.
    pub angle: f32,
    /// Bounciness applied when resolving contacts.
    pub restitution: f32,
}

/// Parameters for a static axis-aligned rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectangleBody {
    /// Horizontal coordinate of the centre.
    pub x: f32,
    /// Vertical coordinate of the centre.
    pub y: f32,
    /// Full width of the rectangle.
    pub width: f32,
    /// Full height of the rectangle.
    pub height: f32,
}

/// Capability surface the engine requires from a rigid-body simulation.
///
/// Every inserted body must be paired with exactly one [`PhysicsBackend::remove`]
/// call by its owner.
pub trait PhysicsBackend: fmt::Debug {
    /// Creates a dynamic circle and adds it to the simulated world.
    fn insert_circle(&mut self, body: CircleBody) -> BodyHandle;

    /// Creates a static rectangle and adds it to the simulated world.
    fn insert_static_rectangle(&mut self, body: RectangleBody) -> BodyHandle;

    /// Removes a body from the simulated world, reporting whether it existed.
    fn remove(&mut self, handle: BodyHandle) -> bool;

    /// Live pose of the body, if it is still registered.
    fn pose(&self, handle: BodyHandle) -> Option<BodyPose>;

    /// Advances the simulation by the provided delta time.
    fn step(&mut self, dt: Duration);

    /// Number of bodies currently registered.
    fn body_count(&self) -> usize;
}

/// Unique identifier assigned to a shape by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(u32);

impl ShapeId {
    /// Creates a new shape identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Numeric value of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Parameters describing a physics-backed blob to spawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsBlobSpec {
    /// Initial horizontal coordinate.
    pub x: f32,
    /// Initial vertical coordinate.
    pub y: f32,
    /// Radius of the collision circle.
    pub radius: f32,
    /// Initial rotation in radians.
    pub angle: f32,
    /// Colour shared by the stroke and optional fill.
    pub color: Hsba,
    /// Whether the single-pass render fills the outline.
    pub filled: bool,
    /// Whether the blob renders as three concentric passes.
    pub layered: bool,
    /// Inner-radius factor handed to the outline generator.
    pub growth: u32,
    /// Number of outline edges.
    pub edges: u32,
    /// Seed for the outline generator.
    pub seed: f32,
}

/// Parameters describing a kinematic blob to add.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KinematicBlobSpec {
    /// Horizontal coordinate of the blob centre.
    pub x: f32,
    /// Vertical coordinate of the blob centre.
    pub y: f32,
    /// Initial outline size.
    pub size: f32,
    /// Size added on every update; zero keeps the outline fixed.
    pub growth_speed: f32,
    /// Inner-radius factor handed to the outline generator.
    pub growth: u32,
    /// Number of outline edges.
    pub edges: u32,
    /// Seed for the outline generator.
    pub seed: f32,
    /// Fill colour.
    pub fill: Hsba,
    /// Stroke colour.
    pub stroke: Hsba,
}

impl KinematicBlobSpec {
    /// Footprint covered by the blob's initial outline.
    #[must_use]
    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.x, self.y, self.size / 2.0)
    }
}

/// Follow-up actions that run once their delay elapses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeferredAction {
    /// Second half of an arena reset: clear the physics collection and rebuild walls.
    CompleteArenaReset,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Updates the canvas dimensions used for size-dependent constants.
    ConfigureCanvas {
        /// New canvas dimensions.
        canvas: Canvas,
    },
    /// Advances the frame clock by the provided delta time.
    Tick {
        /// Duration of frame time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Records the playback session state reported by the transport.
    SetSessionState {
        /// State reported by the transport.
        state: SessionState,
    },
    /// Spawns a physics-backed blob.
    SpawnPhysicsBlob {
        /// Parameters for the new blob.
        spec: PhysicsBlobSpec,
    },
    /// Removes every physics-backed blob, releasing their bodies.
    ClearPhysicsBlobs,
    /// Builds the four arena walls, tearing down any existing set first.
    BuildWalls,
    /// Tears down the arena walls if they exist.
    TeardownWalls,
    /// Queues an action to run once the delay elapses on the frame clock.
    ScheduleDeferred {
        /// Delay measured from the current frame clock.
        delay: Duration,
        /// Action to run when due.
        action: DeferredAction,
    },
    /// Adds a fixed outline to the outline batch.
    AddOutlineBlob {
        /// Parameters for the new outline.
        spec: KinematicBlobSpec,
    },
    /// Empties the outline batch.
    ClearOutlineBlobs,
    /// Adds a growing outline to the animated batch.
    AddGrowingBlob {
        /// Parameters for the new outline.
        spec: KinematicBlobSpec,
    },
    /// Empties the animated batch.
    ClearGrowingBlobs,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the frame clock advanced.
    TimeAdvanced {
        /// Duration that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the canvas dimensions changed.
    CanvasConfigured {
        /// New canvas dimensions.
        canvas: Canvas,
    },
    /// Announces that the session entered a new state.
    SessionStateChanged {
        /// State that became active.
        state: SessionState,
    },
    /// Confirms that a physics-backed blob was created.
    PhysicsBlobSpawned {
        /// Identifier assigned to the blob.
        shape: ShapeId,
        /// Body registered for the blob.
        body: BodyHandle,
    },
    /// Reports that the physics-backed collection was emptied.
    PhysicsBlobsCleared {
        /// Number of blobs removed.
        count: usize,
    },
    /// Confirms that the arena walls were built.
    WallsBuilt,
    /// Confirms that the arena walls were torn down.
    WallsTornDown,
    /// Announces that a deferred action became due and must be carried out.
    DeferredActionDue {
        /// Action that became due.
        action: DeferredAction,
    },
    /// Confirms that an outline joined the outline batch.
    OutlineBlobAdded {
        /// Identifier assigned to the outline.
        shape: ShapeId,
    },
    /// Reports that the outline batch was emptied.
    OutlineBlobsCleared {
        /// Number of outlines removed.
        count: usize,
    },
    /// Confirms that a growing outline joined the animated batch.
    GrowingBlobAdded {
        /// Identifier assigned to the outline.
        shape: ShapeId,
    },
    /// Reports that the animated batch was emptied.
    GrowingBlobsCleared {
        /// Number of outlines removed.
        count: usize,
    },
}
