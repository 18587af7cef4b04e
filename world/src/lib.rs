#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative animation state for Blobsync.
//!
//! The world owns every live shape, the arena walls, the physics backend and
//! the deferred-action queue. It is mutated exclusively through [`apply`] and
//! observed through the functions in [`query`].

mod arena;
mod deferred;
mod shapes;

pub use arena::{ArenaWall, ArenaWalls, WallSide};
pub use shapes::{KinematicGrowingBlob, StaticLayeredBlob};

use blobsync_core::{
    Canvas, CircleBody, Command, Event, PhysicsBackend, SessionState, ShapeId,
};
use blobsync_path::{VertexPerturbation, PERTURBATION_AMPLITUDE};
use deferred::DeferredQueue;
use tracing::debug;

const DEFAULT_CANVAS: Canvas = Canvas::new(800.0, 600.0);

/// Per-frame constants applied by the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldTuning {
    /// Restitution given to physics-backed blob bodies.
    pub restitution: f32,
    /// Thickness revealed per frame on every wall.
    pub reveal_increment: f32,
    /// Wobble phase added to physics-backed blobs per frame.
    pub wobble_step: f32,
    /// Wobble amplitude for physics-backed blobs.
    pub wobble_amplitude: f32,
    /// Perturbation phase added to kinematic blobs per frame.
    pub kinematic_time_step: f32,
    /// Perturbation amplitude for kinematic blobs.
    pub kinematic_amplitude: f32,
    /// Stroke width used by physics-backed blob passes.
    pub stroke_weight: f32,
    /// Distance past the canvas edge, beyond a blob's radius, at which an
    /// escaped physics blob is dropped together with its body.
    pub escape_margin: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            restitution: 0.5,
            reveal_increment: 5.0,
            wobble_step: 0.01,
            wobble_amplitude: 5.0,
            kinematic_time_step: 0.05,
            kinematic_amplitude: PERTURBATION_AMPLITUDE,
            stroke_weight: 4.0,
            escape_margin: 200.0,
        }
    }
}

/// Represents the authoritative animation state.
#[derive(Debug)]
pub struct World {
    tuning: WorldTuning,
    physics: Box<dyn PhysicsBackend>,
    canvas: Canvas,
    session: SessionState,
    walls: Option<ArenaWalls>,
    physics_blobs: Vec<StaticLayeredBlob>,
    outline_blobs: Vec<KinematicGrowingBlob>,
    growing_blobs: Vec<KinematicGrowingBlob>,
    deferred: DeferredQueue,
    next_shape: u32,
    frame_index: u64,
}

impl World {
    /// Creates an empty world driving the provided physics backend.
    #[must_use]
    pub fn new(physics: Box<dyn PhysicsBackend>) -> Self {
        Self::with_tuning(physics, WorldTuning::default())
    }

    /// Creates an empty world with explicit per-frame constants.
    #[must_use]
    pub fn with_tuning(physics: Box<dyn PhysicsBackend>, tuning: WorldTuning) -> Self {
        Self {
            tuning,
            physics,
            canvas: DEFAULT_CANVAS,
            session: SessionState::Idle,
            walls: None,
            physics_blobs: Vec::new(),
            outline_blobs: Vec::new(),
            growing_blobs: Vec::new(),
            deferred: DeferredQueue::default(),
            next_shape: 0,
            frame_index: 0,
        }
    }

    fn allocate_shape(&mut self) -> ShapeId {
        let id = ShapeId::new(self.next_shape);
        self.next_shape = self.next_shape.wrapping_add(1);
        id
    }

    fn clear_physics_blobs(&mut self) -> usize {
        let count = self.physics_blobs.len();
        for blob in self.physics_blobs.drain(..) {
            let _ = self.physics.remove(blob.body());
        }
        count
    }

    /// Drops physics blobs that fell out past the canvas, returning how many went.
    fn cull_escaped_blobs(&mut self) -> usize {
        let canvas = self.canvas;
        let margin = self.tuning.escape_margin;
        let before = self.physics_blobs.len();
        let physics = self.physics.as_mut();
        self.physics_blobs.retain(|blob| {
            let reach = blob.spec().radius + margin;
            let pose = blob.pose();
            let inside = pose.x >= -reach
                && pose.x <= canvas.width + reach
                && pose.y >= -reach
                && pose.y <= canvas.height + reach;
            if !inside {
                let _ = physics.remove(blob.body());
            }
            inside
        });
        before - self.physics_blobs.len()
    }

    fn teardown_walls(&mut self) -> bool {
        match self.walls.take() {
            Some(walls) => {
                walls.teardown(self.physics.as_mut());
                true
            }
            None => false,
        }
    }

    fn advance_frame(&mut self) {
        for blob in &mut self.physics_blobs {
            if let Some(pose) = self.physics.pose(blob.body()) {
                blob.sync_pose(pose);
            }
            blob.advance_wobble(self.tuning.wobble_step);
        }
        for blob in self.outline_blobs.iter_mut().chain(&mut self.growing_blobs) {
            blob.update(self.tuning.kinematic_time_step);
        }
        if let Some(walls) = self.walls.as_mut() {
            walls.advance_reveal(self.tuning.reveal_increment);
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureCanvas { canvas } => {
            world.canvas = canvas;
            out_events.push(Event::CanvasConfigured { canvas });
        }
        Command::Tick { dt } => {
            world.frame_index = world.frame_index.saturating_add(1);
            world.physics.step(dt);
            world.advance_frame();
            let escaped = world.cull_escaped_blobs();
            if escaped > 0 {
                debug!(escaped, frame = world.frame_index, "dropped blobs outside the canvas");
            }
            out_events.push(Event::TimeAdvanced { dt });

            for action in world.deferred.advance(dt) {
                debug!(?action, frame = world.frame_index, "deferred action due");
                out_events.push(Event::DeferredActionDue { action });
            }
        }
        Command::SetSessionState { state } => {
            if world.session != state {
                world.session = state;
                out_events.push(Event::SessionStateChanged { state });
            }
        }
        Command::SpawnPhysicsBlob { spec } => {
            let body = world.physics.insert_circle(CircleBody {
                x: spec.x,
                y: spec.y,
                radius: spec.radius,
                angle: spec.angle,
                restitution: world.tuning.restitution,
            });
            let shape = world.allocate_shape();
            world.physics_blobs.push(StaticLayeredBlob::new(
                shape,
                body,
                spec,
                VertexPerturbation::new(world.tuning.wobble_amplitude),
                world.tuning.stroke_weight,
            ));
            out_events.push(Event::PhysicsBlobSpawned { shape, body });
        }
        Command::ClearPhysicsBlobs => {
            let count = world.clear_physics_blobs();
            out_events.push(Event::PhysicsBlobsCleared { count });
        }
        Command::BuildWalls => {
            let _ = world.teardown_walls();
            world.walls = Some(ArenaWalls::build(world.physics.as_mut(), world.canvas));
            out_events.push(Event::WallsBuilt);
        }
        Command::TeardownWalls => {
            if world.teardown_walls() {
                out_events.push(Event::WallsTornDown);
            }
        }
        Command::ScheduleDeferred { delay, action } => {
            world.deferred.schedule(delay, action);
        }
        Command::AddOutlineBlob { spec } => {
            let shape = world.allocate_shape();
            world.outline_blobs.push(KinematicGrowingBlob::new(
                shape,
                spec,
                VertexPerturbation::new(world.tuning.kinematic_amplitude),
            ));
            out_events.push(Event::OutlineBlobAdded { shape });
        }
        Command::ClearOutlineBlobs => {
            let count = world.outline_blobs.len();
            world.outline_blobs.clear();
            out_events.push(Event::OutlineBlobsCleared { count });
        }
        Command::AddGrowingBlob { spec } => {
            let shape = world.allocate_shape();
            world.growing_blobs.push(KinematicGrowingBlob::new(
                shape,
                spec,
                VertexPerturbation::new(world.tuning.kinematic_amplitude),
            ));
            out_events.push(Event::GrowingBlobAdded { shape });
        }
        Command::ClearGrowingBlobs => {
            let count = world.growing_blobs.len();
            world.growing_blobs.clear();
            out_events.push(Event::GrowingBlobsCleared { count });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use blobsync_core::{Canvas, Footprint, SessionState};

    use super::{ArenaWalls, KinematicGrowingBlob, StaticLayeredBlob, World};

    /// Canvas dimensions currently in effect.
    #[must_use]
    pub fn canvas(world: &World) -> Canvas {
        world.canvas
    }

    /// Session state last reported by the transport.
    #[must_use]
    pub fn session_state(world: &World) -> SessionState {
        world.session
    }

    /// Physics-backed blobs in spawn order.
    #[must_use]
    pub fn physics_blobs(world: &World) -> &[StaticLayeredBlob] {
        &world.physics_blobs
    }

    /// Arena walls, when they are currently built.
    #[must_use]
    pub fn walls(world: &World) -> Option<&ArenaWalls> {
        world.walls.as_ref()
    }

    /// Fixed outlines of the outline batch.
    #[must_use]
    pub fn outline_blobs(world: &World) -> &[KinematicGrowingBlob] {
        &world.outline_blobs
    }

    /// Footprints of the outline batch, as consumed by placement.
    #[must_use]
    pub fn outline_footprints(world: &World) -> Vec<Footprint> {
        world
            .outline_blobs
            .iter()
            .map(KinematicGrowingBlob::footprint)
            .collect()
    }

    /// Growing outlines of the animated batch.
    #[must_use]
    pub fn growing_blobs(world: &World) -> &[KinematicGrowingBlob] {
        &world.growing_blobs
    }

    /// Number of deferred actions that have not become due yet.
    #[must_use]
    pub fn pending_deferred(world: &World) -> usize {
        world.deferred.len()
    }

    /// Number of bodies registered with the physics backend.
    #[must_use]
    pub fn body_count(world: &World) -> usize {
        world.physics.body_count()
    }

    /// Number of frames the world has advanced through.
    #[must_use]
    pub fn frame_index(world: &World) -> u64 {
        world.frame_index
    }
}
