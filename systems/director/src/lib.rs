#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Director systems that translate fired cues into world commands.
//!
//! Two sketch variants exist. [`PhysicsSketch`] spawns physics-backed blobs
//! into a walled arena and periodically resets it, while [`KinematicSketch`]
//! places fixed outlines without overlap and appends growing outlines. Both
//! are pure: they read cues, events and world views and only ever emit
//! [`blobsync_core::Command`] values.

mod kinematic;
mod physics;
mod streams;

pub use kinematic::{KinematicSketch, KinematicSketchTuning};
pub use physics::{ColourPolicy, PhysicsSketch, PhysicsSketchTuning};

use rand::Rng;

/// Uniform draw from `[min, max)` that collapses onto `min` for empty ranges.
pub(crate) fn uniform<R>(rng: &mut R, min: f32, max: f32) -> f32
where
    R: Rng + ?Sized,
{
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

/// Uniform integer draw from `[min, max)` that collapses onto `min` for empty ranges.
pub(crate) fn uniform_count<R>(rng: &mut R, min: u32, max: u32) -> u32
where
    R: Rng + ?Sized,
{
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}
