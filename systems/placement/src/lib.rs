#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bounded-retry randomized placement of circular footprints.

use blobsync_core::{Bounds, Footprint};
use rand::Rng;
use thiserror::Error;

/// Retry budget used by directors when none is configured.
pub const DEFAULT_MAX_TRIES: u32 = 100;

/// Reasons a placement request may fail.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    /// Every candidate overlapped an existing footprint.
    #[error("no free space found after {attempts} attempts")]
    TooCrowded {
        /// Number of candidates that were tried.
        attempts: u32,
    },
}

/// Searches for a position inside `bounds` where a circle of `radius` clears every existing footprint.
///
/// Candidates are drawn uniformly from `bounds`. A candidate is accepted when
/// the distance to every existing centre is at least the sum of the radii. At
/// most `max_tries` candidates are drawn.
pub fn place<R>(
    existing: &[Footprint],
    bounds: Bounds,
    radius: f32,
    max_tries: u32,
    rng: &mut R,
) -> Result<Footprint, PlacementError>
where
    R: Rng + ?Sized,
{
    for _ in 0..max_tries {
        let candidate = Footprint::new(
            sample_axis(rng, bounds.min_x, bounds.max_x),
            sample_axis(rng, bounds.min_y, bounds.max_y),
            radius,
        );
        if existing.iter().all(|other| candidate.clears(other)) {
            return Ok(candidate);
        }
    }

    Err(PlacementError::TooCrowded {
        attempts: max_tries,
    })
}

/// Degenerate or inverted extents collapse onto `min`.
fn sample_axis<R>(rng: &mut R, min: f32, max: f32) -> f32
where
    R: Rng + ?Sized,
{
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}
