//! Labelled random streams derived from the session seed.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

pub(crate) const PHYSICS_STREAM: &str = "physics-sketch";
pub(crate) const KINEMATIC_STREAM: &str = "kinematic-sketch";

/// Creates the generator for `label`, independent from every other label.
pub(crate) fn stream_rng(session_seed: u64, label: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_labeled_seed(session_seed, label))
}

fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
