//! Deterministic seeding for per-decision randomness.
//!
//! Tie-breaks, posterior draws and the exploration coin all draw from an RNG seeded
//! here. The seed depends only on the engine seed, the number of rewards applied so
//! far, and the exact bits of the context, so a repeated `select_arm` with no
//! intervening reward replays the same decision.
//!
//! Not cryptographic; FNV-1a over bytes followed by a SplitMix64 finalizer.

use crate::Context;

const FNV_OFFSET: u64 = 14695981039346656037;
const FNV_PRIME: u64 = 1099511628211;

#[inline]
fn fnv_bytes(mut h: u64, bytes: &[u8]) -> u64 {
    for b in bytes {
        h ^= *b as u64;
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

/// Seed for the RNG used by one decision.
#[must_use]
pub fn decision_seed(seed: u64, epoch: u64, context: &Context) -> u64 {
    let mut h = fnv_bytes(FNV_OFFSET, &epoch.to_le_bytes());
    for row in context.rows() {
        // Row separator so `[[a], [b]]` and `[[a, b]]` hash differently.
        h = fnv_bytes(h, &[0xff]);
        for v in row {
            h = fnv_bytes(h, &v.to_bits().to_le_bytes());
        }
    }
    splitmix64(seed ^ h)
}

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
