//! Pairwise collision resolution on top of the spatial hash broad phase
//!
//! Every candidate pair `(a, b)` with `a < b` is checked once. Overlapping
//! pairs are pushed apart symmetrically to exactly `min_distance`, and pairs
//! that are still closing get an impulse along the contact normal.

use super::spatial_hash::SpatialHash;
use super::states::Body;

/// Resolve all collisions among `bodies` using `hash` as the broad phase.
///
/// `hash` must have been populated from the current positions. `scratch` is
/// reused for neighbour lists between calls. Returns the number of pairs that
/// were found overlapping.
pub fn resolve_collisions(
    bodies: &mut [Body],
    hash: &SpatialHash,
    min_distance: f64,
    restitution: f64,
    scratch: &mut Vec<usize>,
) -> usize {
    let mut collisions = 0;

    for a in 0..bodies.len() {
        hash.neighbors_into(&bodies[a].x, scratch);

        for &b in scratch.iter() {
            // each unordered pair once, and never a body with itself
            if b <= a {
                continue;
            }

            // a < b, so splitting at b gives disjoint &mut to both bodies
            let (lo, hi) = bodies.split_at_mut(b);
            if resolve_pair(&mut lo[a], &mut hi[0], min_distance, restitution) {
                collisions += 1;
            }
        }
    }

    collisions
}

/// Separate and bounce a single pair. Returns `true` if they overlapped.
///
/// Coincident bodies (`distance == 0`) have no contact normal and are left
/// alone.
pub fn resolve_pair(a: &mut Body, b: &mut Body, min_distance: f64, restitution: f64) -> bool {
    let delta = b.x - a.x;
    let distance = delta.norm();
    if distance == 0.0 || distance >= min_distance {
        return false;
    }

    let normal = delta / distance; // from a towards b

    // push both bodies out by half the overlap each
    let half_overlap = 0.5 * (min_distance - distance);
    a.x -= normal * half_overlap;
    b.x += normal * half_overlap;

    // only bounce if approaching along the normal
    let vel_along_normal = (b.v - a.v).dot(&normal);
    if vel_along_normal <= 0.0 {
        let impulse = -(1.0 + restitution) * vel_along_normal / (1.0 / a.m + 1.0 / b.m);
        a.v -= normal * (impulse / a.m);
        b.v += normal * (impulse / b.m);
    }

    true
}
