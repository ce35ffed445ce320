//! Force evaluators for the n-body kernel
//!
//! Both evaluators share one softened force law so they can be compared
//! directly:
//!
//! `F = G * mi * mj / (d'² + s) * normalize(xj - xi)`, `d' = sqrt(d² + s²)`
//!
//! - [`DirectGravity`] sums every pair exactly, O(N²)
//! - [`TreeGravity`] builds a Barnes–Hut tree and approximates, O(N log N)

use crate::simulation::barnes_hut::BarnesHutTree;
use crate::simulation::states::{normalize_or_zero, Body, NVec2};

/// Something that can fill in the force on every body of a registry
/// - `out[i]` is overwritten with the total force on `bodies[i]`
pub trait ForceModel {
    fn forces(&self, bodies: &[Body], out: &mut [NVec2]);
}

/// Magnitude of the softened attraction between two masses at separation
/// `dist`
#[allow(non_snake_case)]
pub fn softened_magnitude(G: f64, m1: f64, m2: f64, dist: f64, softening: f64) -> f64 {
    let d2_soft = dist * dist + softening * softening;
    G * m1 * m2 / (d2_soft + softening)
}

/// Exact pairwise gravity with softening
#[allow(non_snake_case)]
pub struct DirectGravity {
    pub G: f64, // gravitational constant
    pub softening: f64, // softening length
}

impl ForceModel for DirectGravity {
    fn forces(&self, bodies: &[Body], out: &mut [NVec2]) {
        for f in out.iter_mut() {
            *f = NVec2::zeros();
        }

        let n = bodies.len();
        // Loop over each unordered pair (i, j) with i < j
        for i in 0..n {
            let bi = &bodies[i];

            for j in (i + 1)..n {
                let bj = &bodies[j];

                // r points from i to j: i is pulled along +r, j along -r
                let r = bj.x - bi.x;
                let dir = normalize_or_zero(&r);
                if dir == NVec2::zeros() {
                    continue; // coincident, no defined direction
                }

                let f = dir * softened_magnitude(self.G, bi.m, bj.m, r.norm(), self.softening);
                out[i] += f;
                out[j] -= f;
            }
        }
    }
}

/// Barnes–Hut gravity: builds a fresh tree over `bodies` on every call
#[allow(non_snake_case)]
pub struct TreeGravity {
    pub G: f64,
    pub softening: f64,
    pub theta: f64,
    pub max_depth: usize,
}

impl ForceModel for TreeGravity {
    fn forces(&self, bodies: &[Body], out: &mut [NVec2]) {
        let tree = BarnesHutTree::build(bodies, self.max_depth);
        for (i, b) in bodies.iter().enumerate() {
            out[i] = tree.approximate_force(i, b, self.theta, self.G, self.softening);
        }
    }
}
