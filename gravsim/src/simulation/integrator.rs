//! Fixed-step time integration and boundary handling
//!
//! Semi-implicit (symplectic) Euler over the force accumulators the tree
//! left on each body, followed by a toroidal wrap onto the unit domain.

use super::states::{wrap_unit, Body};

/// Advance every body by one step of semi-implicit Euler:
/// v_n+1 = v_n + (f_n / m) dt, then x_n+1 = x_n + v_n+1 dt
pub fn semi_implicit_euler(bodies: &mut [Body], dt: f64) {
    for b in bodies.iter_mut() {
        let a = b.f / b.m; // acceleration from the accumulated force
        b.v += a * dt; // kick first
        b.x += b.v * dt; // then drift with the new velocity
    }
}

/// Wrap every position onto `[0, 1)²`, preserving it modulo 1
pub fn wrap_boundaries(bodies: &mut [Body]) {
    for b in bodies.iter_mut() {
        b.x.x = wrap_unit(b.x.x);
        b.x.y = wrap_unit(b.x.y);
    }
}
