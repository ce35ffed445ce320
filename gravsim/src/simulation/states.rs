//! Core state types for the 2D kernel.
//!
//! - `NVec2` is the vector primitive every other module works in
//! - `Body` holds per-body state, `System` is the body registry that owns them
//!
//! The tree and the spatial hash refer to bodies by their index in
//! `System::bodies`, never by reference, so the registry is free to grow.

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

/// Side length of the square simulation domain `[0, DOMAIN)²`
pub const DOMAIN: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct Body {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub f: NVec2, // force accumulator, cleared every step
    pub m: f64, // mass, > 0
    pub density: f64, // diagnostic density, cleared every step
}

impl Body {
    pub fn new(x: NVec2, v: NVec2, m: f64) -> Self {
        Self {
            x,
            v,
            f: NVec2::zeros(),
            m,
            density: 0.0,
        }
    }

    pub fn momentum(&self) -> NVec2 {
        self.v * self.m
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.m * self.v.norm_squared()
    }
}

/// Initial state handed to the engine by its host
#[derive(Debug, Clone, Copy)]
pub struct BodyInit {
    pub position: NVec2,
    pub velocity: NVec2,
    pub mass: f64,
}

impl BodyInit {
    pub fn at_rest(position: NVec2, mass: f64) -> Self {
        Self {
            position,
            velocity: NVec2::zeros(),
            mass,
        }
    }
}

/// Body registry. Sole owner of per-body state.
#[derive(Debug, Clone, Default)]
pub struct System {
    pub bodies: Vec<Body>, // 2d collection of bodies
}

impl System {
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn total_momentum(&self) -> NVec2 {
        self.bodies.iter().map(Body::momentum).sum()
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(Body::kinetic_energy).sum()
    }
}

/// Unit vector along `v`, or the zero vector when `v` has no length.
///
/// Zero-length directions show up whenever two bodies (or a body and a
/// center of mass) coincide; returning zero drops that contribution instead
/// of producing NaNs.
pub fn normalize_or_zero(v: &NVec2) -> NVec2 {
    v.try_normalize(0.0).unwrap_or_else(NVec2::zeros)
}

/// Wrap a coordinate onto `[0, DOMAIN)`.
///
/// In-range values are returned untouched; the `+ d` round trip would
/// otherwise perturb them in the last bit. Out-of-range values use
/// `(x mod d + d) mod d` rather than `rem_euclid`, which returns `d` itself
/// for tiny negative inputs.
pub fn wrap_unit(x: f64) -> f64 {
    if (0.0..DOMAIN).contains(&x) {
        return x;
    }
    ((x % DOMAIN) + DOMAIN) % DOMAIN
}
