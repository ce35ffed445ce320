//! Numerical and physical parameters for the kernel
//!
//! `StepParams` is what the host feeds every step:
//! - Barnes-Hut opening threshold `theta`,
//! - gravitational constant `G` and time step `dt`,
//! - collision distance and restitution
//!
//! `KernelParams` is fixed for the lifetime of an `Engine`:
//! - force softening and density probe radius,
//! - spatial hash cell size and tree depth cap,
//! - whether the force phase fans out over rayon

use super::error::{require_finite, require_non_negative, require_positive, SimError, SimResult};

pub const DEFAULT_SOFTENING: f64 = 10.0;
pub const DEFAULT_DENSITY_RADIUS: f64 = 0.0005;
pub const DEFAULT_CELL_SIZE: f64 = 0.01;
pub const DEFAULT_MAX_DEPTH: usize = 32;

#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy)]
pub struct StepParams {
    pub theta: f64, // opening threshold, 0 = exact pairwise sum
    pub G: f64, // gravitational constant
    pub dt: f64, // time step
    pub min_distance: f64, // bodies closer than this collide
    pub restitution: f64, // 1 = elastic, 0 = perfectly inelastic
}

impl StepParams {
    /// Check the contract `Engine::step` relies on
    pub fn validate(&self) -> SimResult<()> {
        require_non_negative("theta", self.theta)?;
        require_finite("G", self.G)?;
        require_non_negative("dt", self.dt)?;
        require_non_negative("min_distance", self.min_distance)?;
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(SimError::invalid("restitution", self.restitution, "must lie in [0, 1]"));
        }
        Ok(())
    }
}

impl Default for StepParams {
    fn default() -> Self {
        Self {
            theta: 0.5,
            G: 6.674e-11,
            dt: 0.01,
            min_distance: 0.01,
            restitution: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KernelParams {
    pub softening: f64, // length added in quadrature to every force distance
    pub density_radius: f64, // nodes closer than this are opened by the density probe
    pub cell_size: f64, // spatial hash cell edge
    pub max_depth: usize, // quadtree depth at which coincident bodies are merged
    pub parallel: bool, // fan the force phase out over rayon
}

impl KernelParams {
    pub fn validate(&self) -> SimResult<()> {
        require_non_negative("softening", self.softening)?;
        require_non_negative("density_radius", self.density_radius)?;
        require_positive("cell_size", self.cell_size)?;
        if self.max_depth == 0 {
            return Err(SimError::invalid("max_depth", 0.0, "must be at least 1"));
        }
        Ok(())
    }
}

impl Default for KernelParams {
    fn default() -> Self {
        Self {
            softening: DEFAULT_SOFTENING,
            density_radius: DEFAULT_DENSITY_RADIUS,
            cell_size: DEFAULT_CELL_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            parallel: true,
        }
    }
}
