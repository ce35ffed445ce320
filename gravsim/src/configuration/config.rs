//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – kernel options fixed for the whole run
//! - [`ParametersConfig`] – per-step physical parameters and run length
//! - [`BodyConfig`]       – explicit initial state for individual bodies
//! - [`RandomConfig`]     – a seeded random cloud of bodies
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   theta: 0.5              # Barnes-Hut opening threshold
//!   softening: 10.0         # force softening length
//!   density_radius: 0.0005  # density probe radius
//!   cell_size: 0.01         # spatial hash cell edge
//!   max_depth: 32           # quadtree depth cap
//!   parallel: true          # fan force evaluation out over threads
//!
//! parameters:
//!   G: 6.674e-11            # gravitational constant
//!   dt: 0.01                # time step
//!   min_distance: 0.01      # collision distance
//!   restitution: 1.0        # 1 = elastic
//!   steps: 1000             # ticks to run
//!   log_every: 100          # progress log interval
//!
//! bodies:
//!   - x: [ 0.4, 0.5 ]
//!     v: [ 0.0, 0.0 ]
//!     m: 100.0
//!
//! random:
//!   count: 100
//!   seed: 42
//!   mass: [ 10.0, 10000.0 ]
//!   position: [ 0.1, 0.9 ]
//!   speed: 0.01
//! ```
//!
//! Every `engine` field except `theta` is optional and falls back to the
//! kernel defaults. `bodies` and `random` may both be present; explicit bodies
//! come first.

use serde::Deserialize;

/// Kernel configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub theta: f64, // Determine if a node is approximated by its com instead of opened
    pub softening: Option<f64>, // Softening length added in quadrature to force distances
    pub density_radius: Option<f64>, // Nodes within this radius are not opened by the density probe
    pub cell_size: Option<f64>, // Spatial hash cell edge
    pub max_depth: Option<usize>, // Depth at which coincident bodies are merged
    pub parallel: Option<bool>, // `true` - force phase runs on the rayon pool
}

/// Per-step physical parameters and run control
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub G: f64, // gravitational constant
    pub dt: f64, // time step size
    pub min_distance: f64, // collision distance
    pub restitution: f64, // coefficient of restitution in [0, 1]
    pub steps: u64, // number of ticks the host runs
    #[serde(default = "default_log_every")]
    pub log_every: u64, // progress log interval in ticks
}

fn default_log_every() -> u64 {
    100
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: [f64; 2], // Initial position in domain units
    #[serde(default)]
    pub v: [f64; 2], // Initial velocity, defaults to rest
    pub m: f64, // Mass of the body
}

/// Seeded random cloud: uniform positions in a square, uniform masses,
/// uniform velocity components in `[-speed, speed]`
#[derive(Deserialize, Debug, Clone)]
pub struct RandomConfig {
    pub count: usize,
    pub seed: u64, // deterministic seed to make runs reproducible
    pub mass: [f64; 2], // [min, max)
    pub position: [f64; 2], // [min, max) along both axes
    pub speed: f64,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig, // Kernel configuration
    pub parameters: ParametersConfig, // Step parameters and run length
    #[serde(default)]
    pub bodies: Vec<BodyConfig>, // Explicit bodies
    pub random: Option<RandomConfig>, // Generated bodies, appended after `bodies`
}
