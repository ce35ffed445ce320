//! Per-step simulation kernel
//!
//! `Engine` owns the body registry together with the structures that are
//! rebuilt from it every step (Barnes–Hut tree, spatial hash) and runs one
//! tick through a fixed sequence of phases:
//!
//! 1. clear force/density accumulators
//! 2. rebuild the tree
//! 3. force and density per body (rayon fan-out when enabled)
//! 4. semi-implicit Euler
//! 5. toroidal wrap onto the unit square
//! 6. rebuild the hash from the wrapped positions
//! 7. resolve collisions
//!
//! The hash rebuild sits after the wrap, not next to the tree rebuild ahead
//! of the force phase. Collision resolution tests post-wrap positions, and
//! the cells have to describe those positions for the 3x3 query to find
//! every overlapping pair.
//!
//! The engine keeps no clock; the host owns simulation time.

use rayon::prelude::*;
use tracing::{debug, warn};

use super::barnes_hut::BarnesHutTree;
use super::collisions::resolve_collisions;
use super::error::{require_finite, require_positive, SimResult};
use super::integrator::{semi_implicit_euler, wrap_boundaries};
use super::params::{KernelParams, StepParams};
use super::spatial_hash::SpatialHash;
use super::states::{Body, BodyInit, System};

/// What happened during one call to [`Engine::step`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    pub tree_nodes: usize, // arena size after the rebuild
    pub nodes_visited: usize, // summed over every force query
    pub merged_bodies: usize, // bodies folded into depth-capped leaves
    pub collisions: usize, // overlapping pairs resolved
    pub max_force: f64, // largest |f| over all bodies
}

#[derive(Debug, Clone)]
pub struct Engine {
    params: KernelParams,
    system: System,
    tree: BarnesHutTree,
    hash: SpatialHash,
    neighbors: Vec<usize>, // scratch for collision queries
    max_force: f64,
}

impl Engine {
    pub fn new(params: KernelParams) -> SimResult<Self> {
        params.validate()?;
        Ok(Self {
            tree: BarnesHutTree::new(params.max_depth),
            hash: SpatialHash::new(params.cell_size)?,
            params,
            system: System::default(),
            neighbors: Vec::new(),
            max_force: 0.0,
        })
    }

    /// Replace the registry with `bodies`.
    ///
    /// Masses must be finite and positive, positions and velocities finite.
    /// On error the previous registry is left untouched.
    pub fn initialize<I>(&mut self, bodies: I) -> SimResult<()>
    where
        I: IntoIterator<Item = BodyInit>,
    {
        let bodies = bodies
            .into_iter()
            .map(|init| {
                require_positive("mass", init.mass)?;
                for c in init.position.iter().chain(init.velocity.iter()) {
                    require_finite("body state", *c)?;
                }
                Ok(Body::new(init.position, init.velocity, init.mass))
            })
            .collect::<SimResult<Vec<Body>>>()?;

        debug!(bodies = bodies.len(), "registry initialized");
        self.system = System { bodies };
        self.max_force = 0.0;
        Ok(())
    }

    pub fn bodies(&self) -> &[Body] {
        &self.system.bodies
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn params(&self) -> &KernelParams {
        &self.params
    }

    /// The tree built during the most recent step
    pub fn tree(&self) -> &BarnesHutTree {
        &self.tree
    }

    /// Largest force magnitude on any body after the most recent step
    pub fn max_force_magnitude(&self) -> f64 {
        self.max_force
    }

    /// Advance the registry by one tick.
    pub fn step(&mut self, step: &StepParams) -> SimResult<StepReport> {
        step.validate()?;

        self.clear_accumulators();

        self.tree.rebuild(&self.system.bodies);
        let merged_bodies = self.tree.merged_bodies();
        if merged_bodies > 0 {
            warn!(merged_bodies, max_depth = self.params.max_depth, "coincident bodies merged at tree depth cap");
        }

        let nodes_visited = self.accumulate_forces_and_density(step);

        semi_implicit_euler(&mut self.system.bodies, step.dt);
        wrap_boundaries(&mut self.system.bodies);

        // cells must be at least min_distance wide for the 3x3 query to see
        // every overlapping pair
        let cell_size = self.params.cell_size.max(step.min_distance);
        if cell_size != self.hash.cell_size() {
            self.hash.set_cell_size(cell_size)?;
        }
        self.hash.rebuild(&self.system.bodies);

        let collisions = resolve_collisions(
            &mut self.system.bodies,
            &self.hash,
            step.min_distance,
            step.restitution,
            &mut self.neighbors,
        );

        self.max_force = self
            .system
            .bodies
            .iter()
            .map(|b| b.f.norm())
            .fold(0.0, f64::max);

        let report = StepReport {
            tree_nodes: self.tree.len(),
            nodes_visited,
            merged_bodies,
            collisions,
            max_force: self.max_force,
        };
        debug!(?report, "step complete");
        Ok(report)
    }

    // phases ==============================================================================

    fn clear_accumulators(&mut self) {
        for b in self.system.bodies.iter_mut() {
            b.f.fill(0.0);
            b.density = 0.0;
        }
    }

    /// Query the finished tree once per body. Each body only writes its own
    /// accumulators and the tree is read-only here, so the parallel path
    /// needs no locking.
    fn accumulate_forces_and_density(&mut self, step: &StepParams) -> usize {
        let tree = &self.tree;
        let softening = self.params.softening;
        let radius = self.params.density_radius;

        let query = |(i, b): (usize, &mut Body)| -> usize {
            let (f, visited) = tree.approximate_force_counted(i, b, step.theta, step.G, softening);
            b.f += f;
            b.density += tree.accumulate_density(i, b, radius);
            visited
        };

        if self.params.parallel {
            self.system.bodies.par_iter_mut().enumerate().map(query).sum()
        } else {
            self.system.bodies.iter_mut().enumerate().map(query).sum()
        }
    }
}
