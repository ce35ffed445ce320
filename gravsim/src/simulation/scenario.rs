//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle a
//! host drives:
//! - an initialized `Engine` (kernel parameters + body registry)
//! - the `StepParams` fed to every tick
//! - run length and the simulation clock
//!
//! The clock lives here rather than in the kernel; `tick` advances it by `dt`
//! after every successful step.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::configuration::config::{BodyConfig, EngineConfig, RandomConfig, ScenarioConfig};
use crate::simulation::engine::{Engine, StepReport};
use crate::simulation::error::{SimError, SimResult};
use crate::simulation::params::{KernelParams, StepParams};
use crate::simulation::states::{BodyInit, NVec2};

pub struct Scenario {
    pub engine: Engine,
    pub step: StepParams,
    pub steps: u64, // ticks to run
    pub log_every: u64, // progress log interval
    pub t: f64, // simulation time
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> SimResult<Self> {
        let kernel = kernel_params(&cfg.engine);

        // Per-step parameters from ParametersConfig
        let p_cfg = cfg.parameters;
        let step = StepParams {
            theta: cfg.engine.theta,
            G: p_cfg.G,
            dt: p_cfg.dt,
            min_distance: p_cfg.min_distance,
            restitution: p_cfg.restitution,
        };
        step.validate()?;

        // Bodies: explicit ones first, then the random cloud
        let mut bodies: Vec<BodyInit> = cfg.bodies.iter().map(|bc: &BodyConfig| BodyInit {
            position: NVec2::new(bc.x[0], bc.x[1]),
            velocity: NVec2::new(bc.v[0], bc.v[1]),
            mass: bc.m,
        }).collect();
        if let Some(random) = &cfg.random {
            bodies.extend(random_bodies(random)?);
        }

        let mut engine = Engine::new(kernel)?;
        engine.initialize(bodies)?;

        Ok(Self {
            engine,
            step,
            steps: p_cfg.steps,
            log_every: p_cfg.log_every,
            t: 0.0,
        })
    }

    /// Run one step and advance the clock
    pub fn tick(&mut self) -> SimResult<StepReport> {
        let report = self.engine.step(&self.step)?;
        self.t += self.step.dt;
        Ok(report)
    }
}

fn kernel_params(e_cfg: &EngineConfig) -> KernelParams {
    let defaults = KernelParams::default();
    KernelParams {
        softening: e_cfg.softening.unwrap_or(defaults.softening),
        density_radius: e_cfg.density_radius.unwrap_or(defaults.density_radius),
        cell_size: e_cfg.cell_size.unwrap_or(defaults.cell_size),
        max_depth: e_cfg.max_depth.unwrap_or(defaults.max_depth),
        parallel: e_cfg.parallel.unwrap_or(defaults.parallel),
    }
}

/// Generate the seeded random cloud described by `cfg`.
///
/// Same seed, same bodies.
pub fn random_bodies(cfg: &RandomConfig) -> SimResult<Vec<BodyInit>> {
    let [m_lo, m_hi] = ordered_range("random.mass", cfg.mass)?;
    let [p_lo, p_hi] = ordered_range("random.position", cfg.position)?;
    let speed = cfg.speed;
    if !(speed.is_finite() && speed >= 0.0) {
        return Err(SimError::invalid("random.speed", speed, "must be finite and >= 0"));
    }

    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let bodies = (0..cfg.count)
        .map(|_| {
            let x = rng.gen_range(p_lo..=p_hi);
            let y = rng.gen_range(p_lo..=p_hi);
            let mass = rng.gen_range(m_lo..=m_hi);
            let vx = rng.gen_range(-speed..=speed);
            let vy = rng.gen_range(-speed..=speed);
            BodyInit {
                position: NVec2::new(x, y),
                velocity: NVec2::new(vx, vy),
                mass,
            }
        })
        .collect();

    Ok(bodies)
}

fn ordered_range(name: &'static str, range: [f64; 2]) -> SimResult<[f64; 2]> {
    let [lo, hi] = range;
    if !(lo.is_finite() && hi.is_finite()) {
        return Err(SimError::invalid(name, if lo.is_finite() { hi } else { lo }, "bounds must be finite"));
    }
    if lo > hi {
        return Err(SimError::invalid(name, lo, "lower bound exceeds upper bound"));
    }
    Ok(range)
}
