//! Wall-clock comparisons of direct vs Barnes–Hut force evaluation and of
//! full kernel steps. Output is CSV-ish so it can be pasted into a sheet.

use std::time::Instant;

use tracing::info;

use crate::simulation::engine::Engine;
use crate::simulation::error::SimResult;
use crate::simulation::forces::{DirectGravity, ForceModel, TreeGravity};
use crate::simulation::params::{KernelParams, StepParams, DEFAULT_MAX_DEPTH};
use crate::simulation::states::{Body, BodyInit, NVec2};

const SOFTENING: f64 = 1e-3;
const G: f64 = 1e-6;

/// Deterministic body cloud of size `n` inside the unit square, no rng needed
pub fn make_bodies(n: usize) -> Vec<BodyInit> {
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            let x = NVec2::new(
                0.5 + 0.45 * (i_f * 0.37).sin(),
                0.5 + 0.45 * (i_f * 0.13).cos(),
            );
            BodyInit::at_rest(x, 1.0 + (i % 7) as f64)
        })
        .collect()
}

/// Time one direct and one tree evaluation of the force on every body
pub fn bench_gravity() {
    let ns = [200, 400, 800, 1600, 3200, 6400];

    let direct = DirectGravity { G, softening: SOFTENING };
    let bh = TreeGravity { G, softening: SOFTENING, theta: 0.7, max_depth: DEFAULT_MAX_DEPTH };

    println!("N,direct_ms,bh_ms");
    for n in ns {
        let bodies: Vec<Body> = make_bodies(n)
            .into_iter()
            .map(|b| Body::new(b.position, b.velocity, b.mass))
            .collect();
        let mut out = vec![NVec2::zeros(); n];

        // Warm up
        direct.forces(&bodies, &mut out);
        bh.forces(&bodies, &mut out);

        let t0 = Instant::now();
        direct.forces(&bodies, &mut out);
        let ms_direct = t0.elapsed().as_secs_f64() * 1000.0;

        let t1 = Instant::now();
        bh.forces(&bodies, &mut out);
        let ms_bh = t1.elapsed().as_secs_f64() * 1000.0;

        println!("{},{:.6},{:.6}", n, ms_direct, ms_bh);
    }
}

/// Time full `Engine::step` calls, sequential vs parallel force phase
pub fn bench_step() -> SimResult<()> {
    let ns = [1000, 2000, 4000, 8000, 16000];
    let steps = 5;
    let step = StepParams {
        theta: 0.7,
        G,
        dt: 0.001,
        min_distance: 0.001,
        restitution: 1.0,
    };

    println!("N,sequential_ms,parallel_ms");
    for n in ns {
        let mut timings = [0.0; 2];
        for (slot, parallel) in [false, true].into_iter().enumerate() {
            let mut engine = Engine::new(KernelParams {
                softening: SOFTENING,
                parallel,
                ..KernelParams::default()
            })?;
            engine.initialize(make_bodies(n))?;
            engine.step(&step)?; // warm-up, sizes the arena

            let t0 = Instant::now();
            for _ in 0..steps {
                engine.step(&step)?;
            }
            timings[slot] = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;
        }
        println!("{},{:.6},{:.6}", n, timings[0], timings[1]);
    }

    info!("step benchmark finished");
    Ok(())
}
