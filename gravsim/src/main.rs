use gravsim::{ScenarioConfig, Scenario};
use gravsim::{bench_gravity, bench_step};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// Headless host for the 2D Barnes-Hut kernel
#[derive(Parser, Debug)]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, default_value = "default.yaml")]
    file_name: String,

    /// Override the number of steps from the scenario
    #[arg(short, long)]
    steps: Option<u64>,

    /// Run the benchmark harness instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    if args.bench {
        bench_gravity();
        bench_step()?;
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let mut scenario = Scenario::build_scenario(scenario_cfg).context("invalid scenario")?;
    let steps = args.steps.unwrap_or(scenario.steps);

    info!(
        file = %args.file_name,
        bodies = scenario.engine.bodies().len(),
        steps,
        theta = scenario.step.theta,
        "starting run"
    );

    let mut collisions = 0;
    for n in 1..=steps {
        let report = scenario.tick()?;
        collisions += report.collisions;

        if scenario.log_every > 0 && n % scenario.log_every == 0 {
            let system = scenario.engine.system();
            let mean_density = if system.is_empty() {
                0.0
            } else {
                system.bodies.iter().map(|b| b.density).sum::<f64>() / system.len() as f64
            };
            info!(
                step = n,
                t = scenario.t,
                max_force = report.max_force,
                mean_density,
                tree_nodes = report.tree_nodes,
                collisions,
                kinetic_energy = system.kinetic_energy(),
                "progress"
            );
            collisions = 0;
        }
    }

    let momentum = scenario.engine.system().total_momentum();
    info!(t = scenario.t, px = momentum.x, py = momentum.y, "run finished");

    Ok(())
}
