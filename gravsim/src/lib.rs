pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Body, BodyInit, System, NVec2, DOMAIN};
pub use simulation::params::{StepParams, KernelParams};
pub use simulation::error::{SimError, SimResult};
pub use simulation::engine::{Engine, StepReport};
pub use simulation::barnes_hut::{BarnesHutTree, QuadNode};
pub use simulation::spatial_hash::SpatialHash;
pub use simulation::forces::{ForceModel, DirectGravity, TreeGravity};
pub use simulation::scenario::Scenario;

pub use configuration::config::{EngineConfig, ParametersConfig, BodyConfig, RandomConfig, ScenarioConfig};

pub use benchmark::benchmark::{bench_gravity, bench_step};
