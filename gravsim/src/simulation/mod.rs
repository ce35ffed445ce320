pub mod states;
pub mod params;
pub mod error;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod collisions;
pub mod scenario;
pub mod barnes_hut;
pub mod spatial_hash;
