pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;

pub use policy::GameplayStrategy;
pub use reports::{SimulationReport, summarize};
pub use seeds::{expand_iterations, resolve_seed_inputs};
pub use simulation::run_matrix;
