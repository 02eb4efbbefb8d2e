pub mod integrator;
pub mod plant;
pub mod runner;

pub use integrator::rk4_step;
pub use plant::{PlantParams, PlantState, SimAttitude, SimThrust};
pub use runner::{simulate, simulate_with, SimConfig, TickRecord};
