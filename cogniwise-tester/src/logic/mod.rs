pub mod policy;
pub mod reports;
pub mod scenarios;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use policy::{PlayerPolicy, PlayerProfile};
pub use scenarios::{Scenario, find_scenario, list_scenarios};
pub use seeds::resolve_seed_inputs;
pub use simulation::{SessionRun, SimulationPlan, simulate};
pub use tester::*;
