//! Courier simulation engine: factions of agents carrying messages across a
//! grid to their Masters.

pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod output;
pub mod rng;
pub mod setup;
pub mod simulation;
pub mod systems;

pub use components::{Agent, AgentId, Alliance, Coordinate, Direction, Faction, Grid, Master};
pub use config::{ConfigError, SimConfig};
pub use error::SimError;
pub use rng::{RandomSource, RngKind, SimRng};
pub use simulation::Simulation;
pub use systems::Verdict;
