//! Engine Errors
//!
//! Invalid configuration and invalid state are reported through [`SimError`].
//! Blocked movement is not an error; it is an ordinary turn outcome.

use thiserror::Error;

use crate::components::agent::AgentId;
use crate::components::geometry::Coordinate;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("unknown faction tag `{0}`")]
    UnknownFaction(String),

    #[error("unknown alliance tag `{0}`")]
    UnknownAlliance(String),

    #[error("invalid map dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("safe zone block {block_width}x{block_height} does not fit a {width}x{height} map without overlap")]
    SafeZoneOverlap {
        width: i32,
        height: i32,
        block_width: i32,
        block_height: i32,
    },

    #[error("obstacle density {density} is outside [0, 1)")]
    InvalidDensity { density: f64 },

    #[error("{requested} obstacles requested but only {available} tiles are eligible")]
    ObstacleDensityInfeasible { requested: usize, available: usize },

    #[error("gave up after {attempts} attempts to {purpose}")]
    PlacementExhausted { purpose: &'static str, attempts: u32 },

    #[error("no free tile outside the safe zones is left")]
    NoFreeTile,

    #[error("tile {0} is outside the map")]
    OutOfBounds(Coordinate),

    #[error("tile {0} is already occupied")]
    TileOccupied(Coordinate),

    #[error("tile {0} is blocked by an obstacle")]
    TileBlocked(Coordinate),

    #[error("tile {0} is empty")]
    TileEmpty(Coordinate),

    #[error("no agent with id {0}")]
    UnknownAgent(AgentId),

    #[error("initial energy must be positive")]
    ZeroEnergy,
}
