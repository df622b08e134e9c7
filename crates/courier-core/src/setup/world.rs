//! World Construction
//!
//! Builds the grid and parks one Master per faction on its anchor tile.

use crate::components::{Faction, Grid, MasterRegistry};
use crate::config::MapConfig;
use crate::error::SimError;
use crate::rng::RandomSource;

/// Generates the map: corner safe zones first, then scattered obstacles
pub fn create_grid(config: &MapConfig, rng: &mut impl RandomSource) -> Result<Grid, SimError> {
    Grid::generate(config, rng)
}

/// Creates every faction's Master up front so all four stand on the map
/// before the first agent spawns
pub fn park_masters(grid: &mut Grid) -> Result<MasterRegistry, SimError> {
    let mut masters = MasterRegistry::new();
    for faction in Faction::ALL {
        masters.get_or_create(faction, grid)?;
    }
    Ok(masters)
}
