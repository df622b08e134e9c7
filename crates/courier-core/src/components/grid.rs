//! Grid Components
//!
//! The bounded map: who stands where, which tiles are impassable, which tiles
//! belong to which faction's safe zone, and where agents have died.

use bevy_ecs::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::agent::AgentId;
use super::faction::Faction;
use super::geometry::Coordinate;
use crate::config::MapConfig;
use crate::error::SimError;
use crate::rng::RandomSource;

/// Largest accepted width or height
pub const MAX_DIMENSION: i32 = 4096;

/// What can stand on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occupant {
    Agent(AgentId),
    Master(Faction),
}

#[derive(Resource, Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    occupancy: HashMap<Coordinate, Occupant>,
    obstacles: HashSet<Coordinate>,
    dead: HashMap<Coordinate, Faction>,
    /// Safe tiles per faction, anchor first
    safe_zones: BTreeMap<Faction, Vec<Coordinate>>,
    safe_owner: HashMap<Coordinate, Faction>,
}

impl Grid {
    /// An obstacle-free map with the four corner safe zones laid out.
    pub fn with_safe_zones(
        width: i32,
        height: i32,
        block_width: i32,
        block_height: i32,
    ) -> Result<Self, SimError> {
        if !(1..=MAX_DIMENSION).contains(&width) || !(1..=MAX_DIMENSION).contains(&height) {
            return Err(SimError::InvalidDimensions { width, height });
        }
        if block_width <= 0 || block_height <= 0 || block_width > width / 2 || block_height > height / 2 {
            return Err(SimError::SafeZoneOverlap {
                width,
                height,
                block_width,
                block_height,
            });
        }

        let mut grid = Self {
            width,
            height,
            occupancy: HashMap::new(),
            obstacles: HashSet::new(),
            dead: HashMap::new(),
            safe_zones: BTreeMap::new(),
            safe_owner: HashMap::new(),
        };

        for faction in Faction::ALL {
            let (corner, dx, dy) = grid.corner_of(faction);
            let mut tiles = Vec::with_capacity((block_width * block_height) as usize);
            for y in 0..block_height {
                for x in 0..block_width {
                    let tile = Coordinate::new(corner.x + x * dx, corner.y + y * dy);
                    grid.safe_owner.insert(tile, faction);
                    tiles.push(tile);
                }
            }
            grid.safe_zones.insert(faction, tiles);
        }

        Ok(grid)
    }

    /// Safe zones plus randomly scattered obstacles, as configured
    pub fn generate(config: &MapConfig, rng: &mut impl RandomSource) -> Result<Self, SimError> {
        let mut grid = Self::with_safe_zones(
            config.width,
            config.height,
            config.safe_zone_width,
            config.safe_zone_height,
        )?;
        let placed = grid.scatter_obstacles(config.obstacle_density, config.max_placement_attempts, rng)?;
        tracing::debug!(placed, width = config.width, height = config.height, "generated grid");
        Ok(grid)
    }

    /// Corner tile and outward walking direction of a faction's cluster
    fn corner_of(&self, faction: Faction) -> (Coordinate, i32, i32) {
        match faction {
            Faction::Human => (Coordinate::new(0, 0), 1, 1),
            Faction::Elf => (Coordinate::new(self.width - 1, 0), -1, 1),
            Faction::Orc => (Coordinate::new(0, self.height - 1), 1, -1),
            Faction::Goblin => (Coordinate::new(self.width - 1, self.height - 1), -1, -1),
        }
    }

    /// Rejection-samples `floor(area * density)` obstacles outside safe zones
    /// and occupied tiles. Each pick gets at most `max_attempts` tries.
    pub fn scatter_obstacles(
        &mut self,
        density: f64,
        max_attempts: u32,
        rng: &mut impl RandomSource,
    ) -> Result<usize, SimError> {
        if !(0.0..1.0).contains(&density) {
            return Err(SimError::InvalidDensity { density });
        }

        let area = i64::from(self.width) * i64::from(self.height);
        let requested = (area as f64 * density).floor() as usize;
        let available = self.tiles().filter(|c| self.accepts_obstacle(*c)).count();
        if requested > available {
            return Err(SimError::ObstacleDensityInfeasible { requested, available });
        }

        for _ in 0..requested {
            let tile = self.sample_tile(rng, max_attempts, "place an obstacle", |grid, c| {
                grid.accepts_obstacle(c)
            })?;
            self.obstacles.insert(tile);
        }
        Ok(requested)
    }

    fn accepts_obstacle(&self, c: Coordinate) -> bool {
        !self.is_safe_zone(c) && !self.obstacles.contains(&c) && !self.occupancy.contains_key(&c)
    }

    fn sample_tile(
        &self,
        rng: &mut impl RandomSource,
        max_attempts: u32,
        purpose: &'static str,
        accept: impl Fn(&Grid, Coordinate) -> bool,
    ) -> Result<Coordinate, SimError> {
        for _ in 0..max_attempts {
            let x = rng.below(self.width as usize) as i32;
            let y = rng.below(self.height as usize) as i32;
            let candidate = Coordinate::new(x, y);
            if accept(self, candidate) {
                return Ok(candidate);
            }
        }
        Err(SimError::PlacementExhausted {
            purpose,
            attempts: max_attempts,
        })
    }

    /// A random free tile outside every safe zone, for initial placement
    pub fn random_free_tile(
        &self,
        rng: &mut impl RandomSource,
        max_attempts: u32,
    ) -> Result<Coordinate, SimError> {
        if !self.tiles().any(|c| self.is_spawnable(c)) {
            return Err(SimError::NoFreeTile);
        }
        self.sample_tile(rng, max_attempts, "find a free tile", |grid, c| grid.is_spawnable(c))
    }

    fn is_spawnable(&self, c: Coordinate) -> bool {
        self.is_tile_free(c) && !self.is_safe_zone(c)
    }

    /// Every coordinate on the map, row by row
    pub fn tiles(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Coordinate::new(x, y)))
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_within_bounds(&self, c: Coordinate) -> bool {
        c.x >= 0 && c.x < self.width && c.y >= 0 && c.y < self.height
    }

    pub fn is_obstacle(&self, c: Coordinate) -> bool {
        self.obstacles.contains(&c)
    }

    pub fn is_occupied(&self, c: Coordinate) -> bool {
        self.occupancy.contains_key(&c)
    }

    /// In bounds, no obstacle, nobody standing there
    pub fn is_tile_free(&self, c: Coordinate) -> bool {
        self.is_within_bounds(c) && !self.is_obstacle(c) && !self.is_occupied(c)
    }

    pub fn occupant_at(&self, c: Coordinate) -> Option<Occupant> {
        self.occupancy.get(&c).copied()
    }

    pub fn occupants(&self) -> impl Iterator<Item = (Coordinate, Occupant)> + '_ {
        self.occupancy.iter().map(|(c, o)| (*c, *o))
    }

    pub fn place(&mut self, occupant: Occupant, at: Coordinate) -> Result<(), SimError> {
        if !self.is_within_bounds(at) {
            return Err(SimError::OutOfBounds(at));
        }
        if self.is_obstacle(at) {
            return Err(SimError::TileBlocked(at));
        }
        if self.is_occupied(at) {
            return Err(SimError::TileOccupied(at));
        }
        self.occupancy.insert(at, occupant);
        Ok(())
    }

    pub fn remove(&mut self, at: Coordinate) -> Option<Occupant> {
        self.occupancy.remove(&at)
    }

    /// Moves whoever stands on `from` to `to`. Validates first, so a failed
    /// move leaves the occupancy untouched.
    pub fn relocate(&mut self, from: Coordinate, to: Coordinate) -> Result<Occupant, SimError> {
        let occupant = self.occupant_at(from).ok_or(SimError::TileEmpty(from))?;
        if !self.is_within_bounds(to) {
            return Err(SimError::OutOfBounds(to));
        }
        if self.is_obstacle(to) {
            return Err(SimError::TileBlocked(to));
        }
        if self.is_occupied(to) {
            return Err(SimError::TileOccupied(to));
        }
        self.occupancy.remove(&from);
        self.occupancy.insert(to, occupant);
        Ok(occupant)
    }

    pub fn is_safe_zone(&self, c: Coordinate) -> bool {
        self.safe_owner.contains_key(&c)
    }

    pub fn safe_zone_owner(&self, c: Coordinate) -> Option<Faction> {
        self.safe_owner.get(&c).copied()
    }

    pub fn is_safe_zone_of(&self, c: Coordinate, faction: Faction) -> bool {
        self.safe_zone_owner(c) == Some(faction)
    }

    /// Another faction's safe tile; impassable for `faction`
    pub fn is_other_faction_safe_zone(&self, c: Coordinate, faction: Faction) -> bool {
        matches!(self.safe_zone_owner(c), Some(owner) if owner != faction)
    }

    /// The corner tile a faction homes toward and its Master stands on
    pub fn safe_zone_anchor(&self, faction: Faction) -> Option<Coordinate> {
        self.safe_zones.get(&faction).and_then(|tiles| tiles.first().copied())
    }

    pub fn safe_tiles(&self, faction: Faction) -> &[Coordinate] {
        self.safe_zones.get(&faction).map_or(&[], Vec::as_slice)
    }

    /// Returns false if the tile already held an obstacle
    pub fn add_obstacle(&mut self, c: Coordinate) -> bool {
        self.obstacles.insert(c)
    }

    pub fn mark_dead(&mut self, c: Coordinate, faction: Faction) {
        self.dead.insert(c, faction);
    }

    pub fn dead_marker(&self, c: Coordinate) -> Option<Faction> {
        self.dead.get(&c).copied()
    }

    /// Obstacles in row-major order
    pub fn obstacles(&self) -> Vec<Coordinate> {
        let mut tiles: Vec<_> = self.obstacles.iter().copied().collect();
        tiles.sort_by_key(|c| (c.y, c.x));
        tiles
    }

    /// Dead-agent markers in row-major order
    pub fn dead_markers(&self) -> Vec<(Coordinate, Faction)> {
        let mut markers: Vec<_> = self.dead.iter().map(|(c, f)| (*c, *f)).collect();
        markers.sort_by_key(|(c, _)| (c.y, c.x));
        markers
    }
}
