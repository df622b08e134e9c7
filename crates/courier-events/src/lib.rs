//! Shared event and snapshot types for the courier simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! The engine produces these values; renderers and log consumers read them.

pub mod event;
pub mod snapshot;

pub use event::*;

pub use snapshot::*;

use serde::{Deserialize, Serialize};

/// A grid tile as it appears in serialized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
}

impl Tile {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
