//! Master Components
//!
//! Masters are the stationary collectors. Exactly one per faction, created on
//! first access and parked on the faction's anchor tile.

use bevy_ecs::prelude::*;
use courier_events::MasterSnapshot;
use std::collections::BTreeMap;

use super::faction::{Alliance, Faction};
use super::geometry::Coordinate;
use super::grid::{Grid, Occupant};
use super::message::MessageSet;
use crate::error::SimError;

#[derive(Debug, Clone)]
pub struct Master {
    faction: Faction,
    name: String,
    position: Coordinate,
    messages: MessageSet,
}

impl Master {
    fn new(faction: Faction, position: Coordinate) -> Self {
        Self {
            faction,
            name: format!("Master{faction}"),
            position,
            messages: MessageSet::new(),
        }
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    pub fn alliance(&self) -> Alliance {
        self.faction.alliance()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Coordinate {
        self.position
    }

    pub fn messages(&self) -> &MessageSet {
        &self.messages
    }

    /// Unions a delivery into the collection; returns the number of new messages
    pub fn receive(&mut self, delivery: &MessageSet) -> usize {
        self.messages.absorb(delivery)
    }

    pub fn snapshot(&self, include_messages: bool) -> MasterSnapshot {
        MasterSnapshot {
            faction: self.faction.name().to_string(),
            name: self.name.clone(),
            position: self.position.to_tile(),
            message_count: self.messages.len(),
            messages: if include_messages {
                self.messages.labels()
            } else {
                Vec::new()
            },
        }
    }
}

/// One Master per faction, keyed and iterated in faction order
#[derive(Resource, Debug, Clone, Default)]
pub struct MasterRegistry {
    masters: BTreeMap<Faction, Master>,
}

impl MasterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The faction's Master, parking a new one on its anchor tile the first time
    pub fn get_or_create(&mut self, faction: Faction, grid: &mut Grid) -> Result<&mut Master, SimError> {
        if !self.masters.contains_key(&faction) {
            let anchor = grid
                .safe_zone_anchor(faction)
                .ok_or_else(|| SimError::UnknownFaction(faction.name().to_string()))?;
            grid.place(Occupant::Master(faction), anchor)?;
            tracing::debug!(%faction, %anchor, "parked master");
            self.masters.insert(faction, Master::new(faction, anchor));
        }
        self.masters
            .get_mut(&faction)
            .ok_or_else(|| SimError::UnknownFaction(faction.name().to_string()))
    }

    pub fn get(&self, faction: Faction) -> Option<&Master> {
        self.masters.get(&faction)
    }

    pub fn get_mut(&mut self, faction: Faction) -> Option<&mut Master> {
        self.masters.get_mut(&faction)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Master> {
        self.masters.values()
    }

    pub fn len(&self) -> usize {
        self.masters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masters.is_empty()
    }
}
