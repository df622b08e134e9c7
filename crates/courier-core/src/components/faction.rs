//! Faction Components
//!
//! The four peoples, their two alliances, and the movement policy each
//! faction's agents follow.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::geometry::Direction;
use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    Human,
    Elf,
    Orc,
    Goblin,
}

impl Faction {
    pub const ALL: [Faction; 4] = [Faction::Human, Faction::Elf, Faction::Orc, Faction::Goblin];

    pub fn name(&self) -> &'static str {
        match self {
            Faction::Human => "Human",
            Faction::Elf => "Elf",
            Faction::Orc => "Orc",
            Faction::Goblin => "Goblin",
        }
    }

    /// Upper-case initial, used for Masters and safe-zone tiles
    pub fn initial(&self) -> char {
        match self {
            Faction::Human => 'H',
            Faction::Elf => 'E',
            Faction::Orc => 'O',
            Faction::Goblin => 'G',
        }
    }

    /// The alliance a faction belongs to by default
    pub fn alliance(&self) -> Alliance {
        match self {
            Faction::Human | Faction::Elf => Alliance::Light,
            Faction::Orc | Faction::Goblin => Alliance::Shadow,
        }
    }

    pub fn policy(&self) -> &'static dyn MovementPolicy {
        match self {
            Faction::Human => &Orthogonal,
            Faction::Elf => &Diagonal,
            Faction::Orc => &Plodding,
            Faction::Goblin => &Roaming,
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Faction {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Faction::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SimError::UnknownFaction(s.to_string()))
    }
}

/// Coarse partition deciding whether cross-faction contact is friendly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alliance {
    Light,
    Shadow,
}

impl Alliance {
    pub fn name(&self) -> &'static str {
        match self {
            Alliance::Light => "Light",
            Alliance::Shadow => "Shadow",
        }
    }
}

impl fmt::Display for Alliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Alliance {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Alliance::Light),
            "shadow" => Ok(Alliance::Shadow),
            _ => Err(SimError::UnknownAlliance(s.to_string())),
        }
    }
}

/// How a faction's agents are allowed to move.
///
/// The turn algorithm is shared; a policy only supplies the candidate
/// headings, the longest walk per turn and the map symbol of its walkers.
pub trait MovementPolicy: Send + Sync {
    fn directions(&self) -> &'static [Direction];

    /// Distance is drawn from `1..=max_distance()`
    fn max_distance(&self) -> u32;

    /// Lower-case symbol drawn for a living agent
    fn tag(&self) -> char;

    fn name(&self) -> &'static str;
}

/// N, S, E, W up to three tiles
pub struct Orthogonal;

impl MovementPolicy for Orthogonal {
    fn directions(&self) -> &'static [Direction] {
        &Direction::ORTHOGONAL
    }

    fn max_distance(&self) -> u32 {
        3
    }

    fn tag(&self) -> char {
        'h'
    }

    fn name(&self) -> &'static str {
        "orthogonal"
    }
}

/// Diagonals only, up to three tiles
pub struct Diagonal;

impl MovementPolicy for Diagonal {
    fn directions(&self) -> &'static [Direction] {
        &Direction::DIAGONAL
    }

    fn max_distance(&self) -> u32 {
        3
    }

    fn tag(&self) -> char {
        'e'
    }

    fn name(&self) -> &'static str {
        "diagonal"
    }
}

/// Any heading, a single tile per turn
pub struct Plodding;

impl MovementPolicy for Plodding {
    fn directions(&self) -> &'static [Direction] {
        &Direction::ALL
    }

    fn max_distance(&self) -> u32 {
        1
    }

    fn tag(&self) -> char {
        'o'
    }

    fn name(&self) -> &'static str {
        "plodding"
    }
}

/// Any heading, up to three tiles
pub struct Roaming;

impl MovementPolicy for Roaming {
    fn directions(&self) -> &'static [Direction] {
        &Direction::ALL
    }

    fn max_distance(&self) -> u32 {
        3
    }

    fn tag(&self) -> char {
        'g'
    }

    fn name(&self) -> &'static str {
        "roaming"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_faction_tags() {
        assert_eq!("Human".parse::<Faction>(), Ok(Faction::Human));
        assert_eq!("goblin".parse::<Faction>(), Ok(Faction::Goblin));
        assert_eq!(
            "Dwarf".parse::<Faction>(),
            Err(SimError::UnknownFaction("Dwarf".to_string()))
        );
        assert!("Twilight".parse::<Alliance>().is_err());
    }

    #[test]
    fn test_alliances_pair_factions() {
        assert_eq!(Faction::Human.alliance(), Faction::Elf.alliance());
        assert_eq!(Faction::Orc.alliance(), Faction::Goblin.alliance());
        assert_ne!(Faction::Human.alliance(), Faction::Orc.alliance());
    }

    #[test]
    fn test_policies() {
        assert!(Faction::Human.policy().directions().iter().all(|d| !d.is_diagonal()));
        assert!(Faction::Elf.policy().directions().iter().all(|d| d.is_diagonal()));
        assert_eq!(Faction::Orc.policy().max_distance(), 1);
        assert_eq!(Faction::Orc.policy().directions().len(), 8);
        assert_eq!(Faction::Goblin.policy().max_distance(), 3);
        assert_eq!(Faction::Goblin.policy().name(), "roaming");
    }

    #[test]
    fn test_policy_tags_follow_initials() {
        for faction in Faction::ALL {
            assert_eq!(faction.policy().tag(), faction.initial().to_ascii_lowercase());
        }
    }
}
