//! Console Map
//!
//! Text rendering of the grid, north at the top. The coloured variant paints
//! each symbol in its faction's colour and obstacles red.

use colored::{Color, Colorize};

use crate::components::{Coordinate, Faction, Grid, MasterRegistry, Occupant, Roster};

const CELL_WIDTH: usize = 3;

/// Symbol for one tile plus the colour it is painted with
struct Cell {
    text: String,
    color: Option<Color>,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    fn painted(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color: Some(color),
        }
    }

    fn pad(&self) -> String {
        " ".repeat(CELL_WIDTH.saturating_sub(self.text.chars().count()))
    }
}

fn faction_color(faction: Faction) -> Color {
    match faction {
        Faction::Human => Color::BrightBlue,
        Faction::Elf => Color::BrightMagenta,
        Faction::Orc => Color::BrightGreen,
        Faction::Goblin => Color::BrightYellow,
    }
}

fn cell(grid: &Grid, roster: &Roster, at: Coordinate) -> Cell {
    match grid.occupant_at(at) {
        Some(Occupant::Master(faction)) => {
            return Cell::painted(faction.initial().to_string(), faction_color(faction));
        }
        Some(Occupant::Agent(id)) => {
            if let Some(agent) = roster.get(id) {
                let faction = agent.faction();
                return Cell::painted(faction.policy().tag().to_string(), faction_color(faction));
            }
        }
        None => {}
    }

    if let Some(faction) = grid.dead_marker(at) {
        Cell::painted("x", faction_color(faction))
    } else if grid.is_obstacle(at) {
        Cell::painted("#", Color::Red)
    } else if let Some(owner) = grid.safe_zone_owner(at) {
        Cell::plain(format!("S{}", owner.initial()))
    } else {
        Cell::plain(".")
    }
}

fn render_with(grid: &Grid, roster: &Roster, paint: bool) -> String {
    let mut out = String::with_capacity(((grid.width() * 3 + 1) * grid.height()) as usize);
    for y in (0..grid.height()).rev() {
        let mut row = String::new();
        for x in 0..grid.width() {
            let cell = cell(grid, roster, Coordinate::new(x, y));
            match cell.color {
                Some(color) if paint => row.push_str(&cell.text.color(color).to_string()),
                _ => row.push_str(&cell.text),
            }
            row.push_str(&cell.pad());
        }
        out.push_str(row.trim_end());
        out.push('\n');
    }
    out
}

/// One line per row, highest y first, three characters per cell
pub fn render_grid(grid: &Grid, roster: &Roster) -> String {
    render_with(grid, roster, false)
}

/// Same layout as [`render_grid`] with ANSI colours
pub fn render_grid_colored(grid: &Grid, roster: &Roster) -> String {
    render_with(grid, roster, true)
}

/// Master tallies, one line each
pub fn render_tallies(masters: &MasterRegistry, total: u64) -> String {
    masters
        .iter()
        .map(|m| format!("{}: {}/{} messages", m.name(), m.messages().len(), total))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Agent, AgentId, Faction, MessageLedger};
    use crate::rng::{RngKind, SimRng};
    use crate::setup::park_masters;

    #[test]
    fn test_render_small_map() {
        let mut grid = Grid::with_safe_zones(6, 4, 2, 1).unwrap();
        let masters = park_masters(&mut grid).unwrap();
        let mut roster = Roster::new();
        let mut ledger = MessageLedger::new();
        let mut rng = SimRng::new(RngKind::MonteCarlo, 1);

        let at = Coordinate::new(2, 2);
        let agent = Agent::new(AgentId(0), "Elf1", Faction::Elf, Faction::Elf.alliance(), at, 100, &mut ledger, 5, &mut rng)
            .unwrap();
        grid.place(Occupant::Agent(agent.id()), at).unwrap();
        roster.push(agent);
        grid.add_obstacle(Coordinate::new(3, 1));
        grid.add_obstacle(Coordinate::new(4, 2));
        grid.mark_dead(Coordinate::new(4, 2), Faction::Orc);

        let rendered = render_grid(&grid, &roster);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines,
            vec![
                "O  SO .  .  SG G",
                ".  .  e  .  x  .",
                ".  .  .  #  .  .",
                "H  SH .  .  SE E",
            ]
        );
        assert!(render_tallies(&masters, 3).contains("MasterHuman: 0/3 messages"));
        assert!(!rendered.contains('\u{1b}'));
    }

    #[test]
    fn test_colored_map_paints_factions() {
        colored::control::set_override(true);
        let mut grid = Grid::with_safe_zones(6, 4, 2, 1).unwrap();
        park_masters(&mut grid).unwrap();
        grid.add_obstacle(Coordinate::new(3, 1));

        let rendered = render_grid_colored(&grid, &Roster::new());
        assert!(rendered.contains(&"G".color(Color::BrightYellow).to_string()));
        assert!(rendered.contains(&"H".color(Color::BrightBlue).to_string()));
        assert!(rendered.contains(&"#".color(Color::Red).to_string()));
        assert!(rendered.contains("SH"));
        assert_eq!(rendered.lines().count(), 4);
    }
}
