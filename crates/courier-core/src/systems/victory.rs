//! Win Conditions
//!
//! A faction wins outright the moment its Master holds every message ever
//! issued. Otherwise the round budget runs out and the fullest Master wins.

use courier_events::VerdictSnapshot;

use crate::components::{Faction, MasterRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// These Masters hold the complete set
    Complete { winners: Vec<Faction>, messages: usize },
    /// Budget exhausted; these Masters tie for the most messages
    MostMessages { winners: Vec<Faction>, messages: usize },
    /// Budget exhausted and every Master is empty
    NoWinner,
}

impl Verdict {
    pub fn winners(&self) -> &[Faction] {
        match self {
            Verdict::Complete { winners, .. } | Verdict::MostMessages { winners, .. } => winners,
            Verdict::NoWinner => &[],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Verdict::Complete { .. } => "complete",
            Verdict::MostMessages { .. } => "most_messages",
            Verdict::NoWinner => "no_winner",
        }
    }

    pub fn snapshot(&self) -> VerdictSnapshot {
        let message_count = match self {
            Verdict::Complete { messages, .. } | Verdict::MostMessages { messages, .. } => *messages,
            Verdict::NoWinner => 0,
        };
        VerdictSnapshot {
            kind: self.kind().to_string(),
            winners: self.winners().iter().map(|f| f.name().to_string()).collect(),
            message_count,
        }
    }

    /// One line for the console
    pub fn describe(&self) -> String {
        let names = |winners: &[Faction]| {
            winners
                .iter()
                .map(|f| format!("Master{f}"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self {
            Verdict::Complete { winners, messages } => {
                format!("{} collected all {messages} messages", names(winners))
            }
            Verdict::MostMessages { winners, messages } => {
                format!("{} won with {messages} messages", names(winners))
            }
            Verdict::NoWinner => "No Master collected any message".to_string(),
        }
    }
}

/// Masters holding all `total` messages, if any do
pub fn complete_collection(masters: &MasterRegistry, total: u64) -> Option<Verdict> {
    if total == 0 {
        return None;
    }
    let winners: Vec<Faction> = masters
        .iter()
        .filter(|m| m.messages().len() as u64 == total)
        .map(|m| m.faction())
        .collect();
    if winners.is_empty() {
        None
    } else {
        Some(Verdict::Complete {
            winners,
            messages: total as usize,
        })
    }
}

/// End-of-budget decision: the largest collection wins, ties share the win
pub fn most_messages(masters: &MasterRegistry) -> Verdict {
    let best = masters.iter().map(|m| m.messages().len()).max().unwrap_or(0);
    if best == 0 {
        return Verdict::NoWinner;
    }
    let winners = masters
        .iter()
        .filter(|m| m.messages().len() == best)
        .map(|m| m.faction())
        .collect();
    Verdict::MostMessages {
        winners,
        messages: best,
    }
}
