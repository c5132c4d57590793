//! Win/loss/draw tally across matches.

use crate::game::Outcome;
use crate::Occupant;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One occupant's results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

/// A row of the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub occupant: Occupant,
    #[serde(flatten)]
    pub record: Record,
}

/// Results of every finished match in this process.
#[derive(Debug, Clone, Default)]
pub struct Scoreboard {
    records: HashMap<Occupant, Record>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a finished game between `players`.
    pub fn record(&mut self, outcome: &Outcome, players: &[Occupant]) {
        for player in players {
            let row = self.records.entry(player.clone()).or_default();
            match &outcome.winner {
                None => row.draws += 1,
                Some(w) if w == player => row.wins += 1,
                Some(_) => row.losses += 1,
            }
        }
    }

    pub fn get(&self, occupant: &Occupant) -> Record {
        self.records.get(occupant).copied().unwrap_or_default()
    }

    /// All rows, most wins first, then fewest losses.
    pub fn standings(&self) -> Vec<Standing> {
        let mut rows: Vec<Standing> = self
            .records
            .iter()
            .map(|(occupant, record)| Standing {
                occupant: occupant.clone(),
                record: *record,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.record
                .wins
                .cmp(&a.record.wins)
                .then(a.record.losses.cmp(&b.record.losses))
                .then_with(|| a.occupant.to_string().cmp(&b.occupant.to_string()))
        });
        rows
    }
}
