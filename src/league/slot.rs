use super::GameRecord;
use super::series::{self, BestOf, SeriesState};
use serde::{Serialize, Serializer};
use std::fmt;

/// Who fills one side of a bracket slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Participant {
    Entity(String),
    /// Winner of an upstream slot that is not decided yet.
    WinnerOf(&'static str),
    /// Loser of an upstream slot that is not decided yet.
    LoserOf(&'static str),
    /// A standings seed that does not exist yet.
    Seed(u8),
}

impl Participant {
    pub fn entity(&self) -> Option<&str> {
        match self {
            Participant::Entity(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::Entity(name) => f.write_str(name),
            Participant::WinnerOf(slot) => write!(f, "winner of {slot}"),
            Participant::LoserOf(slot) => write!(f, "loser of {slot}"),
            Participant::Seed(seed) => write!(f, "seed {seed}"),
        }
    }
}

impl Serialize for Participant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketSlot {
    pub slot_id: &'static str,
    pub home: Participant,
    pub away: Participant,
    pub series_score: String,
    pub series: SeriesState,
}

impl BracketSlot {
    /// Resolve the slot from game records. A placeholder on either side means
    /// there is nothing to tally yet: the slot stays NOT_STARTED at 0-0.
    pub fn contest(
        slot_id: &'static str,
        home: Participant,
        away: Participant,
        best_of: BestOf,
        records: &[GameRecord],
    ) -> Self {
        let series = match (home.entity(), away.entity()) {
            (Some(a), Some(b)) => series::resolve(a, b, records, best_of),
            _ => SeriesState::not_started(home.to_string(), away.to_string(), best_of),
        };
        Self {
            slot_id,
            series_score: series.score(),
            home,
            away,
            series,
        }
    }

    pub fn winner(&self) -> Option<&str> {
        self.series.winner.as_deref()
    }

    pub fn loser(&self) -> Option<&str> {
        self.series.loser.as_deref()
    }

    /// The decided winner, or a "winner of <slot>" placeholder.
    pub fn advancing(&self) -> Participant {
        match self.winner() {
            Some(w) => Participant::Entity(w.to_owned()),
            None => Participant::WinnerOf(self.slot_id),
        }
    }

    /// The decided loser, or a "loser of <slot>" placeholder.
    pub fn eliminated(&self) -> Participant {
        match self.loser() {
            Some(l) => Participant::Entity(l.to_owned()),
            None => Participant::LoserOf(self.slot_id),
        }
    }
}
