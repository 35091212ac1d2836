use super::GameRecord;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Odd series length. The only values used by the bracket are 1, 5 and 7,
/// but any odd length works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BestOf(u8);

impl BestOf {
    pub const ONE: BestOf = BestOf(1);
    pub const FIVE: BestOf = BestOf(5);
    pub const SEVEN: BestOf = BestOf(7);

    pub fn new(games: u8) -> Option<Self> {
        (games % 2 == 1).then_some(BestOf(games))
    }

    /// ceil((N + 1) / 2): 1 -> 1, 5 -> 3, 7 -> 4.
    pub fn wins_needed(self) -> u32 {
        u32::from(self.0) / 2 + 1
    }
}

impl TryFrom<u8> for BestOf {
    type Error = String;

    fn try_from(games: u8) -> Result<Self, Self::Error> {
        BestOf::new(games).ok_or_else(|| format!("best-of must be odd, got {games}"))
    }
}

impl From<BestOf> for u8 {
    fn from(best_of: BestOf) -> u8 {
        best_of.0
    }
}

impl fmt::Display for BestOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bo{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeriesStatus {
    #[default]
    NotStarted,
    InProgress,
    Decided,
    /// Both sides past the threshold with equal tallies. Only possible with
    /// inconsistent upstream data; left unresolved on purpose.
    Disputed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesState {
    pub entity_a: String,
    pub entity_b: String,
    pub best_of: BestOf,
    pub wins_a: u32,
    pub wins_b: u32,
    pub status: SeriesStatus,
    pub winner: Option<String>,
    pub loser: Option<String>,
}

impl SeriesState {
    /// 0-0 series that was never computed.
    pub fn not_started(entity_a: impl Into<String>, entity_b: impl Into<String>, best_of: BestOf) -> Self {
        Self {
            entity_a: entity_a.into(),
            entity_b: entity_b.into(),
            best_of,
            wins_a: 0,
            wins_b: 0,
            status: SeriesStatus::NotStarted,
            winner: None,
            loser: None,
        }
    }

    /// "wins_a-wins_b"
    pub fn score(&self) -> String {
        format!("{}-{}", self.wins_a, self.wins_b)
    }
}

/// Tally a series between `a` and `b`. Pure: records outside the pairing and
/// tied scores are ignored, and nothing stops counting once a side clinches.
pub fn resolve(a: &str, b: &str, records: &[GameRecord], best_of: BestOf) -> SeriesState {
    let mut state = SeriesState::not_started(a, b, best_of);
    for record in records.iter().filter(|r| r.is_between(a, b)) {
        match record.score_winner() {
            Some(w) if w == a => state.wins_a += 1,
            Some(w) if w == b => state.wins_b += 1,
            _ => {}
        }
    }

    let needed = best_of.wins_needed();
    let (wins_a, wins_b) = (state.wins_a, state.wins_b);
    let clinched_a = wins_a >= needed;
    let clinched_b = wins_b >= needed;

    state.status = if wins_a + wins_b == 0 {
        SeriesStatus::NotStarted
    } else if !clinched_a && !clinched_b {
        SeriesStatus::InProgress
    } else if wins_a == wins_b {
        warn!("{a} vs {b} ({best_of}): both sides at {wins_a} wins, series left undecided");
        SeriesStatus::Disputed
    } else {
        SeriesStatus::Decided
    };

    if state.status == SeriesStatus::Decided {
        let (winner, loser) = if wins_a > wins_b { (a, b) } else { (b, a) };
        state.winner = Some(winner.to_owned());
        state.loser = Some(loser.to_owned());
    }
    state
}
