pub mod client;
pub mod history;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of the game-history wire format
// ---------------------------------------------------------------------------

/// One entry from a participant's game history, trimmed and typed but not yet
/// filtered. Duplicates across participants and pages are expected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryGame {
    /// `None` when the source omitted the id or sent an empty one.
    pub id: Option<String>,
    pub home: HistorySide,
    pub away: HistorySide,
    /// Raw "MM/DD/YYYY HH:MM[:SS]" string, parsed downstream.
    pub display_date: String,
    pub game_mode: String,
    pub pitcher_info: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySide {
    /// Full franchise name, e.g. "Red Sox".
    pub team: String,
    /// Account name as shown by the source, badge markers included.
    pub participant: String,
    pub result: GameResult,
    pub runs: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Win,
    Loss,
    #[default]
    Unknown,
}

impl GameResult {
    pub fn parse(marker: &str) -> Self {
        match marker.trim().to_uppercase().as_str() {
            "W" => GameResult::Win,
            "L" => GameResult::Loss,
            _ => GameResult::Unknown,
        }
    }
}

impl From<history::HistoryEntry> for HistoryGame {
    fn from(raw: history::HistoryEntry) -> Self {
        let text = |s: Option<String>| s.map(|s| s.trim().to_owned()).unwrap_or_default();
        let runs = |s: Option<String>| {
            s.and_then(|s| s.trim().parse::<u32>().ok())
                .unwrap_or_default()
        };

        HistoryGame {
            id: raw
                .id
                .map(|id| id.trim().to_owned())
                .filter(|id| !id.is_empty()),
            home: HistorySide {
                team: text(raw.home_full_name),
                participant: raw.home_name.unwrap_or_default(),
                result: GameResult::parse(raw.home_display_result.as_deref().unwrap_or("")),
                runs: runs(raw.home_runs),
            },
            away: HistorySide {
                team: text(raw.away_full_name),
                participant: raw.away_name.unwrap_or_default(),
                result: GameResult::parse(raw.away_display_result.as_deref().unwrap_or("")),
                runs: runs(raw.away_runs),
            },
            display_date: text(raw.display_date),
            game_mode: text(raw.game_mode),
            pitcher_info: text(raw.display_pitcher_info),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::GameHistoryResponse;

    #[test]
    fn entry_maps_numeric_and_string_fields() {
        let raw: GameHistoryResponse = serde_json::from_str(
            r#"{"game_history":[{
                "id": 812345,
                "game_mode": "league",
                "display_date": "09/25/2025 23:10:05",
                "home_full_name": " Pirates ",
                "away_full_name": "Twins",
                "home_name": "Joshe_izarra^b12^",
                "away_name": "Bufon3-0",
                "home_display_result": "W",
                "away_display_result": "l",
                "home_runs": "4",
                "away_runs": 2
            }]}"#,
        )
        .unwrap();
        let game = HistoryGame::from(raw.game_history.unwrap().remove(0));
        assert_eq!(game.id.as_deref(), Some("812345"));
        assert_eq!(game.home.team, "Pirates");
        assert_eq!(game.home.participant, "Joshe_izarra^b12^");
        assert_eq!(game.home.result, GameResult::Win);
        assert_eq!(game.away.result, GameResult::Loss);
        assert_eq!((game.home.runs, game.away.runs), (4, 2));
        assert_eq!(game.game_mode, "league");
    }

    #[test]
    fn empty_id_becomes_none() {
        let raw: GameHistoryResponse =
            serde_json::from_str(r#"{"game_history":[{"id": "  "}, {}]}"#).unwrap();
        let games: Vec<HistoryGame> = raw
            .game_history
            .unwrap()
            .into_iter()
            .map(HistoryGame::from)
            .collect();
        assert!(games.iter().all(|g| g.id.is_none()));
        assert_eq!(games[1].home.result, GameResult::Unknown);
        assert_eq!(games[1].home.runs, 0);
    }

    #[test]
    fn unparsable_runs_count_as_zero() {
        let raw: GameHistoryResponse =
            serde_json::from_str(r#"{"game_history":[{"home_runs": "--", "away_runs": null}]}"#)
                .unwrap();
        let game = HistoryGame::from(raw.game_history.unwrap().remove(0));
        assert_eq!((game.home.runs, game.away.runs), (0, 0));
    }
}
