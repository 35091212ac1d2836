pub mod bracket;
pub mod display;
pub mod normalize;
pub mod series;
pub mod slot;
pub mod standings;
pub mod wildcard;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

/// A game that passed the relevance filter. Entities are franchise names as
/// the source spells them (trimmed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Absent ids are never de-duplicated against each other.
    pub id: Option<String>,
    pub home_entity: String,
    pub away_entity: String,
    pub home_participant: String,
    pub away_participant: String,
    pub home_score: u32,
    pub away_score: u32,
    pub played_at: DateTime<Utc>,
    pub competition_mode: String,
    /// Side flagged "W" by the source, if either was.
    pub marked_winner: Option<Side>,
    pub pitcher_info: String,
}

impl GameRecord {
    /// Unordered pair match; home/away assignment is irrelevant.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.home_entity == a && self.away_entity == b)
            || (self.home_entity == b && self.away_entity == a)
    }

    /// Pair key with the entities in sorted order.
    pub fn pairing(&self) -> (&str, &str) {
        if self.home_entity <= self.away_entity {
            (&self.home_entity, &self.away_entity)
        } else {
            (&self.away_entity, &self.home_entity)
        }
    }

    /// Winner by runs. `None` on a tied score.
    pub fn score_winner(&self) -> Option<&str> {
        match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => Some(&self.home_entity),
            std::cmp::Ordering::Less => Some(&self.away_entity),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// (winner, loser) by the source's result markers.
    pub fn marked_outcome(&self) -> Option<(&str, &str)> {
        match self.marked_winner? {
            Side::Home => Some((&self.home_entity, &self.away_entity)),
            Side::Away => Some((&self.away_entity, &self.home_entity)),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    /// Home/away game on 2025-09-25 plus `minute` minutes, id derived from the
    /// minute, winner marked from the score.
    pub fn game(minute: u32, home: &str, home_score: u32, away: &str, away_score: u32) -> GameRecord {
        let played_at = Utc.with_ymd_and_hms(2025, 9, 25, 0, 0, 0).unwrap()
            + chrono::Duration::minutes(i64::from(minute));
        let marked_winner = match home_score.cmp(&away_score) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        };
        GameRecord {
            id: Some(format!("g{minute}")),
            home_entity: home.to_owned(),
            away_entity: away.to_owned(),
            home_participant: format!("{home}-user"),
            away_participant: format!("{away}-user"),
            home_score,
            away_score,
            played_at,
            competition_mode: "LEAGUE".to_owned(),
            marked_winner,
            pitcher_info: String::new(),
        }
    }

    /// Standings already in rank order, points strictly descending.
    pub fn ranked(entities: &[&str]) -> Vec<super::standings::TeamStanding> {
        let n = entities.len() as u32;
        entities
            .iter()
            .zip(0u32..)
            .map(|(entity, i)| {
                let wins = n - i;
                super::standings::TeamStanding {
                    entity: (*entity).to_owned(),
                    participant: format!("{entity}-user"),
                    wins,
                    losses: 0,
                    games_played: wins,
                    scheduled: 34,
                    remaining: 34u32.saturating_sub(wins),
                    points: 2 * wins as i32,
                    points_base: 2 * wins as i32,
                    points_adjustment: 0,
                    adjustment_reason: String::new(),
                }
            })
            .collect()
    }
}
