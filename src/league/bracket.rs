use super::GameRecord;
use super::series::BestOf;
use super::slot::BracketSlot;
use super::standings::TeamStanding;
use super::wildcard::{self, seed};
use crate::config::WildcardStrategy;
use serde::Serialize;

/// Full postseason picture. Rebuilt from scratch on every cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bracket {
    pub wildcard: [BracketSlot; 3],
    pub quarterfinals: [BracketSlot; 4],
    pub semifinals: [BracketSlot; 2],
    #[serde(rename = "final")]
    pub final_round: [BracketSlot; 1],
    /// Set iff the final is decided.
    pub champion: Option<String>,
}

impl Bracket {
    /// Wild-card round, then the eight-team bracket on top of it.
    pub fn build(strategy: WildcardStrategy, standings: &[TeamStanding], records: &[GameRecord]) -> Self {
        let wildcard = wildcard::build(strategy, standings, records);
        Self::from_wildcard(standings, wildcard, records)
    }

    /// Seeds 1-6 from the standings, seed 7 from WC1 and seed 8 from WC3.
    pub fn from_wildcard(standings: &[TeamStanding], wildcard: [BracketSlot; 3], records: &[GameRecord]) -> Self {
        let seed7 = wildcard[0].advancing();
        let seed8 = wildcard[2].advancing();

        let qf = |id: &'static str, home, away| BracketSlot::contest(id, home, away, BestOf::FIVE, records);
        let quarterfinals = [
            qf("QF1", seed(standings, 1), seed8),
            qf("QF2", seed(standings, 2), seed7),
            qf("QF3", seed(standings, 3), seed(standings, 6)),
            qf("QF4", seed(standings, 4), seed(standings, 5)),
        ];

        let semifinals = [
            BracketSlot::contest(
                "SF1",
                quarterfinals[0].advancing(),
                quarterfinals[1].advancing(),
                BestOf::FIVE,
                records,
            ),
            BracketSlot::contest(
                "SF2",
                quarterfinals[2].advancing(),
                quarterfinals[3].advancing(),
                BestOf::FIVE,
                records,
            ),
        ];

        let final_slot = BracketSlot::contest(
            "F1",
            semifinals[0].advancing(),
            semifinals[1].advancing(),
            BestOf::SEVEN,
            records,
        );
        // Only a decided series carries a winner.
        let champion = final_slot.winner().map(str::to_owned);

        Self {
            wildcard,
            quarterfinals,
            semifinals,
            final_round: [final_slot],
            champion,
        }
    }
}
