use super::GameRecord;
use super::series::BestOf;
use super::slot::{BracketSlot, Participant};
use super::standings::TeamStanding;
use crate::config::WildcardStrategy;
use log::warn;
use std::collections::HashSet;

pub const WC1: &str = "WC1";
pub const WC2: &str = "WC2";
pub const WC3: &str = "WC3";

/// Ranked entities needed before wild-card seeding means anything.
pub const MIN_RANKED: usize = 10;

/// Entity at 1-based `seed`, or a "seed N" placeholder.
pub fn seed(standings: &[TeamStanding], seed: u8) -> Participant {
    standings
        .get(usize::from(seed).saturating_sub(1))
        .map(|s| Participant::Entity(s.entity.clone()))
        .unwrap_or(Participant::Seed(seed))
}

/// WC1, WC2 and WC3, all best-of-1. WC3 is WC1's loser against WC2's winner,
/// and keeps both placeholders until both feeders are decided.
pub fn build(strategy: WildcardStrategy, standings: &[TeamStanding], records: &[GameRecord]) -> [BracketSlot; 3] {
    let ((wc1_home, wc1_away), (wc2_home, wc2_away)) = match strategy {
        WildcardStrategy::Seeded => seeded_pairings(standings),
        WildcardStrategy::Discovery => discovered_pairings(standings, records),
    };

    let wc1 = BracketSlot::contest(WC1, wc1_home, wc1_away, BestOf::ONE, records);
    let wc2 = BracketSlot::contest(WC2, wc2_home, wc2_away, BestOf::ONE, records);
    let (wc3_home, wc3_away) = match (wc1.loser(), wc2.winner()) {
        (Some(loser), Some(winner)) => {
            if loser == winner {
                warn!("{WC3} pairs {loser} against itself; it cannot be resolved from game records");
            }
            (wc1.eliminated(), wc2.advancing())
        }
        _ => (Participant::LoserOf(WC1), Participant::WinnerOf(WC2)),
    };
    let wc3 = BracketSlot::contest(WC3, wc3_home, wc3_away, BestOf::ONE, records);
    [wc1, wc2, wc3]
}

type Pairing = (Participant, Participant);

fn placeholder_pairings() -> (Pairing, Pairing) {
    (
        (Participant::Seed(7), Participant::Seed(8)),
        (Participant::Seed(9), Participant::Seed(10)),
    )
}

/// 7 vs 8 and 9 vs 10. Until ten entities are ranked, every wild-card seed is
/// a placeholder.
fn seeded_pairings(standings: &[TeamStanding]) -> (Pairing, Pairing) {
    if standings.len() < MIN_RANKED {
        return placeholder_pairings();
    }
    (
        (seed(standings, 7), seed(standings, 8)),
        (seed(standings, 9), seed(standings, 10)),
    )
}

/// First two distinct pairings in play order. With a full ranking the scan only
/// looks at games among seeds 7 to 10; otherwise every league game counts.
fn discovered_pairings(standings: &[TeamStanding], records: &[GameRecord]) -> (Pairing, Pairing) {
    let pool: Option<HashSet<&str>> = (standings.len() >= MIN_RANKED)
        .then(|| standings[6..MIN_RANKED].iter().map(|s| s.entity.as_str()).collect());

    let mut ordered: Vec<&GameRecord> = records
        .iter()
        .filter(|r| {
            pool.as_ref()
                .is_none_or(|p| p.contains(r.home_entity.as_str()) && p.contains(r.away_entity.as_str()))
        })
        .collect();
    ordered.sort_by_key(|r| r.played_at);

    let mut seen = HashSet::new();
    let mut found = Vec::with_capacity(2);
    for record in ordered {
        if found.len() == 2 {
            break;
        }
        if seen.insert(record.pairing()) {
            found.push((
                Participant::Entity(record.home_entity.clone()),
                Participant::Entity(record.away_entity.clone()),
            ));
        }
    }
    let mut found = found.into_iter();

    let (first, second) = placeholder_pairings();
    let wc1 = found.next().unwrap_or(first);
    let wc2 = found.next().unwrap_or(second);
    (wc1, wc2)
}
