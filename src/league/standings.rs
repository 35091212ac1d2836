use super::GameRecord;
use super::normalize::{Normalizer, Scope, dedup_by_id};
use crate::config::{LeagueConfig, RosterEntry};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt::Write as _;
use theshow_api::HistoryGame;

/// Raw history per fetched account name.
pub type Captures = HashMap<String, Vec<HistoryGame>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamStanding {
    pub entity: String,
    pub participant: String,
    pub wins: u32,
    pub losses: u32,
    pub games_played: u32,
    pub scheduled: u32,
    pub remaining: u32,
    /// points_base + points_adjustment
    pub points: i32,
    pub points_base: i32,
    pub points_adjustment: i32,
    pub adjustment_reason: String,
}

/// Produces one standings row per roster entry.
pub trait StandingsSource {
    fn compute_standings_row(&self, entity: &str, participant: &str) -> TeamStanding;
}

/// Rows for the whole roster, ranked.
pub fn compute_rows<S: StandingsSource + ?Sized>(source: &S, roster: &[RosterEntry]) -> Vec<TeamStanding> {
    let mut rows: Vec<TeamStanding> = roster
        .iter()
        .map(|r| source.compute_standings_row(&r.entity, &r.participant))
        .collect();
    rank(&mut rows);
    rows
}

/// Points desc, wins desc, losses asc. Stable: full ties keep roster order.
pub fn rank(rows: &mut [TeamStanding]) {
    rows.sort_by_key(|r| (Reverse(r.points), Reverse(r.wins), r.losses));
}

/// Wins and losses for `entity` by the source's result markers. Games with no
/// marked winner count for nobody.
pub fn tally(entity: &str, records: &[GameRecord]) -> (u32, u32) {
    let entity = entity.trim().to_lowercase();
    let same = |name: &str| name.trim().to_lowercase() == entity;
    records
        .iter()
        .filter_map(GameRecord::marked_outcome)
        .fold((0, 0), |(wins, losses), (winner, loser)| {
            if same(winner) {
                (wins + 1, losses)
            } else if same(loser) {
                (wins, losses + 1)
            } else {
                (wins, losses)
            }
        })
}

/// Apply the manual corrections to a counted record. Win/loss corrections feed
/// the base points; the points correction is added on top, independently.
pub fn build_row(config: &LeagueConfig, entity: &str, participant: &str, counted: (u32, u32)) -> TeamStanding {
    let extra = config.record_adjustments.get(entity).copied().unwrap_or_default();
    let wins = counted.0 + extra.wins;
    let losses = counted.1 + extra.losses;
    let games_played = wins + losses;
    let points_base = config.scoring.base_points(wins, losses);
    let adjustment = config.point_adjustments.get(entity).cloned().unwrap_or_default();

    TeamStanding {
        entity: entity.to_owned(),
        participant: participant.to_owned(),
        wins,
        losses,
        games_played,
        scheduled: config.scheduled_games,
        remaining: config.scheduled_games.saturating_sub(games_played),
        points: points_base + adjustment.points,
        points_base,
        points_adjustment: adjustment.points,
        adjustment_reason: adjustment.reason,
    }
}

/// One entity's history at each stage of normalization.
#[derive(Debug, Clone, Default)]
pub struct EntityCapture {
    pub raw: Vec<HistoryGame>,
    pub dedup: Vec<HistoryGame>,
    pub considered: Vec<GameRecord>,
}

/// [`StandingsSource`] over fetched captures.
pub struct Aggregator<'a> {
    config: &'a LeagueConfig,
    normalizer: &'a Normalizer,
    captures: &'a Captures,
}

impl<'a> Aggregator<'a> {
    pub fn new(config: &'a LeagueConfig, normalizer: &'a Normalizer, captures: &'a Captures) -> Self {
        Self { config, normalizer, captures }
    }

    /// History of the participant and its aliases, scoped to `entity`.
    pub fn capture(&self, entity: &str, participant: &str) -> EntityCapture {
        let raw: Vec<HistoryGame> = self
            .config
            .accounts_for(participant)
            .into_iter()
            .filter_map(|account| self.captures.get(account))
            .flatten()
            .cloned()
            .collect();
        let dedup = dedup_by_id(&raw);
        let considered = self.normalizer.normalize(&dedup, Scope::Entity(entity));
        EntityCapture { raw, dedup, considered }
    }
}

impl StandingsSource for Aggregator<'_> {
    fn compute_standings_row(&self, entity: &str, participant: &str) -> TeamStanding {
        let capture = self.capture(entity, participant);
        log::debug!(
            "[captures] {entity} ({participant}): raw={} dedup={} considered={}",
            capture.raw.len(),
            capture.dedup.len(),
            capture.considered.len()
        );
        build_row(self.config, entity, participant, tally(entity, &capture.considered))
    }
}

/// Fixed-width table for the terminal, followed by manual point notes.
pub fn render_table(rows: &[TeamStanding]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Pos | Team                | Player          | Sched |  GP |  W |  L | Left | Pts");
    let _ = writeln!(out, "----+---------------------+-----------------+-------+-----+----+----+------+----");
    for (pos, r) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3} | {:<19} | {:<15} | {:>5} | {:>3} | {:>2} | {:>2} | {:>4} | {:>3}",
            pos + 1,
            r.entity,
            r.participant,
            r.scheduled,
            r.games_played,
            r.wins,
            r.losses,
            r.remaining,
            r.points
        );
    }

    let notes: Vec<_> = rows.iter().filter(|r| r.points_adjustment != 0).collect();
    if !notes.is_empty() {
        let _ = writeln!(out, "\nManual point adjustments:");
        for r in notes {
            let sign = if r.points_adjustment > 0 { "+" } else { "" };
            let _ = writeln!(out, " - {}: {sign}{} ({})", r.entity, r.points_adjustment, r.adjustment_reason);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PointAdjustment, RecordAdjustment};
    use crate::league::fixtures::game;

    fn bare_config() -> LeagueConfig {
        LeagueConfig {
            record_adjustments: HashMap::new(),
            point_adjustments: HashMap::new(),
            ..LeagueConfig::default()
        }
    }

    fn row(entity: &str, points: i32, wins: u32, losses: u32) -> TeamStanding {
        TeamStanding {
            entity: entity.into(),
            participant: String::new(),
            wins,
            losses,
            games_played: wins + losses,
            scheduled: 34,
            remaining: 0,
            points,
            points_base: points,
            points_adjustment: 0,
            adjustment_reason: String::new(),
        }
    }

    #[test]
    fn tally_uses_markers_and_skips_unmarked() {
        let mut unmarked = game(3, "Pirates", 9, "Twins", 0);
        unmarked.marked_winner = None;
        let records = vec![
            game(0, "Pirates", 4, "Twins", 2),
            game(1, "twins ", 5, "Pirates", 1),
            game(2, "Pirates", 6, "Mets", 0),
            unmarked,
        ];
        assert_eq!(tally("Pirates", &records), (2, 1));
        assert_eq!(tally("Twins", &records), (1, 1));
    }

    #[test]
    fn points_formula_includes_extra_points() {
        let mut config = bare_config();
        for (wins, losses, extra) in [(0, 0, 0), (5, 3, 0), (10, 2, -3), (1, 20, 4)] {
            config.point_adjustments.insert(
                "Braves".into(),
                PointAdjustment { points: extra, reason: "ruling".into() },
            );
            let r = build_row(&config, "Braves", "JoseAco21", (wins, losses));
            assert_eq!(r.points, 2 * wins as i32 + losses as i32 + extra);
            assert_eq!(r.points, r.points_base + r.points_adjustment);
            assert_eq!(r.games_played, wins + losses);
        }
    }

    #[test]
    fn empty_history_with_record_correction() {
        let mut config = bare_config();
        config.record_adjustments.insert("Nationals".into(), RecordAdjustment { wins: 5, losses: 3 });
        let r = build_row(&config, "Nationals", "MR TRAMPA PR", tally("Nationals", &[]));
        assert_eq!((r.wins, r.losses), (5, 3));
        assert_eq!(r.points, 13);
        assert_eq!(r.remaining, 34 - 8);
    }

    #[test]
    fn record_corrections_do_not_touch_the_points_override() {
        let mut config = bare_config();
        config.record_adjustments.insert("Cubs".into(), RecordAdjustment { wins: 1, losses: 1 });
        config.point_adjustments.insert(
            "Cubs".into(),
            PointAdjustment { points: -2, reason: "forfeit".into() },
        );
        let r = build_row(&config, "Cubs", "Papotico013213", (2, 0));
        assert_eq!(r.points_base, 2 * 3 + 1);
        assert_eq!(r.points_adjustment, -2);
        assert_eq!(r.points, 5);
        assert_eq!(r.adjustment_reason, "forfeit");
    }

    #[test]
    fn ranking_keys_in_order() {
        let mut rows = vec![
            row("A", 10, 3, 4),
            row("B", 12, 4, 4),
            row("C", 10, 4, 2),
            row("D", 10, 4, 1),
        ];
        rank(&mut rows);
        let order: Vec<_> = rows.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(order, vec!["B", "D", "C", "A"]);
    }

    #[test]
    fn ranking_is_stable_for_full_ties() {
        let mut rows = vec![
            row("Orioles", 10, 4, 2),
            row("Red Sox", 20, 9, 2),
            row("Yankees", 10, 4, 2),
            row("Tigers", 10, 4, 2),
        ];
        rank(&mut rows);
        let order: Vec<_> = rows.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(order, vec!["Red Sox", "Orioles", "Yankees", "Tigers"]);
    }

    struct Fixed(HashMap<&'static str, (u32, u32)>, LeagueConfig);

    impl StandingsSource for Fixed {
        fn compute_standings_row(&self, entity: &str, participant: &str) -> TeamStanding {
            let counted = self.0.get(entity).copied().unwrap_or_default();
            build_row(&self.1, entity, participant, counted)
        }
    }

    #[test]
    fn compute_rows_ranks_every_roster_entry() {
        let config = bare_config();
        let source = Fixed([("Orioles", (1, 0)), ("Red Sox", (3, 0))].into(), config.clone());
        let rows = compute_rows(&source, &config.roster[..3]);
        let order: Vec<_> = rows.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(order, vec!["Red Sox", "Orioles", "Yankees"]);
        assert_eq!(rows[0].participant, "AV777");
    }

    #[test]
    fn aggregator_merges_alias_history() {
        use theshow_api::{GameResult, HistorySide};
        let config = bare_config();
        let normalizer = Normalizer::new(&config).unwrap();
        let g = |id: &str, home_user: &str| HistoryGame {
            id: Some(id.into()),
            home: HistorySide {
                team: "Marlins".into(),
                participant: home_user.into(),
                result: GameResult::Win,
                runs: 3,
            },
            away: HistorySide {
                team: "Cubs".into(),
                participant: "Papotico013213".into(),
                result: GameResult::Loss,
                runs: 1,
            },
            display_date: "09/25/2025 23:10".into(),
            game_mode: "LEAGUE".into(),
            pitcher_info: String::new(),
        };
        let captures: Captures = [
            ("lnsocial".to_owned(), vec![g("1", "lnsocial")]),
            // the same game also shows up on the opponent's page
            ("lnsociaI".to_owned(), vec![g("2", "lnsociaI"), g("1", "lnsocial")]),
        ]
        .into();
        let aggregator = Aggregator::new(&config, &normalizer, &captures);

        let capture = aggregator.capture("Marlins", "lnsocial");
        assert_eq!((capture.raw.len(), capture.dedup.len(), capture.considered.len()), (3, 2, 2));

        let r = aggregator.compute_standings_row("Marlins", "lnsocial");
        assert_eq!((r.wins, r.losses), (2, 0));
        let cubs = aggregator.compute_standings_row("Cubs", "Papotico013213");
        assert_eq!((cubs.wins, cubs.losses), (0, 0), "no captures fetched for Cubs accounts");
    }

    #[test]
    fn table_lists_rows_and_notes() {
        let mut rows = vec![row("Pirates", 62, 27, 8), row("Twins", 45, 11, 23)];
        rows[1].points_adjustment = -1;
        rows[1].adjustment_reason = "late forfeit".into();
        let table = render_table(&rows);
        assert!(table.lines().nth(2).unwrap().starts_with("  1 | Pirates"));
        assert!(table.contains(" - Twins: -1 (late forfeit)"));
    }
}
