use crate::config::LeagueConfig;
use crate::league::GameRecord;
use crate::league::bracket::Bracket;
use crate::league::normalize::{Normalizer, Scope};
use crate::league::standings::{Aggregator, Captures, compute_rows};
use crate::snapshot::{DumpDir, Snapshot, SnapshotStore};
use crate::state::worker::Refresh;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use theshow_api::HistoryGame;
use theshow_api::client::ShowApi;

/// fetch -> normalize -> standings -> wild card -> bracket -> snapshot.
pub struct RefreshCycle {
    config: LeagueConfig,
    normalizer: Normalizer,
    api: ShowApi,
    store: SnapshotStore,
    dumps: Option<DumpDir>,
}

impl RefreshCycle {
    pub fn new(config: LeagueConfig, store: SnapshotStore, dumps: Option<DumpDir>) -> anyhow::Result<Self> {
        let normalizer = Normalizer::new(&config)?;
        let api = ShowApi::with_options(config.api.options());
        Ok(Self { config, normalizer, api, store, dumps })
    }

    /// Full cycle. The snapshot is only written once everything is computed.
    pub async fn try_run(&self) -> anyhow::Result<Snapshot> {
        let captures = self.fetch_captures().await;
        let snapshot = self.compute(&captures, Utc::now());
        self.store.write(&snapshot).await?;
        Ok(snapshot)
    }

    /// Roster participants then their aliases, each account once.
    fn fetch_order(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.config
            .roster
            .iter()
            .flat_map(|entry| self.config.accounts_for(&entry.participant))
            .filter(|account| seen.insert(*account))
            .collect()
    }

    async fn fetch_captures(&self) -> Captures {
        let mut captures = Captures::new();
        for account in self.fetch_order() {
            let games = self.api.fetch_participant(account, &self.config.pages).await;
            debug!("fetched {} games for {account}", games.len());
            captures.insert(account.to_owned(), games);
        }
        captures
    }

    /// Everything after the fetch. Pure apart from the optional debug dumps.
    pub fn compute(&self, captures: &Captures, now: DateTime<Utc>) -> Snapshot {
        let aggregator = Aggregator::new(&self.config, &self.normalizer, captures);
        if let Some(dumps) = &self.dumps {
            self.dump_captures(&aggregator, dumps);
        }

        let standings = compute_rows(&aggregator, &self.config.roster);
        if let Some(dumps) = &self.dumps
            && let Err(e) = dumps.write("standings", &standings)
        {
            warn!("{e:#}");
        }

        let league = self.league_records(captures);
        let bracket = Bracket::build(self.config.wildcard_strategy, &standings, &league);
        let today = now.with_timezone(self.normalizer.tz()).date_naive();

        Snapshot {
            generated_at: now,
            games_today: self.normalizer.games_on(&league, today),
            postseason_games: league
                .iter()
                .map(|r| r.display_line(self.normalizer.tz(), self.normalizer.label()))
                .collect(),
            standings,
            bracket,
        }
    }

    /// Every capture, in fetch order, normalized at league scope.
    fn league_records(&self, captures: &Captures) -> Vec<GameRecord> {
        let all: Vec<HistoryGame> = self
            .fetch_order()
            .into_iter()
            .filter_map(|account| captures.get(account))
            .flatten()
            .cloned()
            .collect();
        self.normalizer.normalize(&all, Scope::League)
    }

    fn dump_captures(&self, aggregator: &Aggregator<'_>, dumps: &DumpDir) {
        for entry in &self.config.roster {
            let capture = aggregator.capture(&entry.entity, &entry.participant);
            let written = dumps
                .write(&format!("{}_raw", entry.participant), &capture.raw)
                .and_then(|_| dumps.write(&format!("{}_dedup", entry.participant), &capture.dedup))
                .and_then(|_| dumps.write(&format!("{}_considered", entry.participant), &capture.considered));
            if let Err(e) = written {
                warn!("{e:#}");
            }
        }
    }
}

impl Refresh for RefreshCycle {
    /// Errors are logged and reported as `false`; the previous snapshot stays.
    async fn refresh(&mut self) -> bool {
        match self.try_run().await {
            Ok(snapshot) => {
                info!(
                    "snapshot written to {} ({} teams, {} league games, champion: {})",
                    self.store.path().display(),
                    snapshot.standings.len(),
                    snapshot.postseason_games.len(),
                    snapshot.bracket.champion.as_deref().unwrap_or("-")
                );
                true
            }
            Err(e) => {
                error!("refresh cycle failed: {e:#}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PointAdjustment, RosterEntry, WildcardStrategy};
    use crate::league::series::SeriesStatus;
    use std::collections::HashMap;
    use theshow_api::{GameResult, HistorySide};

    const TEAMS: [(&str, &str); 10] = [
        ("u1", "Braves"),
        ("u2", "Tigers"),
        ("u3", "Royals"),
        ("u4", "Yankees"),
        ("u5", "Cubs"),
        ("u6", "Brewers"),
        ("u7", "Pirates"),
        ("u8", "Twins"),
        ("u9", "Dodgers"),
        ("u10", "Padres"),
    ];

    fn config() -> LeagueConfig {
        let record_adjustments = TEAMS
            .iter()
            .zip((0..10u32).rev())
            .map(|((_, entity), wins)| {
                (
                    (*entity).to_owned(),
                    crate::config::RecordAdjustment { wins: wins * 2, losses: 0 },
                )
            })
            .collect();
        LeagueConfig {
            roster: TEAMS
                .iter()
                .map(|(p, e)| RosterEntry { participant: (*p).into(), entity: (*e).into() })
                .collect(),
            aliases: [("u9".to_owned(), vec!["u9-alt".to_owned()])].into(),
            extra_members: vec![],
            record_adjustments,
            point_adjustments: HashMap::new(),
            wildcard_strategy: WildcardStrategy::Seeded,
            ..LeagueConfig::default()
        }
    }

    fn cycle(dir: &std::path::Path, config: LeagueConfig) -> RefreshCycle {
        RefreshCycle::new(config, SnapshotStore::new(dir.join("cache.json")), None).unwrap()
    }

    fn history(id: &str, date: &str, home: (&str, &str, u32), away: (&str, &str, u32)) -> HistoryGame {
        let side = |(team, user, runs): (&str, &str, u32), won: bool| HistorySide {
            team: team.into(),
            participant: user.into(),
            result: if won { GameResult::Win } else { GameResult::Loss },
            runs,
        };
        HistoryGame {
            id: Some(id.into()),
            home: side(home, home.2 > away.2),
            away: side(away, away.2 > home.2),
            display_date: date.into(),
            game_mode: "LEAGUE".into(),
            pitcher_info: String::new(),
        }
    }

    #[test]
    fn fetch_order_lists_each_account_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.aliases.insert("u1".into(), vec!["u9-alt".into()]);
        let cycle = cycle(dir.path(), config);
        let order = cycle.fetch_order();
        assert_eq!(order[..2], ["u1", "u9-alt"]);
        assert_eq!(order.len(), 11);
    }

    #[test]
    fn compute_builds_standings_bracket_and_game_lists() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.point_adjustments.insert(
            "Padres".into(),
            PointAdjustment { points: 1, reason: "makeup".into() },
        );
        let cycle = cycle(dir.path(), config);

        let wc1 = history("1", "09/25/2025 23:10", ("Pirates", "u7", 4), ("Twins", "u8", 2));
        let captures: Captures = [
            ("u7".to_owned(), vec![wc1.clone()]),
            ("u8".to_owned(), vec![wc1]),
            (
                "u9-alt".to_owned(),
                vec![history("2", "09/26/2025 12:00", ("Padres", "u10", 0), ("Dodgers", "u9-alt", 6))],
            ),
        ]
        .into();
        let now = "2025-09-26T02:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let snapshot = cycle.compute(&captures, now);

        assert_eq!(snapshot.standings.len(), 10);
        assert_eq!(snapshot.standings[0].entity, "Braves");
        let padres = snapshot.standings.iter().find(|s| s.entity == "Padres").unwrap();
        assert_eq!(padres.points, padres.points_base + 1);

        // Shared game is counted once at league scope.
        assert_eq!(snapshot.postseason_games.len(), 2);
        // 02:30 UTC is still the 25th in Santiago; the Dodgers game is tomorrow.
        assert_eq!(
            snapshot.games_today,
            vec!["Pirates 4 - Twins 2  - 25-09-2025 - 8:10 pm (hora Chile)".to_owned()]
        );
        let [wc1, wc2, _] = &snapshot.bracket.wildcard;
        assert_eq!(wc1.winner(), Some("Pirates"));
        assert_eq!(wc2.winner(), Some("Dodgers"));
    }

    #[test]
    fn compute_tolerates_empty_captures() {
        let dir = tempfile::tempdir().unwrap();
        let cycle = cycle(dir.path(), config());
        let snapshot = cycle.compute(&Captures::new(), Utc::now());

        assert_eq!(snapshot.standings.len(), 10);
        assert!(snapshot.postseason_games.is_empty());
        assert!(snapshot.bracket.quarterfinals.iter().all(|s| s.series.status == SeriesStatus::NotStarted));
        assert!(snapshot.bracket.champion.is_none());
    }

    #[test]
    fn dumps_are_written_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let dumps = DumpDir::new(dir.path().join("dumps"));
        let cycle = RefreshCycle::new(config(), SnapshotStore::new(dir.path().join("cache.json")), Some(dumps))
            .unwrap();
        cycle.compute(&Captures::new(), Utc::now());

        for name in ["u1_raw.json", "u1_dedup.json", "u10_considered.json", "standings.json"] {
            assert!(dir.path().join("dumps").join(name).exists(), "{name} missing");
        }
    }
}
