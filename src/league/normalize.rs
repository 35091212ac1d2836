use super::display::local_stamp;
use super::{GameRecord, Side};
use crate::config::{ExclusionRule, ExclusionTable, LeagueConfig};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use theshow_api::{GameResult, HistoryGame};

/// Literal formats the source uses for `display_date`.
const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"];

/// No-op opponent marker.
const CPU: &str = "cpu";

/// Platform badges such as `^b12^` appended to account names.
static BADGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i-u)\^b[0-9]+\^").expect("badge pattern is valid"));

/// Anything that may carry an upstream identifier.
pub trait Identified {
    fn record_id(&self) -> Option<&str>;
}

impl Identified for HistoryGame {
    fn record_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Identified for GameRecord {
    fn record_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Keep the first occurrence of every non-empty id. Id-less items always pass.
pub fn dedup_by_id<T: Identified + Clone>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| match item.record_id().filter(|id| !id.is_empty()) {
            Some(id) => seen.insert(id.to_owned()),
            None => true,
        })
        .cloned()
        .collect()
}

/// Naive timestamps are read as UTC. Anything else is `None`, never an error.
pub fn parse_display_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Lower-cased account name with platform badges stripped.
pub fn normalize_participant(raw: &str) -> String {
    BADGE_RE.replace_all(raw, "").trim().to_lowercase()
}

pub fn is_cpu(raw: &str) -> bool {
    normalize_participant(raw) == CPU
}

fn norm_team(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Which games a normalization pass keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    /// Both franchises are tracked entities.
    League,
    /// The named entity is on either side (case-insensitive).
    Entity(&'a str),
}

/// Turns raw history into deduplicated, relevant, time-ordered records.
#[derive(Debug, Clone)]
pub struct Normalizer {
    mode: String,
    cutoff: DateTime<Utc>,
    members: HashSet<String>,
    entities: HashSet<String>,
    exclusions: ExclusionTable,
    tz: Tz,
    label: String,
}

impl Normalizer {
    pub fn new(config: &LeagueConfig) -> anyhow::Result<Self> {
        Ok(Self {
            mode: config.competition_mode.trim().to_uppercase(),
            cutoff: config.cutoff.and_utc(),
            members: config
                .member_accounts()
                .into_iter()
                .map(normalize_participant)
                .collect(),
            entities: config.entities().map(|e| e.trim().to_owned()).collect(),
            exclusions: config.exclusions.clone(),
            tz: config.tz()?,
            label: config.local_label.clone(),
        })
    }

    pub fn tz(&self) -> &Tz {
        &self.tz
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Full pass: dedup by id, relevance filter, scope, exclusions, then a
    /// stable sort by play time.
    pub fn normalize(&self, games: &[HistoryGame], scope: Scope<'_>) -> Vec<GameRecord> {
        let mut records: Vec<GameRecord> = dedup_by_id(games)
            .iter()
            .filter_map(|g| self.relevant(g))
            .filter(|r| self.in_scope(r, scope))
            .filter(|r| !self.is_excluded(r))
            .collect();
        records.sort_by_key(|r| r.played_at);
        records
    }

    /// Mode, cutoff and membership checks for a single game.
    pub fn relevant(&self, game: &HistoryGame) -> Option<GameRecord> {
        if game.game_mode.trim().to_uppercase() != self.mode {
            return None;
        }
        let played_at = parse_display_date(&game.display_date)?;
        if played_at < self.cutoff {
            return None;
        }

        let home_member = self.is_member(&game.home.participant);
        let away_member = self.is_member(&game.away.participant);
        let members_only = home_member && away_member;
        let against_cpu = (is_cpu(&game.home.participant) && away_member)
            || (is_cpu(&game.away.participant) && home_member);
        if !(members_only || against_cpu) {
            return None;
        }

        let marked_winner = match (game.home.result, game.away.result) {
            (GameResult::Win, _) => Some(Side::Home),
            (_, GameResult::Win) => Some(Side::Away),
            _ => None,
        };

        Some(GameRecord {
            id: game.id.clone(),
            home_entity: game.home.team.trim().to_owned(),
            away_entity: game.away.team.trim().to_owned(),
            home_participant: game.home.participant.clone(),
            away_participant: game.away.participant.clone(),
            home_score: game.home.runs,
            away_score: game.away.runs,
            played_at,
            competition_mode: self.mode.clone(),
            marked_winner,
            pitcher_info: game.pitcher_info.clone(),
        })
    }

    fn is_member(&self, raw: &str) -> bool {
        self.members.contains(&normalize_participant(raw))
    }

    fn in_scope(&self, record: &GameRecord, scope: Scope<'_>) -> bool {
        match scope {
            Scope::League => {
                self.entities.contains(&record.home_entity)
                    && self.entities.contains(&record.away_entity)
            }
            Scope::Entity(entity) => {
                let entity = norm_team(entity);
                norm_team(&record.home_entity) == entity || norm_team(&record.away_entity) == entity
            }
        }
    }

    pub fn is_excluded(&self, record: &GameRecord) -> bool {
        let line = record.display_line(&self.tz, &self.label);
        if self.exclusions.strings.iter().any(|s| s.trim() == line.trim()) {
            return true;
        }
        let stamp = local_stamp(record.played_at, &self.tz);
        self.exclusions
            .rules
            .iter()
            .any(|rule| rule_matches(rule, record, &stamp))
    }

    /// Display lines for records played on `day` in the local zone, with a
    /// second de-duplication on (home, away, score, pitcher line) for
    /// re-uploads that got a fresh id.
    pub fn games_on(&self, records: &[GameRecord], day: NaiveDate) -> Vec<String> {
        let mut seen = HashSet::new();
        records
            .iter()
            .filter(|r| r.played_at.with_timezone(&self.tz).date_naive() == day)
            .filter(|r| {
                seen.insert((
                    r.home_entity.as_str(),
                    r.away_entity.as_str(),
                    r.home_score,
                    r.away_score,
                    r.pitcher_info.as_str(),
                ))
            })
            .map(|r| r.display_line(&self.tz, &self.label))
            .collect()
    }
}

fn rule_matches(rule: &ExclusionRule, record: &GameRecord, stamp: &str) -> bool {
    let team_ok = |want: &Option<String>, have: &str| want.as_deref().is_none_or(|w| w == have);
    let score_ok = |want: Option<u32>, have: u32| want.is_none_or(|w| w == have);

    team_ok(&rule.home_team, &record.home_entity)
        && team_ok(&rule.away_team, &record.away_entity)
        && score_ok(rule.home_score, record.home_score)
        && score_ok(rule.away_score, record.away_score)
        && rule
            .played_at_contains
            .as_deref()
            .is_none_or(|needle| stamp.contains(needle))
}
