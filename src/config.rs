use anyhow::{Context, bail};
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;
use theshow_api::client::ApiOptions;

/// Env var naming a JSON file that replaces the built-in league tables.
pub const CONFIG_ENV: &str = "PELOTEROS_CONFIG";

/// Everything a refresh cycle needs to know about the league. Passed explicitly
/// to each component; nothing is read from ambient state.
///
/// A config file may omit tuning knobs (scoring, pages, timezone, api), which
/// then take the built-in values. League tables never do: a missing roster,
/// alias, member, correction or exclusion table is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueConfig {
    /// Ordered roster. Order is the final tiebreak in the standings.
    #[serde(default)]
    pub roster: Vec<RosterEntry>,
    /// Extra accounts whose history is fetched and merged into a participant's.
    #[serde(default)]
    pub aliases: HashMap<String, Vec<String>>,
    /// Accounts recognised as league members without owning a franchise.
    #[serde(default)]
    pub extra_members: Vec<String>,
    #[serde(default)]
    pub record_adjustments: HashMap<String, RecordAdjustment>,
    #[serde(default)]
    pub point_adjustments: HashMap<String, PointAdjustment>,
    pub scoring: ScoringRule,
    pub competition_mode: String,
    /// Games before this instant are ignored. Interpreted as UTC.
    pub cutoff: NaiveDateTime,
    pub pages: Vec<u32>,
    pub scheduled_games: u32,
    /// IANA zone used for "today" and display strings.
    pub timezone: String,
    pub local_label: String,
    pub wildcard_strategy: WildcardStrategy,
    #[serde(default)]
    pub exclusions: ExclusionTable,
    pub api: ApiSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub participant: String,
    pub entity: String,
}

/// Results from before the data source existed, or replayed off-platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAdjustment {
    pub wins: u32,
    pub losses: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointAdjustment {
    pub points: i32,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub win_points: i32,
    pub loss_points: i32,
}

impl Default for ScoringRule {
    fn default() -> Self {
        Self { win_points: 2, loss_points: 1 }
    }
}

impl ScoringRule {
    pub fn base_points(&self, wins: u32, losses: u32) -> i32 {
        self.win_points * wins as i32 + self.loss_points * losses as i32
    }
}

/// How WC1/WC2 are identified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildcardStrategy {
    /// WC1 = seed 7 vs 8, WC2 = seed 9 vs 10.
    #[default]
    Seeded,
    /// WC1/WC2 = first two distinct pairings seen in play order.
    Discovery,
}

/// Hand-verified bad games from the upstream source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionTable {
    /// Exact display lines, compared after trimming.
    pub strings: Vec<String>,
    pub rules: Vec<ExclusionRule>,
}

/// Structural match; every field that is set must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionRule {
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    /// Substring of the local "dd-mm-yyyy - h:mm am" stamp.
    pub played_at_contains: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub platform: String,
    pub timeout_secs: u64,
    pub retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        let options = ApiOptions::default();
        Self {
            base_url: options.base_url,
            platform: options.platform,
            timeout_secs: options.timeout.as_secs(),
            retries: options.retries,
            retry_delay_ms: options.retry_delay.as_millis() as u64,
        }
    }
}

impl ApiSettings {
    pub fn options(&self) -> ApiOptions {
        ApiOptions {
            base_url: self.base_url.clone(),
            platform: self.platform.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            retries: self.retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

impl LeagueConfig {
    /// Built-in tables, or the JSON file named by `PELOTEROS_CONFIG`.
    pub fn load() -> anyhow::Result<Self> {
        let config = match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("could not read league config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid league config json at {}", path.display()))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.roster.is_empty() {
            bail!("league config has an empty roster");
        }
        let mut seen = HashSet::new();
        for entry in &self.roster {
            if !seen.insert(entry.entity.as_str()) {
                bail!("entity {:?} appears twice in the roster", entry.entity);
            }
        }
        self.tz()?;
        Ok(())
    }

    pub fn tz(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("unknown timezone {:?}: {e}", self.timezone))
    }

    /// Accounts fetched for one participant: the participant, then its aliases.
    pub fn accounts_for<'a>(&'a self, participant: &'a str) -> Vec<&'a str> {
        std::iter::once(participant)
            .chain(
                self.aliases
                    .get(participant)
                    .into_iter()
                    .flatten()
                    .map(String::as_str),
            )
            .collect()
    }

    /// Every account that counts as a league member, aliases included.
    pub fn member_accounts(&self) -> Vec<&str> {
        let mut members: Vec<&str> = self.roster.iter().map(|r| r.participant.as_str()).collect();
        for (base, alts) in &self.aliases {
            members.push(base);
            members.extend(alts.iter().map(String::as_str));
        }
        members.extend(self.extra_members.iter().map(String::as_str));
        members
    }

    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.roster.iter().map(|r| r.entity.as_str())
    }
}

impl Default for LeagueConfig {
    fn default() -> Self {
        let roster = [
            ("mlbsonoman", "Orioles"),
            ("AV777", "Red Sox"),
            ("L_Sanz7", "Yankees"),
            ("ElChamaquin", "Tigers"),
            ("Dcontreritas", "Royals"),
            ("Bufon3-0", "Twins"),
            ("Amorphis8076", "White Sox"),
            ("lednew__", "Rangers"),
            ("itschinoo02", "Astros"),
            ("JoseAco21", "Braves"),
            ("lnsocial", "Marlins"),
            ("MR TRAMPA PR", "Nationals"),
            ("Papotico013213", "Cubs"),
            ("SARMIENTOFO-SHO", "Brewers"),
            ("Joshe_izarra", "Pirates"),
            ("Francoxico", "Diamondbacks"),
            ("Mayolito7", "Dodgers"),
            ("Juanbrachog", "Padres"),
        ]
        .into_iter()
        .map(|(participant, entity)| RosterEntry {
            participant: participant.to_owned(),
            entity: entity.to_owned(),
        })
        .collect();

        let aliases: [(&str, &[&str]); 6] = [
            ("AV777", &["StrikerVJ"]),
            ("MR TRAMPA PR", &["BENDITOPA"]),
            ("Papotico013213", &["El asesino03874"]),
            ("lnsocial", &["lnsociaI", "Insocial", "InsociaI"]),
            ("X2KDUDE", &["Xx2kdudexX8466"]),
            ("Francoxico", &["Xxbandiffft", "XxBandido15xX"]),
        ];
        let aliases = aliases
            .into_iter()
            .map(|(base, alts)| {
                (base.to_owned(), alts.iter().map(|a| (*a).to_owned()).collect())
            })
            .collect();

        let record_adjustments = [
            ("Pirates", 27, 4),
            ("Twins", 11, 23),
            ("Diamondbacks", 14, 9),
            ("Dodgers", 23, 9),
            ("Rangers", 10, 24),
            ("Red Sox", 8, 21),
            ("Royals", 16, 11),
            ("Tigers", 16, 9),
            ("Braves", 22, 8),
            ("Brewers", 8, 11),
            ("Cubs", 9, 7),
            ("Astros", 7, 6),
            ("Padres", 5, 12),
            ("Orioles", 6, 15),
            ("Yankees", 13, 9),
            ("White Sox", 2, 17),
            ("Nationals", 5, 3),
            ("Marlins", 6, 4),
        ]
        .into_iter()
        .map(|(entity, wins, losses)| (entity.to_owned(), RecordAdjustment { wins, losses }))
        .collect();

        let exclusions = ExclusionTable {
            strings: vec!["Yankees 0 - 0 Mets - 08-09-2025 - 9:40 pm (hora Chile)".to_owned()],
            rules: vec![ExclusionRule {
                home_team: Some("Yankees".to_owned()),
                away_team: Some("Mets".to_owned()),
                home_score: Some(0),
                away_score: Some(0),
                played_at_contains: Some("08-09-2025 - 9:40".to_owned()),
            }],
        };

        Self {
            roster,
            aliases,
            extra_members: vec!["AiramReynoso_".to_owned(), "Yosoyreynoso_".to_owned()],
            record_adjustments,
            point_adjustments: HashMap::new(),
            scoring: ScoringRule::default(),
            competition_mode: "LEAGUE".to_owned(),
            cutoff: chrono::NaiveDate::from_ymd_opt(2025, 9, 24)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap_or_default(),
            pages: vec![1, 2],
            scheduled_games: 34,
            timezone: "America/Santiago".to_owned(),
            local_label: "hora Chile".to_owned(),
            wildcard_strategy: WildcardStrategy::default(),
            exclusions,
            api: ApiSettings::default(),
        }
    }
}
