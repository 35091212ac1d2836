use log::warn;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_INTERVAL_SECS: u64 = 300;
const DEFAULT_CACHE: &str = "standings_cache.json";
const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Runtime switches, separate from the league tables in `config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// One cycle, print the table, exit.
    pub run_once: bool,
    pub interval: Duration,
    pub cache_path: PathBuf,
    pub bind: String,
    pub dump_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            run_once: false,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            cache_path: PathBuf::from(DEFAULT_CACHE),
            bind: DEFAULT_BIND.to_owned(),
            dump_dir: None,
        }
    }
}

impl Settings {
    pub fn load(once_flag: bool) -> Self {
        let mut settings = Self::from_lookup(|key| std::env::var(key).ok());
        settings.run_once |= once_flag;
        settings
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let interval = match value("UPDATE_INTERVAL_SECONDS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!("UPDATE_INTERVAL_SECONDS={raw:?} is not a positive integer, using {DEFAULT_INTERVAL_SECS}");
                    defaults.interval
                }
            },
            None => defaults.interval,
        };

        Self {
            run_once: value("RUN_ONCE").is_some_and(|v| v == "1"),
            interval,
            cache_path: value("PELOTEROS_CACHE").map(PathBuf::from).unwrap_or(defaults.cache_path),
            bind: value("PELOTEROS_BIND").unwrap_or(defaults.bind),
            dump_dir: value("PELOTEROS_DUMP_DIR").map(PathBuf::from),
        }
    }
}
