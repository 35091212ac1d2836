use crate::league::bracket::Bracket;
use crate::league::standings::TeamStanding;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Everything one refresh cycle produces.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub standings: Vec<TeamStanding>,
    /// Display lines for games played today in the league's zone.
    pub games_today: Vec<String>,
    /// Display lines for every league game since the cutoff.
    pub postseason_games: Vec<String>,
    pub bracket: Bracket,
}

/// The cached snapshot file shared by the refresh worker and the HTTP server.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize fully, write a sibling temp file, then rename it over the
    /// target. Readers see the old file or the new one, never a partial write.
    pub async fn write(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        let payload = serde_json::to_vec_pretty(snapshot).context("could not serialize snapshot")?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("could not create {}", parent.display()))?;
        }

        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &payload)
            .await
            .with_context(|| format!("could not write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("could not move snapshot into {}", self.path.display()))?;
        Ok(())
    }

    /// Raw file bytes, `None` before the first successful write.
    pub async fn read_raw(&self) -> anyhow::Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("could not read {}", self.path.display())),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name: OsString = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

// ----------------------------------------------------------------------------
// Debug dumps

/// Keep `[A-Za-z0-9._-]`, replace everything else with `_`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Directory receiving pretty-printed intermediate captures.
#[derive(Debug, Clone)]
pub struct DumpDir {
    root: PathBuf,
}

impl DumpDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Writes `<dir>/<sanitized name>.json` and returns its path.
    pub fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("could not create dump dir {}", self.root.display()))?;
        let path = self.root.join(format!("{}.json", sanitize_name(name)));
        let payload = serde_json::to_string_pretty(value).context("could not serialize dump")?;
        std::fs::write(&path, payload).with_context(|| format!("could not write {}", path.display()))?;
        Ok(path)
    }
}
