/// Wire types for the game-history endpoint.
/// Endpoint: https://mlb25.theshow.com/apis/game_history.json?username=..&platform=..&page=..
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Deserialize, Default, Debug)]
pub struct GameHistoryResponse {
    #[serde(default)]
    pub game_history: Option<Vec<HistoryEntry>>,
}

#[derive(Deserialize, Default, Debug, Clone)]
pub struct HistoryEntry {
    /// Numeric on most pages, a string on some; absent for a handful of games.
    #[serde(default, deserialize_with = "loose_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub game_mode: Option<String>,
    #[serde(default)]
    pub display_date: Option<String>,
    #[serde(default)]
    pub home_full_name: Option<String>,
    #[serde(default)]
    pub away_full_name: Option<String>,
    #[serde(default)]
    pub home_name: Option<String>,
    #[serde(default)]
    pub away_name: Option<String>,
    /// "W" / "L" marker.
    #[serde(default)]
    pub home_display_result: Option<String>,
    #[serde(default)]
    pub away_display_result: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub home_runs: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub away_runs: Option<String>,
    #[serde(default)]
    pub display_pitcher_info: Option<String>,
}

/// Accept a JSON string, number or bool and keep its textual form.
fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}
