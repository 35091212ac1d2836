use super::GameRecord;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// "25-09-2025 - 8:10 pm" in the given zone: no zero padding on the hour,
/// lower-case meridiem.
pub fn local_stamp(ts: DateTime<Utc>, tz: &Tz) -> String {
    ts.with_timezone(tz)
        .format("%d-%m-%Y - %-I:%M %p")
        .to_string()
        .to_lowercase()
}

impl GameRecord {
    /// "Yankees 4 - Tigers 2  - 24-09-2025 - 9:10 pm (hora Chile)"
    pub fn display_line(&self, tz: &Tz, label: &str) -> String {
        format!(
            "{} {} - {} {}  - {} ({label})",
            self.home_entity,
            self.home_score,
            self.away_entity,
            self.away_score,
            local_stamp(self.played_at, tz)
        )
    }
}
