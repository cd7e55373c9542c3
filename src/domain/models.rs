use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How often an activity recurs.
///
/// The recurrence tag is recorded and persisted per-activity but is never
/// expanded across dates: an activity marked `daily` exists only under the
/// date it was saved for. Callers that want materialized recurrences have
/// to create the copies themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RepeatPolicy {
    #[default]
    Once,
    Daily,
    Weekly,
}

/// One scheduled item of a day's timetable.
///
/// The wire shape is `{ time, activity, repeat, days }`: the remote store
/// calls the description field `activity`, so it is renamed here. `repeat`
/// and `days` may be absent in stored payloads and default to `once` /
/// empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Activity {
    pub time: String,
    #[serde(rename = "activity")]
    pub label: String,
    #[serde(default)]
    pub repeat: RepeatPolicy,
    /// Weekday names; only meaningful when `repeat` is `weekly`.
    #[serde(default)]
    pub days: Vec<String>,
}

impl Activity {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.time, "activity.time")?;
        validate_non_empty(&self.label, "activity.activity")?;
        Ok(())
    }

    /// The chronological sort key: `time` left-padded with zeros to five
    /// characters, so `9:30` compares as `09:30`. Lexicographic order on
    /// the padded form equals time-of-day order for colon-separated
    /// `H:MM`/`HH:MM` values; anything else sorts unpredictably.
    pub fn sort_key(&self) -> String {
        pad_time(&self.time)
    }
}

pub fn pad_time(time: &str) -> String {
    format!("{time:0>5}")
}

/// The committed schedule for one calendar date.
///
/// Loaded fresh from the remote store whenever the selected date changes,
/// replaced wholesale on every mutation, and never persisted locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleDay {
    pub date: NaiveDate,
    pub activities: Vec<Activity>,
}

impl ScheduleDay {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            activities: Vec::new(),
        }
    }

    /// The date key used to address the remote store.
    pub fn formatted_date(&self) -> String {
        format_date_key(self.date)
    }

    /// Restores the ordering invariant: ascending by padded time. The sort
    /// is stable, so activities with equal times keep insertion order.
    pub fn sort_by_time(&mut self) {
        self.activities.sort_by_key(Activity::sort_key);
    }
}

/// Renders a calendar date as `DD/MM/YYYY`.
pub fn format_date_key(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}
