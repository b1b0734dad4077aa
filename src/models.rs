use crate::errors::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Anxious,
    Calm,
}

impl Mood {
    /// Fixed display order used by every listing and aggregation.
    pub const ALL: [Mood; 5] = [Mood::Happy, Mood::Sad, Mood::Angry, Mood::Anxious, Mood::Calm];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
            Mood::Anxious => "anxious",
            Mood::Calm => "calm",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Angry => "Angry",
            Mood::Anxious => "Anxious",
            Mood::Calm => "Calm",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Sad => "😢",
            Mood::Angry => "😠",
            Mood::Anxious => "😰",
            Mood::Calm => "😌",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Mood::Happy => "#fbbf24",
            Mood::Sad => "#3b82f6",
            Mood::Angry => "#ef4444",
            Mood::Anxious => "#a855f7",
            Mood::Calm => "#10b981",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| AppError::validation(format!("unknown mood '{value}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodRecord {
    pub mood: Mood,
    pub occurred_at: DateTime<Utc>,
}

impl MoodRecord {
    pub fn new(mood: Mood, occurred_at: DateTime<Utc>) -> Self {
        Self { mood, occurred_at }
    }

    pub fn date(&self) -> NaiveDate {
        self.occurred_at.date_naive()
    }
}

/// Records for one user, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MoodHistory {
    records: Vec<MoodRecord>,
}

impl MoodHistory {
    pub fn from_records(mut records: Vec<MoodRecord>) -> Self {
        records.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Self { records }
    }

    /// Adds a freshly captured record. An out-of-order timestamp falls back
    /// to a positioned insert so the ordering still holds.
    pub fn prepend(&mut self, record: MoodRecord) {
        let position = self
            .records
            .iter()
            .position(|existing| existing.occurred_at <= record.occurred_at)
            .unwrap_or(self.records.len());
        self.records.insert(position, record);
    }

    pub fn records(&self) -> &[MoodRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&MoodRecord> {
        self.records.first()
    }

    pub fn recent(&self, limit: usize) -> &[MoodRecord] {
        &self.records[..limit.min(self.records.len())]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains_mood(&self, mood: Mood) -> bool {
        self.records.iter().any(|record| record.mood == mood)
    }

    pub fn has_mood_on(&self, mood: Mood, date: NaiveDate) -> bool {
        self.records
            .iter()
            .any(|record| record.mood == mood && record.date() == date)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoodCounts([u32; 5]);

impl MoodCounts {
    pub fn get(&self, mood: Mood) -> u32 {
        self.0[mood.index()]
    }

    pub fn set(&mut self, mood: Mood, count: u32) {
        self.0[mood.index()] = count;
    }

    pub fn increment(&mut self, mood: Mood) {
        let slot = &mut self.0[mood.index()];
        *slot = slot.saturating_add(1);
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

impl Serialize for MoodCounts {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(Mood::ALL.len()))?;
        for mood in Mood::ALL {
            map.serialize_entry(mood.as_str(), &self.get(mood))?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionEntry {
    pub mood: Mood,
    pub label: &'static str,
    pub count: u32,
    pub color: &'static str,
    pub emoji: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub entries: Vec<DistributionEntry>,
    /// True when `entries` is the placeholder shown before any real data exists.
    pub sample: bool,
}

impl Distribution {
    pub fn total(&self) -> u32 {
        self.entries.iter().map(|entry| entry.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyPoint {
    pub day: &'static str,
    #[serde(flatten)]
    pub counts: MoodCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklySeries {
    pub points: Vec<WeeklyPoint>,
    pub illustrative: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insights {
    pub most_common: Mood,
    pub total_entries: u32,
    pub tracking_streak_days: u32,
    pub encouragement: &'static str,
    pub sample: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub distribution: Distribution,
    pub weekly_sample: WeeklySeries,
    pub current_week: WeeklySeries,
    pub insights: Insights,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub mood: String,
}

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub mood: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub mood: Mood,
    pub quote: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EntryView {
    pub mood: Mood,
    pub label: &'static str,
    pub emoji: &'static str,
    pub occurred_at: DateTime<Utc>,
    pub date: String,
}

impl From<&MoodRecord> for EntryView {
    fn from(record: &MoodRecord) -> Self {
        Self {
            mood: record.mood,
            label: record.mood.label(),
            emoji: record.mood.emoji(),
            occurred_at: record.occurred_at,
            date: record.date().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrackerResponse {
    pub user_id: UserId,
    pub state: &'static str,
    pub selected: Option<Mood>,
    pub can_confirm: bool,
    pub latest_emoji: &'static str,
    pub total_entries: usize,
    pub recent: Vec<EntryView>,
}
