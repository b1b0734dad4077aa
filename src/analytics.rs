use crate::models::{
    Distribution, DistributionEntry, Insights, Mood, MoodCounts, MoodHistory, WeeklyPoint, WeeklySeries,
};
use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;

pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Shown in place of real counts until the first record exists.
const SAMPLE_DISTRIBUTION: [(Mood, u32); 5] = [
    (Mood::Happy, 8),
    (Mood::Calm, 6),
    (Mood::Anxious, 3),
    (Mood::Sad, 2),
    (Mood::Angry, 1),
];

const CONSISTENT_TRACKING: &str =
    "Great job maintaining consistent mood tracking! Your emotional awareness is growing stronger.";
const KEEP_TRACKING: &str =
    "Keep logging your moods daily to unlock deeper insights into your emotional patterns.";

pub fn compute_distribution(history: &MoodHistory) -> Distribution {
    if history.is_empty() {
        return Distribution {
            entries: SAMPLE_DISTRIBUTION
                .into_iter()
                .map(|(mood, count)| entry(mood, count))
                .collect(),
            sample: true,
        };
    }

    let counts = count_moods(history);
    Distribution {
        entries: Mood::ALL
            .into_iter()
            .filter(|mood| counts.get(*mood) > 0)
            .map(|mood| entry(mood, counts.get(mood)))
            .collect(),
        sample: false,
    }
}

/// Random per-day counts for the trend chart. A mood that appears anywhere in
/// the history gets its offset on every day; nothing here is reconstructed
/// from actual timestamps. See [`bucket_week_at`] for real per-day counts.
pub fn generate_illustrative_weekly_sample<R: Rng>(history: &MoodHistory, rng: &mut R) -> WeeklySeries {
    let points = WEEKDAY_LABELS
        .into_iter()
        .map(|day| {
            let mut counts = MoodCounts::default();
            for mood in Mood::ALL {
                let (bound, offset) = sample_shape(mood);
                let mut value = rng.gen_range(0..bound);
                if history.contains_mood(mood) {
                    value += offset;
                }
                counts.set(mood, value);
            }
            WeeklyPoint { day, counts }
        })
        .collect();

    WeeklySeries {
        points,
        illustrative: true,
    }
}

/// Counts records per mood for each day of the Monday-based week containing `today`.
pub fn bucket_week_at(today: NaiveDate, history: &MoodHistory) -> WeeklySeries {
    let start = week_start(today);
    let end = start + Duration::days(6);

    let mut days = [MoodCounts::default(); 7];
    for record in history.records() {
        let date = record.date();
        if date < start || date > end {
            continue;
        }
        let offset = (date - start).num_days() as usize;
        days[offset].increment(record.mood);
    }

    WeeklySeries {
        points: WEEKDAY_LABELS
            .into_iter()
            .zip(days)
            .map(|(day, counts)| WeeklyPoint { day, counts })
            .collect(),
        illustrative: false,
    }
}

pub fn compute_insights(history: &MoodHistory, today: NaiveDate) -> Insights {
    let distribution = compute_distribution(history);
    let most_common = distribution
        .entries
        .iter()
        .fold(None::<&DistributionEntry>, |best, candidate| match best {
            Some(best) if best.count >= candidate.count => Some(best),
            _ => Some(candidate),
        })
        .map_or(Mood::Happy, |entry| entry.mood);

    let encouragement = if history.len() > 5 {
        CONSISTENT_TRACKING
    } else {
        KEEP_TRACKING
    };

    Insights {
        most_common,
        total_entries: distribution.total(),
        tracking_streak_days: tracking_streak(history, today),
        encouragement,
        sample: distribution.sample,
    }
}

/// Consecutive calendar days with at least one record, ending today or, if
/// nothing was logged yet today, yesterday.
pub fn tracking_streak(history: &MoodHistory, today: NaiveDate) -> u32 {
    let mut dates: Vec<NaiveDate> = history.records().iter().map(|r| r.date()).collect();
    dates.dedup();

    let mut expected = match dates.first() {
        Some(&latest) if latest == today => today,
        Some(&latest) if Some(latest) == today.pred_opt() => latest,
        _ => return 0,
    };

    let mut streak = 0;
    for date in dates {
        if date != expected {
            break;
        }
        streak += 1;
        match expected.pred_opt() {
            Some(previous) => expected = previous,
            None => break,
        }
    }
    streak
}

fn count_moods(history: &MoodHistory) -> MoodCounts {
    let mut counts = MoodCounts::default();
    for record in history.records() {
        counts.increment(record.mood);
    }
    counts
}

fn entry(mood: Mood, count: u32) -> DistributionEntry {
    DistributionEntry {
        mood,
        label: mood.label(),
        count,
        color: mood.color(),
        emoji: mood.emoji(),
    }
}

/// (exclusive random bound, presence offset)
fn sample_shape(mood: Mood) -> (u32, u32) {
    match mood {
        Mood::Happy => (5, 2),
        Mood::Sad => (3, 1),
        Mood::Angry => (2, 1),
        Mood::Anxious => (4, 1),
        Mood::Calm => (4, 2),
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}
