use crate::errors::AppError;
use crate::models::{Mood, MoodHistory, MoodRecord, UserId};
use crate::notify::{Notification, Notifier};
use crate::storage::MoodStore;
use chrono::{DateTime, NaiveDate, Utc};
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    NoSelection,
    Selected(Mood),
    Saving(Mood),
    Saved(Mood),
}

impl CaptureState {
    pub fn name(self) -> &'static str {
        match self {
            Self::NoSelection => "no_selection",
            Self::Selected(_) => "selected",
            Self::Saving(_) => "saving",
            Self::Saved(_) => "saved",
        }
    }

    pub fn mood(self) -> Option<Mood> {
        match self {
            Self::NoSelection => None,
            Self::Selected(mood) | Self::Saving(mood) | Self::Saved(mood) => Some(mood),
        }
    }
}

/// Whether the same mood may be logged more than once per calendar day.
/// Only the confirm action checks this; stores accept duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    Allow,
    SuppressSameDay,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "allow" => Ok(Self::Allow),
            "suppress_same_day" => Ok(Self::SuppressSameDay),
            other => Err(other.to_string()),
        }
    }
}

/// Progress of the one history read a session makes when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Pending,
    Loaded,
    Failed,
}

/// Per-user tracker: the pending selection plus the loaded history.
#[derive(Debug, Clone)]
pub struct TrackerSession {
    state: CaptureState,
    history: MoodHistory,
    load_state: LoadState,
}

impl Default for TrackerSession {
    fn default() -> Self {
        Self {
            state: CaptureState::NoSelection,
            history: MoodHistory::default(),
            load_state: LoadState::Pending,
        }
    }
}

impl TrackerSession {
    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn history(&self) -> &MoodHistory {
        &self.history
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// Replaces the history with the store's copy. A failed read leaves the
    /// current history in place, raises one notification and marks the
    /// session `Failed`; nothing reads again until a new session starts.
    pub async fn load(&mut self, user: &UserId, store: &dyn MoodStore, notifier: &dyn Notifier) -> Result<(), AppError> {
        match store.fetch_for_user(user).await {
            Ok(records) => {
                self.history = MoodHistory::from_records(records);
                self.load_state = LoadState::Loaded;
                Ok(())
            }
            Err(err) => {
                self.load_state = LoadState::Failed;
                warn!(%user, "failed to load mood history: {err}");
                notifier.notify(
                    user,
                    Notification::destructive("Could not load your moods", err.to_string()),
                );
                Err(err)
            }
        }
    }

    pub fn select(&mut self, mood: Mood) -> Result<(), AppError> {
        if let CaptureState::Saving(_) = self.state {
            return Err(AppError::validation("a mood is already being saved"));
        }
        self.state = CaptureState::Selected(mood);
        Ok(())
    }

    /// The confirm action is offered only with a pending selection that the
    /// duplicate policy allows for `today`.
    pub fn can_confirm(&self, policy: DuplicatePolicy, today: NaiveDate) -> bool {
        match self.state {
            CaptureState::Selected(mood) => match policy {
                DuplicatePolicy::Allow => true,
                DuplicatePolicy::SuppressSameDay => !self.history.has_mood_on(mood, today),
            },
            _ => false,
        }
    }

    pub async fn confirm(
        &mut self,
        user: &UserId,
        store: &dyn MoodStore,
        notifier: &dyn Notifier,
        policy: DuplicatePolicy,
        now: DateTime<Utc>,
    ) -> Result<MoodRecord, AppError> {
        let CaptureState::Selected(mood) = self.state else {
            return Err(AppError::validation("Select a mood first"));
        };
        if !self.can_confirm(policy, now.date_naive()) {
            return Err(AppError::validation(format!(
                "{} is already logged for today",
                mood.label()
            )));
        }

        self.state = CaptureState::Saving(mood);
        let record = MoodRecord::new(mood, now);

        match store.insert(user, record).await {
            Ok(()) => {
                self.history.prepend(record);
                self.state = CaptureState::Saved(mood);
                info!(%user, %mood, "mood logged");
                notifier.notify(
                    user,
                    Notification::info(
                        "Mood logged successfully! 🌟",
                        "Your mood has been recorded for today.",
                    ),
                );
                Ok(record)
            }
            Err(err) => {
                self.state = CaptureState::Selected(mood);
                warn!(%user, %mood, "failed to log mood: {err}");
                notifier.notify(
                    user,
                    Notification::destructive("Could not log your mood", err.to_string()),
                );
                Err(err)
            }
        }
    }
}
