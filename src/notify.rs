use crate::models::UserId;
use serde::Serialize;
use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};
use tracing::{info, warn};

/// Older notifications are dropped once a user's queue reaches this length.
const QUEUE_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }
}

/// Fire-and-forget delivery of user-facing messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, user: &UserId, notification: Notification);
}

/// Holds pending notifications per user until the page or API drains them.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    queues: Mutex<HashMap<UserId, VecDeque<Notification>>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self, user: &UserId) -> Vec<Notification> {
        let mut queues = self.queues.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        queues
            .remove(user)
            .map(|queue| queue.into_iter().collect())
            .unwrap_or_default()
    }

    #[cfg(test)]
    fn pending(&self, user: &UserId) -> usize {
        let queues = self.queues.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        queues.get(user).map_or(0, VecDeque::len)
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, user: &UserId, notification: Notification) {
        match notification.severity {
            Severity::Info => info!(%user, title = %notification.title, "notification"),
            Severity::Destructive => warn!(%user, title = %notification.title, "notification"),
        }

        let mut queues = self.queues.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let queue = queues.entry(user.clone()).or_default();
        if queue.len() == QUEUE_LIMIT {
            queue.pop_front();
        }
        queue.push_back(notification);
    }
}
