use crate::errors::AppError;
use crate::models::{MoodRecord, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
};
use tokio::{fs, sync::Mutex};
use tracing::{debug, error};

/// Record store queried by user. Uniqueness of entries is not enforced here.
#[async_trait]
pub trait MoodStore: Send + Sync {
    /// All records for `user`, newest first.
    async fn fetch_for_user(&self, user: &UserId) -> Result<Vec<MoodRecord>, AppError>;

    async fn insert(&self, user: &UserId, record: MoodRecord) -> Result<(), AppError>;
}

fn newest_first(mut records: Vec<MoodRecord>) -> Vec<MoodRecord> {
    records.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    records
}

/// Lives as long as the process. Used with the mock sign-in.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<UserId, Vec<MoodRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MoodStore for MemoryStore {
    async fn fetch_for_user(&self, user: &UserId) -> Result<Vec<MoodRecord>, AppError> {
        let records = self.records.lock().await;
        Ok(newest_first(records.get(user).cloned().unwrap_or_default()))
    }

    async fn insert(&self, user: &UserId, record: MoodRecord) -> Result<(), AppError> {
        let mut records = self.records.lock().await;
        records.entry(user.clone()).or_default().push(record);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreData {
    pub users: BTreeMap<UserId, Vec<MoodRecord>>,
}

/// Whole-document JSON file, rewritten on every insert.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl JsonFileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let data = load_data(&path).await;
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MoodStore for JsonFileStore {
    async fn fetch_for_user(&self, user: &UserId) -> Result<Vec<MoodRecord>, AppError> {
        let data = self.data.lock().await;
        Ok(newest_first(data.users.get(user).cloned().unwrap_or_default()))
    }

    async fn insert(&self, user: &UserId, record: MoodRecord) -> Result<(), AppError> {
        let mut data = self.data.lock().await;
        data.users.entry(user.clone()).or_default().push(record);

        if let Err(err) = persist_data(&self.path, &data).await {
            if let Some(records) = data.users.get_mut(user) {
                records.pop();
                if records.is_empty() {
                    data.users.remove(user);
                }
            }
            return Err(err);
        }

        debug!(%user, mood = %record.mood, "persisted mood record");
        Ok(())
    }
}

/// Reads the moods file. A missing, unreadable or malformed file yields an empty store.
async fn load_data(path: &Path) -> StoreData {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no moods file yet");
            return StoreData::default();
        }
        Err(err) => {
            error!(path = %path.display(), "could not read moods file: {err}");
            return StoreData::default();
        }
    };
    serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        error!(path = %path.display(), "moods file is not a valid mood history: {err}");
        StoreData::default()
    })
}

async fn persist_data(path: &Path, data: &StoreData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data)?;
    fs::write(path, payload).await.map_err(|err| {
        error!(path = %path.display(), "could not write moods file: {err}");
        AppError::persistence(format!("could not save mood history: {err}"))
    })
}
