use crate::errors::AppError;
use serde::{Serialize, de::DeserializeOwned};
use std::{collections::BTreeMap, env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{debug, error};

pub const LOGS_KEY: &str = "interntrack_logs";
pub const USER_KEY: &str = "eduMentorUser";
const STUDY_KEY_PREFIX: &str = "eduMentorData_";

pub fn study_key(user: &str) -> String {
    format!("{STUDY_KEY_PREFIX}{user}")
}

pub fn corrupt_key(key: &str) -> String {
    format!("{key}.corrupt")
}

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/store.json"))
}

/// String-keyed store persisted as one JSON object. Every write rewrites the
/// whole file, so the last writer wins.
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl LocalStore {
    pub async fn open(path: &Path) -> Self {
        let items = match fs::read(path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(items) => items,
                Err(err) => {
                    error!("failed to parse store file: {err}");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                error!("failed to read store file: {err}");
                BTreeMap::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            items,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    /// Writes `value` under `key`. On a failed flush the previous value is
    /// restored so memory never runs ahead of disk.
    pub async fn set_item(&mut self, key: &str, value: String) -> Result<(), AppError> {
        let previous = self.items.insert(key.to_string(), value);
        if let Err(err) = self.flush().await {
            self.restore(key, previous);
            return Err(err);
        }
        Ok(())
    }

    pub async fn remove_item(&mut self, key: &str) -> Result<(), AppError> {
        let Some(previous) = self.items.remove(key) else {
            return Ok(());
        };
        if let Err(err) = self.flush().await {
            self.restore(key, Some(previous));
            return Err(err);
        }
        Ok(())
    }

    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_item(key)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(err) => {
                error!(key, "failed to parse stored value: {err}");
                None
            }
        }
    }

    /// Like [`load_json`](Self::load_json), but a value that fails to parse is
    /// copied to `<key>.corrupt` before the default is handed out. The copy is
    /// flushed with the next write, so the raw text survives the overwrite.
    pub fn load_json_or_default<T: DeserializeOwned + Default>(&mut self, key: &str) -> T {
        let Some(raw) = self.get_item(key) else {
            return T::default();
        };
        match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(err) => {
                let raw = raw.to_string();
                let backup = corrupt_key(key);
                error!(key, backup = %backup, "stored value is unreadable, keeping a copy: {err}");
                self.items.insert(backup, raw);
                T::default()
            }
        }
    }

    pub async fn save_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), AppError> {
        let payload = serde_json::to_string(value)?;
        self.set_item(key, payload).await
    }

    fn restore(&mut self, key: &str, previous: Option<String>) {
        match previous {
            Some(value) => {
                self.items.insert(key.to_string(), value);
            }
            None => {
                self.items.remove(key);
            }
        }
    }

    async fn flush(&self) -> Result<(), AppError> {
        let payload = serde_json::to_vec_pretty(&self.items)?;
        fs::write(&self.path, payload).await?;
        debug!(path = %self.path.display(), keys = self.items.len(), "store flushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(&dir.path().join("absent.json")).await;
        assert!(store.get_item(LOGS_KEY).is_none());
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = LocalStore::open(&path).await;
        store.set_item(USER_KEY, "ana".to_string()).await.unwrap();
        store.save_json(&study_key("ana"), &vec![1, 2, 3]).await.unwrap();

        let reopened = LocalStore::open(&path).await;
        assert_eq!(reopened.get_item(USER_KEY), Some("ana"));
        assert_eq!(
            reopened.load_json::<Vec<u32>>("eduMentorData_ana"),
            Some(vec![1, 2, 3])
        );
    }

    #[tokio::test]
    async fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = LocalStore::open(&path).await;
        assert!(store.get_item(USER_KEY).is_none());
    }

    #[tokio::test]
    async fn failed_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be written as a file.
        let mut store = LocalStore::open(dir.path()).await;

        let result = store.set_item(USER_KEY, "ana".to_string()).await;
        assert!(result.is_err());
        assert!(store.get_item(USER_KEY).is_none());
    }

    #[tokio::test]
    async fn remove_item_deletes_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let mut store = LocalStore::open(&path).await;
        store.set_item(USER_KEY, "ana".to_string()).await.unwrap();
        store.remove_item(USER_KEY).await.unwrap();
        store.remove_item(USER_KEY).await.unwrap();

        let reopened = LocalStore::open(&path).await;
        assert!(reopened.get_item(USER_KEY).is_none());
    }

    #[tokio::test]
    async fn unreadable_value_is_kept_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let mut store = LocalStore::open(&path).await;
        store.set_item(LOGS_KEY, "[{\"id\": oops".to_string()).await.unwrap();

        let logs: Vec<serde_json::Value> = store.load_json_or_default(LOGS_KEY);
        assert!(logs.is_empty());
        store.save_json(LOGS_KEY, &logs).await.unwrap();

        let reopened = LocalStore::open(&path).await;
        assert_eq!(reopened.get_item(LOGS_KEY), Some("[]"));
        assert_eq!(reopened.get_item(&corrupt_key(LOGS_KEY)), Some("[{\"id\": oops"));
    }
}
