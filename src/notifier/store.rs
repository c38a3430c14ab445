use crate::errors::{PersistenceError, Result};
use async_trait::async_trait;
use log::{info, warn};
use std::collections::HashMap;
use std::path::PathBuf;

/// Mapping from subscriber name to delivery endpoint.
pub type SubscriberSet = HashMap<String, String>;

/// Durable storage for the subscriber set.
///
/// The registry calls `save` synchronously after every mutation; a failed
/// write is surfaced to the caller of register/remove since silently losing
/// subscriber state is unacceptable.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Loads the persisted set. An absent or corrupt file yields the empty
    /// set, not an error.
    async fn load(&self) -> SubscriberSet;

    /// Rewrites the whole persisted document with the given set.
    async fn save(&self, set: &SubscriberSet) -> Result<()>;
}

/// JSON file store: one `{name: url}` object, rewritten wholesale.
pub struct FileSubscriberStore {
    path: PathBuf,
}

impl FileSubscriberStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SubscriberStore for FileSubscriberStore {
    async fn load(&self) -> SubscriberSet {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                info!(
                    "subscriber file {} not readable ({}), starting with empty set",
                    self.path.display(),
                    err
                );
                return SubscriberSet::new();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(set) => set,
            Err(err) => {
                warn!(
                    "subscriber file {} is corrupt ({}), starting with empty set",
                    self.path.display(),
                    err
                );
                SubscriberSet::new()
            }
        }
    }

    async fn save(&self, set: &SubscriberSet) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(set)
            .map_err(|e| PersistenceError::SerdeFailed(e.into()))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| PersistenceError::SaveFailed(e.into()))?;
            }
        }
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| PersistenceError::SaveFailed(e.into()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileSubscriberStore::new(dir.path().join("subscribers.json"));

        let mut set = SubscriberSet::new();
        set.insert("frontend".to_string(), "http://localhost:9000/update".to_string());
        store.save(&set).await.unwrap();

        assert_eq!(store.load().await, set);
    }

    #[tokio::test]
    async fn test_load_absent_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileSubscriberStore::new(dir.path().join("missing.json"));
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("subscribers.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let store = FileSubscriberStore::new(path);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_overwrites_prior_state() {
        let dir = TempDir::new().unwrap();
        let store = FileSubscriberStore::new(dir.path().join("subscribers.json"));

        let mut first = SubscriberSet::new();
        first.insert("a".to_string(), "http://a/".to_string());
        first.insert("b".to_string(), "http://b/".to_string());
        store.save(&first).await.unwrap();

        let mut second = SubscriberSet::new();
        second.insert("a".to_string(), "http://a/".to_string());
        store.save(&second).await.unwrap();

        assert_eq!(store.load().await, second);
    }

    #[tokio::test]
    async fn test_save_to_unwritable_path_fails() {
        let store = FileSubscriberStore::new("/proc/feedwatch-cannot-write/subscribers.json");
        let err = store.save(&SubscriberSet::new()).await.err().unwrap();
        assert!(err.is_persistence());
    }
}
