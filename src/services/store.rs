use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

use crate::models::subscription::StoredSubscription;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unsupported subscription store url: {0}")]
    UnsupportedUrl(String),
    #[error("subscription store lock poisoned")]
    Poisoned,
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt subscription file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Keyed storage for at most one subscription per subscriber.
pub trait SubscriptionStore: Send + Sync {
    /// Stores `subscription`, replacing whatever its subscriber held before.
    fn put(&self, subscription: StoredSubscription) -> Result<(), StoreError>;
    fn get(&self, subscriber: &str) -> Result<Option<StoredSubscription>, StoreError>;
    /// Returns whether a record was removed.
    fn remove(&self, subscriber: &str) -> Result<bool, StoreError>;
    fn count(&self) -> Result<usize, StoreError>;
}

/// Opens a store from a `memory://` or `file://<path>` url.
pub fn open_store(store_url: &str) -> Result<Arc<dyn SubscriptionStore>, StoreError> {
    if store_url.starts_with("memory://") {
        Ok(Arc::new(MemoryStore::new()))
    } else if let Some(path) = store_url.strip_prefix("file://") {
        let path = if path.is_empty() {
            "push_subscriptions.json"
        } else {
            path
        };
        Ok(Arc::new(FileStore::open(path)?))
    } else {
        Err(StoreError::UnsupportedUrl(store_url.to_string()))
    }
}

type SubscriptionMap = HashMap<String, StoredSubscription>;

fn lock(map: &Mutex<SubscriptionMap>) -> Result<MutexGuard<'_, SubscriptionMap>, StoreError> {
    map.lock().map_err(|_| StoreError::Poisoned)
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    subscriptions: Arc<Mutex<SubscriptionMap>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubscriptionStore for MemoryStore {
    fn put(&self, subscription: StoredSubscription) -> Result<(), StoreError> {
        lock(&self.subscriptions)?.insert(subscription.subscriber.clone(), subscription);
        Ok(())
    }

    fn get(&self, subscriber: &str) -> Result<Option<StoredSubscription>, StoreError> {
        Ok(lock(&self.subscriptions)?.get(subscriber).cloned())
    }

    fn remove(&self, subscriber: &str) -> Result<bool, StoreError> {
        Ok(lock(&self.subscriptions)?.remove(subscriber).is_some())
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(lock(&self.subscriptions)?.len())
    }
}

/// JSON file backed store. The whole map is rewritten on every mutation and
/// the in-memory copy only changes once the write succeeded.
pub struct FileStore {
    path: PathBuf,
    subscriptions: Mutex<SubscriptionMap>,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let subscriptions = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            if raw.trim().is_empty() {
                SubscriptionMap::new()
            } else {
                serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                    path: path.clone(),
                    source,
                })?
            }
        } else {
            SubscriptionMap::new()
        };

        log::info!(
            "Opened subscription file {} ({} records)",
            path.display(),
            subscriptions.len()
        );

        Ok(Self {
            path,
            subscriptions: Mutex::new(subscriptions),
        })
    }

    fn persist(&self, subscriptions: &SubscriptionMap) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        let json = serde_json::to_string_pretty(subscriptions).map_err(|source| {
            StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        // write-then-rename
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl SubscriptionStore for FileStore {
    fn put(&self, subscription: StoredSubscription) -> Result<(), StoreError> {
        let mut subscriptions = lock(&self.subscriptions)?;
        let mut next = subscriptions.clone();
        next.insert(subscription.subscriber.clone(), subscription);
        self.persist(&next)?;
        *subscriptions = next;
        Ok(())
    }

    fn get(&self, subscriber: &str) -> Result<Option<StoredSubscription>, StoreError> {
        Ok(lock(&self.subscriptions)?.get(subscriber).cloned())
    }

    fn remove(&self, subscriber: &str) -> Result<bool, StoreError> {
        let mut subscriptions = lock(&self.subscriptions)?;
        if !subscriptions.contains_key(subscriber) {
            return Ok(false);
        }
        let mut next = subscriptions.clone();
        next.remove(subscriber);
        self.persist(&next)?;
        *subscriptions = next;
        Ok(true)
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(lock(&self.subscriptions)?.len())
    }
}
