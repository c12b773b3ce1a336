//! Reloadable config values with change notification.
//!
//! A reload replaces the value; holders of a [`ConfigWatcher`] wake up and
//! re-read instead of polling.

use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, watch};

pub struct ConfigStore<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    value: RwLock<T>,
    notify: watch::Sender<()>,
}

/// Wakes up when the owning [`ConfigStore`] is updated.
pub struct ConfigWatcher {
    rx: watch::Receiver<()>,
}

impl<T> ConfigStore<T> {
    pub fn new(initial: T) -> Self {
        let (notify, _) = watch::channel(());
        Self {
            inner: Arc::new(Inner {
                value: RwLock::new(initial),
                notify,
            }),
        }
    }

    /// Swap in a new value and wake every watcher.
    pub async fn update(&self, value: T) {
        {
            let mut guard = self.inner.value.write().await;
            *guard = value;
        }
        self.inner.notify.send_replace(());
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.value.read().await
    }

    pub fn subscribe(&self) -> ConfigWatcher {
        ConfigWatcher {
            rx: self.inner.notify.subscribe(),
        }
    }
}

impl<T: Clone> ConfigStore<T> {
    /// Copy of the current value, for callers that must not hold the lock
    /// across a database transaction.
    pub async fn snapshot(&self) -> T {
        self.inner.value.read().await.clone()
    }
}

impl<T> Clone for ConfigStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl ConfigWatcher {
    /// Resolves on the next update, or errors once the store is gone.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn watchers_see_updates() {
        let store = ConfigStore::new(1u32);
        let mut watcher = store.subscribe();

        store.update(2).await;
        tokio::time::timeout(Duration::from_secs(1), watcher.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*store.read().await, 2);
    }

    #[tokio::test]
    async fn clones_share_the_value() {
        let store = ConfigStore::new(String::from("a"));
        let other = store.clone();
        other.update(String::from("b")).await;
        assert_eq!(store.snapshot().await, "b");
    }

    #[tokio::test]
    async fn dropping_the_store_ends_watchers() {
        let store = ConfigStore::new(0u8);
        let mut watcher = store.subscribe();
        drop(store);
        assert!(watcher.changed().await.is_err());
    }
}
