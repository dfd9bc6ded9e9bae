// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-chat mutual exclusion.
//!
//! A map entry lives only while someone holds or waits for the chat's lock.
//! Eviction happens under the map shard lock and only when the map's own
//! reference is the last one, so a waiter can never end up on a mutex that
//! a later caller no longer sees.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default, Clone)]
pub(crate) struct ChatLocks {
    inner: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    /// Waits until no other holder owns `chat_id`.
    pub(crate) async fn acquire(&self, chat_id: &str) -> ChatGuard {
        let lock = Arc::clone(&self.inner.entry(chat_id.to_string()).or_default());
        let guard = lock.lock_owned().await;
        ChatGuard {
            chat_id: chat_id.to_string(),
            guard: Some(guard),
            locks: self.clone(),
        }
    }

    fn evict_if_idle(&self, chat_id: &str) {
        self.inner
            .remove_if(chat_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Exclusive hold on one chat. Dropping it releases the lock and evicts the
/// entry when nobody is queued behind it.
#[derive(Debug)]
pub(crate) struct ChatGuard {
    chat_id: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: ChatLocks,
}

impl Drop for ChatGuard {
    fn drop(&mut self) {
        // The owned guard keeps a reference of its own.
        drop(self.guard.take());
        self.locks.evict_if_idle(&self.chat_id);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn idle_entries_are_evicted() {
        let locks = ChatLocks::default();
        let guard = locks.acquire("c1").await;
        assert_eq!(locks.len(), 1);
        drop(guard);
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn entry_survives_while_someone_waits() {
        let locks = ChatLocks::default();
        let first = locks.acquire("c1").await;

        let waiter = locks.clone();
        let mut second = tokio::spawn(async move { waiter.acquire("c1").await });
        assert!(
            tokio::time::timeout(Duration::from_millis(20), &mut second)
                .await
                .is_err()
        );

        drop(first);
        assert_eq!(locks.len(), 1, "queued waiter keeps the entry alive");
        let second = second.await.unwrap();

        let third = locks.clone();
        let mut third = tokio::spawn(async move { third.acquire("c1").await });
        assert!(
            tokio::time::timeout(Duration::from_millis(20), &mut third)
                .await
                .is_err(),
            "third caller must queue on the same mutex"
        );

        drop(second);
        drop(third.await.unwrap());
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn different_chats_do_not_block_each_other() {
        let locks = ChatLocks::default();
        let _a = locks.acquire("a").await;
        let b = tokio::time::timeout(Duration::from_millis(20), locks.acquire("b")).await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }
}
