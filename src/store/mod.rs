pub mod memory;
pub mod sqlite;

pub use memory::{MemoryEntryStore, MemoryFiringStore};
pub use sqlite::{SqliteEntryStore, SqliteFiringStore, open_pool};

use crate::calendar::{Entry, EntryDraft, EntryId, EntryPatch, NotificationRule};
use crate::config::Config;
use anyhow::Result;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Persistent collection of calendar entries.
pub trait EntryStore: Send + Sync {
    fn create<'a>(
        &'a self,
        draft: &'a EntryDraft,
        notifications: &'a [NotificationRule],
    ) -> Pin<Box<dyn Future<Output = Result<EntryId>> + Send + 'a>>;

    /// Entries in creation order.
    fn list<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<Vec<Entry>>> + Send + 'a>>;

    fn get<'a>(
        &'a self,
        id: &'a EntryId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Entry>>> + Send + 'a>>;

    fn delete<'a>(
        &'a self,
        id: &'a EntryId,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>>;

    /// Copies an entry under a fresh id. `None` when `id` is unknown.
    fn duplicate<'a>(
        &'a self,
        id: &'a EntryId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<EntryId>>> + Send + 'a>>;

    /// Applies `patch` and returns the stored result. `None` when `id` is
    /// unknown.
    fn update<'a>(
        &'a self,
        id: &'a EntryId,
        patch: &'a EntryPatch,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Entry>>> + Send + 'a>>;

    /// Entries whose title or location contains `query`, in creation order.
    fn search<'a>(
        &'a self,
        query: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Entry>>> + Send + 'a>> {
        Box::pin(async move {
            let mut entries = self.list().await?;
            entries.retain(|entry| entry.matches(query));
            Ok(entries)
        })
    }
}

/// One reminder slot: `(entry, minutes_before)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FiringKey {
    pub entry_id: EntryId,
    pub minutes_before: u32,
}

impl FiringKey {
    pub fn new(entry_id: EntryId, minutes_before: u32) -> Self {
        Self {
            entry_id,
            minutes_before,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FiringChange {
    Mark(FiringKey),
    Clear(FiringKey),
}

/// Which reminders already fired. Written only by the notification scheduler.
pub trait FiringRecordStore: Send + Sync {
    fn has<'a>(
        &'a self,
        key: &'a FiringKey,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>>;

    fn mark<'a>(&'a self, key: &'a FiringKey)
    -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    fn clear<'a>(
        &'a self,
        key: &'a FiringKey,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    fn list<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<Vec<FiringKey>>> + Send + 'a>>;

    /// Commits a batch of changes all-or-nothing.
    fn apply<'a>(
        &'a self,
        changes: &'a [FiringChange],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Entry and firing stores sharing one backend.
#[derive(Clone)]
pub struct Stores {
    pub entries: Arc<dyn EntryStore>,
    pub firings: Arc<dyn FiringRecordStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            entries: Arc::new(MemoryEntryStore::new()),
            firings: Arc::new(MemoryFiringStore::new()),
        }
    }

    /// Opens the backend named by `[storage] backend`.
    pub async fn open(config: &Config) -> Result<Self> {
        match config.storage.backend.as_str() {
            "memory" => Ok(Self::in_memory()),
            "sqlite" => {
                let pool = open_pool(&config.db_path()).await?;
                Ok(Self {
                    entries: Arc::new(SqliteEntryStore::new(pool.clone()).await?),
                    firings: Arc::new(SqliteFiringStore::new(pool).await?),
                })
            }
            other => anyhow::bail!("unknown storage backend '{other}'"),
        }
    }

    /// Edits an entry. When the date or start time changes, the entry's firing
    /// records are cleared so its reminders can fire again for the new time.
    pub async fn update_entry(&self, id: &EntryId, patch: &EntryPatch) -> Result<Option<Entry>> {
        let Some(entry) = self.entries.update(id, patch).await? else {
            return Ok(None);
        };

        if patch.reschedules() {
            let stale: Vec<FiringChange> = self
                .firings
                .list()
                .await?
                .into_iter()
                .filter(|key| &key.entry_id == id)
                .map(FiringChange::Clear)
                .collect();
            if !stale.is_empty() {
                self.firings.apply(&stale).await?;
                tracing::debug!(entry_id = %id, cleared = stale.len(), "entry rescheduled");
            }
        }

        Ok(Some(entry))
    }
}
