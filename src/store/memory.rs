use super::{EntryStore, FiringChange, FiringKey, FiringRecordStore};
use crate::calendar::{Entry, EntryDraft, EntryId, EntryPatch, NotificationRule};
use anyhow::Result;
use chrono::Utc;
use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::RwLock;

/// Process-local entry store.
#[derive(Default)]
pub struct MemoryEntryStore {
    entries: RwLock<Vec<Entry>>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully formed entry, replacing one with the same id.
    pub async fn insert(&self, entry: Entry) {
        let mut entries = self.entries.write().await;
        entries.retain(|existing| existing.id != entry.id);
        entries.push(entry);
    }
}

impl EntryStore for MemoryEntryStore {
    fn create<'a>(
        &'a self,
        draft: &'a EntryDraft,
        notifications: &'a [NotificationRule],
    ) -> Pin<Box<dyn Future<Output = Result<EntryId>> + Send + 'a>> {
        Box::pin(async move {
            let id = EntryId::generate();
            let entry = Entry::from_draft(id.clone(), draft, notifications);
            self.entries.write().await.push(entry);
            Ok(id)
        })
    }

    fn list<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<Vec<Entry>>> + Send + 'a>> {
        Box::pin(async move { Ok(self.entries.read().await.clone()) })
    }

    fn get<'a>(
        &'a self,
        id: &'a EntryId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Entry>>> + Send + 'a>> {
        Box::pin(async move {
            Ok(self
                .entries
                .read()
                .await
                .iter()
                .find(|entry| &entry.id == id)
                .cloned())
        })
    }

    fn delete<'a>(
        &'a self,
        id: &'a EntryId,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        Box::pin(async move {
            let mut entries = self.entries.write().await;
            let before = entries.len();
            entries.retain(|entry| &entry.id != id);
            Ok(entries.len() != before)
        })
    }

    fn duplicate<'a>(
        &'a self,
        id: &'a EntryId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<EntryId>>> + Send + 'a>> {
        Box::pin(async move {
            let mut entries = self.entries.write().await;
            let Some(source) = entries.iter().find(|entry| &entry.id == id) else {
                return Ok(None);
            };
            let copy = Entry {
                id: EntryId::generate(),
                created_at: Utc::now(),
                ..source.clone()
            };
            let copy_id = copy.id.clone();
            entries.push(copy);
            Ok(Some(copy_id))
        })
    }

    fn update<'a>(
        &'a self,
        id: &'a EntryId,
        patch: &'a EntryPatch,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Entry>>> + Send + 'a>> {
        Box::pin(async move {
            let mut entries = self.entries.write().await;
            let Some(entry) = entries.iter_mut().find(|entry| &entry.id == id) else {
                return Ok(None);
            };
            patch.apply_to(entry);
            Ok(Some(entry.clone()))
        })
    }
}

/// Process-local firing records.
#[derive(Default)]
pub struct MemoryFiringStore {
    records: RwLock<BTreeSet<FiringKey>>,
}

impl MemoryFiringStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FiringRecordStore for MemoryFiringStore {
    fn has<'a>(
        &'a self,
        key: &'a FiringKey,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        Box::pin(async move { Ok(self.records.read().await.contains(key)) })
    }

    fn mark<'a>(
        &'a self,
        key: &'a FiringKey,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.records.write().await.insert(key.clone());
            Ok(())
        })
    }

    fn clear<'a>(
        &'a self,
        key: &'a FiringKey,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.records.write().await.remove(key);
            Ok(())
        })
    }

    fn list<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<Vec<FiringKey>>> + Send + 'a>> {
        Box::pin(async move { Ok(self.records.read().await.iter().cloned().collect()) })
    }

    fn apply<'a>(
        &'a self,
        changes: &'a [FiringChange],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut records = self.records.write().await;
            for change in changes {
                match change {
                    FiringChange::Mark(key) => {
                        records.insert(key.clone());
                    }
                    FiringChange::Clear(key) => {
                        records.remove(key);
                    }
                }
            }
            Ok(())
        })
    }
}
