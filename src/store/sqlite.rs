use super::{EntryStore, FiringChange, FiringKey, FiringRecordStore};
use crate::calendar::{
    CalendarDate, ClockTime, Entry, EntryDraft, EntryId, EntryKind, EntryPatch, NotificationRule,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

const SCHEMA_META_TABLE: &str = "
CREATE TABLE IF NOT EXISTS voxplan_schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";
const SCHEMA_VERSION_KEY: &str = "schema_version";
const SCHEMA_VERSION: u32 = 1;

/// Opens (creating if needed) the sqlite database at `db_path`.
pub async fn open_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
    }

    let url = format!("sqlite://{}?mode=rwc", db_path.display());
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .with_context(|| format!("Failed to open entry DB: {}", db_path.display()))
}

async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_META_TABLE)
        .execute(pool)
        .await
        .context("create voxplan_schema_meta table")?;

    let stored: Option<(String,)> =
        sqlx::query_as("SELECT value FROM voxplan_schema_meta WHERE key = $1")
            .bind(SCHEMA_VERSION_KEY)
            .fetch_optional(pool)
            .await
            .context("load schema version")?;

    match stored {
        Some((value,)) => {
            let parsed = value
                .parse::<u32>()
                .with_context(|| format!("invalid schema version value: {value}"))?;
            anyhow::ensure!(
                parsed == SCHEMA_VERSION,
                "incompatible schema version: stored={parsed}, expected={SCHEMA_VERSION}. \
remove the entry DB and restart."
            );
        }
        None => {
            sqlx::query("INSERT OR IGNORE INTO voxplan_schema_meta (key, value) VALUES ($1, $2)")
                .bind(SCHEMA_VERSION_KEY)
                .bind(SCHEMA_VERSION.to_string())
                .execute(pool)
                .await
                .context("persist schema version")?;
        }
    }

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS entries (
             seq           INTEGER PRIMARY KEY AUTOINCREMENT,
             id            TEXT NOT NULL UNIQUE,
             kind          TEXT NOT NULL,
             title         TEXT NOT NULL,
             year          INTEGER NOT NULL,
             month         INTEGER NOT NULL,
             day           INTEGER NOT NULL,
             start_time    TEXT,
             end_time      TEXT,
             location      TEXT,
             notifications TEXT NOT NULL DEFAULT '[]',
             created_at    TEXT NOT NULL
         )",
    )
    .execute(pool)
    .await
    .context("create entries table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS firing_records (
             entry_id       TEXT NOT NULL,
             minutes_before INTEGER NOT NULL,
             fired_at       TEXT NOT NULL,
             PRIMARY KEY (entry_id, minutes_before)
         )",
    )
    .execute(pool)
    .await
    .context("create firing_records table")?;

    Ok(())
}

/// SQLite-backed entry store.
pub struct SqliteEntryStore {
    pool: SqlitePool,
}

impl SqliteEntryStore {
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        ensure_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn insert(&self, entry: &Entry) -> Result<()> {
        let notifications =
            serde_json::to_string(&entry.notifications).context("serialize notification rules")?;
        sqlx::query(
            "INSERT INTO entries (
                 id, kind, title, year, month, day, start_time, end_time,
                 location, notifications, created_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.id.as_str())
        .bind(entry.kind.to_string())
        .bind(&entry.title)
        .bind(i64::from(entry.date.year))
        .bind(i64::from(entry.date.month))
        .bind(i64::from(entry.date.day))
        .bind(entry.start_time.map(String::from))
        .bind(entry.end_time.map(String::from))
        .bind(entry.location.as_deref())
        .bind(notifications)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to insert entry")?;
        Ok(())
    }

    async fn fetch(&self, id: &EntryId) -> Result<Option<Entry>> {
        let row = sqlx::query(
            "SELECT id, kind, title, year, month, day, start_time, end_time,
                    location, notifications, created_at
             FROM entries WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load entry")?;
        row.as_ref().map(map_entry_row).transpose()
    }
}

fn parse_time(raw: Option<String>) -> Result<Option<ClockTime>> {
    raw.map(|value| ClockTime::try_from(value).map_err(anyhow::Error::msg))
        .transpose()
}

fn map_entry_row(row: &SqliteRow) -> Result<Entry> {
    let kind_raw: String = row.try_get("kind")?;
    let notifications_raw: String = row.try_get("notifications")?;
    let created_raw: String = row.try_get("created_at")?;
    let year: i64 = row.try_get("year")?;
    let month: i64 = row.try_get("month")?;
    let day: i64 = row.try_get("day")?;

    let notifications: Vec<NotificationRule> =
        serde_json::from_str(&notifications_raw).context("deserialize notification rules")?;
    let created_at = DateTime::parse_from_rfc3339(&created_raw)
        .with_context(|| format!("Invalid RFC3339 timestamp in entry DB: {created_raw}"))?
        .with_timezone(&Utc);

    Ok(Entry {
        id: EntryId::from(row.try_get::<String, _>("id")?),
        kind: kind_raw
            .parse::<EntryKind>()
            .map_err(|_| anyhow::anyhow!("unknown entry kind: {kind_raw}"))?,
        title: row.try_get("title")?,
        date: CalendarDate::new(
            i32::try_from(year).context("entry year out of range")?,
            u32::try_from(month).context("entry month out of range")?,
            u32::try_from(day).context("entry day out of range")?,
        ),
        start_time: parse_time(row.try_get("start_time")?)?,
        end_time: parse_time(row.try_get("end_time")?)?,
        location: row.try_get("location")?,
        notifications,
        created_at,
    })
}

impl EntryStore for SqliteEntryStore {
    fn create<'a>(
        &'a self,
        draft: &'a EntryDraft,
        notifications: &'a [NotificationRule],
    ) -> Pin<Box<dyn Future<Output = Result<EntryId>> + Send + 'a>> {
        Box::pin(async move {
            let entry = Entry::from_draft(EntryId::generate(), draft, notifications);
            self.insert(&entry).await?;
            Ok(entry.id)
        })
    }

    fn list<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<Vec<Entry>>> + Send + 'a>> {
        Box::pin(async move {
            let rows = sqlx::query(
                "SELECT id, kind, title, year, month, day, start_time, end_time,
                        location, notifications, created_at
                 FROM entries ORDER BY seq ASC",
            )
            .fetch_all(&self.pool)
            .await
            .context("Failed to list entries")?;

            rows.iter().map(map_entry_row).collect()
        })
    }

    fn get<'a>(
        &'a self,
        id: &'a EntryId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Entry>>> + Send + 'a>> {
        Box::pin(self.fetch(id))
    }

    fn delete<'a>(
        &'a self,
        id: &'a EntryId,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM entries WHERE id = ?")
                .bind(id.as_str())
                .execute(&self.pool)
                .await
                .context("Failed to delete entry")?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn duplicate<'a>(
        &'a self,
        id: &'a EntryId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<EntryId>>> + Send + 'a>> {
        Box::pin(async move {
            let Some(source) = self.fetch(id).await? else {
                return Ok(None);
            };
            let copy = Entry {
                id: EntryId::generate(),
                created_at: Utc::now(),
                ..source
            };
            self.insert(&copy).await?;
            Ok(Some(copy.id))
        })
    }

    fn update<'a>(
        &'a self,
        id: &'a EntryId,
        patch: &'a EntryPatch,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Entry>>> + Send + 'a>> {
        Box::pin(async move {
            let Some(mut entry) = self.fetch(id).await? else {
                return Ok(None);
            };
            patch.apply_to(&mut entry);

            let notifications = serde_json::to_string(&entry.notifications)
                .context("serialize notification rules")?;
            let result = sqlx::query(
                "UPDATE entries
                 SET title = ?, year = ?, month = ?, day = ?, start_time = ?,
                     end_time = ?, location = ?, notifications = ?
                 WHERE id = ?",
            )
            .bind(&entry.title)
            .bind(i64::from(entry.date.year))
            .bind(i64::from(entry.date.month))
            .bind(i64::from(entry.date.day))
            .bind(entry.start_time.map(String::from))
            .bind(entry.end_time.map(String::from))
            .bind(entry.location.as_deref())
            .bind(notifications)
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .context("Failed to update entry")?;

            Ok((result.rows_affected() > 0).then_some(entry))
        })
    }
}

/// SQLite-backed firing records. `apply` runs in a single transaction.
pub struct SqliteFiringStore {
    pool: SqlitePool,
}

impl SqliteFiringStore {
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        ensure_schema(&pool).await?;
        Ok(Self { pool })
    }
}

fn minutes_to_db(minutes_before: u32) -> i64 {
    i64::from(minutes_before)
}

impl FiringRecordStore for SqliteFiringStore {
    fn has<'a>(
        &'a self,
        key: &'a FiringKey,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        Box::pin(async move {
            let row: Option<(i64,)> = sqlx::query_as(
                "SELECT 1 FROM firing_records WHERE entry_id = ? AND minutes_before = ?",
            )
            .bind(key.entry_id.as_str())
            .bind(minutes_to_db(key.minutes_before))
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query firing record")?;
            Ok(row.is_some())
        })
    }

    fn mark<'a>(
        &'a self,
        key: &'a FiringKey,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move { self.apply(&[FiringChange::Mark(key.clone())]).await })
    }

    fn clear<'a>(
        &'a self,
        key: &'a FiringKey,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move { self.apply(&[FiringChange::Clear(key.clone())]).await })
    }

    fn list<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<Vec<FiringKey>>> + Send + 'a>> {
        Box::pin(async move {
            let rows: Vec<(String, i64)> = sqlx::query_as(
                "SELECT entry_id, minutes_before FROM firing_records
                 ORDER BY entry_id, minutes_before",
            )
            .fetch_all(&self.pool)
            .await
            .context("Failed to list firing records")?;

            rows.into_iter()
                .map(|(entry_id, minutes)| {
                    let minutes_before = u32::try_from(minutes)
                        .with_context(|| format!("invalid minutes_before in DB: {minutes}"))?;
                    Ok(FiringKey::new(EntryId::from(entry_id), minutes_before))
                })
                .collect()
        })
    }

    fn apply<'a>(
        &'a self,
        changes: &'a [FiringChange],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut tx = self
                .pool
                .begin()
                .await
                .context("Failed to begin firing record transaction")?;
            let fired_at = Utc::now().to_rfc3339();

            for change in changes {
                match change {
                    FiringChange::Mark(key) => {
                        sqlx::query(
                            "INSERT OR IGNORE INTO firing_records (entry_id, minutes_before, fired_at)
                             VALUES (?, ?, ?)",
                        )
                        .bind(key.entry_id.as_str())
                        .bind(minutes_to_db(key.minutes_before))
                        .bind(&fired_at)
                        .execute(&mut *tx)
                        .await
                        .context("Failed to mark firing record")?;
                    }
                    FiringChange::Clear(key) => {
                        sqlx::query(
                            "DELETE FROM firing_records WHERE entry_id = ? AND minutes_before = ?",
                        )
                        .bind(key.entry_id.as_str())
                        .bind(minutes_to_db(key.minutes_before))
                        .execute(&mut *tx)
                        .await
                        .context("Failed to clear firing record")?;
                    }
                }
            }

            tx.commit()
                .await
                .context("Failed to commit firing record transaction")?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    fn draft() -> EntryDraft {
        EntryDraft {
            kind: EntryKind::Birthday,
            title: "Abuela".into(),
            date: CalendarDate::new(2024, 2, 31),
            start_time: ClockTime::new(0, 0).unwrap(),
            end_time: ClockTime::new(23, 59).unwrap(),
            location: Some("Casa".into()),
        }
    }

    #[tokio::test]
    async fn entries_round_trip_through_sqlite() {
        let store = SqliteEntryStore::new(memory_pool().await).await.unwrap();
        let rules = [
            NotificationRule::minutes_before(0),
            NotificationRule::minutes_before(1440),
        ];
        let id = store.create(&draft(), &rules).await.unwrap();

        let entry = store.get(&id).await.unwrap().unwrap();
        assert_eq!(entry.kind, EntryKind::Birthday);
        assert_eq!(entry.date, CalendarDate::new(2024, 2, 31));
        assert_eq!(entry.start_time, ClockTime::new(0, 0));
        assert_eq!(entry.location.as_deref(), Some("Casa"));
        assert_eq!(entry.notifications, rules.to_vec());
    }

    #[tokio::test]
    async fn schema_setup_is_idempotent() {
        let pool = memory_pool().await;
        SqliteEntryStore::new(pool.clone()).await.unwrap();
        SqliteFiringStore::new(pool.clone()).await.unwrap();
        SqliteEntryStore::new(pool).await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_and_delete() {
        let store = SqliteEntryStore::new(memory_pool().await).await.unwrap();
        let id = store.create(&draft(), &[]).await.unwrap();
        let copy = store.duplicate(&id).await.unwrap().unwrap();

        let listed: Vec<_> = store.list().await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(listed, vec![id.clone(), copy.clone()]);

        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn firing_batch_is_applied_together() {
        let store = SqliteFiringStore::new(memory_pool().await).await.unwrap();
        let a = FiringKey::new(EntryId::from("a"), 15);
        let b = FiringKey::new(EntryId::from("b"), 0);

        store.mark(&a).await.unwrap();
        store
            .apply(&[FiringChange::Clear(a.clone()), FiringChange::Mark(b.clone())])
            .await
            .unwrap();

        assert!(!store.has(&a).await.unwrap());
        assert!(store.has(&b).await.unwrap());
        assert_eq!(store.list().await.unwrap(), vec![b]);
    }

    #[tokio::test]
    async fn update_persists_edited_fields() {
        let store = SqliteEntryStore::new(memory_pool().await).await.unwrap();
        let id = store.create(&draft(), &[]).await.unwrap();

        let patch = EntryPatch {
            title: Some("Abuela Rosa".into()),
            date: Some(CalendarDate::new(2024, 3, 1)),
            start_time: ClockTime::new(18, 0),
            notifications: Some(vec![NotificationRule::minutes_before(60)]),
            ..EntryPatch::default()
        };
        let updated = store.update(&id, &patch).await.unwrap().unwrap();

        let stored = store.get(&id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.title, "Abuela Rosa");
        assert_eq!(stored.date, CalendarDate::new(2024, 3, 1));
        assert_eq!(stored.start_time, ClockTime::new(18, 0));
        assert_eq!(stored.end_time, ClockTime::new(23, 59));
        assert_eq!(stored.notifications, vec![NotificationRule::minutes_before(60)]);

        let missing = EntryId::from("missing");
        assert!(store.update(&missing, &patch).await.unwrap().is_none());
        assert_eq!(store.search("rosa").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_kind_in_a_row_is_reported() {
        let store = SqliteEntryStore::new(memory_pool().await).await.unwrap();
        sqlx::query(
            "INSERT INTO entries (id, kind, title, year, month, day, created_at)
             VALUES ('x', 'meeting', 'Sync', 2024, 1, 2, '2024-01-01T00:00:00Z')",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let err = store.list().await.unwrap_err();
        assert!(format!("{err:#}").contains("unknown entry kind: meeting"));

        sqlx::query("UPDATE entries SET kind = 'task' WHERE id = 'x'")
            .execute(store.pool())
            .await
            .unwrap();
        let entry = store.get(&EntryId::from("x")).await.unwrap().unwrap();
        assert_eq!(entry.kind, EntryKind::Task);
    }
}
