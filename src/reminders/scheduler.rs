use super::sink::NotificationSink;
use super::text::reminder_text;
use super::types::{MIN_TICK_SECS, Reminder, TickPlan, TickReport};
use crate::calendar::{Clock, Entry, EntryId};
use crate::error::SchedulerError;
use crate::store::{EntryStore, FiringChange, FiringKey, FiringRecordStore};
use chrono::{Duration as ChronoDuration, NaiveDateTime};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::time::{self, Duration, MissedTickBehavior};

/// Decides which reminders fire and which firing records are pruned, given
/// one consistent snapshot of entries and records.
///
/// A `(entry, minutes_before)` pair fires when it has no record and
/// `occurrence - minutes_before <= now < occurrence`. Records are pruned once
/// `now >= occurrence`, or when their entry no longer exists.
pub fn plan_tick(
    entries: &[Entry],
    fired: &BTreeSet<FiringKey>,
    now: NaiveDateTime,
    locale: &str,
) -> TickPlan {
    let mut plan = TickPlan::default();
    let mut occurrences: HashMap<&EntryId, Option<NaiveDateTime>> = HashMap::new();

    for entry in entries {
        let occurrence = entry.occurrence();
        if occurrence.is_none() {
            plan.skipped.push(entry.id.clone());
        }
        occurrences.insert(&entry.id, occurrence);
    }

    for key in fired {
        let prune = match occurrences.get(&key.entry_id) {
            None => true,
            Some(Some(occurrence)) => now >= *occurrence,
            Some(None) => false,
        };
        if prune {
            plan.changes.push(FiringChange::Clear(key.clone()));
        }
    }

    for entry in entries {
        let Some(occurrence) = entry.occurrence() else {
            continue;
        };
        if now >= occurrence {
            continue;
        }

        let mut seen = HashSet::new();
        for rule in &entry.notifications {
            if !seen.insert(rule.minutes_before) {
                continue;
            }
            let key = FiringKey::new(entry.id.clone(), rule.minutes_before);
            if fired.contains(&key) {
                continue;
            }

            let due_at = occurrence
                .checked_sub_signed(ChronoDuration::minutes(i64::from(rule.minutes_before)))
                .unwrap_or(NaiveDateTime::MIN);
            if now < due_at {
                continue;
            }

            let (title, body) = reminder_text(entry, locale);
            plan.reminders.push(Reminder {
                entry_id: entry.id.clone(),
                kind: entry.kind,
                minutes_before: rule.minutes_before,
                occurrence,
                title,
                body,
            });
            plan.changes.push(FiringChange::Mark(key));
        }
    }

    plan
}

/// Polls the entry store and emits each due reminder exactly once.
pub struct NotificationScheduler {
    entries: Arc<dyn EntryStore>,
    firings: Arc<dyn FiringRecordStore>,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    locale: String,
    /// Impossible-date entries already warned about.
    skip_warned: Mutex<HashSet<EntryId>>,
}

impl NotificationScheduler {
    pub fn new(
        entries: Arc<dyn EntryStore>,
        firings: Arc<dyn FiringRecordStore>,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            entries,
            firings,
            sink,
            clock,
            locale: "es".into(),
            skip_warned: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub async fn tick(&self) -> Result<TickReport, SchedulerError> {
        self.evaluate(self.clock.now()).await
    }

    /// One evaluation at `now`. Firing records are committed as one batch
    /// before anything is emitted, so a failed tick emits nothing and writes
    /// nothing.
    pub async fn evaluate(&self, now: NaiveDateTime) -> Result<TickReport, SchedulerError> {
        let entries = self
            .entries
            .list()
            .await
            .map_err(|e| SchedulerError::EntryRead(format!("{e:#}")))?;
        let fired: BTreeSet<FiringKey> = self
            .firings
            .list()
            .await
            .map_err(|e| SchedulerError::FiringRead(format!("{e:#}")))?
            .into_iter()
            .collect();

        let plan = plan_tick(&entries, &fired, now, &self.locale);

        let newly_skipped = self.note_skipped(&plan.skipped);

        if !plan.is_empty() {
            self.firings
                .apply(&plan.changes)
                .await
                .map_err(|e| SchedulerError::FiringWrite(format!("{e:#}")))?;
        }

        for reminder in &plan.reminders {
            tracing::info!(
                entry_id = %reminder.entry_id,
                minutes_before = reminder.minutes_before,
                occurrence = %reminder.occurrence,
                sink = self.sink.name(),
                "reminder fired"
            );
            self.sink.emit(&reminder.title, &reminder.body);
        }

        let pruned = plan
            .changes
            .iter()
            .filter(|change| matches!(change, FiringChange::Clear(_)))
            .count();

        Ok(TickReport {
            fired: plan.reminders,
            pruned,
            skipped: plan.skipped.len(),
            newly_skipped,
        })
    }

    /// Warns once per entry whose date does not exist; later ticks only log at
    /// debug. Entries that stop being skipped are forgotten.
    fn note_skipped(&self, skipped: &[EntryId]) -> usize {
        let mut warned = self
            .skip_warned
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        warned.retain(|id| skipped.contains(id));

        let mut fresh = 0;
        for id in skipped {
            if warned.insert(id.clone()) {
                fresh += 1;
                tracing::warn!(entry_id = %id, "entry date does not exist; reminders skipped");
            } else {
                tracing::debug!(entry_id = %id, "entry with impossible date still skipped");
            }
        }
        fresh
    }

    /// Ticks every `every` (first tick immediately) until `shutdown` resolves.
    /// Failed ticks are logged and retried on the next interval.
    pub async fn run<F>(&self, every: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let every = every.max(Duration::from_secs(MIN_TICK_SECS));
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        crate::diagnostics::health::mark_component_ok("scheduler");

        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => break,
                _ = interval.tick() => {}
            }

            match self.tick().await {
                Ok(report) => {
                    crate::diagnostics::health::mark_component_ok("scheduler");
                    if !report.fired.is_empty() || report.pruned > 0 {
                        tracing::debug!(
                            fired = report.fired.len(),
                            pruned = report.pruned,
                            "scheduler tick"
                        );
                    }
                }
                Err(e) => {
                    crate::diagnostics::health::mark_component_error("scheduler", &e);
                    tracing::warn!("Scheduler tick skipped: {e}");
                }
            }
        }
    }
}
