use super::controller::DialogueController;
use crate::calendar::{EntryId, NotificationRule};
use crate::store::EntryStore;
use anyhow::Result;
use std::sync::Arc;

/// Hands a completed draft to the entry store and resets the controller.
pub struct DraftEmitter {
    store: Arc<dyn EntryStore>,
    default_rules: Vec<NotificationRule>,
}

impl DraftEmitter {
    pub fn new(store: Arc<dyn EntryStore>, default_rules: Vec<NotificationRule>) -> Self {
        Self {
            store,
            default_rules,
        }
    }

    pub fn default_rules(&self) -> &[NotificationRule] {
        &self.default_rules
    }

    /// Returns `Ok(None)` when the controller is not `Complete`. On store
    /// failure the controller keeps its draft so the emit can be retried.
    pub async fn emit(&self, controller: &mut DialogueController) -> Result<Option<EntryId>> {
        let Some(draft) = controller.completed_draft() else {
            return Ok(None);
        };

        let id = self.store.create(draft, &self.default_rules).await?;
        tracing::info!(
            entry_id = %id,
            kind = %draft.kind,
            date = %draft.date,
            reminders = self.default_rules.len(),
            "entry created from dialogue"
        );
        controller.reset();
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::FixedClock;
    use crate::store::MemoryEntryStore;
    use chrono::NaiveDate;

    fn controller() -> DialogueController {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        DialogueController::for_locale("es", Arc::new(FixedClock::new(now)))
    }

    #[tokio::test]
    async fn emit_is_noop_before_completion() {
        let store = Arc::new(MemoryEntryStore::new());
        let emitter = DraftEmitter::new(store.clone(), vec![]);
        let mut c = controller();
        c.submit_utterance("evento");

        assert!(emitter.emit(&mut c).await.unwrap().is_none());
        assert_eq!(c.state().step(), "title");
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn emit_creates_entry_with_default_rules_and_resets() {
        let store = Arc::new(MemoryEntryStore::new());
        let emitter = DraftEmitter::new(
            store.clone(),
            vec![NotificationRule::minutes_before(15)],
        );
        let mut c = controller();
        for u in ["tarea", "Informe", "3", "9:30", "11", "oficina"] {
            c.submit_utterance(u);
        }

        let id = emitter.emit(&mut c).await.unwrap().unwrap();
        assert_eq!(c.state().step(), "greeting");

        let entry = store.get(&id).await.unwrap().unwrap();
        assert_eq!(entry.title, "Informe");
        assert_eq!(entry.location.as_deref(), Some("oficina"));
        assert_eq!(entry.notifications, vec![NotificationRule::minutes_before(15)]);
    }
}
