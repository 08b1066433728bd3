use std::sync::Mutex;

/// Fire-and-forget reminder delivery.
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &str;

    fn emit(&self, title: &str, body: &str);
}

/// Logs reminders through `tracing`.
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn name(&self) -> &str {
        "tracing"
    }

    fn emit(&self, title: &str, body: &str) {
        tracing::info!(title, body, "reminder");
    }
}

/// Prints reminders to stdout.
pub struct StdoutSink;

impl NotificationSink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn emit(&self, title: &str, body: &str) {
        println!("🔔 {title}: {body}");
    }
}

/// Keeps every emitted reminder in memory.
#[derive(Default)]
pub struct CollectingSink {
    emitted: Mutex<Vec<(String, String)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitted(&self) -> Vec<(String, String)> {
        self.emitted
            .lock()
            .map_or_else(|poisoned| poisoned.into_inner().clone(), |guard| guard.clone())
    }
}

impl NotificationSink for CollectingSink {
    fn name(&self) -> &str {
        "collecting"
    }

    fn emit(&self, title: &str, body: &str) {
        if let Ok(mut emitted) = self.emitted.lock() {
            emitted.push((title.to_string(), body.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        sink.emit("a", "1");
        sink.emit("b", "2");
        assert_eq!(
            sink.emitted(),
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );
    }
}
