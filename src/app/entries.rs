use anyhow::Result;
use voxplan::calendar::{Entry, EntryId, EntryPatch};
use voxplan::store::{EntryStore, Stores};

pub fn format_entry(entry: &Entry) -> String {
    let mut line = format!("{}  {:<8}  {}", entry.id, entry.kind.to_string(), entry.date);

    match (entry.start_time, entry.end_time) {
        (Some(start), Some(end)) => line.push_str(&format!(" {start}-{end}")),
        (Some(start), None) => line.push_str(&format!(" {start}")),
        _ => {}
    }

    line.push_str("  ");
    line.push_str(&entry.title);

    if let Some(location) = &entry.location {
        line.push_str(&format!(" @ {location}"));
    }

    if entry.notifications.is_empty() {
        line.push_str(&format!("  ({})", t!("entries.no_reminders")));
    } else {
        let offsets: Vec<String> = entry
            .notifications
            .iter()
            .map(|rule| format!("-{}m", rule.minutes_before))
            .collect();
        line.push_str(&format!("  [{}]", offsets.join(", ")));
    }

    line
}

pub async fn list(store: &dyn EntryStore) -> Result<()> {
    let entries = store.list().await?;
    if entries.is_empty() {
        println!("{}", t!("entries.empty"));
        return Ok(());
    }
    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

pub async fn remove(store: &dyn EntryStore, id: &str) -> Result<()> {
    let id = EntryId::from(id);
    if store.delete(&id).await? {
        println!("{}", t!("entries.removed", id = id.as_str()));
    } else {
        println!("{}", t!("entries.not_found", id = id.as_str()));
    }
    Ok(())
}

pub async fn duplicate(store: &dyn EntryStore, id: &str) -> Result<()> {
    let id = EntryId::from(id);
    match store.duplicate(&id).await? {
        Some(copy) => println!(
            "{}",
            t!("entries.duplicated", id = id.as_str(), copy = copy.as_str())
        ),
        None => println!("{}", t!("entries.not_found", id = id.as_str())),
    }
    Ok(())
}

/// Applies `patch` and prints the stored result. Returns the edited entry, or
/// `None` when nothing was changed.
pub async fn edit(stores: &Stores, id: &str, patch: &EntryPatch) -> Result<Option<Entry>> {
    if patch.is_empty() {
        println!("{}", t!("entries.no_changes"));
        return Ok(None);
    }

    let id = EntryId::from(id);
    let updated = stores.update_entry(&id, patch).await?;
    match &updated {
        Some(entry) => {
            println!("{}", t!("entries.updated", id = id.as_str()));
            println!("{}", format_entry(entry));
        }
        None => println!("{}", t!("entries.not_found", id = id.as_str())),
    }
    Ok(updated)
}

pub async fn search(store: &dyn EntryStore, query: &str) -> Result<usize> {
    let hits = store.search(query).await?;
    if hits.is_empty() {
        println!("{}", t!("entries.no_matches", query = query));
    }
    for entry in &hits {
        println!("{}", format_entry(entry));
    }
    Ok(hits.len())
}
