use std::sync::Mutex;

use serde::Serialize;

/// A human-visible pending or recurring update widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateEntry {
    pub title: String,
    pub body: String,
}

/// Port to the rendering layer's list of update widgets. The refresh
/// service mirrors scheduled tasks onto it and drops entries when a
/// one-shot task retires; the rendering layer owns what is displayed.
pub trait UpdateBoard: Send + Sync {
    /// Add an entry, replacing any existing entry with the same title.
    fn upsert(&self, entry: UpdateEntry);

    /// Remove the entry with this title. Returns false when absent.
    fn remove(&self, title: &str) -> bool;

    fn contains(&self, title: &str) -> bool;

    fn entries(&self) -> Vec<UpdateEntry>;
}

/// In-memory update list, used by the CLI driver and by tests.
#[derive(Default)]
pub struct UpdateList {
    entries: Mutex<Vec<UpdateEntry>>,
}

impl UpdateList {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<UpdateEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl UpdateBoard for UpdateList {
    fn upsert(&self, entry: UpdateEntry) {
        let mut entries = self.lock();
        if let Some(existing) = entries.iter_mut().find(|e| e.title == entry.title) {
            *existing = entry;
        } else {
            entries.push(entry);
        }
    }

    fn remove(&self, title: &str) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|e| e.title != title);
        entries.len() < before
    }

    fn contains(&self, title: &str) -> bool {
        self.lock().iter().any(|e| e.title == title)
    }

    fn entries(&self) -> Vec<UpdateEntry> {
        self.lock().clone()
    }
}
