use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which feed a scheduled task refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Health,
    News,
}

/// A pending scheduled refresh. `name` is the unique key; `time_spec` is
/// kept so a recurring task can resolve its next firing time.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub name: String,
    pub fire_at: DateTime<Utc>,
    pub time_spec: String,
    pub feed: FeedKind,
    pub recurring: bool,
}

struct HeapEntry {
    fire_at: DateTime<Utc>,
    seq: u64,
    task: ScheduledTask,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.seq == other.seq
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.fire_at
            .cmp(&other.fire_at)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Pending scheduled tasks, keyed by firing time.
///
/// A min-heap orders tasks by (fire_at, insertion); the name map carries the
/// sequence number of each name's current entry, so cancel and supersede are
/// O(1) with stale heap entries skimmed off lazily in `due`.
#[derive(Default)]
pub struct TaskRegistry {
    heap: BinaryHeap<Reverse<HeapEntry>>,
    live: HashMap<String, u64>,
    next_seq: u64,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a task. A pending task with the same name is superseded.
    pub fn insert(&mut self, task: ScheduledTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.live.insert(task.name.clone(), seq);
        self.heap.push(Reverse(HeapEntry {
            fire_at: task.fire_at,
            seq,
            task,
        }));
    }

    /// Remove a pending task by name. Returns false when the name is
    /// unknown or its task already fired; never an error.
    pub fn cancel(&mut self, name: &str) -> bool {
        self.live.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.live.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Pop every task with `fire_at <= now`, in (fire_at, insertion) order.
    /// Popped tasks leave the pending set for good; recurrence is an
    /// explicit re-insert by the caller.
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<ScheduledTask> {
        let mut due = Vec::new();
        loop {
            match self.heap.peek() {
                Some(Reverse(head)) if head.fire_at <= now => {}
                _ => break,
            }
            let Some(Reverse(entry)) = self.heap.pop() else {
                break;
            };
            // Cancelled or superseded entries stay in the heap until their
            // firing time comes around, then drop out here.
            if self.live.get(&entry.task.name) != Some(&entry.seq) {
                continue;
            }
            self.live.remove(&entry.task.name);
            due.push(entry.task);
        }
        due
    }

    /// Live tasks in firing order, for status display.
    pub fn pending(&self) -> Vec<ScheduledTask> {
        let mut tasks: Vec<&HeapEntry> = self
            .heap
            .iter()
            .map(|Reverse(entry)| entry)
            .filter(|entry| self.live.get(&entry.task.name) == Some(&entry.seq))
            .collect();
        tasks.sort_by_key(|entry| (entry.fire_at, entry.seq));
        tasks.into_iter().map(|entry| entry.task.clone()).collect()
    }
}
