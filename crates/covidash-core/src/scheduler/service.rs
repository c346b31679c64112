use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::board::{UpdateBoard, UpdateEntry};
use crate::clock;
use crate::config::AppConfig;
use crate::feed::{HealthFeed, NewsFeed};
use crate::series::derive_summary;
use crate::state::{Dashboard, Snapshot};
use crate::Result;

use super::registry::{FeedKind, ScheduledTask, TaskRegistry};

/// Events emitted by the refresh service to notify the UI of changes
#[derive(Debug, Clone)]
pub enum RefreshEvent {
    /// Health figures have been re-derived, UI should re-read the snapshot
    HealthRefreshed,
    /// News list has been refreshed
    NewsRefreshed { new_articles: usize },
    /// A recurring task re-enrolled itself
    TaskRescheduled { name: String, fire_at: DateTime<Utc> },
    /// A one-shot task finished and was dropped
    TaskRetired { name: String },
    /// An error occurred during a scheduled refresh
    Error { task: String, message: String },
}

/// Read-only view handed to the rendering layer: the merged state plus the
/// visible update widgets.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub snapshot: Snapshot,
    pub updates: Vec<UpdateEntry>,
}

/// A caller request to enrol a scheduled refresh.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    /// Unique display name; a pending request with the same name is replaced.
    pub name: String,
    /// Wall-clock "HH:MM" firing time.
    pub time_spec: String,
    pub feed: FeedKind,
    pub recurring: bool,
}

/// Coordinates scheduled refreshes for both feeds: resolves firing times,
/// runs due tasks on each tick, merges results into the shared state, and
/// re-enrols or retires each task after it fires.
pub struct RefreshService {
    state: Arc<Dashboard>,
    health: Arc<dyn HealthFeed>,
    news: Arc<dyn NewsFeed>,
    board: Arc<dyn UpdateBoard>,
    config: Arc<AppConfig>,
    registry: Mutex<TaskRegistry>,
    event_tx: Option<mpsc::UnboundedSender<RefreshEvent>>,
}

impl RefreshService {
    pub fn new(
        state: Arc<Dashboard>,
        health: Arc<dyn HealthFeed>,
        news: Arc<dyn NewsFeed>,
        board: Arc<dyn UpdateBoard>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            state,
            health,
            news,
            board,
            config,
            registry: Mutex::new(TaskRegistry::new()),
            event_tx: None,
        }
    }

    /// Set the event sender for UI notifications
    pub fn with_event_sender(mut self, tx: mpsc::UnboundedSender<RefreshEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    fn send_event(&self, event: RefreshEvent) {
        if let Some(ref tx) = self.event_tx {
            if tx.send(event).is_err() {
                warn!("Failed to send refresh event: receiver dropped");
            }
        }
    }

    fn registry(&self) -> MutexGuard<'_, TaskRegistry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Enrol a refresh at the requested wall-clock time. A malformed time
    /// spec is the only synchronous failure.
    pub fn schedule(&self, request: ScheduleRequest) -> Result<()> {
        self.schedule_at(request, Local::now())
    }

    pub fn schedule_at(&self, request: ScheduleRequest, now: DateTime<Local>) -> Result<()> {
        let fire_at = clock::next_occurrence(&request.time_spec, &now)?.with_timezone(&Utc);

        self.board.upsert(UpdateEntry {
            title: request.name.clone(),
            body: describe_request(&request),
        });
        self.registry().insert(ScheduledTask {
            name: request.name.clone(),
            fire_at,
            time_spec: request.time_spec.clone(),
            feed: request.feed,
            recurring: request.recurring,
        });

        info!(name = %request.name, %fire_at, "scheduled refresh");
        Ok(())
    }

    /// Best-effort cancel by name: the pending task and its board entry are
    /// both dropped. Unknown or already-fired names are a no-op.
    pub fn cancel(&self, name: &str) -> bool {
        let cancelled = self.registry().cancel(name);
        self.board.remove(name);
        if cancelled {
            info!(name, "cancelled scheduled refresh");
        }
        cancelled
    }

    /// Live tasks in firing order.
    pub fn pending(&self) -> Vec<ScheduledTask> {
        self.registry().pending()
    }

    /// Snapshot the merged state and the update widgets in one read.
    pub fn view(&self) -> DashboardView {
        DashboardView {
            snapshot: self.state.snapshot(self.config.news.max_articles),
            updates: self.board.entries(),
        }
    }

    /// Run every task due now. Called by the external tick driver; tasks in
    /// the batch execute serially, never concurrently.
    pub async fn tick(&self) {
        self.tick_at(Utc::now()).await;
    }

    pub async fn tick_at(&self, now: DateTime<Utc>) {
        // Drain the batch before executing so a task re-enrolling itself
        // cannot land back into the same tick.
        let due = self.registry().due(now);
        for task in due {
            self.fire(task, now).await;
        }
    }

    async fn fire(&self, task: ScheduledTask, now: DateTime<Utc>) {
        info!(name = %task.name, "running scheduled refresh");

        let outcome = match task.feed {
            FeedKind::Health => self.refresh_health().await,
            FeedKind::News => self.refresh_news().await.map(|_| ()),
        };
        if let Err(e) = outcome {
            // Previous state is retained; the task still reschedules or
            // retires exactly as on success.
            error!(name = %task.name, "scheduled refresh failed: {e}");
            self.send_event(RefreshEvent::Error {
                task: task.name.clone(),
                message: e.to_string(),
            });
        }

        if task.recurring {
            self.reschedule(task, now);
        } else {
            self.board.remove(&task.name);
            info!(name = %task.name, "retired one-shot refresh");
            self.send_event(RefreshEvent::TaskRetired { name: task.name });
        }
    }

    fn reschedule(&self, task: ScheduledTask, now: DateTime<Utc>) {
        match clock::next_occurrence(&task.time_spec, &now.with_timezone(&Local)) {
            Ok(next) => {
                let fire_at = next.with_timezone(&Utc);
                let name = task.name.clone();
                self.registry().insert(ScheduledTask { fire_at, ..task });
                info!(name = %name, %fire_at, "re-enrolled recurring refresh");
                self.send_event(RefreshEvent::TaskRescheduled { name, fire_at });
            }
            Err(e) => {
                // Can only happen if the stored spec went bad, which insert
                // validation rules out; drop the task rather than loop.
                error!(name = %task.name, "failed to re-enrol refresh: {e}");
                self.board.remove(&task.name);
                self.send_event(RefreshEvent::Error {
                    task: task.name,
                    message: e.to_string(),
                });
            }
        }
    }

    /// Refresh a feed immediately, outside the schedule.
    pub async fn refresh_now(&self, feed: FeedKind) -> Result<()> {
        match feed {
            FeedKind::Health => self.refresh_health().await,
            FeedKind::News => self.refresh_news().await.map(|_| ()),
        }
    }

    async fn refresh_health(&self) -> Result<()> {
        let health = &self.config.health;

        // Fetch both series before touching state, so a failure part way
        // through leaves the previous figures untouched.
        let local = self
            .health
            .fetch_series(&health.local_area, &health.local_area_type)
            .await?;
        let national = self
            .health
            .fetch_series(&health.national_area, &health.national_area_type)
            .await?;

        self.state.apply_local_summary(&derive_summary(&local));
        self.state.apply_national_summary(&derive_summary(&national));

        self.send_event(RefreshEvent::HealthRefreshed);
        Ok(())
    }

    async fn refresh_news(&self) -> Result<usize> {
        let news = &self.config.news;
        let raw = self.news.fetch_articles(&news.search_terms).await?;
        let added = self.state.merge_articles(&raw, &news.strip_phrases);
        if added > 0 {
            info!(added, "merged new articles");
        }
        self.send_event(RefreshEvent::NewsRefreshed { new_articles: added });
        Ok(added)
    }
}

fn describe_request(request: &ScheduleRequest) -> String {
    let subject = match request.feed {
        FeedKind::Health => "Covid data",
        FeedKind::News => "News data",
    };
    if request.recurring {
        format!("{subject} will be updated daily at: {}", request.time_spec)
    } else {
        format!("{subject} will be updated at: {}", request.time_spec)
    }
}
