mod registry;
mod service;

pub use registry::{FeedKind, ScheduledTask, TaskRegistry};
pub use service::{DashboardView, RefreshEvent, RefreshService, ScheduleRequest};
