use async_trait::async_trait;

use crate::series::SeriesTable;
use crate::Result;

mod health;
mod models;
mod news;

pub use health::{HealthApiClient, SERIES_COLUMNS};
pub use models::{NewsItem, RawArticle};
pub use news::NewsApiClient;

/// Health-statistics feed consumed by the refresh service. Implementations
/// must fail fast rather than stall a tick.
#[async_trait]
pub trait HealthFeed: Send + Sync {
    async fn fetch_series(&self, area: &str, area_type: &str) -> Result<SeriesTable>;
}

/// News feed consumed by the refresh service.
#[async_trait]
pub trait NewsFeed: Send + Sync {
    async fn fetch_articles(&self, search_terms: &str) -> Result<Vec<RawArticle>>;
}
