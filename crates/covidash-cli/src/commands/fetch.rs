use std::sync::Arc;

use anyhow::Result;

use covidash_core::board::UpdateList;
use covidash_core::feed::{HealthApiClient, NewsApiClient};
use covidash_core::scheduler::{FeedKind, RefreshService};
use covidash_core::{AppConfig, Dashboard};

pub async fn run(config: Arc<AppConfig>) -> Result<()> {
    let state = Arc::new(Dashboard::new());
    let board = Arc::new(UpdateList::new());
    let health = Arc::new(HealthApiClient::new(&config)?);
    let news = Arc::new(NewsApiClient::new(&config)?);
    let service = RefreshService::new(state, health, news, board, config.clone());

    println!("Refreshing health data and news...\n");

    service.refresh_now(FeedKind::Health).await?;
    service.refresh_now(FeedKind::News).await?;

    let snapshot = service.view().snapshot;
    let metrics = snapshot.metrics;

    println!("{} 7-day cases:  {}", config.health.local_area, figure(metrics.local_weekly_cases));
    println!("{} 7-day cases:  {}", config.health.national_area, figure(metrics.national_weekly_cases));
    println!("Hospital cases:       {}", figure(metrics.hospital_cases));
    println!("Cumulative deaths:    {}", figure(metrics.cumulative_deaths));

    if snapshot.articles.is_empty() {
        println!("\nNo articles found.");
    } else {
        println!("\nHeadlines ({}):\n", snapshot.articles.len());
        for article in &snapshot.articles {
            let published = article
                .published_at
                .map(|at| at.format(" [%Y-%m-%d]").to_string())
                .unwrap_or_default();
            println!("  {}{}", article.title, published);
        }
    }

    Ok(())
}

fn figure(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "n/a".to_string())
}
