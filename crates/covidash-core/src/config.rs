use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scheduler::FeedKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    /// Refreshes to enrol at startup.
    #[serde(default)]
    pub updates: Vec<UpdateScheduleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Dashboard title
    #[serde(default = "default_title")]
    pub title: String,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Health statistics API endpoint
    #[serde(default = "default_health_endpoint")]
    pub endpoint: String,
    /// Area used for the national figures
    #[serde(default = "default_national_area")]
    pub national_area: String,
    /// Area type matching `national_area`, as defined by the API
    #[serde(default = "default_national_area_type")]
    pub national_area_type: String,
    /// Area used for the local case figure
    #[serde(default = "default_local_area")]
    pub local_area: String,
    /// Area type matching `local_area`
    #[serde(default = "default_local_area_type")]
    pub local_area_type: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            endpoint: default_health_endpoint(),
            national_area: default_national_area(),
            national_area_type: default_national_area_type(),
            local_area: default_local_area(),
            local_area_type: default_local_area_type(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// News search API endpoint
    #[serde(default = "default_news_endpoint")]
    pub endpoint: String,
    /// API key for the news endpoint
    #[serde(default)]
    pub api_key: String,
    /// Space-separated search terms, OR-combined in the query
    #[serde(default = "default_search_terms")]
    pub search_terms: String,
    /// Article language
    #[serde(default = "default_language")]
    pub language: String,
    /// Upstream sort order
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    /// Restrict results to these sources (comma-separated), if set
    #[serde(default)]
    pub sources: Option<String>,
    /// Maximum articles exposed in a snapshot
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
    /// Phrases removed from article titles before display
    #[serde(default)]
    pub strip_phrases: Vec<String>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_news_endpoint(),
            api_key: String::new(),
            search_terms: default_search_terms(),
            language: default_language(),
            sort_by: default_sort_by(),
            sources: None,
            max_articles: default_max_articles(),
            strip_phrases: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Tick cadence for the refresh engine, in seconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval(),
            request_timeout_secs: default_timeout(),
        }
    }
}

/// One startup schedule entry: `covidash run` enrols each of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateScheduleConfig {
    /// Unique display name
    pub name: String,
    /// Wall-clock "HH:MM" firing time
    pub time: String,
    /// Which feed to refresh: "health" or "news"
    pub feed: FeedKind,
    /// Repeat daily instead of firing once
    #[serde(default)]
    pub repeat: bool,
}

fn default_title() -> String {
    "Covid Dashboard".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_health_endpoint() -> String {
    "https://api.coronavirus.data.gov.uk/v1/data".to_string()
}

fn default_national_area() -> String {
    "England".to_string()
}

fn default_national_area_type() -> String {
    "nation".to_string()
}

fn default_local_area() -> String {
    "Exeter".to_string()
}

fn default_local_area_type() -> String {
    "ltla".to_string()
}

fn default_news_endpoint() -> String {
    "https://newsapi.org/v2/everything".to_string()
}

fn default_search_terms() -> String {
    "Covid COVID-19 coronavirus".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_sort_by() -> String {
    "publishedAt".to_string()
}

fn default_max_articles() -> usize {
    10
}

fn default_tick_interval() -> u64 {
    60
}

fn default_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/covidash/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("covidash")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [news]
            api_key = "secret"

            [[updates]]
            name = "morning covid"
            time = "08:00"
            feed = "health"
            repeat = true
            "#,
        )
        .unwrap();

        assert_eq!(config.news.api_key, "secret");
        assert_eq!(config.news.max_articles, 10);
        assert_eq!(config.health.national_area, "England");
        assert_eq!(config.sync.tick_interval_secs, 60);

        assert_eq!(config.updates.len(), 1);
        assert_eq!(config.updates[0].feed, FeedKind::Health);
        assert!(config.updates[0].repeat);
    }

    #[test]
    fn test_default_roundtrips_through_toml() {
        let config = AppConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.news.search_terms, config.news.search_terms);
        assert_eq!(parsed.sync.request_timeout_secs, config.sync.request_timeout_secs);
    }
}
