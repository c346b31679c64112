use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{NewsFeed, RawArticle};
use crate::config::AppConfig;
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

/// Client for a NewsAPI-style article search endpoint.
pub struct NewsApiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    language: String,
    sort_by: String,
    sources: Option<String>,
}

impl NewsApiClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.sync.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.news.endpoint.clone(),
            api_key: config.news.api_key.clone(),
            language: config.news.language.clone(),
            sort_by: config.news.sort_by.clone(),
            sources: config.news.sources.clone(),
        })
    }

    /// Space-separated search terms become an OR query.
    fn build_query(search_terms: &str) -> String {
        search_terms.split_whitespace().collect::<Vec<_>>().join(" OR ")
    }
}

#[async_trait]
impl NewsFeed for NewsApiClient {
    async fn fetch_articles(&self, search_terms: &str) -> Result<Vec<RawArticle>> {
        let query = Self::build_query(search_terms);
        let mut params = vec![
            ("apiKey", self.api_key.as_str()),
            ("q", query.as_str()),
            ("language", self.language.as_str()),
            ("sortBy", self.sort_by.as_str()),
        ];
        if let Some(sources) = self.sources.as_deref() {
            params.push(("sources", sources));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FeedUnavailable(format!(
                "news API returned HTTP {status}"
            )));
        }

        let body: NewsResponse = response.json().await?;
        tracing::info!(articles = body.articles.len(), "fetched news articles");

        Ok(body.articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_joins_terms_with_or() {
        assert_eq!(
            NewsApiClient::build_query("Covid COVID-19 coronavirus"),
            "Covid OR COVID-19 OR coronavirus"
        );
        assert_eq!(NewsApiClient::build_query("flu"), "flu");
        assert_eq!(NewsApiClient::build_query("  spaced   out  "), "spaced OR out");
    }
}
