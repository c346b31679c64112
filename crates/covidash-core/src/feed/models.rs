use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw article record as returned by the news API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// A news article as shown on the dashboard: cleaned title, body with an
/// embedded source link, and the publication date the list is ordered by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewsItem {
    pub fn from_raw(raw: &RawArticle, strip_phrases: &[String]) -> Self {
        let mut title = raw.title.clone();
        for phrase in strip_phrases {
            if title.contains(phrase.as_str()) {
                title = title.replace(phrase.as_str(), "");
            }
        }

        let description = raw.description.as_deref().unwrap_or("");
        let body = match raw.url.as_deref() {
            Some(url) => format!(
                "{description} (<a target=\"blank\" rel=\"noopener noreferrer\" href=\"{url}\">Read More</a>)"
            ),
            None => description.to_string(),
        };

        Self {
            title,
            body,
            published_at: raw.published_at,
        }
    }
}
