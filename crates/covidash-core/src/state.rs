use std::collections::HashSet;
use std::sync::RwLock;

use serde::Serialize;

use crate::feed::{NewsItem, RawArticle};
use crate::series::CaseSummary;

/// Headline metrics shown on the dashboard. Every field starts unknown and
/// is only ever overwritten by a successfully derived value, so a failed
/// refresh leaves the last good figure in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CaseMetrics {
    pub local_weekly_cases: Option<i64>,
    pub national_weekly_cases: Option<i64>,
    pub hospital_cases: Option<i64>,
    pub cumulative_deaths: Option<i64>,
}

/// Read-only view of the merged state, handed to the rendering layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub metrics: CaseMetrics,
    pub articles: Vec<NewsItem>,
}

#[derive(Default)]
struct Inner {
    metrics: CaseMetrics,
    articles: Vec<NewsItem>,
    // Raw upstream titles we have already turned into articles. Removal
    // from the visible list does not clear this, so a dismissed article
    // cannot be resurrected by a later refresh.
    seen_titles: HashSet<String>,
    dismissed_titles: HashSet<String>,
}

/// The merged dashboard state. One writer (the refresh service) and any
/// number of snapshot readers; the lock keeps a multi-threaded embedding
/// safe.
#[derive(Default)]
pub struct Dashboard {
    inner: RwLock<Inner>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Overwrite the national figures with a freshly derived summary.
    /// Figures the summary could not derive keep their previous value.
    pub fn apply_national_summary(&self, summary: &CaseSummary) {
        let mut inner = self.write();
        if let Some(cases) = summary.weekly_cases {
            inner.metrics.national_weekly_cases = Some(cases);
        }
        if let Some(hospital) = summary.hospital_cases {
            inner.metrics.hospital_cases = Some(hospital);
        }
        if let Some(deaths) = summary.cumulative_deaths {
            inner.metrics.cumulative_deaths = Some(deaths);
        }
    }

    /// Overwrite the local-area weekly case total.
    pub fn apply_local_summary(&self, summary: &CaseSummary) {
        if let Some(cases) = summary.weekly_cases {
            self.write().metrics.local_weekly_cases = Some(cases);
        }
    }

    /// Merge freshly fetched articles into the news list, newest first.
    /// Articles whose title was already seen or has been dismissed are
    /// dropped. Returns how many articles were new.
    pub fn merge_articles(&self, raw: &[RawArticle], strip_phrases: &[String]) -> usize {
        let mut guard = self.write();
        let inner = &mut *guard;

        let mut added = 0;
        for article in raw {
            if inner.dismissed_titles.contains(&article.title)
                || inner.seen_titles.contains(&article.title)
            {
                continue;
            }
            inner.seen_titles.insert(article.title.clone());
            inner.articles.push(NewsItem::from_raw(article, strip_phrases));
            added += 1;
        }

        if added > 0 {
            inner
                .articles
                .sort_by(|a, b| b.published_at.cmp(&a.published_at));
        }
        added
    }

    /// Drop an article from the visible list and blacklist its title so a
    /// later refresh cannot bring it back. Returns false when no article
    /// with that title is listed.
    pub fn dismiss_article(&self, title: &str) -> bool {
        let mut inner = self.write();
        let before = inner.articles.len();
        inner.articles.retain(|a| a.title != title);
        let removed = inner.articles.len() < before;
        if removed {
            inner.dismissed_titles.insert(title.to_string());
        }
        removed
    }

    /// Read-only snapshot: metrics plus at most `max_articles` articles,
    /// newest first.
    pub fn snapshot(&self, max_articles: usize) -> Snapshot {
        let inner = self.read();
        Snapshot {
            metrics: inner.metrics,
            articles: inner.articles.iter().take(max_articles).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn raw(title: &str, day: u32) -> RawArticle {
        RawArticle {
            title: title.to_string(),
            description: Some(format!("{title} description")),
            url: Some("https://example.com/article".to_string()),
            published_at: Utc.with_ymd_and_hms(2021, 12, day, 9, 0, 0).single(),
        }
    }

    #[test]
    fn test_apply_summary_keeps_previous_on_none() {
        let state = Dashboard::new();
        state.apply_national_summary(&CaseSummary {
            weekly_cases: Some(240_299),
            hospital_cases: Some(7_019),
            cumulative_deaths: Some(141_544),
        });
        state.apply_national_summary(&CaseSummary {
            weekly_cases: Some(250_000),
            hospital_cases: None,
            cumulative_deaths: None,
        });

        let metrics = state.snapshot(0).metrics;
        assert_eq!(metrics.national_weekly_cases, Some(250_000));
        assert_eq!(metrics.hospital_cases, Some(7_019));
        assert_eq!(metrics.cumulative_deaths, Some(141_544));
    }

    #[test]
    fn test_merge_dedups_and_sorts_newest_first() {
        let state = Dashboard::new();
        let added = state.merge_articles(&[raw("older", 1), raw("newest", 8), raw("middle", 4)], &[]);
        assert_eq!(added, 3);

        // Refreshing with an overlap adds only the unseen article.
        let added = state.merge_articles(&[raw("newest", 8), raw("fresh", 9)], &[]);
        assert_eq!(added, 1);

        let titles: Vec<_> = state
            .snapshot(10)
            .articles
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, ["fresh", "newest", "middle", "older"]);
    }

    #[test]
    fn test_dismissed_article_stays_gone() {
        let state = Dashboard::new();
        state.merge_articles(&[raw("story", 1)], &[]);
        assert!(state.dismiss_article("story"));
        assert!(!state.dismiss_article("story"));

        state.merge_articles(&[raw("story", 1)], &[]);
        assert!(state.snapshot(10).articles.is_empty());
    }

    #[test]
    fn test_snapshot_bounded() {
        let state = Dashboard::new();
        let articles: Vec<_> = (1..=9).map(|day| raw(&format!("story {day}"), day)).collect();
        state.merge_articles(&articles, &[]);

        let snapshot = state.snapshot(5);
        assert_eq!(snapshot.articles.len(), 5);
        assert_eq!(snapshot.articles[0].title, "story 9");
    }
}
