use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::HealthFeed;
use crate::config::AppConfig;
use crate::series::SeriesTable;
use crate::{Error, Result};

/// Column set requested from the health API, in table order.
pub const SERIES_COLUMNS: &[&str] = &[
    "areaCode",
    "areaName",
    "areaType",
    "date",
    "cumDailyNsoDeathsByDeathDate",
    "hospitalCases",
    "newCasesBySpecimenDate",
];

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    #[serde(default)]
    data: Vec<Value>,
}

/// Client for the UKHSA coronavirus dashboard API.
pub struct HealthApiClient {
    client: Client,
    endpoint: String,
}

impl HealthApiClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.sync.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.health.endpoint.clone(),
        })
    }

    // The API echoes back exactly the fields named in `structure`, so an
    // identity mapping requests the columns the series table expects.
    fn structure_json() -> Result<String> {
        let mut structure = Map::new();
        for column in SERIES_COLUMNS {
            structure.insert(column.to_string(), Value::String(column.to_string()));
        }
        Ok(serde_json::to_string(&Value::Object(structure))?)
    }
}

#[async_trait]
impl HealthFeed for HealthApiClient {
    async fn fetch_series(&self, area: &str, area_type: &str) -> Result<SeriesTable> {
        let filters = format!("areaType={area_type};areaName={area}");
        let structure = Self::structure_json()?;

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("filters", filters.as_str()), ("structure", structure.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FeedUnavailable(format!(
                "health API returned HTTP {status} for {area}"
            )));
        }

        let body: SeriesResponse = response.json().await?;
        tracing::info!(area, rows = body.data.len(), "fetched health series");

        Ok(SeriesTable::from_records(&body.data, SERIES_COLUMNS))
    }
}
