use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::info;

use super::{DemographicsProvider, ProviderError};
use crate::config::ProviderConfig;

/// ACS profile variables requested per zip code tabulation area:
/// total, male and female population, and median age.
const PROFILE_VARIABLES: &str = "DP05_0001E,DP05_0002E,DP05_0003E,DP05_0018E";

/// Zip-level demographic figures parsed from the ACS profile response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    pub total_population: Option<u64>,
    pub male_population: Option<u64>,
    pub female_population: Option<u64>,
    pub median_age: Option<f64>,
}

/// HTTP client for the Census ACS 5-year profile API.
#[derive(Debug, Clone)]
pub struct CensusClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CensusClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DemographicsProvider for CensusClient {
    async fn demographics_for_zip(&self, zip_code: &str) -> Result<Demographics, ProviderError> {
        info!(%zip_code, "querying census demographics");

        let area = format!("zip code tabulation area:{zip_code}");
        let response = self
            .client
            .get(self.base_url.as_str())
            .query(&[
                ("get", PROFILE_VARIABLES),
                ("for", area.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ProviderError::Authentication),
            status if !status.is_success() => Err(ProviderError::Status(status.as_u16())),
            _ => {
                // The census API answers with a header row followed by one
                // value row, all strings or nulls.
                let rows: Vec<Vec<Option<String>>> = response
                    .json()
                    .await
                    .map_err(|err| ProviderError::UnexpectedPayload(err.to_string()))?;
                parse_profile(&rows)
            }
        }
    }
}

pub(crate) fn parse_profile(rows: &[Vec<Option<String>>]) -> Result<Demographics, ProviderError> {
    let (header, values) = match rows {
        [header, values, ..] => (header, values),
        _ => {
            return Err(ProviderError::UnexpectedPayload(
                "census response is missing the value row".to_string(),
            ))
        }
    };

    let field = |name: &str| {
        header
            .iter()
            .position(|column| column.as_deref() == Some(name))
            .and_then(|index| values.get(index))
            .and_then(|value| value.as_deref())
    };

    Ok(Demographics {
        total_population: field("DP05_0001E").and_then(|raw| raw.parse().ok()),
        male_population: field("DP05_0002E").and_then(|raw| raw.parse().ok()),
        female_population: field("DP05_0003E").and_then(|raw| raw.parse().ok()),
        median_age: field("DP05_0018E").and_then(|raw| raw.parse().ok()),
    })
}
