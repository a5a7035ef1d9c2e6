use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{PropertyProvider, ProviderError};
use crate::config::ProviderConfig;
use crate::valuation::PropertyAttributes;

/// One property record as returned by the Rentcast `/properties` endpoint.
/// The wire format is camelCase; every field is optional because the
/// upstream omits whatever it does not know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyRecord {
    pub id: Option<String>,
    pub formatted_address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f64>,
    pub square_footage: Option<f64>,
    pub lot_size: Option<f64>,
    pub year_built: Option<i32>,
    pub property_type: Option<String>,
    pub description: Option<String>,
    pub value_estimate: Option<f64>,
    pub value_estimate_low: Option<f64>,
    pub value_estimate_high: Option<f64>,
    pub rent_estimate: Option<f64>,
    pub rent_estimate_low: Option<f64>,
    pub rent_estimate_high: Option<f64>,
    pub last_sold_date: Option<String>,
    pub last_sold_price: Option<f64>,
    // Some upstream payloads spell this all-lowercase.
    #[serde(alias = "zipcode")]
    pub zip_code: Option<String>,
}

impl PropertyRecord {
    /// Narrows the record down to the fields the valuation model reads.
    pub fn attributes(&self) -> PropertyAttributes {
        PropertyAttributes {
            value_estimate: self.value_estimate,
            square_footage: self.square_footage,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            year_built: self.year_built,
            zip_code: self.zip_code.clone(),
            property_type: self.property_type.clone(),
            formatted_address: self.formatted_address.clone(),
        }
    }
}

/// HTTP client for the Rentcast property-data API.
#[derive(Debug, Clone)]
pub struct RentcastClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl RentcastClient {
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
impl PropertyProvider for RentcastClient {
    async fn lookup(&self, address: &str) -> Result<Vec<PropertyRecord>, ProviderError> {
        let url = format!("{}/properties", self.base_url);
        info!(%address, "querying property records");

        let response = self
            .client
            .get(url.as_str())
            .header("X-Api-Key", &self.api_key)
            .header(ACCEPT, "application/json")
            .query(&[("address", address)])
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ProviderError::Authentication),
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound),
            status if !status.is_success() => Err(ProviderError::Status(status.as_u16())),
            _ => {
                let records: Vec<PropertyRecord> = response
                    .json()
                    .await
                    .map_err(|err| ProviderError::UnexpectedPayload(err.to_string()))?;
                info!(count = records.len(), "property lookup succeeded");
                Ok(records)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_parses_camel_case_and_zipcode_alias() {
        let raw = r#"{
            "id": "prop-1",
            "formattedAddress": "123 Main St, New York, NY 10013",
            "bedrooms": 2,
            "bathrooms": 1.5,
            "squareFootage": 980,
            "yearBuilt": 1962,
            "propertyType": "Condo",
            "valueEstimate": 825000,
            "zipcode": "10013"
        }"#;

        let record: PropertyRecord = serde_json::from_str(raw).expect("record parses");
        assert_eq!(record.zip_code.as_deref(), Some("10013"));
        assert_eq!(record.bathrooms, Some(1.5));
        assert_eq!(record.last_sold_price, None);
    }

    #[test]
    fn attributes_carry_only_model_inputs() {
        let record = PropertyRecord {
            value_estimate: Some(825_000.0),
            square_footage: Some(980.0),
            bedrooms: Some(2),
            zip_code: Some("10013".to_string()),
            rent_estimate: Some(3_900.0),
            latitude: Some(40.72),
            ..PropertyRecord::default()
        };

        let attributes = record.attributes();
        assert_eq!(attributes.value_estimate, Some(825_000.0));
        assert_eq!(attributes.zip_code.as_deref(), Some("10013"));
        assert_eq!(attributes.bedrooms, Some(2));
    }
}
