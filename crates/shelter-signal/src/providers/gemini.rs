use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{Demographics, NarrativeSummarizer, PropertyRecord, ProviderError};
use crate::config::ProviderConfig;
use crate::valuation::forecast::PredictionBundle;

const MODEL_NAME: &str = "gemini-1.5-flash";

/// Returned instead of prose when the upstream accepted the request but
/// produced no usable candidate (safety block, empty completion).
pub const SUMMARY_BLOCKED_MESSAGE: &str =
    "**AI Summary Generation Issue:** Content generation issue. Please review input data or try again later.";

/// HTTP client for the Generative Language API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl NarrativeSummarizer for GeminiClient {
    async fn summarize(
        &self,
        property: &PropertyRecord,
        demographics: Option<&Demographics>,
        predictions: &PredictionBundle,
    ) -> Result<String, ProviderError> {
        let prompt = build_summary_prompt(property, demographics, predictions);
        info!(
            address = property.formatted_address.as_deref().unwrap_or("unknown"),
            "requesting AI summary"
        );

        let url = format!(
            "{}/v1beta/models/{MODEL_NAME}:generateContent",
            self.base_url
        );
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(url.as_str())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ProviderError::Authentication),
            status if !status.is_success() => Err(ProviderError::Status(status.as_u16())),
            _ => {
                let body: GenerateContentResponse = response
                    .json()
                    .await
                    .map_err(|err| ProviderError::UnexpectedPayload(err.to_string()))?;

                match body.first_text() {
                    Some(text) => Ok(text.trim().to_string()),
                    None => {
                        warn!("summary response held no candidates; returning fallback text");
                        Ok(SUMMARY_BLOCKED_MESSAGE.to_string())
                    }
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .map(|part| part.text.as_str())
            .find(|text| !text.trim().is_empty())
    }
}

/// Renders the deterministic analysis prompt. Unknown fields surface as
/// `N/A` so the model is told about the limitation instead of left to
/// invent figures.
pub fn build_summary_prompt(
    property: &PropertyRecord,
    demographics: Option<&Demographics>,
    predictions: &PredictionBundle,
) -> String {
    let address = property
        .formatted_address
        .as_deref()
        .unwrap_or("the property");
    let property_type = property.property_type.as_deref().unwrap_or("N/A");
    let bedrooms = format_count(property.bedrooms.map(u64::from));
    let bathrooms = property
        .bathrooms
        .map(|baths| format!("{baths}"))
        .unwrap_or_else(|| "N/A".to_string());
    let square_footage = format_count(property.square_footage.map(|sqft| sqft as u64));
    let year_built = property
        .year_built
        .map(|year| year.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let zip_code = property.zip_code.as_deref().unwrap_or("N/A");

    let value_estimate = format_money(property.value_estimate);
    let rent_estimate = match property.rent_estimate {
        Some(rent) => format!("{}/mo", format_money(Some(rent))),
        None => "N/A".to_string(),
    };

    let predicted_value = format_money(predictions.predicted_value_next_year);
    let trend = predictions.trend.trend.label();
    let prediction_confidence = format!("{:.0}%", predictions.valuation.confidence * 100.0);

    let population = format_count(demographics.and_then(|data| data.total_population));
    let median_age = demographics
        .and_then(|data| data.median_age)
        .map(|age| format!("{age:.1}"))
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "Analyze the following real estate property data and generate a concise investment summary in Markdown format. \
Be informative but cautious, acting like a helpful real estate analysis assistant.

**Property Details:**
*   Address: {address}
*   Type: {property_type}
*   Bedrooms: {bedrooms}
*   Bathrooms: {bathrooms}
*   Square Footage: {square_footage} sqft
*   Year Built: {year_built}

**Current Market Data (Estimates):**
*   Estimated Value: {value_estimate}
*   Estimated Rent: {rent_estimate}

**Forecast & Prediction (1-Year Outlook):**
*   Predicted Value: {predicted_value}
*   Market Trend: {trend}
*   Prediction Confidence: {prediction_confidence}

**Location Context (Zip Code: {zip_code}):**
*   Total Population (Zip): {population}
*   Median Age (Zip): {median_age}

**Instructions:**
1.  Provide a brief **Property Overview**.
2.  Summarize the **Current Market Snapshot** based on estimates.
3.  Explain the **Future Outlook** based on the prediction.
4.  Briefly mention the **Location Context** using demographic data.
5.  Keep the tone professional and objective. Use Markdown for structure (bolding, bullet points).
6.  Include a short disclaimer at the end stating this is AI-generated analysis and not financial advice.
7.  Do not invent data not provided above. If data is 'N/A', acknowledge the limitation."
    )
}

fn format_money(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("${}", group_thousands(value.round() as i64)),
        None => "N/A".to_string(),
    }
}

fn format_count(value: Option<u64>) -> String {
    match value {
        Some(value) => group_thousands(value as i64),
        None => "N/A".to_string(),
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
