pub mod census;
pub mod gemini;
pub mod rentcast;

pub use census::{CensusClient, Demographics};
pub use gemini::GeminiClient;
pub use rentcast::{PropertyRecord, RentcastClient};

use crate::valuation::forecast::PredictionBundle;
use async_trait::async_trait;

/// Errors surfaced by the upstream provider clients. The orchestrator maps
/// these onto HTTP statuses at the edge; the census and summary providers
/// are additionally downgraded to fallbacks there rather than propagated.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("upstream rejected the configured credentials")]
    Authentication,
    #[error("no results for the requested input")]
    NotFound,
    #[error("upstream returned http status {0}")]
    Status(u16),
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected upstream payload: {0}")]
    UnexpectedPayload(String),
}

/// Resolves a street address to raw property records.
#[async_trait]
pub trait PropertyProvider: Send + Sync {
    async fn lookup(&self, address: &str) -> Result<Vec<PropertyRecord>, ProviderError>;
}

/// Fetches zip-code-level demographic figures.
#[async_trait]
pub trait DemographicsProvider: Send + Sync {
    async fn demographics_for_zip(&self, zip_code: &str) -> Result<Demographics, ProviderError>;
}

/// Turns structured property data into a prose investment summary.
#[async_trait]
pub trait NarrativeSummarizer: Send + Sync {
    async fn summarize(
        &self,
        property: &PropertyRecord,
        demographics: Option<&Demographics>,
        predictions: &PredictionBundle,
    ) -> Result<String, ProviderError>;
}
