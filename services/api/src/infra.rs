use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

use shelter_signal::config::{ConfigError, ProvidersConfig};
use shelter_signal::error::AppError;
use shelter_signal::providers::{
    CensusClient, DemographicsProvider, GeminiClient, NarrativeSummarizer, PropertyProvider,
    RentcastClient,
};
use shelter_signal::valuation::ValuationModel;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) providers: Arc<Providers>,
    pub(crate) model: Arc<ValuationModel>,
}

/// The orchestrator's collaborator set. The property provider is
/// mandatory; the other two degrade to fallbacks when unconfigured.
pub(crate) struct Providers {
    pub(crate) property: Arc<dyn PropertyProvider>,
    pub(crate) demographics: Option<Arc<dyn DemographicsProvider>>,
    pub(crate) summarizer: Option<Arc<dyn NarrativeSummarizer>>,
}

pub(crate) fn build_providers(config: &ProvidersConfig) -> Result<Providers, AppError> {
    info!(
        rentcast = config.rentcast.is_some(),
        census = config.census.is_some(),
        gemini = config.gemini.is_some(),
        "provider credentials loaded"
    );

    let rentcast = config
        .rentcast
        .as_ref()
        .ok_or(ConfigError::MissingApiKey {
            provider: "Rentcast",
        })?;
    let property: Arc<dyn PropertyProvider> = Arc::new(RentcastClient::new(rentcast)?);

    let demographics: Option<Arc<dyn DemographicsProvider>> = match &config.census {
        Some(census) => Some(Arc::new(CensusClient::new(census)?)),
        None => {
            warn!("census API key missing; demographic data will be omitted");
            None
        }
    };

    let summarizer: Option<Arc<dyn NarrativeSummarizer>> = match &config.gemini {
        Some(gemini) => Some(Arc::new(GeminiClient::new(gemini)?)),
        None => {
            warn!("gemini API key missing; AI summaries are disabled");
            None
        }
    };

    Ok(Providers {
        property,
        demographics,
        summarizer,
    })
}
