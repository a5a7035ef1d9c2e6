use crate::infra::AppState;
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shelter_signal::error::AppError;
use shelter_signal::providers::{Demographics, PropertyRecord};
use shelter_signal::valuation::forecast::{MarketTrend, PredictionPoint};
use tracing::{error, info, warn};

const SUMMARY_DISABLED_MESSAGE: &str =
    "**AI Summary Generation Disabled:** API Key not configured.";
const SUMMARY_FAILED_MESSAGE: &str =
    "**AI Summary Generation Failed:** An error occurred while contacting the AI service.";

pub(crate) fn router() -> Router {
    Router::new()
        .route("/", get(root_status))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/property", get(property_endpoint))
}

#[derive(Debug, Deserialize)]
pub(crate) struct PropertyQuery {
    pub(crate) address: String,
}

/// A synthetic look-back point. Real history needs a data source the
/// service does not integrate yet, so the client chart is seeded with
/// fixed multipliers off the current estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct HistoricalValue {
    pub(crate) date: NaiveDate,
    pub(crate) value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PropertyDataResponse {
    pub(crate) address: String,
    #[serde(flatten)]
    pub(crate) property: PropertyRecord,
    pub(crate) predicted_value_next_year: Option<f64>,
    pub(crate) prediction_confidence: f64,
    pub(crate) predicted_rent_next_year: Option<f64>,
    pub(crate) market_trend: MarketTrend,
    pub(crate) trend_confidence: f64,
    pub(crate) historical_values: Vec<HistoricalValue>,
    pub(crate) prediction_points: Vec<PredictionPoint>,
    pub(crate) census_data: Option<Demographics>,
    pub(crate) ai_summary: String,
}

pub(crate) async fn root_status() -> Json<serde_json::Value> {
    Json(json!({ "message": "ShelterSignal Backend is running" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn property_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<PropertyQuery>,
) -> Result<Json<PropertyDataResponse>, AppError> {
    info!(address = %query.address, "received property request");
    let current_year = Local::now().year();
    let response = build_property_response(&state, &query.address, current_year).await?;
    info!(address = %query.address, "property request processed");
    Ok(Json(response))
}

/// Sequences the collaborators and assembles the combined response.
/// Only the property lookup can fail the request; demographics and the
/// AI summary degrade to absent/fallback values.
pub(crate) async fn build_property_response(
    state: &AppState,
    address: &str,
    current_year: i32,
) -> Result<PropertyDataResponse, AppError> {
    let records = state.providers.property.lookup(address).await?;
    let record = records.into_iter().next().ok_or(AppError::PropertyNotFound)?;

    let census_data = match (&record.zip_code, &state.providers.demographics) {
        (Some(zip_code), Some(provider)) => match provider.demographics_for_zip(zip_code).await {
            Ok(demographics) => Some(demographics),
            Err(err) => {
                warn!(%zip_code, %err, "census fetch failed; omitting demographics");
                None
            }
        },
        _ => None,
    };

    let valuation = state.model.compute(&record.attributes(), current_year);
    let bundle = state
        .model
        .project(valuation, record.zip_code.as_deref(), current_year);

    let ai_summary = match &state.providers.summarizer {
        Some(summarizer) => {
            match summarizer
                .summarize(&record, census_data.as_ref(), &bundle)
                .await
            {
                Ok(summary) => summary,
                Err(err) => {
                    error!(%err, "AI summary generation failed");
                    SUMMARY_FAILED_MESSAGE.to_string()
                }
            }
        }
        None => SUMMARY_DISABLED_MESSAGE.to_string(),
    };

    let historical_values = placeholder_history(
        record.value_estimate.unwrap_or(state.model.default_base_value),
        current_year,
    );

    Ok(PropertyDataResponse {
        address: address.to_string(),
        predicted_value_next_year: bundle.predicted_value_next_year,
        prediction_confidence: bundle.valuation.confidence,
        predicted_rent_next_year: bundle.predicted_rent_next_year,
        market_trend: bundle.trend.trend,
        trend_confidence: bundle.trend.confidence,
        historical_values,
        prediction_points: bundle.points,
        census_data,
        ai_summary,
        property: record,
    })
}

fn placeholder_history(base_value: f64, current_year: i32) -> Vec<HistoricalValue> {
    let point = |year: i32, month: u32, multiplier: f64| HistoricalValue {
        date: NaiveDate::from_ymd_opt(year, month, 1).expect("valid history date"),
        value: base_value * multiplier,
    };

    vec![
        point(current_year - 2, 1, 0.9),
        point(current_year - 2, 7, 0.95),
        point(current_year - 1, 1, 1.0),
        point(current_year - 1, 7, 1.02),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::Providers;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use shelter_signal::providers::{
        DemographicsProvider, NarrativeSummarizer, PropertyProvider, ProviderError,
    };
    use shelter_signal::valuation::forecast::PredictionBundle;
    use shelter_signal::valuation::ValuationModel;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    const YEAR: i32 = 2024;

    struct StubPropertyProvider {
        records: Vec<PropertyRecord>,
    }

    #[async_trait]
    impl PropertyProvider for StubPropertyProvider {
        async fn lookup(&self, _address: &str) -> Result<Vec<PropertyRecord>, ProviderError> {
            Ok(self.records.clone())
        }
    }

    struct StubDemographicsProvider {
        fail: bool,
    }

    #[async_trait]
    impl DemographicsProvider for StubDemographicsProvider {
        async fn demographics_for_zip(
            &self,
            _zip_code: &str,
        ) -> Result<Demographics, ProviderError> {
            if self.fail {
                return Err(ProviderError::Status(500));
            }
            Ok(Demographics {
                total_population: Some(28_867),
                male_population: Some(13_956),
                female_population: Some(14_911),
                median_age: Some(38.2),
            })
        }
    }

    struct StubSummarizer {
        fail: bool,
    }

    #[async_trait]
    impl NarrativeSummarizer for StubSummarizer {
        async fn summarize(
            &self,
            _property: &PropertyRecord,
            _demographics: Option<&Demographics>,
            _predictions: &PredictionBundle,
        ) -> Result<String, ProviderError> {
            if self.fail {
                return Err(ProviderError::Status(503));
            }
            Ok("## Property Overview".to_string())
        }
    }

    fn manhattan_record() -> PropertyRecord {
        PropertyRecord {
            id: Some("prop-1".to_string()),
            formatted_address: Some("123 Main St, New York, NY 10013".to_string()),
            bedrooms: Some(2),
            bathrooms: Some(1.5),
            square_footage: Some(980.0),
            year_built: Some(1962),
            property_type: Some("Condo".to_string()),
            value_estimate: Some(825_000.0),
            rent_estimate: Some(3_900.0),
            zip_code: Some("10013".to_string()),
            ..PropertyRecord::default()
        }
    }

    fn state_with(providers: Providers) -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(recorder.handle()),
            providers: Arc::new(providers),
            model: Arc::new(ValuationModel::default()),
        }
    }

    fn full_stub_state(records: Vec<PropertyRecord>) -> AppState {
        state_with(Providers {
            property: Arc::new(StubPropertyProvider { records }),
            demographics: Some(Arc::new(StubDemographicsProvider { fail: false })),
            summarizer: Some(Arc::new(StubSummarizer { fail: false })),
        })
    }

    #[tokio::test]
    async fn assembles_all_sections_of_the_response() {
        let state = full_stub_state(vec![manhattan_record()]);
        let response = build_property_response(&state, "123 Main St", YEAR)
            .await
            .expect("response builds");

        assert_eq!(response.address, "123 Main St");
        assert_eq!(response.prediction_points.len(), 4);
        assert_eq!(
            response.predicted_value_next_year,
            Some(response.prediction_points[1].value)
        );
        assert_eq!(response.market_trend, MarketTrend::Increasing);
        assert_eq!(response.trend_confidence, 0.80);
        assert_eq!(response.predicted_rent_next_year, None);
        assert_eq!(response.historical_values.len(), 4);
        let census = response.census_data.expect("demographics present");
        assert_eq!(census.total_population, Some(28_867));
        assert_eq!(response.ai_summary, "## Property Overview");
    }

    #[tokio::test]
    async fn response_serializes_with_camel_case_wire_names() {
        let state = full_stub_state(vec![manhattan_record()]);
        let response = build_property_response(&state, "123 Main St", YEAR)
            .await
            .expect("response builds");

        let value = serde_json::to_value(&response).expect("serializes");
        assert_eq!(value["formattedAddress"], "123 Main St, New York, NY 10013");
        assert!(value["predictedValueNextYear"].is_number());
        assert_eq!(value["marketTrend"], "Increasing");
        assert_eq!(value["predictedRentNextYear"], serde_json::Value::Null);
        assert_eq!(value["predictionPoints"][0]["date"], "2024-01-01");
        assert_eq!(value["censusData"]["medianAge"], 38.2);
    }

    #[tokio::test]
    async fn empty_lookup_maps_to_property_not_found() {
        let state = full_stub_state(Vec::new());
        let err = build_property_response(&state, "nowhere", YEAR)
            .await
            .expect_err("lookup finds nothing");
        assert!(matches!(err, AppError::PropertyNotFound));
    }

    #[tokio::test]
    async fn census_failure_degrades_to_missing_demographics() {
        let state = state_with(Providers {
            property: Arc::new(StubPropertyProvider {
                records: vec![manhattan_record()],
            }),
            demographics: Some(Arc::new(StubDemographicsProvider { fail: true })),
            summarizer: Some(Arc::new(StubSummarizer { fail: false })),
        });

        let response = build_property_response(&state, "123 Main St", YEAR)
            .await
            .expect("response still builds");
        assert!(response.census_data.is_none());
    }

    #[tokio::test]
    async fn summarizer_failure_falls_back_to_fixed_message() {
        let state = state_with(Providers {
            property: Arc::new(StubPropertyProvider {
                records: vec![manhattan_record()],
            }),
            demographics: None,
            summarizer: Some(Arc::new(StubSummarizer { fail: true })),
        });

        let response = build_property_response(&state, "123 Main St", YEAR)
            .await
            .expect("response still builds");
        assert_eq!(response.ai_summary, SUMMARY_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn missing_summarizer_reports_disabled() {
        let state = state_with(Providers {
            property: Arc::new(StubPropertyProvider {
                records: vec![manhattan_record()],
            }),
            demographics: None,
            summarizer: None,
        });

        let response = build_property_response(&state, "123 Main St", YEAR)
            .await
            .expect("response still builds");
        assert_eq!(response.ai_summary, SUMMARY_DISABLED_MESSAGE);
    }

    #[tokio::test]
    async fn root_endpoint_returns_the_status_message() {
        let app = router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("handler responds");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["message"], "ShelterSignal Backend is running");
    }

    #[test]
    fn placeholder_history_spans_the_two_prior_years() {
        let history = placeholder_history(550_000.0, 2024);
        assert_eq!(history.len(), 4);
        assert_eq!(
            history[0].date,
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
        );
        assert_eq!(history[0].value, 495_000.0);
        assert_eq!(
            history[3].date,
            NaiveDate::from_ymd_opt(2023, 7, 1).unwrap()
        );
        assert_eq!(history[3].value, 561_000.0);
    }
}
