use chrono::NaiveDate;
use serde::Serialize;

use super::{round2, ValuationModel, ValuationResult};

/// One point on the forecast chart. Dates are always January 1st of the
/// year in question; the first point carries the unappreciated base value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Coarse market direction derived from the location factor alone, not
/// from historical series analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarketTrend {
    Increasing,
    Stable,
}

impl MarketTrend {
    pub fn label(&self) -> &'static str {
        match self {
            MarketTrend::Increasing => "Increasing",
            MarketTrend::Stable => "Stable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendClassification {
    pub trend: MarketTrend,
    pub confidence: f64,
}

/// Everything the orchestrator needs from the core: the valuation itself,
/// the forecast series, the trend call, and the headline next-year figure.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionBundle {
    pub valuation: ValuationResult,
    pub points: Vec<PredictionPoint>,
    pub trend: TrendClassification,
    pub predicted_value_next_year: Option<f64>,
    /// Rent forecasting needs its own model; until one exists this is
    /// always `None`.
    pub predicted_rent_next_year: Option<f64>,
}

impl ValuationModel {
    /// Extends a valuation into a `horizon_years`-long forecast and
    /// classifies the market trend for the property's zip code.
    ///
    /// Pure and infallible: the anchor year is injected, appreciation is a
    /// fixed cumulative rate, and every zip resolves to a factor.
    pub fn project(
        &self,
        valuation: ValuationResult,
        zip_code: Option<&str>,
        current_year: i32,
    ) -> PredictionBundle {
        let mut points = Vec::with_capacity(self.horizon_years as usize + 1);
        let mut value = valuation.base_value;

        points.push(PredictionPoint {
            date: january_first(current_year),
            value: value.round(),
        });

        for offset in 1..=self.horizon_years {
            value *= 1.0 + self.annual_appreciation;
            points.push(PredictionPoint {
                date: january_first(current_year + offset as i32),
                value: value.round(),
            });
        }

        let trend = self.classify_trend(zip_code);
        // The headline figure is the first appreciated point. The horizon is
        // fixed, but a degenerate series must still degrade to None.
        let predicted_value_next_year = points.get(1).map(|point| point.value);

        PredictionBundle {
            valuation,
            points,
            trend,
            predicted_value_next_year,
            predicted_rent_next_year: None,
        }
    }

    fn classify_trend(&self, zip_code: Option<&str>) -> TrendClassification {
        let factor = self.location_factor(zip_code);
        let (trend, confidence) = if factor < 0.95 {
            (MarketTrend::Stable, 0.60)
        } else if factor > 1.2 {
            (MarketTrend::Increasing, 0.80)
        } else {
            (MarketTrend::Increasing, 0.70)
        };

        TrendClassification {
            trend,
            confidence: round2(confidence),
        }
    }
}

fn january_first(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).expect("january 1st exists for every representable year")
}
