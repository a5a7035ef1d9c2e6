pub mod forecast;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Attributes describing a single property, as resolved by the upstream
/// data providers. Every field is optional: absence means "unknown", never
/// zero, and an unknown field simply skips its adjustment in the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyAttributes {
    pub value_estimate: Option<f64>,
    pub square_footage: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f64>,
    pub year_built: Option<i32>,
    pub zip_code: Option<String>,
    pub property_type: Option<String>,
    pub formatted_address: Option<String>,
}

/// Outcome of the heuristic model: a dollar estimate and how much the model
/// trusts it. `base_value` is floored at 50,000 and `confidence` is clamped
/// to [0.50, 0.95].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValuationResult {
    pub base_value: f64,
    pub confidence: f64,
}

const CONFIDENCE_FLOOR: f64 = 0.50;
const CONFIDENCE_CEILING: f64 = 0.95;
/// Signal-driven bumps (sqft, beds, baths, age) never push past this;
/// only a recognized location factor can reach the ceiling.
const SIGNAL_CONFIDENCE_CAP: f64 = 0.90;

const BASE_VALUE_FLOOR: f64 = 50_000.0;
const SQFT_PLAUSIBLE_LOW: f64 = 200_000.0;
const SQFT_PLAUSIBLE_HIGH: f64 = 10_000_000.0;

/// Deterministic, explainable scoring model. The tables and constants are
/// plain data so tests and callers can substitute alternates instead of
/// relying on module globals.
#[derive(Debug, Clone)]
pub struct ValuationModel {
    /// Seed value when no upstream estimate is available.
    pub default_base_value: f64,
    /// Dollar value per square foot used for the cross-check estimate.
    pub sqft_unit_value: f64,
    /// Dollar step per bedroom away from the three-bedroom baseline.
    pub bedroom_step: f64,
    /// Dollar step per bathroom away from the two-bathroom baseline.
    pub bathroom_step: f64,
    /// Value lost per year of age, floored at `age_factor_floor`.
    pub depreciation_rate: f64,
    pub age_factor_floor: f64,
    /// Multiplier per property type category; unrecognized types get 1.0.
    pub property_type_factors: HashMap<String, f64>,
    /// Multiplier per zip code; unrecognized zips get 1.0.
    pub location_factors: HashMap<String, f64>,
    /// Years of forecast points generated past the anchor.
    pub horizon_years: u32,
    /// Cumulative annual appreciation applied to forecast points.
    pub annual_appreciation: f64,
}

impl Default for ValuationModel {
    fn default() -> Self {
        let property_type_factors = [
            ("Single Family", 1.05),
            ("Condo", 1.0),
            ("Townhouse", 1.02),
            ("Multi Family", 0.95),
            ("Apartment", 1.0),
        ]
        .into_iter()
        .map(|(key, factor)| (key.to_string(), factor))
        .collect();

        // NYC zips grouped by borough: Manhattan, Brooklyn, Queens, Bronx,
        // Staten Island.
        let location_factors = [
            ("10005", 1.3),
            ("10013", 1.4),
            ("10019", 1.25),
            ("10128", 1.2),
            ("11201", 1.2),
            ("11211", 1.15),
            ("11215", 1.1),
            ("11243", 1.1),
            ("11102", 1.0),
            ("11375", 1.05),
            ("11104", 0.98),
            ("10463", 0.95),
            ("10471", 1.0),
            ("10301", 0.9),
            ("10309", 0.85),
        ]
        .into_iter()
        .map(|(zip, factor)| (zip.to_string(), factor))
        .collect();

        Self {
            default_base_value: 550_000.0,
            sqft_unit_value: 650.0,
            bedroom_step: 35_000.0,
            bathroom_step: 20_000.0,
            depreciation_rate: 0.001,
            age_factor_floor: 0.85,
            property_type_factors,
            location_factors,
            horizon_years: 3,
            annual_appreciation: 0.04,
        }
    }
}

impl ValuationModel {
    /// Runs the full adjustment pipeline over the supplied attributes.
    ///
    /// The steps execute in a fixed order because the square-footage
    /// cross-check blends against the seeded value; every later step is an
    /// independent additive or multiplicative nudge. `current_year` is
    /// injected rather than read from the clock so results are
    /// deterministic under test.
    pub fn compute(&self, attributes: &PropertyAttributes, current_year: i32) -> ValuationResult {
        let running = self.seed(attributes);
        let running = self.cross_check_square_footage(running, attributes);
        let running = self.adjust_bedrooms(running, attributes);
        let running = self.adjust_bathrooms(running, attributes);
        let running = self.depreciate_for_age(running, attributes, current_year);
        let running = self.apply_property_type(running, attributes);
        let running = self.apply_location(running, attributes);
        floor_and_clamp(running)
    }

    /// Resolves the location multiplier for a zip code, falling back to the
    /// neutral 1.0 when the zip is absent or unrecognized.
    pub fn location_factor(&self, zip_code: Option<&str>) -> f64 {
        zip_code
            .and_then(|zip| self.location_factors.get(zip).copied())
            .unwrap_or(1.0)
    }

    fn seed(&self, attributes: &PropertyAttributes) -> ValuationResult {
        match attributes.value_estimate {
            Some(estimate) => ValuationResult {
                base_value: estimate,
                confidence: 0.75,
            },
            None => ValuationResult {
                base_value: self.default_base_value,
                confidence: CONFIDENCE_FLOOR,
            },
        }
    }

    fn cross_check_square_footage(
        &self,
        running: ValuationResult,
        attributes: &PropertyAttributes,
    ) -> ValuationResult {
        let sqft = match attributes.square_footage {
            Some(sqft) if sqft > 100.0 => sqft,
            _ => return running,
        };

        let sqft_estimate = sqft * self.sqft_unit_value;
        if attributes.value_estimate.is_some() {
            return ValuationResult {
                base_value: running.base_value * 0.7 + sqft_estimate * 0.3,
                confidence: bump(running.confidence, 0.05, SIGNAL_CONFIDENCE_CAP),
            };
        }

        // Without a prior estimate, adopt the per-sqft figure only when it
        // lands in a plausible band; otherwise keep the default seed.
        if sqft_estimate > SQFT_PLAUSIBLE_LOW && sqft_estimate < SQFT_PLAUSIBLE_HIGH {
            ValuationResult {
                base_value: sqft_estimate,
                confidence: 0.60,
            }
        } else {
            running
        }
    }

    fn adjust_bedrooms(
        &self,
        running: ValuationResult,
        attributes: &PropertyAttributes,
    ) -> ValuationResult {
        match attributes.bedrooms {
            Some(bedrooms) if bedrooms > 0 => ValuationResult {
                base_value: running.base_value + (bedrooms as f64 - 3.0) * self.bedroom_step,
                confidence: bump(running.confidence, 0.02, SIGNAL_CONFIDENCE_CAP),
            },
            _ => running,
        }
    }

    fn adjust_bathrooms(
        &self,
        running: ValuationResult,
        attributes: &PropertyAttributes,
    ) -> ValuationResult {
        match attributes.bathrooms {
            Some(bathrooms) if bathrooms > 0.0 => ValuationResult {
                base_value: running.base_value + (bathrooms - 2.0) * self.bathroom_step,
                confidence: bump(running.confidence, 0.01, SIGNAL_CONFIDENCE_CAP),
            },
            _ => running,
        }
    }

    fn depreciate_for_age(
        &self,
        running: ValuationResult,
        attributes: &PropertyAttributes,
        current_year: i32,
    ) -> ValuationResult {
        let year_built = match attributes.year_built {
            Some(year) if year > 1800 && year <= current_year => year,
            _ => return running,
        };

        let age = f64::from(current_year - year_built);
        let age_factor = (1.0 - age * self.depreciation_rate).max(self.age_factor_floor);
        ValuationResult {
            base_value: running.base_value * age_factor,
            confidence: bump(running.confidence, 0.02, SIGNAL_CONFIDENCE_CAP),
        }
    }

    fn apply_property_type(
        &self,
        running: ValuationResult,
        attributes: &PropertyAttributes,
    ) -> ValuationResult {
        let factor = attributes
            .property_type
            .as_deref()
            .and_then(|kind| self.property_type_factors.get(kind).copied())
            .unwrap_or(1.0);

        ValuationResult {
            base_value: running.base_value * factor,
            confidence: running.confidence,
        }
    }

    fn apply_location(
        &self,
        running: ValuationResult,
        attributes: &PropertyAttributes,
    ) -> ValuationResult {
        let factor = self.location_factor(attributes.zip_code.as_deref());
        let confidence = if factor == 1.0 {
            running.confidence
        } else {
            bump(running.confidence, 0.05, CONFIDENCE_CEILING)
        };

        ValuationResult {
            base_value: running.base_value * factor,
            confidence,
        }
    }
}

fn bump(confidence: f64, by: f64, cap: f64) -> f64 {
    (confidence + by).min(cap)
}

fn floor_and_clamp(running: ValuationResult) -> ValuationResult {
    let confidence = running.confidence.clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING);
    ValuationResult {
        base_value: running.base_value.max(BASE_VALUE_FLOOR),
        confidence: round2(confidence),
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
