use chrono::NaiveDate;
use shelter_signal::valuation::forecast::MarketTrend;
use shelter_signal::valuation::{PropertyAttributes, ValuationModel};

const YEAR: i32 = 2024;

#[test]
fn bare_attributes_produce_the_default_valuation_and_forecast() {
    let model = ValuationModel::default();
    let valuation = model.compute(&PropertyAttributes::default(), YEAR);
    assert_eq!(valuation.base_value, 550_000.0);
    assert_eq!(valuation.confidence, 0.50);

    let bundle = model.project(valuation, None, YEAR);
    assert_eq!(bundle.points.len(), 4);
    assert_eq!(
        bundle.points[0].date,
        NaiveDate::from_ymd_opt(YEAR, 1, 1).expect("valid anchor date")
    );
    assert_eq!(bundle.points[0].value, 550_000.0);
    assert_eq!(bundle.predicted_value_next_year, Some(572_000.0));
    assert_eq!(bundle.trend.trend, MarketTrend::Increasing);
    assert_eq!(bundle.trend.confidence, 0.70);
    assert_eq!(bundle.predicted_rent_next_year, None);
}

#[test]
fn manhattan_condo_flows_through_valuation_into_trend() {
    let model = ValuationModel::default();
    let attributes = PropertyAttributes {
        value_estimate: Some(900_000.0),
        square_footage: Some(1_100.0),
        bedrooms: Some(2),
        bathrooms: Some(2.0),
        year_built: Some(1985),
        zip_code: Some("10005".to_string()),
        property_type: Some("Condo".to_string()),
        formatted_address: Some("1 Wall St, New York, NY 10005".to_string()),
    };

    let valuation = model.compute(&attributes, YEAR);
    assert!(valuation.base_value >= 50_000.0);
    assert!(valuation.confidence > 0.75, "every signal corroborates");
    assert!(valuation.confidence <= 0.95);

    let bundle = model.project(valuation, attributes.zip_code.as_deref(), YEAR);
    assert_eq!(bundle.trend.trend, MarketTrend::Increasing);
    assert_eq!(bundle.trend.confidence, 0.80);

    // Chronological and strictly appreciating past the anchor.
    for pair in bundle.points.windows(2) {
        assert!(pair[0].date < pair[1].date);
        assert!(pair[0].value < pair[1].value);
    }
}

#[test]
fn bounds_hold_across_a_spread_of_inputs() {
    let model = ValuationModel::default();
    let cases = [
        PropertyAttributes::default(),
        PropertyAttributes {
            value_estimate: Some(10_000.0),
            bedrooms: Some(1),
            bathrooms: Some(1.0),
            year_built: Some(1810),
            zip_code: Some("10309".to_string()),
            property_type: Some("Multi Family".to_string()),
            ..PropertyAttributes::default()
        },
        PropertyAttributes {
            value_estimate: Some(25_000_000.0),
            square_footage: Some(20_000.0),
            bedrooms: Some(9),
            bathrooms: Some(7.0),
            year_built: Some(2023),
            zip_code: Some("10013".to_string()),
            property_type: Some("Single Family".to_string()),
            ..PropertyAttributes::default()
        },
    ];

    for attributes in cases {
        let valuation = model.compute(&attributes, YEAR);
        assert!(valuation.base_value >= 50_000.0, "{attributes:?}");
        assert!(
            (0.50..=0.95).contains(&valuation.confidence),
            "{attributes:?}"
        );
    }
}

#[test]
fn substituted_tables_change_both_valuation_and_trend() {
    let mut model = ValuationModel::default();
    model.location_factors.clear();
    model
        .location_factors
        .insert("50310".to_string(), 0.90);

    let attributes = PropertyAttributes {
        value_estimate: Some(300_000.0),
        zip_code: Some("50310".to_string()),
        ..PropertyAttributes::default()
    };

    let valuation = model.compute(&attributes, YEAR);
    assert_eq!(valuation.base_value, 270_000.0);
    assert_eq!(valuation.confidence, 0.80);

    let bundle = model.project(valuation, attributes.zip_code.as_deref(), YEAR);
    assert_eq!(bundle.trend.trend, MarketTrend::Stable);
    assert_eq!(bundle.trend.confidence, 0.60);
}
