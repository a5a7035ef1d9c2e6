use chrono::{Datelike, Local};
use clap::Args;
use shelter_signal::error::AppError;
use shelter_signal::valuation::{PropertyAttributes, ValuationModel};

#[derive(Args, Debug, Default)]
pub(crate) struct PredictArgs {
    /// Known value estimate in dollars
    #[arg(long)]
    pub(crate) value_estimate: Option<f64>,
    /// Living area in square feet
    #[arg(long)]
    pub(crate) square_footage: Option<f64>,
    /// Bedroom count
    #[arg(long)]
    pub(crate) bedrooms: Option<u32>,
    /// Bathroom count (halves allowed)
    #[arg(long)]
    pub(crate) bathrooms: Option<f64>,
    /// Construction year
    #[arg(long)]
    pub(crate) year_built: Option<i32>,
    /// Zip code used for the location factor and trend
    #[arg(long)]
    pub(crate) zip_code: Option<String>,
    /// Property type category (e.g. "Single Family", "Condo")
    #[arg(long)]
    pub(crate) property_type: Option<String>,
    /// Anchor year for the forecast (defaults to the current year)
    #[arg(long)]
    pub(crate) year: Option<i32>,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let current_year = args.year.unwrap_or_else(|| Local::now().year());
    let attributes = attributes_from(&args);

    let model = ValuationModel::default();
    let valuation = model.compute(&attributes, current_year);
    let bundle = model.project(valuation, attributes.zip_code.as_deref(), current_year);

    println!("Heuristic valuation");
    println!(
        "Base value: ${:.0} (confidence {:.2})",
        valuation.base_value, valuation.confidence
    );

    println!("\nForecast ({}% annual appreciation)", model.annual_appreciation * 100.0);
    for point in &bundle.points {
        println!("- {}: ${:.0}", point.date, point.value);
    }

    match bundle.predicted_value_next_year {
        Some(value) => println!("\nNext-year prediction: ${value:.0}"),
        None => println!("\nNext-year prediction: unavailable"),
    }
    println!(
        "Market trend: {} (confidence {:.2})",
        bundle.trend.trend.label(),
        bundle.trend.confidence
    );

    Ok(())
}

fn attributes_from(args: &PredictArgs) -> PropertyAttributes {
    PropertyAttributes {
        value_estimate: args.value_estimate,
        square_footage: args.square_footage,
        bedrooms: args.bedrooms,
        bathrooms: args.bathrooms,
        year_built: args.year_built,
        zip_code: args.zip_code.clone(),
        property_type: args.property_type.clone(),
        formatted_address: None,
    }
}
