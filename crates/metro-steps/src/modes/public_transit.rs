//! Preferencias y tiempos de viaje del modo transporte público.

use indexmap::IndexMap;
use metro_core::{
    random_seed_parameter,
    sampling::{generate_duration_values, generate_values},
    DistributionValue, FileSpec, InputSpec, ParamValue, Parameter, PipelineStep, Result,
    StepContext, Validator,
};
use polars::prelude::*;

use super::files::{PUBLIC_TRANSIT_PREFERENCES, PUBLIC_TRANSIT_TRAVEL_TIMES};
use crate::frame::{duration_series, str_column};
use crate::population::{PERSONS, TRIPS};

fn zero_constant() -> ParamValue {
    ParamValue::Distribution(DistributionValue::Constant(Box::new(ParamValue::Float(0.0))))
}

/// Genera los parámetros de preferencia para viajar en transporte público,
/// por persona.
pub struct PublicTransitPreferencesStep;

impl PipelineStep for PublicTransitPreferencesStep {
    fn name(&self) -> &'static str {
        "PublicTransitPreferencesStep"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            random_seed_parameter(),
            Parameter::new(
                "constant",
                "modes.public_transit.constant",
                Validator::distribution(Validator::Float),
            )
            .with_default(zero_constant())
            .with_description("Constant penalty for each trip in public transit (€)."),
            Parameter::new(
                "value_of_time",
                "modes.public_transit.alpha",
                Validator::distribution(Validator::Float),
            )
            .with_default(zero_constant())
            .with_description("Value of time in public transit (€/h)."),
        ]
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([("persons", InputSpec::required(&*PERSONS))])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("public_transit_preferences", &*PUBLIC_TRANSIT_PREFERENCES)])
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let persons = ctx.input("persons").read_dataframe()?;
        let person_ids = str_column(&persons, "person_id")?;
        let n = person_ids.len();
        let mut rng = ctx.rng();
        let constant = ctx
            .require("constant")?
            .as_distribution()
            .cloned()
            .unwrap_or(DistributionValue::Constant(Box::new(ParamValue::Float(0.0))));
        let value_of_time = ctx
            .require("value_of_time")?
            .as_distribution()
            .cloned()
            .unwrap_or(DistributionValue::Constant(Box::new(ParamValue::Float(0.0))));
        let cst = generate_values(&constant, n, &mut rng)?;
        let vot = generate_values(&value_of_time, n, &mut rng)?;
        let df = DataFrame::new(vec![
            Series::new("person_id", person_ids.iter().map(String::as_str).collect::<Vec<_>>()),
            Series::new("public_transit_cst", cst),
            Series::new("public_transit_vot", vot),
        ])?;
        ctx.output("public_transit_preferences").write_dataframe(df)
    }
}

/// Genera el tiempo de viaje en transporte público de cada viaje, constante u
/// obtenido de una distribución de duraciones.
pub struct PublicTransitTravelTimesStep;

impl PipelineStep for PublicTransitTravelTimesStep {
    fn name(&self) -> &'static str {
        "PublicTransitTravelTimesStep"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            random_seed_parameter(),
            Parameter::new(
                "travel_time",
                "modes.public_transit.travel_time",
                Validator::distribution_with(
                    Validator::Duration,
                    Validator::Duration,
                    Validator::Duration,
                ),
            )
            .with_description("Duration of the trips by public transit.")
            .with_example("`{ mean = 1800, std = 600, distribution = \"Normal\" }`"),
        ]
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([("trips", InputSpec::required(&*TRIPS))])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("public_transit_travel_times", &*PUBLIC_TRANSIT_TRAVEL_TIMES)])
    }

    fn is_defined(&self, ctx: &StepContext) -> bool {
        ctx.has_param("travel_time")
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let trips = ctx.input("trips").read_dataframe()?;
        let trip_ids = str_column(&trips, "trip_id")?;
        let travel_time = ctx.require("travel_time")?.as_distribution().cloned().ok_or_else(
            || metro_core::MetroError::Runtime("`travel_time` is not a distribution".to_string()),
        )?;
        let mut rng = ctx.rng();
        let values = generate_duration_values(&travel_time, trip_ids.len(), &mut rng)?;
        let df = DataFrame::new(vec![
            Series::new("trip_id", trip_ids.iter().map(String::as_str).collect::<Vec<_>>()),
            duration_series("public_transit_travel_time", &values)?,
        ])?;
        ctx.output("public_transit_travel_times").write_dataframe(df)
    }
}
