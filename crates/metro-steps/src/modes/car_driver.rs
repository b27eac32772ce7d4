//! Preferencias y distancias del modo auto.

use std::collections::HashMap;

use indexmap::IndexMap;
use metro_core::{
    random_seed_parameter, sampling::generate_values, DistributionValue, FileSpec, InputSpec,
    ParamValue, Parameter, PipelineStep, Result, StepContext, Validator,
};
use polars::prelude::*;

use super::files::{CAR_DRIVER_DISTANCES, CAR_DRIVER_ODS, CAR_DRIVER_PREFERENCES};
use crate::frame::{f64_column, str_column};
use crate::population::PERSONS;
use crate::road_network::ALL_DISTANCES;

fn zero_constant() -> ParamValue {
    ParamValue::Distribution(zero_distribution())
}

fn zero_distribution() -> DistributionValue {
    DistributionValue::Constant(Box::new(ParamValue::Float(0.0)))
}

/// Genera los parámetros de preferencia para viajar como conductor, por
/// persona: una constante por viaje y un valor del tiempo, constantes u
/// obtenidos de una distribución.
pub struct CarDriverPreferencesStep;

impl PipelineStep for CarDriverPreferencesStep {
    fn name(&self) -> &'static str {
        "CarDriverPreferencesStep"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            random_seed_parameter(),
            Parameter::new("constant", "modes.car_driver.constant", Validator::distribution(Validator::Float))
                .with_default(zero_constant())
                .with_description("Constant penalty for each trip as a car driver (€)."),
            Parameter::new("value_of_time", "modes.car_driver.alpha", Validator::distribution(Validator::Float))
                .with_default(zero_constant())
                .with_description("Value of time as a car driver (€/h)."),
        ]
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([("persons", InputSpec::required(&*PERSONS))])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("car_driver_preferences", &*CAR_DRIVER_PREFERENCES)])
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
            .unwrap_or_else(zero_distribution);
        let value_of_time = ctx
            .require("value_of_time")?
            .as_distribution()
            .cloned()
            .unwrap_or_else(zero_distribution);
        let cst = generate_values(&constant, n, &mut rng)?;
        let vot = generate_values(&value_of_time, n, &mut rng)?;
        let df = DataFrame::new(vec![
            Series::new("person_id", person_ids.iter().map(String::as_str).collect::<Vec<_>>()),
            Series::new("car_driver_cst", cst),
            Series::new("car_driver_vot", vot),
        ])?;
        ctx.output("car_driver_preferences").write_dataframe(df)
    }
}

/// Distancia del camino mínimo para cada viaje como conductor, leída del
/// archivo de distancias de todos los pares de nodos.
pub struct CarDriverDistancesStep;

impl PipelineStep for CarDriverDistancesStep {
    fn name(&self) -> &'static str {
        "CarDriverDistancesStep"
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([
            ("car_driver_ods", InputSpec::required(&*CAR_DRIVER_ODS)),
            ("all_distances", InputSpec::required(&*ALL_DISTANCES)),
        ])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("car_driver_distances", &*CAR_DRIVER_DISTANCES)])
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let trips = ctx.input("car_driver_ods").read_dataframe()?;
        let distances = ctx.input("all_distances").read_dataframe()?;
        let origins = str_column(&distances, "origin_id")?;
        let destinations = str_column(&distances, "destination_id")?;
        let lengths = f64_column(&distances, "distance")?;
        let lookup: HashMap<(&str, &str), f64> = origins
            .iter()
            .zip(destinations.iter())
            .zip(lengths.iter())
            .map(|((origin, destination), length)| {
                ((origin.as_str(), destination.as_str()), *length)
            })
            .collect();
        let trip_ids = str_column(&trips, "trip_id")?;
        let trip_origins = str_column(&trips, "origin_node_id")?;
        let trip_destinations = str_column(&trips, "destination_node_id")?;
        let trip_distances: Vec<f64> = trip_origins
            .iter()
            .zip(trip_destinations.iter())
            .map(|(origin, destination)| {
                lookup.get(&(origin.as_str(), destination.as_str())).copied().unwrap_or(f64::NAN)
            })
            .collect();
        let df = DataFrame::new(vec![
            Series::new("trip_id", trip_ids.iter().map(String::as_str).collect::<Vec<_>>()),
            Series::new("distance", trip_distances),
        ])?;
        ctx.output("car_driver_distances").write_dataframe(df)
    }
}
