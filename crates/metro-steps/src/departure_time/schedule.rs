//! Utilidad de horario con penalidad lineal (à la Arnott, de Palma, Lindsey).

use chrono::Duration;
use indexmap::IndexMap;
use metro_core::{
    random_seed_parameter,
    sampling::{generate_duration_values, generate_time_values, generate_values},
    DistributionValue, FileSpec, InputSpec, MetroError, ParamValue, Parameter, PipelineStep,
    Result, StepContext, Validator,
};
use polars::prelude::*;

use super::files::{LINEAR_SCHEDULE, TSTARS};
use crate::frame::{duration_series, str_column, time_series};
use crate::population::TRIPS;

/// Genera el horario deseado de inicio de la actividad que sigue a cada
/// viaje, constante u obtenido de una distribución horaria. Conviene usarlo
/// sólo cuando cada persona tiene un único viaje.
pub struct HomogeneousTstarStep;

impl PipelineStep for HomogeneousTstarStep {
    fn name(&self) -> &'static str {
        "HomogeneousTstarStep"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            random_seed_parameter(),
            Parameter::new(
                "tstar",
                "departure_time.linear_schedule.tstar",
                Validator::distribution_with(Validator::Time, Validator::Time, Validator::Duration),
            )
            .with_description("Desired start time of the following activity.")
            .with_example("`{ mean = 08:00:00, std = 1800, distribution = \"Normal\" }`"),
        ]
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([("trips", InputSpec::required(&*TRIPS))])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("tstars", &*TSTARS)])
    }

    fn is_defined(&self, ctx: &StepContext) -> bool {
        ctx.has_param("tstar")
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let trips = ctx.input("trips").read_dataframe()?;
        let trip_ids = str_column(&trips, "trip_id")?;
        let tstar = ctx
            .require("tstar")?
            .as_distribution()
            .cloned()
            .ok_or_else(|| MetroError::Runtime("`tstar` is not a distribution".to_string()))?;
        let mut rng = ctx.rng();
        let tstars = generate_time_values(&tstar, trip_ids.len(), &mut rng)?;
        let df = DataFrame::new(vec![
            Series::new("trip_id", trip_ids.iter().map(String::as_str).collect::<Vec<_>>()),
            time_series("tstar", &tstars)?,
        ])?;
        ctx.output("tstars").write_dataframe(df)
    }
}

/// Genera los parámetros de la utilidad de horario lineal de cada viaje:
/// `beta` (llegar temprano), `gamma` (llegar tarde) y `delta` (largo de la
/// ventana deseada). Debe combinarse con un step que genere los horarios
/// deseados (tstar).
pub struct LinearScheduleStep;

impl PipelineStep for LinearScheduleStep {
    fn name(&self) -> &'static str {
        "LinearScheduleStep"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            random_seed_parameter(),
            Parameter::new(
                "beta",
                "departure_time.linear_schedule.beta",
                Validator::distribution(Validator::Float),
            )
            .with_default(ParamValue::Distribution(DistributionValue::Constant(Box::new(
                ParamValue::Float(0.0),
            ))))
            .with_description("Penalty for starting an activity earlier than the desired time (€/h)."),
            Parameter::new(
                "gamma",
                "departure_time.linear_schedule.gamma",
                Validator::distribution(Validator::Float),
            )
            .with_default(ParamValue::Distribution(DistributionValue::Constant(Box::new(
                ParamValue::Float(0.0),
            ))))
            .with_description("Penalty for starting an activity later than the desired time (€/h)."),
            Parameter::new(
                "delta",
                "departure_time.linear_schedule.delta",
                Validator::distribution_with(
                    Validator::Duration,
                    Validator::Duration,
                    Validator::Duration,
                ),
            )
            .with_default(ParamValue::Distribution(DistributionValue::Constant(Box::new(
                ParamValue::Duration(Duration::zero()),
            ))))
            .with_description("Length of the desired time window."),
        ]
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([("trips", InputSpec::required(&*TRIPS))])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("linear_schedule", &*LINEAR_SCHEDULE)])
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let trips = ctx.input("trips").read_dataframe()?;
        let trip_ids = str_column(&trips, "trip_id")?;
        let n = trip_ids.len();
        let mut rng = ctx.rng();
        let beta = distribution_param(ctx, "beta")?;
        let gamma = distribution_param(ctx, "gamma")?;
        let delta = distribution_param(ctx, "delta")?;
        let betas = generate_values(&beta, n, &mut rng)?;
        let gammas = generate_values(&gamma, n, &mut rng)?;
        let deltas = generate_duration_values(&delta, n, &mut rng)?;
        let df = DataFrame::new(vec![
            Series::new("trip_id", trip_ids.iter().map(String::as_str).collect::<Vec<_>>()),
            Series::new("beta", betas),
            Series::new("gamma", gammas),
            duration_series("delta", &deltas)?,
        ])?;
        ctx.output("linear_schedule").write_dataframe(df)
    }
}

fn distribution_param(ctx: &StepContext, name: &str) -> Result<DistributionValue> {
    ctx.require(name)?
        .as_distribution()
        .cloned()
        .ok_or_else(|| MetroError::Runtime(format!("`{}` is not a distribution", name)))
}
