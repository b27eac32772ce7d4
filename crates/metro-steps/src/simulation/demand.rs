//! Conversión de la demanda (agentes, alternativas y viajes) al formato del
//! simulador.

use std::collections::HashMap;

use indexmap::IndexMap;
use metro_core::{
    FileSpec, InputSpec, MetroFile, ParamValue, Parameter, PipelineStep, Result, StepContext,
};
use polars::prelude::*;

use super::common::{has_mode, has_mode_choice, modes_parameter, trip_modes};
use super::files::{METRO_AGENTS, METRO_ALTERNATIVES, METRO_TRIPS};
use crate::departure_time::{LINEAR_SCHEDULE, TSTARS};
use crate::frame::{
    duration_seconds_column, f64_column, opt_f64_column, str_column, time_seconds_column,
};
use crate::modes::{
    CAR_DRIVER_ODS, CAR_DRIVER_PREFERENCES, PUBLIC_TRANSIT_PREFERENCES,
    PUBLIC_TRANSIT_TRAVEL_TIMES,
};
use crate::population::{TRIPS, UNIFORM_DRAWS};

fn when_car_driver(ctx: &StepContext) -> bool {
    has_mode(ctx, "car_driver")
}

fn when_public_transit(ctx: &StepContext) -> bool {
    has_mode(ctx, "public_transit")
}

fn when_mode_choice(ctx: &StepContext) -> bool {
    has_mode_choice(ctx)
}

/// Genera el archivo de agentes del simulador. Con elección de modo (dos o
/// más modos simulados) inicializa además los parámetros del modelo de
/// elección.
pub struct WriteMetroAgentsStep;

impl PipelineStep for WriteMetroAgentsStep {
    fn name(&self) -> &'static str {
        "WriteMetroAgentsStep"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            modes_parameter(),
            Parameter::new(
                "mode_choice_model",
                "mode_choice.model",
                metro_core::Validator::enumeration(&["Logit", "Deterministic"]),
            )
            .with_default(ParamValue::String("Deterministic".to_string()))
            .with_description("Type of choice model for mode choice."),
            Parameter::float("mode_choice_mu", "mode_choice.mu")
                .with_default(ParamValue::Float(1.0))
                .with_description("Value of mu for the Logit choice model.")
                .with_note("Only required when the mode choice model is Logit."),
        ]
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([
            ("trips", InputSpec::required(&*TRIPS)),
            ("uniform_draws", InputSpec::required(&*UNIFORM_DRAWS).when(when_mode_choice)),
        ])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("metro_agents", &*METRO_AGENTS)])
    }

    fn is_defined(&self, ctx: &StepContext) -> bool {
        trip_modes(ctx).is_some()
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let trips = ctx.input("trips").read_dataframe()?;
        let mut agent_ids = str_column(&trips, "tour_id")?;
        agent_ids.sort_unstable();
        agent_ids.dedup();
        let n = agent_ids.len();
        let mut columns = vec![Series::new(
            "agent_id",
            agent_ids.iter().map(String::as_str).collect::<Vec<_>>(),
        )];
        if has_mode_choice(ctx) {
            let model = ctx.str_param("mode_choice_model").unwrap_or("Deterministic");
            columns.push(Series::new("alt_choice.type", vec![model; n]));
            if model == "Logit" {
                let mu = ctx.float_param("mode_choice_mu").unwrap_or(1.0);
                columns.push(Series::new("alt_choice.mu", vec![mu; n]));
            }
            let draws = ctx.input("uniform_draws").read_dataframe()?;
            let tour_ids = str_column(&draws, "tour_id")?;
            let mode_u = f64_column(&draws, "mode_u")?;
            let lookup: HashMap<&str, f64> = tour_ids
                .iter()
                .zip(mode_u.iter())
                .map(|(tour_id, u)| (tour_id.as_str(), *u))
                .collect();
            let us: Vec<Option<f64>> =
                agent_ids.iter().map(|agent| lookup.get(agent.as_str()).copied()).collect();
            columns.push(Series::new("alt_choice.u", us));
        }
        ctx.output("metro_agents").write_dataframe(DataFrame::new(columns)?)
    }
}

/// Genera el archivo de alternativas del simulador: una alternativa por
/// agente y modo simulado, con la elección de horario de salida por
/// transformada inversa.
pub struct WriteMetroAlternativesStep;

impl PipelineStep for WriteMetroAlternativesStep {
    fn name(&self) -> &'static str {
        "WriteMetroAlternativesStep"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![modes_parameter()]
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([
            ("trips", InputSpec::required(&*TRIPS)),
            ("uniform_draws", InputSpec::required(&*UNIFORM_DRAWS)),
        ])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("metro_alternatives", &*METRO_ALTERNATIVES)])
    }

    fn is_defined(&self, ctx: &StepContext) -> bool {
        trip_modes(ctx).is_some()
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let modes = trip_modes(ctx).unwrap_or_default();
        let trips = ctx.input("trips").read_dataframe()?;
        let mut agent_ids = str_column(&trips, "tour_id")?;
        agent_ids.sort_unstable();
        agent_ids.dedup();
        let draws = ctx.input("uniform_draws").read_dataframe()?;
        let tour_ids = str_column(&draws, "tour_id")?;
        let departure_u = f64_column(&draws, "departure_time_u")?;
        let lookup: HashMap<&str, f64> = tour_ids
            .iter()
            .zip(departure_u.iter())
            .map(|(tour_id, u)| (tour_id.as_str(), *u))
            .collect();

        let mut out_agents: Vec<&str> = Vec::new();
        let mut out_alts: Vec<&str> = Vec::new();
        let mut out_delays: Vec<Option<f64>> = Vec::new();
        let mut out_dt_types: Vec<&str> = Vec::new();
        let mut out_dt_us: Vec<Option<f64>> = Vec::new();
        for agent in &agent_ids {
            for mode in &modes {
                out_agents.push(agent);
                out_alts.push(mode);
                out_delays.push(None);
                out_dt_types.push("Continuous");
                out_dt_us.push(lookup.get(agent.as_str()).copied());
            }
        }
        let df = DataFrame::new(vec![
            Series::new("agent_id", out_agents),
            Series::new("alt_id", out_alts),
            Series::new("origin_delay", out_delays),
            Series::new("dt_choice.type", out_dt_types),
            Series::new("dt_choice.u", out_dt_us),
        ])?;
        ctx.output("metro_alternatives").write_dataframe(df)
    }
}

/// Filas de viajes de un modo, con columnas anulables compartidas.
#[derive(Default)]
struct TripRows {
    agent_ids: Vec<String>,
    alt_ids: Vec<String>,
    trip_ids: Vec<String>,
    class_types: Vec<String>,
    origins: Vec<Option<String>>,
    destinations: Vec<Option<String>>,
    vehicles: Vec<Option<String>>,
    travel_times: Vec<Option<f64>>,
    constants: Vec<Option<f64>>,
    alphas: Vec<Option<f64>>,
    schedule_types: Vec<Option<String>>,
    tstars: Vec<Option<f64>>,
    betas: Vec<Option<f64>>,
    gammas: Vec<Option<f64>>,
    deltas: Vec<Option<f64>>,
}

fn preference_lookup(
    file: &MetroFile,
    key_column: &str,
    cst_column: &str,
    vot_column: &str,
) -> Result<HashMap<String, (Option<f64>, Option<f64>)>> {
    if !file.exists() {
        return Ok(HashMap::new());
    }
    let df = file.read_dataframe()?;
    let keys = str_column(&df, key_column)?;
    let csts = opt_f64_column(&df, cst_column)?;
    let vots = opt_f64_column(&df, vot_column)?;
    Ok(keys
        .into_iter()
        .zip(csts.into_iter().zip(vots.into_iter()))
        .map(|(key, (cst, vot))| (key, (cst, vot)))
        .collect())
}

struct ScheduleLookups {
    tstars: HashMap<String, f64>,
    linear: HashMap<String, (f64, f64, f64)>,
}

impl ScheduleLookups {
    fn load(tstars_file: &MetroFile, linear_file: &MetroFile) -> Result<ScheduleLookups> {
        let mut tstars = HashMap::new();
        if tstars_file.exists() {
            let df = tstars_file.read_dataframe()?;
            let ids = str_column(&df, "trip_id")?;
            let values = time_seconds_column(&df, "tstar")?;
            tstars = ids.into_iter().zip(values).collect();
        }
        let mut linear = HashMap::new();
        if linear_file.exists() {
            let df = linear_file.read_dataframe()?;
            let ids = str_column(&df, "trip_id")?;
            let betas = f64_column(&df, "beta")?;
            let gammas = f64_column(&df, "gamma")?;
            let deltas = duration_seconds_column(&df, "delta")?;
            for (((id, beta), gamma), delta) in
                ids.into_iter().zip(betas).zip(gammas).zip(deltas)
            {
                linear.insert(id, (beta, gamma, delta));
            }
        }
        Ok(ScheduleLookups { tstars, linear })
    }

    /// Completa las columnas de utilidad de horario de una fila. Los
    /// penales por hora pasan a penales por segundo.
    fn fill(&self, trip_id: &str, rows: &mut TripRows) {
        rows.tstars.push(self.tstars.get(trip_id).copied());
        match self.linear.get(trip_id) {
            Some((beta, gamma, delta)) => {
                rows.schedule_types.push(Some("Linear".to_string()));
                rows.betas.push(Some(beta / 3600.0));
                rows.gammas.push(Some(gamma / 3600.0));
                rows.deltas.push(Some(*delta));
            }
            None => {
                rows.schedule_types.push(None);
                rows.betas.push(None);
                rows.gammas.push(None);
                rows.deltas.push(None);
            }
        }
    }
}

/// Genera el archivo de viajes del simulador: una fila por viaje y modo
/// simulado, con clase `Road` para el auto y `Virtual` para el transporte
/// público.
pub struct WriteMetroTripsStep;

impl PipelineStep for WriteMetroTripsStep {
    fn name(&self) -> &'static str {
        "WriteMetroTripsStep"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![modes_parameter()]
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([
            ("trips", InputSpec::required(&*TRIPS)),
            ("car_driver_ods", InputSpec::required(&*CAR_DRIVER_ODS).when(when_car_driver)),
            (
                "public_transit_travel_times",
                InputSpec::required(&*PUBLIC_TRANSIT_TRAVEL_TIMES).when(when_public_transit),
            ),
            ("linear_schedule", InputSpec::optional(&*LINEAR_SCHEDULE)),
            ("tstars", InputSpec::optional(&*TSTARS)),
            (
                "car_driver_preferences",
                InputSpec::optional(&*CAR_DRIVER_PREFERENCES).when(when_car_driver),
            ),
            (
                "public_transit_preferences",
                InputSpec::optional(&*PUBLIC_TRANSIT_PREFERENCES).when(when_public_transit),
            ),
        ])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("metro_trips", &*METRO_TRIPS)])
    }

    fn is_defined(&self, ctx: &StepContext) -> bool {
        trip_modes(ctx).map(|modes| !modes.is_empty()).unwrap_or(false)
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let trips = ctx.input("trips").read_dataframe()?;
        let trip_ids = str_column(&trips, "trip_id")?;
        let person_ids = str_column(&trips, "person_id")?;
        let tour_ids = str_column(&trips, "tour_id")?;
        // Orden estable por (agente, viaje).
        let mut order: Vec<usize> = (0..trip_ids.len()).collect();
        order.sort_by(|&a, &b| {
            (&tour_ids[a], &trip_ids[a]).cmp(&(&tour_ids[b], &trip_ids[b]))
        });

        let schedules = ScheduleLookups::load(ctx.input("tstars"), ctx.input("linear_schedule"))?;
        let mut rows = TripRows::default();

        if has_mode(ctx, "car_driver") {
            let ods = ctx.input("car_driver_ods").read_dataframe()?;
            let od_ids = str_column(&ods, "trip_id")?;
            let od_origins = str_column(&ods, "origin_node_id")?;
            let od_destinations = str_column(&ods, "destination_node_id")?;
            let od_lookup: HashMap<&str, (&str, &str)> = od_ids
                .iter()
                .zip(od_origins.iter().zip(od_destinations.iter()))
                .map(|(id, (origin, destination))| {
                    (id.as_str(), (origin.as_str(), destination.as_str()))
                })
                .collect();
            let preferences = preference_lookup(
                ctx.input("car_driver_preferences"),
                "person_id",
                "car_driver_cst",
                "car_driver_vot",
            )?;
            for &index in &order {
                let trip_id = &trip_ids[index];
                rows.agent_ids.push(tour_ids[index].clone());
                rows.alt_ids.push("car_driver".to_string());
                rows.trip_ids.push(trip_id.clone());
                rows.class_types.push("Road".to_string());
                let od = od_lookup.get(trip_id.as_str());
                rows.origins.push(od.map(|(origin, _)| origin.to_string()));
                rows.destinations.push(od.map(|(_, destination)| destination.to_string()));
                rows.vehicles.push(Some("car_driver".to_string()));
                rows.travel_times.push(None);
                let (cst, vot) =
                    preferences.get(&person_ids[index]).copied().unwrap_or((None, None));
                rows.constants.push(cst.map(|c| -c));
                rows.alphas.push(vot.map(|v| v / 3600.0));
                schedules.fill(trip_id, &mut rows);
            }
        }
        if has_mode(ctx, "public_transit") {
            let tts = ctx.input("public_transit_travel_times").read_dataframe()?;
            let tt_ids = str_column(&tts, "trip_id")?;
            let tt_values = duration_seconds_column(&tts, "public_transit_travel_time")?;
            let tt_lookup: HashMap<&str, f64> = tt_ids
                .iter()
                .zip(tt_values.iter())
                .map(|(id, tt)| (id.as_str(), *tt))
                .collect();
            let preferences = preference_lookup(
                ctx.input("public_transit_preferences"),
                "person_id",
                "public_transit_cst",
                "public_transit_vot",
            )?;
            for &index in &order {
                let trip_id = &trip_ids[index];
                rows.agent_ids.push(tour_ids[index].clone());
                rows.alt_ids.push("public_transit".to_string());
                rows.trip_ids.push(trip_id.clone());
                rows.class_types.push("Virtual".to_string());
                rows.origins.push(None);
                rows.destinations.push(None);
                rows.vehicles.push(None);
                rows.travel_times.push(tt_lookup.get(trip_id.as_str()).copied());
                let (cst, vot) =
                    preferences.get(&person_ids[index]).copied().unwrap_or((None, None));
                rows.constants.push(cst.map(|c| -c));
                rows.alphas.push(vot.map(|v| v / 3600.0));
                schedules.fill(trip_id, &mut rows);
            }
        }

        let df = DataFrame::new(vec![
            Series::new("agent_id", rows.agent_ids),
            Series::new("alt_id", rows.alt_ids),
            Series::new("trip_id", rows.trip_ids),
            Series::new("class.type", rows.class_types),
            Series::new("class.origin", rows.origins),
            Series::new("class.destination", rows.destinations),
            Series::new("class.vehicle", rows.vehicles),
            Series::new("class.travel_time", rows.travel_times),
            Series::new("constant_utility", rows.constants),
            Series::new("alpha", rows.alphas),
            Series::new("schedule_utility.type", rows.schedule_types),
            Series::new("schedule_utility.tstar", rows.tstars),
            Series::new("schedule_utility.beta", rows.betas),
            Series::new("schedule_utility.gamma", rows.gammas),
            Series::new("schedule_utility.delta", rows.deltas),
        ])?;
        ctx.output("metro_trips").write_dataframe(df)
    }
}
