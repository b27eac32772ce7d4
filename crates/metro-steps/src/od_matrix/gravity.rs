//! Matriz OD por modelo gravitacional.

use std::collections::HashMap;

use indexmap::IndexMap;
use metro_core::{
    random_seed_parameter, FileSpec, InputSpec, MetroError, Parameter, PipelineStep, Result,
    StepContext,
};

use super::common::generate_trips_from_od_matrix;
use crate::frame::{duration_seconds_column, str_column};
use crate::modes::CAR_DRIVER_ODS;
use crate::road_network::ALL_FREE_FLOW_TRAVEL_TIMES;

/// Genera pares origen-destino de conductores con un modelo gravitacional:
/// la cantidad de viajes desde cada nodo es fija (`trips_per_node`) y el flujo
/// hacia cada destino es proporcional a `exp(-lambda * tt0)`, con `lambda` la
/// tasa de decaimiento (`exponential_decay`, por minuto) y `tt0` el tiempo de
/// viaje a flujo libre.
pub struct GravityODMatrixStep;

impl PipelineStep for GravityODMatrixStep {
    fn name(&self) -> &'static str {
        "GravityODMatrixStep"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            random_seed_parameter(),
            Parameter::float("exponential_decay", "gravity_od_matrix.exponential_decay")
                .with_description(
                    "Exponential decay rate of flows as a function of free-flow travel times \
                     (rate per minute).",
                ),
            Parameter::int("trips_per_node", "gravity_od_matrix.trips_per_node")
                .with_description("Number of trips to be generated originating from each node."),
            Parameter::string("nodes_regex", "gravity_od_matrix.nodes_regex")
                .with_description(
                    "Regular expression specifying the nodes to be selected as possible origin / \
                     destination.",
                )
                .with_note("If not specified, any node can be an origin / destination."),
        ]
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([(
            "all_free_flow_travel_times",
            InputSpec::required(&*ALL_FREE_FLOW_TRAVEL_TIMES),
        )])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("car_driver_ods", &*CAR_DRIVER_ODS)])
    }

    fn is_defined(&self, ctx: &StepContext) -> bool {
        ctx.has_param("exponential_decay") && ctx.has_param("trips_per_node")
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let decay = ctx.require("exponential_decay")?.as_float().unwrap_or(0.0);
        let trips_per_node = ctx.require("trips_per_node")?.as_int().unwrap_or(0) as f64;
        let pattern = match ctx.str_param("nodes_regex") {
            Some(raw) => Some(regex::Regex::new(raw).map_err(|e| {
                MetroError::Runtime(format!("invalid nodes regex `{}`: {}", raw, e))
            })?),
            None => None,
        };
        let tts = ctx.input("all_free_flow_travel_times").read_dataframe()?;
        let origins = str_column(&tts, "origin_id")?;
        let destinations = str_column(&tts, "destination_id")?;
        let travel_times = duration_seconds_column(&tts, "free_flow_travel_time")?;

        // Tasa cruda por par, filtrando pares triviales y nodos no
        // seleccionados.
        let mut rates: Vec<(usize, f64)> = Vec::new();
        let mut total_by_origin: HashMap<&str, f64> = HashMap::new();
        for (index, ((origin, destination), tt)) in
            origins.iter().zip(destinations.iter()).zip(travel_times.iter()).enumerate()
        {
            if origin == destination {
                continue;
            }
            if let Some(pattern) = &pattern {
                if !pattern.is_match(origin) || !pattern.is_match(destination) {
                    continue;
                }
            }
            let rate = (-decay * tt / 60.0).exp();
            rates.push((index, rate));
            *total_by_origin.entry(origin.as_str()).or_insert(0.0) += rate;
        }
        let rows: Vec<(String, String, f64)> = rates
            .into_iter()
            .map(|(index, rate)| {
                let origin = origins[index].clone();
                let total = total_by_origin[origin.as_str()];
                let size = rate / total * trips_per_node;
                (origin, destinations[index].clone(), size)
            })
            .collect();
        let trips = generate_trips_from_od_matrix(&rows, &mut ctx.rng())?;
        ctx.output("car_driver_ods").write_dataframe(trips)
    }
}
