//! Conversión de la oferta (red vial y tipos de vehículo) al formato del
//! simulador.

use std::collections::HashMap;

use indexmap::IndexMap;
use metro_core::{
    FileSpec, InputSpec, ParamValue, Parameter, PipelineStep, Result, StepContext,
};
use polars::prelude::*;

use super::common::{has_mode, modes_parameter};
use super::files::{METRO_EDGES, METRO_VEHICLE_TYPES};
use crate::frame::{f64_column, opt_f64_column, str_column};
use crate::road_network::{EDGES_CAPACITIES, RAW_EDGES};

/// Genera el archivo de aristas del simulador: velocidades en m/s y flujos de
/// cuello de botella en PCE/s, con las capacidades como enriquecimiento
/// opcional.
pub struct WriteMetroEdgesStep;

impl PipelineStep for WriteMetroEdgesStep {
    fn name(&self) -> &'static str {
        "WriteMetroEdgesStep"
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([
            ("raw_edges", InputSpec::required(&*RAW_EDGES)),
            ("capacities", InputSpec::optional(&*EDGES_CAPACITIES)),
        ])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("metro_edges", &*METRO_EDGES)])
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let edges = ctx.input("raw_edges").read_dataframe()?;
        let edge_ids = str_column(&edges, "edge_id")?;
        let sources = str_column(&edges, "source")?;
        let targets = str_column(&edges, "target")?;
        let lengths = f64_column(&edges, "length")?;
        let speeds: Vec<f64> = match edges.column("speed_limit") {
            Ok(_) => opt_f64_column(&edges, "speed_limit")?
                .into_iter()
                .map(|speed| speed.unwrap_or(50.0) / 3.6)
                .collect(),
            Err(_) => vec![50.0 / 3.6; edge_ids.len()],
        };
        let n = edge_ids.len();

        let mut bottleneck_flows: Vec<Option<f64>> = vec![None; n];
        if ctx.input("capacities").exists() {
            let capacities = ctx.input("capacities").read_dataframe()?;
            let capacity_ids = str_column(&capacities, "edge_id")?;
            let capacity_values = opt_f64_column(&capacities, "capacity")?;
            let lookup: HashMap<&str, Option<f64>> = capacity_ids
                .iter()
                .zip(capacity_values.iter())
                .map(|(id, capacity)| (id.as_str(), *capacity))
                .collect();
            for (index, edge_id) in edge_ids.iter().enumerate() {
                // Capacidad en PCE/h; el simulador espera PCE/s.
                bottleneck_flows[index] = lookup
                    .get(edge_id.as_str())
                    .copied()
                    .flatten()
                    .map(|capacity| capacity / 3600.0);
            }
        }
        let df = DataFrame::new(vec![
            Series::new("edge_id", edge_ids.iter().map(String::as_str).collect::<Vec<_>>()),
            Series::new("source", sources.iter().map(String::as_str).collect::<Vec<_>>()),
            Series::new("target", targets.iter().map(String::as_str).collect::<Vec<_>>()),
            Series::new("length", lengths),
            Series::new("speed", speeds),
            Series::new("bottleneck_flow", bottleneck_flows),
            Series::new("overtaking", vec![true; n]),
        ])?;
        ctx.output("metro_edges").write_dataframe(df)
    }
}

/// Genera el archivo de tipos de vehículo del simulador. Sólo hace falta
/// cuando se simula el modo auto.
pub struct WriteMetroVehicleTypesStep;

impl PipelineStep for WriteMetroVehicleTypesStep {
    fn name(&self) -> &'static str {
        "WriteMetroVehicleTypesStep"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            modes_parameter(),
            Parameter::float("car_headway", "vehicle_types.car.headway")
                .with_default(ParamValue::Float(8.0))
                .with_description(
                    "Typical length between two cars, from head to head, in meters.",
                ),
            Parameter::float("car_pce", "vehicle_types.car.pce")
                .with_default(ParamValue::Float(1.0))
                .with_description("Passenger car equivalent of a typical car."),
        ]
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("metro_vehicle_types", &*METRO_VEHICLE_TYPES)])
    }

    fn is_defined(&self, ctx: &StepContext) -> bool {
        has_mode(ctx, "car_driver")
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let df = DataFrame::new(vec![
            Series::new("vehicle_id", vec!["car_driver"]),
            Series::new("headway", vec![ctx.float_param("car_headway").unwrap_or(8.0)]),
            Series::new("pce", vec![ctx.float_param("car_pce").unwrap_or(1.0)]),
        ])?;
        ctx.output("metro_vehicle_types").write_dataframe(df)
    }
}
