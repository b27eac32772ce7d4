//! Capacidades exógenas de cuello de botella por arista.

use indexmap::IndexMap;
use metro_core::{
    FileSpec, InputSpec, ParamValue, Parameter, PipelineStep, Result, StepContext, Validator,
};
use polars::prelude::*;

use super::files::{EDGES_CAPACITIES, RAW_EDGES};
use crate::frame::str_column;

/// El valor es un número (capacidad constante para todas las aristas) o una
/// tabla `road_type -> capacidad`. La tabla se normaliza a una lista de pares
/// ordenada por road type, estable para el fingerprint.
fn capacities_validator(value: &toml::Value) -> std::result::Result<ParamValue, String> {
    match value {
        toml::Value::Integer(i) => Ok(ParamValue::Float(*i as f64)),
        toml::Value::Float(f) => Ok(ParamValue::Float(*f)),
        toml::Value::Table(table) => {
            let mut pairs: Vec<ParamValue> = Vec::with_capacity(table.len());
            for (road_type, capacity) in table {
                let capacity = match capacity {
                    toml::Value::Integer(i) => *i as f64,
                    toml::Value::Float(f) => *f,
                    other => {
                        return Err(format!(
                            "invalid capacities (map road_type -> capacity expected): `{}`",
                            other
                        ))
                    }
                };
                pairs.push(ParamValue::List(vec![
                    ParamValue::String(road_type.clone()),
                    ParamValue::Float(capacity),
                ]));
            }
            Ok(ParamValue::List(pairs))
        }
        other => Err(format!("invalid capacities (number or table expected): `{}`", other)),
    }
}

/// Asigna la capacidad de cuello de botella de cada arista desde valores
/// exógenos: un escalar para toda la red o una tabla por road type.
pub struct ExogenousCapacitiesStep;

impl PipelineStep for ExogenousCapacitiesStep {
    fn name(&self) -> &'static str {
        "ExogenousCapacitiesStep"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![Parameter::new(
            "capacities",
            "road_network.capacities",
            Validator::Custom {
                description: "number or table `road_type -> capacity`".to_string(),
                validate: capacities_validator,
            },
        )
        .with_description("Bottleneck capacity (in PCE/h) of edges.")
        .with_note(
            "The value is either a scalar value to be applied to all edges or a table \
             `road_type -> capacity`.",
        )]
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([("raw_edges", InputSpec::required(&*RAW_EDGES))])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("edges_capacities", &*EDGES_CAPACITIES)])
    }

    fn is_defined(&self, ctx: &StepContext) -> bool {
        ctx.has_param("capacities")
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let edges = ctx.input("raw_edges").read_dataframe()?;
        let edge_ids = str_column(&edges, "edge_id")?;
        let capacities: Vec<Option<f64>> = match ctx.require("capacities")? {
            ParamValue::Float(constant) => vec![Some(*constant); edge_ids.len()],
            ParamValue::List(pairs) => {
                let mut by_road_type = std::collections::HashMap::new();
                for pair in pairs {
                    if let ParamValue::List(items) = pair {
                        if let (Some(ParamValue::String(road_type)), Some(capacity)) =
                            (items.first(), items.get(1).and_then(ParamValue::as_float))
                        {
                            by_road_type.insert(road_type.clone(), capacity);
                        }
                    }
                }
                let road_types = str_column(&edges, "road_type")?;
                let values: Vec<Option<f64>> = road_types
                    .iter()
                    .map(|road_type| by_road_type.get(road_type).copied())
                    .collect();
                let missing = values.iter().filter(|v| v.is_none()).count();
                if missing > 0 {
                    tracing::warn!(
                        "{} edge(s) have a road type with no configured capacity",
                        missing
                    );
                }
                values
            }
            other => {
                return Err(metro_core::MetroError::Runtime(format!(
                    "unexpected capacities value: {:?}",
                    other
                )))
            }
        };
        let df = DataFrame::new(vec![
            Series::new("edge_id", edge_ids.iter().map(String::as_str).collect::<Vec<_>>()),
            Series::new("capacity", capacities),
        ])?;
        ctx.output("edges_capacities").write_dataframe(df)
    }
}
