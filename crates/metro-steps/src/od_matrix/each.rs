//! Matriz OD con una cantidad fija de viajes por par de nodos.

use indexmap::IndexMap;
use metro_core::{
    random_seed_parameter, sampling::generate_int_values, FileSpec, InputSpec, Parameter,
    PipelineStep, Result, StepContext, Validator,
};

use super::common::generate_trips_from_od_matrix;
use crate::frame::str_column;
use crate::modes::CAR_DRIVER_ODS;
use crate::road_network::RAW_EDGES;

/// Genera pares origen-destino de conductores con `each` viajes para cada par
/// de nodos de la red. Los orígenes elegibles son los nodos con al menos una
/// arista saliente; los destinos, los nodos con al menos una entrante.
pub struct ODMatrixEachStep;

impl PipelineStep for ODMatrixEachStep {
    fn name(&self) -> &'static str {
        "ODMatrixEachStep"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            random_seed_parameter(),
            Parameter::new(
                "each",
                "node_od_matrix.each",
                Validator::distribution_with(Validator::Int, Validator::Float, Validator::Float),
            )
            .with_description("Number of trips to generate for each origin-destination pair."),
        ]
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([("raw_edges", InputSpec::required(&*RAW_EDGES))])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("car_driver_ods", &*CAR_DRIVER_ODS)])
    }

    fn is_defined(&self, ctx: &StepContext) -> bool {
        ctx.has_param("each")
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let edges = ctx.input("raw_edges").read_dataframe()?;
        let mut sources = str_column(&edges, "source")?;
        sources.sort_unstable();
        sources.dedup();
        let mut targets = str_column(&edges, "target")?;
        targets.sort_unstable();
        targets.dedup();

        let each = ctx.require("each")?.as_distribution().cloned().ok_or_else(|| {
            metro_core::MetroError::Runtime("`each` is not a distribution parameter".to_string())
        })?;
        let mut rng = ctx.rng();
        let nb_pairs = sources.len() * targets.len();
        let sizes = generate_int_values(&each, nb_pairs, &mut rng)?;
        let mut rows: Vec<(String, String, f64)> = Vec::with_capacity(nb_pairs);
        let mut index = 0;
        for source in &sources {
            for target in &targets {
                rows.push((source.clone(), target.clone(), sizes[index] as f64));
                index += 1;
            }
        }
        let trips = generate_trips_from_od_matrix(&rows, &mut rng)?;
        ctx.output("car_driver_ods").write_dataframe(trips)
    }
}
