//! Draws uniformes por tour para el muestreo por transformada inversa.

use indexmap::IndexMap;
use metro_core::{
    random_seed_parameter, FileSpec, InputSpec, Parameter, PipelineStep, Result, StepContext,
};
use polars::prelude::*;
use rand::Rng;

use super::files::{TRIPS, UNIFORM_DRAWS};
use crate::frame::str_column;

/// Sortea números aleatorios para la elección de modo y de horario de salida
/// de cada tour, uniformes en [0, 1).
pub struct UniformDrawsStep;

impl PipelineStep for UniformDrawsStep {
    fn name(&self) -> &'static str {
        "UniformDrawsStep"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![random_seed_parameter()]
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([("trips", InputSpec::required(&*TRIPS))])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("uniform_draws", &*UNIFORM_DRAWS)])
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let trips = ctx.input("trips").read_dataframe()?;
        let mut tour_ids = str_column(&trips, "tour_id")?;
        tour_ids.sort_unstable();
        tour_ids.dedup();
        let nb_tours = tour_ids.len();
        let mut rng = ctx.rng();
        let mode_u: Vec<f64> = (0..nb_tours).map(|_| rng.gen()).collect();
        let departure_time_u: Vec<f64> = (0..nb_tours).map(|_| rng.gen()).collect();
        let df = DataFrame::new(vec![
            Series::new("tour_id", tour_ids.iter().map(String::as_str).collect::<Vec<_>>()),
            Series::new("mode_u", mode_u),
            Series::new("departure_time_u", departure_time_u),
        ])?;
        ctx.output("uniform_draws").write_dataframe(df)
    }
}
