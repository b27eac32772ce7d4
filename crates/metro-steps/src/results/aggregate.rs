//! Estadísticas resumen de los resultados por viaje.

use indexmap::IndexMap;
use metro_core::{FileSpec, InputSpec, PipelineStep, Result, StepContext};
use polars::prelude::*;

use super::files::AGGREGATE_TRIP_RESULTS;
use crate::frame::f64_column;
use crate::simulation::METRO_TRIP_RESULTS;

fn stats(values: &[f64]) -> (Option<f64>, Option<f64>, Option<f64>, Option<f64>) {
    if values.is_empty() {
        return (None, None, None, None);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    (Some(mean), Some(variance.sqrt()), Some(min), Some(max))
}

/// Agrega los resultados por viaje del simulador en estadísticas resumen
/// (media, desviación, mínimo y máximo) por métrica.
pub struct AggregateTripResultsStep;

impl PipelineStep for AggregateTripResultsStep {
    fn name(&self) -> &'static str {
        "AggregateTripResultsStep"
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([("metro_trip_results", InputSpec::required(&*METRO_TRIP_RESULTS))])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("aggregate_trip_results", &*AGGREGATE_TRIP_RESULTS)])
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let results = ctx.input("metro_trip_results").read_dataframe()?;
        let departures = f64_column(&results, "departure_time")?;
        let arrivals = f64_column(&results, "arrival_time")?;
        let travel_times: Vec<f64> = departures
            .iter()
            .zip(arrivals.iter())
            .map(|(departure, arrival)| arrival - departure)
            .collect();

        let mut metrics: Vec<&str> = Vec::new();
        let mut means: Vec<Option<f64>> = Vec::new();
        let mut stds: Vec<Option<f64>> = Vec::new();
        let mut mins: Vec<Option<f64>> = Vec::new();
        let mut maxs: Vec<Option<f64>> = Vec::new();
        for (metric, values) in [
            ("departure_time", &departures),
            ("arrival_time", &arrivals),
            ("travel_time", &travel_times),
        ] {
            let (mean, std, min, max) = stats(values);
            metrics.push(metric);
            means.push(mean);
            stds.push(std);
            mins.push(min);
            maxs.push(max);
        }
        let df = DataFrame::new(vec![
            Series::new("metric", metrics),
            Series::new("mean", means),
            Series::new("std", stds),
            Series::new("min", mins),
            Series::new("max", maxs),
        ])?;
        ctx.output("aggregate_trip_results").write_dataframe(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_over_a_simple_series() {
        let (mean, std, min, max) = stats(&[1.0, 2.0, 3.0]);
        assert_eq!(mean, Some(2.0));
        assert_eq!(min, Some(1.0));
        assert_eq!(max, Some(3.0));
        assert!((std.unwrap() - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn stats_over_an_empty_series_are_null() {
        assert_eq!(stats(&[]), (None, None, None, None));
    }
}
