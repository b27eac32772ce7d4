//! Clases de artifact de resultados agregados.

use metro_core::{Column, FileSpec, MetroDataType};
use once_cell::sync::Lazy;

pub static AGGREGATE_TRIP_RESULTS: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("AggregateTripResults", "results/aggregate/trip_stats.parquet")
        .with_description("Summary statistics over the trip-level simulation results.")
        .with_schema(vec![
            Column::new("metric", MetroDataType::String)
                .unique()
                .non_nullable()
                .with_description("Name of the aggregated metric."),
            Column::new("mean", MetroDataType::Float).with_description("Mean over trips."),
            Column::new("std", MetroDataType::Float)
                .with_description("Standard deviation over trips."),
            Column::new("min", MetroDataType::Float).with_description("Minimum over trips."),
            Column::new("max", MetroDataType::Float).with_description("Maximum over trips."),
        ])
});
