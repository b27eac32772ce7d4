//! Clases de artifact de horario de salida.

use metro_core::{Column, FileSpec, MetroDataType};
use once_cell::sync::Lazy;

pub static TSTARS: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("Tstars", "demand/population/tstars.parquet")
        .with_description("Desired start time of the activity following each trip.")
        .with_schema(vec![
            Column::new("trip_id", MetroDataType::Id)
                .unique()
                .non_nullable()
                .with_description("Identifier of the trip."),
            Column::new("tstar", MetroDataType::Time)
                .non_nullable()
                .with_description("Desired start time of the following activity."),
        ])
});

pub static LINEAR_SCHEDULE: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("LinearSchedule", "demand/population/linear_schedule.parquet")
        .with_description(
            "Preference parameters for the linear schedule-delay utility of each trip.",
        )
        .with_schema(vec![
            Column::new("trip_id", MetroDataType::Id)
                .unique()
                .non_nullable()
                .with_description("Identifier of the trip."),
            Column::new("beta", MetroDataType::Float)
                .non_nullable()
                .with_description("Penalty for starting the activity early (€/h)."),
            Column::new("gamma", MetroDataType::Float)
                .non_nullable()
                .with_description("Penalty for starting the activity late (€/h)."),
            Column::new("delta", MetroDataType::Duration)
                .non_nullable()
                .with_description("Length of the desired time window."),
        ])
});
