//! Clases de artifact de los modos.

use metro_core::{Column, FileSpec, MetroDataType};
use once_cell::sync::Lazy;

pub static CAR_DRIVER_ODS: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("CarDriverODs", "demand/population/car_driver_origins_destinations.parquet")
        .with_description(
            "Origin / destination on the road network for each trip, when traveling as a car \
             driver.",
        )
        .with_schema(vec![
            Column::new("trip_id", MetroDataType::Id)
                .unique()
                .non_nullable()
                .with_description("Identifier of the trip."),
            Column::new("origin_node_id", MetroDataType::Id)
                .non_nullable()
                .with_description("Identifier of the origin node, on the road network."),
            Column::new("destination_node_id", MetroDataType::Id)
                .non_nullable()
                .with_description("Identifier of the destination node, on the road network."),
        ])
});

pub static CAR_DRIVER_PREFERENCES: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("CarDriverPreferences", "demand/population/car_driver_preferences.parquet")
        .with_description("Preferences to travel as a car driver, for each person.")
        .with_schema(vec![
            Column::new("person_id", MetroDataType::Id)
                .unique()
                .non_nullable()
                .with_description("Identifier of the person."),
            Column::new("car_driver_cst", MetroDataType::Float)
                .with_description("Penalty for each trip as a car driver (€)."),
            Column::new("car_driver_vot", MetroDataType::Float)
                .with_description("Value of time as a car driver (€/h)."),
        ])
});

pub static CAR_DRIVER_DISTANCES: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("CarDriverDistances", "demand/population/car_driver_distances.parquet")
        .with_description("Shortest-path distance on the road network of each car driver trip.")
        .with_schema(vec![
            Column::new("trip_id", MetroDataType::Id)
                .unique()
                .non_nullable()
                .with_description("Identifier of the trip."),
            Column::new("distance", MetroDataType::Float)
                .non_nullable()
                .with_description("Distance of the shortest path, in meters."),
        ])
});

pub static PUBLIC_TRANSIT_PREFERENCES: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe(
        "PublicTransitPreferences",
        "demand/population/public_transit_preferences.parquet",
    )
    .with_description("Preferences to travel by public transit, for each person.")
    .with_schema(vec![
        Column::new("person_id", MetroDataType::Id)
            .unique()
            .non_nullable()
            .with_description("Identifier of the person."),
        Column::new("public_transit_cst", MetroDataType::Float)
            .with_description("Penalty for each trip in public transit (€)."),
        Column::new("public_transit_vot", MetroDataType::Float)
            .with_description("Value of time in public transit (€/h)."),
    ])
});

pub static PUBLIC_TRANSIT_TRAVEL_TIMES: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe(
        "PublicTransitTravelTimes",
        "demand/population/public_transit_travel_times.parquet",
    )
    .with_description("Travel time of each trip, when traveling by public transit.")
    .with_schema(vec![
        Column::new("trip_id", MetroDataType::Id)
            .unique()
            .non_nullable()
            .with_description("Identifier of the trip."),
        Column::new("public_transit_travel_time", MetroDataType::Duration)
            .non_nullable()
            .with_description("Duration of the trip by public transit."),
    ])
});
