//! Clases de artifact de la población.

use metro_core::{Column, FileSpec, MetroDataType};
use once_cell::sync::Lazy;

pub static TRIPS: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("Trips", "demand/population/trips.parquet")
        .with_description("Identifiers and order of the trips for each person.")
        .with_schema(vec![
            Column::new("trip_id", MetroDataType::Id)
                .unique()
                .non_nullable()
                .with_description("Identifier of the trip."),
            Column::new("person_id", MetroDataType::Id)
                .non_nullable()
                .with_description("Identifier of the person performing the trip."),
            Column::new("household_id", MetroDataType::Id)
                .non_nullable()
                .with_description("Identifier of the household of the person."),
            Column::new("trip_index", MetroDataType::UInt)
                .with_description("Index of the trip in the trip chain of the person, starting at 1."),
            Column::new("tour_id", MetroDataType::Id)
                .non_nullable()
                .with_description("Identifier of the home-tour this trip is part of."),
        ])
});

pub static PERSONS: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("Persons", "demand/population/persons.parquet")
        .with_description("Identifiers and characteristics of the simulated persons.")
        .with_schema(vec![
            Column::new("person_id", MetroDataType::Id)
                .unique()
                .non_nullable()
                .with_description("Identifier of the person."),
            Column::new("household_id", MetroDataType::Id)
                .non_nullable()
                .with_description("Identifier of the household of the person."),
            Column::new("has_driving_license", MetroDataType::Bool)
                .with_description("Whether the person has a driving license."),
            Column::new("has_pt_subscription", MetroDataType::Bool)
                .with_description("Whether the person has a public-transit subscription."),
        ])
});

pub static HOUSEHOLDS: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("Households", "demand/population/households.parquet")
        .with_description("Identifiers and characteristics of the simulated households.")
        .with_schema(vec![
            Column::new("household_id", MetroDataType::Id)
                .unique()
                .non_nullable()
                .with_description("Identifier of the household."),
            Column::new("number_of_persons", MetroDataType::UInt)
                .non_nullable()
                .with_description("Number of persons in the household."),
            Column::new("number_of_vehicles", MetroDataType::UInt)
                .with_description("Number of vehicles (cars) owned by the household."),
            Column::new("income", MetroDataType::Float)
                .with_description("Monthly disposable income of the household."),
        ])
});

pub static UNIFORM_DRAWS: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("UniformDraws", "demand/population/uniform_draws.parquet")
        .with_description(
            "Draws for the inverse transform sampling of mode choice and departure-time choice, \
             of each tour.",
        )
        .with_schema(vec![
            Column::new("tour_id", MetroDataType::Id)
                .unique()
                .non_nullable()
                .with_description("Identifier of the tour."),
            Column::new("mode_u", MetroDataType::Float)
                .non_nullable()
                .with_description("Random uniform draw for mode choice."),
            Column::new("departure_time_u", MetroDataType::Float)
                .non_nullable()
                .with_description("Random uniform draw for departure-time choice."),
        ])
});
