//! Clases de artifact de entrada y salida del simulador.
//!
//! Los archivos de `run/input/` los escriben los steps de conversión; los de
//! `run/output/` los produce el binario del simulador, por lo que sus
//! esquemas sólo documentan el contrato (nunca se validan en escritura).

use metro_core::{Column, FileSpec, MetroDataType};
use once_cell::sync::Lazy;

pub static METRO_PARAMETERS: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::text("MetroParameters", "run/parameters.json")
        .with_description("JSON file with the parameters for the simulator.")
});

pub static METRO_EDGES: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("MetroEdges", "run/input/edges.parquet")
        .with_description("Input edges file for the simulator.")
        .with_schema(vec![
            Column::new("edge_id", MetroDataType::Id)
                .unique()
                .non_nullable()
                .with_description("Identifier of the edge."),
            Column::new("source", MetroDataType::Id)
                .non_nullable()
                .with_description("Identifier of the edge's first node."),
            Column::new("target", MetroDataType::Id)
                .non_nullable()
                .with_description("Identifier of the edge's last node."),
            Column::new("length", MetroDataType::Float)
                .non_nullable()
                .with_description("Length of the edge, in meters."),
            Column::new("speed", MetroDataType::Float)
                .non_nullable()
                .with_description("Base speed on the edge, in m/s."),
            Column::new("bottleneck_flow", MetroDataType::Float)
                .with_description("Bottleneck flow of the edge, in PCE per second."),
            Column::new("overtaking", MetroDataType::Bool)
                .non_nullable()
                .with_description("Whether vehicles can overtake on the edge."),
        ])
});

pub static METRO_VEHICLE_TYPES: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("MetroVehicleTypes", "run/input/vehicle_types.parquet")
        .with_description("Input vehicle-types file for the simulator.")
        .with_schema(vec![
            Column::new("vehicle_id", MetroDataType::Id)
                .unique()
                .non_nullable()
                .with_description("Identifier of the vehicle type."),
            Column::new("headway", MetroDataType::Float)
                .non_nullable()
                .with_description("Typical length between two vehicles, from head to head, in meters."),
            Column::new("pce", MetroDataType::Float)
                .non_nullable()
                .with_description("Passenger car equivalent of the vehicle type."),
        ])
});

pub static METRO_AGENTS: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("MetroAgents", "run/input/agents.parquet")
        .with_description("Input agents file for the simulator.")
        .with_schema(vec![
            Column::new("agent_id", MetroDataType::Id)
                .unique()
                .non_nullable()
                .with_description("Identifier of the agent."),
            Column::new("alt_choice.type", MetroDataType::String)
                .optional()
                .with_description("Type of choice model for the alternative choice."),
            Column::new("alt_choice.u", MetroDataType::Float)
                .optional()
                .with_description("Uniform draw for the alternative choice."),
            Column::new("alt_choice.mu", MetroDataType::Float)
                .optional()
                .with_description("Value of mu for the Logit choice model."),
        ])
});

pub static METRO_ALTERNATIVES: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("MetroAlternatives", "run/input/alts.parquet")
        .with_description("Input alternatives file for the simulator.")
        .with_schema(vec![
            Column::new("agent_id", MetroDataType::Id)
                .non_nullable()
                .with_description("Identifier of the agent."),
            Column::new("alt_id", MetroDataType::Id)
                .non_nullable()
                .with_description("Identifier of the alternative."),
            Column::new("origin_delay", MetroDataType::Float)
                .with_description("Delay before the first trip starts, in seconds."),
            Column::new("dt_choice.type", MetroDataType::String)
                .non_nullable()
                .with_description("Type of departure-time choice model."),
            Column::new("dt_choice.u", MetroDataType::Float)
                .with_description("Uniform draw for the departure-time choice."),
        ])
});

pub static METRO_TRIPS: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("MetroTrips", "run/input/trips.parquet")
        .with_description("Input trips file for the simulator.")
        .with_schema(vec![
            Column::new("agent_id", MetroDataType::Id)
                .non_nullable()
                .with_description("Identifier of the agent performing the trip."),
            Column::new("alt_id", MetroDataType::Id)
                .non_nullable()
                .with_description("Identifier of the alternative the trip belongs to."),
            Column::new("trip_id", MetroDataType::Id)
                .non_nullable()
                .with_description("Identifier of the trip."),
            Column::new("class.type", MetroDataType::String)
                .non_nullable()
                .with_description("Class of the trip: `Road` or `Virtual`."),
            Column::new("class.origin", MetroDataType::Id)
                .with_description("Origin node of a road trip."),
            Column::new("class.destination", MetroDataType::Id)
                .with_description("Destination node of a road trip."),
            Column::new("class.vehicle", MetroDataType::Id)
                .with_description("Vehicle type of a road trip."),
            Column::new("class.travel_time", MetroDataType::Float)
                .with_description("Travel time of a virtual trip, in seconds."),
            Column::new("constant_utility", MetroDataType::Float)
                .with_description("Constant utility of the trip."),
            Column::new("alpha", MetroDataType::Float)
                .with_description("Penalty per second of travel time."),
            Column::new("schedule_utility.type", MetroDataType::String)
                .with_description("Type of schedule utility."),
            Column::new("schedule_utility.tstar", MetroDataType::Float)
                .with_description("Desired arrival time, in seconds after midnight."),
            Column::new("schedule_utility.beta", MetroDataType::Float)
                .with_description("Early-arrival penalty, per second."),
            Column::new("schedule_utility.gamma", MetroDataType::Float)
                .with_description("Late-arrival penalty, per second."),
            Column::new("schedule_utility.delta", MetroDataType::Float)
                .with_description("Length of the desired time window, in seconds."),
        ])
});

pub static METRO_TRIP_RESULTS: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("MetroTripResults", "run/output/trip_results.parquet")
        .with_description("Trip-level results from the simulator.")
        .with_schema(vec![
            Column::new("agent_id", MetroDataType::Id)
                .non_nullable()
                .with_description("Identifier of the agent performing the trip."),
            Column::new("trip_id", MetroDataType::Id)
                .non_nullable()
                .with_description("Identifier of the trip."),
            Column::new("departure_time", MetroDataType::Float)
                .non_nullable()
                .with_description("Departure time of the trip, in seconds after midnight."),
            Column::new("arrival_time", MetroDataType::Float)
                .non_nullable()
                .with_description("Arrival time of the trip, in seconds after midnight."),
            Column::new("road_time", MetroDataType::Float)
                .with_description("Time spent on the road segments, in seconds."),
            Column::new("in_bottleneck_time", MetroDataType::Float)
                .with_description("Time spent waiting at an entry bottleneck, in seconds."),
            Column::new("length", MetroDataType::Float)
                .with_description("Length of the route taken, in meters."),
        ])
});

pub static METRO_AGENT_RESULTS: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("MetroAgentResults", "run/output/agent_results.parquet")
        .with_description("Agent-level results from the simulator.")
        .with_schema(vec![
            Column::new("agent_id", MetroDataType::Id)
                .unique()
                .non_nullable()
                .with_description("Identifier of the agent."),
            Column::new("selected_alt_id", MetroDataType::Id)
                .non_nullable()
                .with_description("Identifier of the alternative chosen."),
            Column::new("expected_utility", MetroDataType::Float)
                .non_nullable()
                .with_description("Expected utility of the agent."),
            Column::new("utility", MetroDataType::Float)
                .non_nullable()
                .with_description("Realized utility of the agent."),
        ])
});
