//! Clases de artifact de la red vial.

use metro_core::{Column, FileSpec, MetroDataType};
use once_cell::sync::Lazy;

pub static RAW_EDGES: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::geodataframe("RawEdges", "network/road_network/edges_raw.geo.parquet")
        .with_description("Characteristics of the road-network edges.")
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
            Column::new("road_type", MetroDataType::Id)
                .optional()
                .non_nullable()
                .with_description("Identifier of the edge's road type."),
            Column::new("length", MetroDataType::Float)
                .non_nullable()
                .with_description("Length of the edge, in meters."),
            Column::new("speed_limit", MetroDataType::Float)
                .optional()
                .with_description("Speed limit on the edge, in km/h."),
            Column::new("lanes", MetroDataType::Float)
                .optional()
                .with_description("Number of lanes on the edge."),
        ])
});

pub static EDGES_CAPACITIES: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("EdgesCapacities", "network/road_network/edges_capacities.parquet")
        .with_description("Bottleneck capacity of each road-network edge.")
        .with_schema(vec![
            Column::new("edge_id", MetroDataType::Id)
                .unique()
                .non_nullable()
                .with_description("Identifier of the edge."),
            Column::new("capacity", MetroDataType::Float)
                .with_description("Bottleneck capacity of the edge, in PCE per hour."),
        ])
});

pub static ALL_FREE_FLOW_TRAVEL_TIMES: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe(
        "AllFreeFlowTravelTimes",
        "network/road_network/all_free_flow_travel_times.parquet",
    )
    .with_description("Free-flow travel time for each pair of nodes on the road network.")
    .with_schema(vec![
        Column::new("origin_id", MetroDataType::Id)
            .non_nullable()
            .with_description("Identifier of the origin node."),
        Column::new("destination_id", MetroDataType::Id)
            .non_nullable()
            .with_description("Identifier of the destination node."),
        Column::new("free_flow_travel_time", MetroDataType::Duration)
            .with_description("Free-flow travel time."),
    ])
});

pub static ALL_DISTANCES: Lazy<FileSpec> = Lazy::new(|| {
    FileSpec::dataframe("AllDistances", "network/road_network/all_distances.parquet")
        .with_description("Shortest-path distance for each pair of nodes on the road network.")
        .with_schema(vec![
            Column::new("origin_id", MetroDataType::Id)
                .non_nullable()
                .with_description("Identifier of the origin node."),
            Column::new("destination_id", MetroDataType::Id)
                .non_nullable()
                .with_description("Identifier of the destination node."),
            Column::new("distance", MetroDataType::Float)
                .with_description("Distance of the shortest path, in meters."),
        ])
});
